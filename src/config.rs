use crate::auth::SPREADSHEETS_SCOPE;
use crate::common::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// Public sample spreadsheet with a `Class Data` sheet.
pub const SAMPLE_SPREADSHEET_ID: &str = "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms";
pub const SAMPLE_RANGE: &str = "Class Data!A2:E";
pub const DEFAULT_WRITE_RANGE: &str = "Example!A1";

/// Environment variables are read as `SHEETGRID_<FIELD>`, e.g. `SHEETGRID_TOKEN_PATH`.
pub const ENV_PREFIX: &str = "SHEETGRID";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Cached `authorized_user` credential.
    pub token_path: PathBuf,
    /// OAuth client secret bundle downloaded from the Cloud console.
    pub client_secrets_path: PathBuf,
    pub scopes: Vec<String>,
    pub read_spreadsheet_id: String,
    pub read_range: String,
    pub write_spreadsheet_id: Option<String>,
    pub write_range: String,
}

impl Settings {
    /// Defaults, then the optional `file`, then `SHEETGRID_*` variables.
    pub fn load(file: Option<&str>) -> Result<Settings, ConfigError> {
        let mut builder = ::config::Config::builder()
            .set_default("token_path", "token.json")?
            .set_default("client_secrets_path", "credentials.json")?
            .set_default("scopes", vec![SPREADSHEETS_SCOPE.to_string()])?
            .set_default("read_spreadsheet_id", SAMPLE_SPREADSHEET_ID)?
            .set_default("read_range", SAMPLE_RANGE)?
            .set_default("write_range", DEFAULT_WRITE_RANGE)?;

        builder = match file {
            Some(name) => builder.add_source(::config::File::with_name(name)),
            None => builder.add_source(::config::File::with_name("Sheetgrid").required(false)),
        };

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("scopes"),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
