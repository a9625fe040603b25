use crate::common::error::Result;
use crate::formula_grid::FormulaGrid;
use async_trait::async_trait;
use serde_json::Value;

#[cfg(feature = "sheets")]
use crate::auth::{self, Credential};
#[cfg(feature = "sheets")]
use crate::common::error::{AuthError, BadRequest, Error};
#[cfg(feature = "sheets")]
use google_sheets4 as sheets4;
#[cfg(feature = "sheets")]
use sheets4::api::{UpdateValuesResponse, ValueRange};
#[cfg(feature = "sheets")]
use sheets4::{oauth2, Sheets};

/// Minimal read/write surface over a spreadsheet service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpreadsheetClient: Send + Sync {
    /// Rows of `range`, trailing empty cells omitted as the API does.
    async fn read(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<Value>>>;

    /// Write `rows` starting at `range`, returning the number of updated cells.
    async fn write(
        &self,
        spreadsheet_id: &str,
        range: &str,
        input: ValueInputOption,
        rows: Vec<Vec<Value>>,
    ) -> Result<u32>;
}

/// Rows are the outer array of every `ValueRange` sent or requested here.
#[cfg(feature = "sheets")]
const ROWS: &str = "ROWS";

/// How written strings are interpreted. `UserEntered` turns `=A4+B4` into a formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueInputOption {
    Raw,
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
            ValueInputOption::UserEntered => "USER_ENTERED",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ValuesGetParam {
    spreadsheet_id: String,
    range: String,
}

impl ValuesGetParam {
    pub fn new(spreadsheet_id: &str, range: &str) -> Self {
        ValuesGetParam {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ValuesUpdateParam {
    spreadsheet_id: String,
    range: String,
    value_input_option: ValueInputOption,
}

impl ValuesUpdateParam {
    pub fn new(spreadsheet_id: &str, range: &str, value_input_option: ValueInputOption) -> Self {
        ValuesUpdateParam {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            value_input_option,
        }
    }
}

/// Display text of a cell. Strings are shown without quotes, empty cells as "".
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Project every row onto `indices`. Cells past the end of a row come back empty.
pub fn select_columns(rows: &[Vec<Value>], indices: &[usize]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            indices
                .iter()
                .map(|&i| row.get(i).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Read `range` and keep only the columns at `indices`.
pub async fn read_columns<C>(
    client: &C,
    spreadsheet_id: &str,
    range: &str,
    indices: &[usize],
) -> Result<Vec<Vec<String>>>
where
    C: SpreadsheetClient + ?Sized,
{
    let rows = client.read(spreadsheet_id, range).await?;
    log::debug!("read {} rows from {}", rows.len(), range);
    Ok(select_columns(&rows, indices))
}

/// Write `grid` at `range`. With `USER_ENTERED` the sheet evaluates the formulas,
/// with `RAW` they land as plain text.
pub async fn write_grid<C>(
    client: &C,
    spreadsheet_id: &str,
    range: &str,
    input: ValueInputOption,
    grid: &FormulaGrid,
) -> Result<u32>
where
    C: SpreadsheetClient + ?Sized,
{
    let updated = client
        .write(spreadsheet_id, range, input, grid.to_values())
        .await?;
    log::info!("{} cells updated.", updated);
    Ok(updated)
}

#[cfg(feature = "sheets")]
pub struct SpreadSheet {
    api: Sheets<auth::HttpsConnector>,
}

#[cfg(feature = "sheets")]
impl SpreadSheet {
    /// Build a hub for `credential`. A refresh token enables the `authorized_user` refresh
    /// flow; without one the access token from this run is used as is.
    pub async fn new(credential: &Credential) -> Result<SpreadSheet> {
        let client = auth::new_client();
        let hub = match &credential.refresh_token {
            Some(refresh_token) => {
                let secret = oauth2::authorized_user::AuthorizedUserSecret {
                    client_id: credential.client_id.clone(),
                    client_secret: credential.client_secret.clone(),
                    refresh_token: refresh_token.clone(),
                    key_type: credential.kind.clone(),
                };
                let authenticator = oauth2::AuthorizedUserAuthenticator::builder(secret)
                    .build()
                    .await
                    .map_err(|e| AuthError::Flow(e.to_string()))?;
                Sheets::new(client, authenticator)
            }
            None => {
                let token = credential.access_token.clone().ok_or(AuthError::NoToken)?;
                Sheets::new(client, token)
            }
        };
        Ok(SpreadSheet { api: hub })
    }

    fn handle_error(e: sheets4::Error) -> Error {
        match e {
            sheets4::Error::BadRequest(body) => {
                let request_error = BadRequest::classify(&body);
                log::error!("{}", request_error);
                Error::Request(request_error)
            }
            other => {
                log::error!("{}", other);
                Error::Sheets(other.to_string())
            }
        }
    }

    pub async fn get_values(&self, p: &ValuesGetParam) -> Result<ValueRange> {
        // https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values/get
        let result = self
            .api
            .spreadsheets()
            .values_get(&p.spreadsheet_id, &p.range)
            .major_dimension(ROWS)
            .doit()
            .await
            .map_err(Self::handle_error)?;

        Ok(result.1)
    }

    pub async fn update_values(
        &self,
        p: &ValuesUpdateParam,
        values: Vec<Vec<Value>>,
    ) -> Result<UpdateValuesResponse> {
        // https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values/update
        let request = ValueRange {
            major_dimension: Some(ROWS.to_string()),
            range: None,
            values: Some(values),
        };
        let result = self
            .api
            .spreadsheets()
            .values_update(request, &p.spreadsheet_id, &p.range)
            .value_input_option(p.value_input_option.as_str())
            .doit()
            .await
            .map_err(Self::handle_error)?;

        Ok(result.1)
    }
}

#[cfg(feature = "sheets")]
#[async_trait]
impl SpreadsheetClient for SpreadSheet {
    async fn read(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<Value>>> {
        let params = ValuesGetParam::new(spreadsheet_id, range);
        let value_range = self.get_values(&params).await?;
        Ok(value_range.values.unwrap_or_default())
    }

    async fn write(
        &self,
        spreadsheet_id: &str,
        range: &str,
        input: ValueInputOption,
        rows: Vec<Vec<Value>>,
    ) -> Result<u32> {
        let params = ValuesUpdateParam::new(spreadsheet_id, range, input);
        let response = self.update_values(&params, rows).await?;
        Ok(response.updated_cells.unwrap_or(0).max(0) as u32)
    }
}

#[cfg(test)]
#[path = "sheets_test.rs"]
mod sheets_test;
