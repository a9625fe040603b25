use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Crate level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error("spreadsheet request failed: {0}")]
    Sheets(String),
    #[error("spreadsheet request rejected: {0}")]
    Request(#[from] RequestError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Interactive login could not complete.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("client secrets at {path:?} are not usable: {message}")]
    InvalidClientSecrets { path: PathBuf, message: String },
    #[error("authorization flow failed: {0}")]
    Flow(String),
    #[error("authorization flow finished without an access token")]
    NoToken,
}

/// Configuration and credential file problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read client secrets {path:?}: {source}")]
    ReadClientSecrets { path: PathBuf, source: io::Error },
    #[error("could not parse client secrets {path:?}: {source}")]
    ParseClientSecrets {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("client secrets {path:?} have neither an `installed` nor a `web` key")]
    UnknownClientSecretShape { path: PathBuf },
    #[error("credential has no refresh token to store")]
    MissingRefreshToken,
    #[error("could not encode credential: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("could not write credential to {path:?}: {source}")]
    WriteToken { path: PathBuf, source: io::Error },
    #[error("invalid settings: {0}")]
    Settings(#[from] ::config::ConfigError),
}

/// Formula grid layout asks for more than the column alphabet holds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("column {index} is outside the {available} letter alphabet")]
    AlphabetExhausted { index: usize, available: usize },
}

/// Google API response BadRequest
///
/// Err(Bad Request: {"error":{"code":404,"errors":[{"domain":"global","message":"Requested entity was not found.","reason":"notFound"}],"message":"Requested entity was not found.","status":"NOT_FOUND"}}
///
#[derive(Debug, Error, Deserialize, Serialize, PartialEq, Eq)]
pub enum RequestError {
    /// 404 notfound
    #[error("code: {code}, {message}")]
    NotFound { code: u16, message: String },
    /// 403 forbidden
    #[error("code: {code}, {message}")]
    Forbidden { code: u16, message: String },
    /// 400 invalid argument, e.g. a malformed range
    #[error("code: {code}, {message}")]
    InvalidArgument { code: u16, message: String },
    #[error("code: {code}, {message}")]
    Undefined { code: u16, message: String },
}

const UNKNOWN_CODE: u16 = 500;
const UNKNOWN_MESSAGE: &str = "Unknown error";

impl BadRequest {
    fn code_message(&self) -> (u16, String) {
        self.error
            .as_ref()
            .map(|e| {
                (
                    e.code.unwrap_or(UNKNOWN_CODE),
                    e.message
                        .clone()
                        .unwrap_or_else(|| String::from(UNKNOWN_MESSAGE)),
                )
            })
            .unwrap_or((UNKNOWN_CODE, String::from(UNKNOWN_MESSAGE)))
    }

    pub fn request_error(&self) -> RequestError {
        let (code, message) = self.code_message();
        match code {
            404 => RequestError::NotFound { code, message },
            403 => RequestError::Forbidden { code, message },
            400 => RequestError::InvalidArgument { code, message },
            _ => RequestError::Undefined { code, message },
        }
    }

    /// Classify a raw error body. Bodies that do not look like a Google error fall back to
    /// `Undefined`.
    pub fn classify(body: &serde_json::Value) -> RequestError {
        serde_json::from_value::<BadRequest>(body.clone())
            .map(|b| b.request_error())
            .unwrap_or(RequestError::Undefined {
                code: UNKNOWN_CODE,
                message: body.to_string(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BadRequest {
    pub error: Option<GoogleError>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GoogleError {
    pub code: Option<u16>,
    pub errors: Option<Vec<ErrorDetail>>,
    pub message: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorDetail {
    pub domain: Option<String>,
    pub message: Option<String>,
    pub reason: Option<String>,
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
