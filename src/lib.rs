pub mod auth;
pub mod common;
pub mod config;
pub mod credential_cache;
pub mod formula_grid;
pub mod sheets;

pub use auth::{AuthProvider, Credential};
pub use common::error::{Error, Result};
pub use credential_cache::CredentialCache;
pub use formula_grid::{FormulaGrid, FormulaGridBuilder};
pub use sheets::SpreadsheetClient;
