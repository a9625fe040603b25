use crate::common::error::AuthError;
use async_trait::async_trait;
use std::path::Path;

#[cfg(feature = "sheets")]
use google_sheets4::oauth2;
#[cfg(feature = "sheets")]
use google_sheets4::{hyper, hyper_rustls};
#[cfg(feature = "sheets")]
use oauth2::authenticator_delegate::{DefaultInstalledFlowDelegate, InstalledFlowDelegate};
#[cfg(feature = "sheets")]
use oauth2::storage::{TokenInfo, TokenStorage};
#[cfg(feature = "sheets")]
use std::future::Future;
#[cfg(feature = "sheets")]
use std::pin::Pin;
#[cfg(feature = "sheets")]
use std::sync::{Arc, Mutex};

/// Read/write access to spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Credential kind understood by Google's `authorized_user` refresh flow.
pub const AUTHORIZED_USER: &str = "authorized_user";

/// Bearer credential of an OAuth2 user.
///
/// Values are never updated in place. A newer login produces a new `Credential` that replaces
/// the stored one as a whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    pub kind: String,
    pub client_id: String,
    pub client_secret: String,
    /// Long lived token. Only credentials carrying one are worth caching.
    pub refresh_token: Option<String>,
    /// Short lived token obtained during this run, if any.
    pub access_token: Option<String>,
}

impl Credential {
    pub fn authorized_user(
        client_id: &str,
        client_secret: &str,
        refresh_token: Option<&str>,
    ) -> Self {
        Credential {
            kind: AUTHORIZED_USER.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            refresh_token: refresh_token.map(str::to_string),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    pub fn is_persistable(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Source of fresh credentials, normally a browser based consent flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Obtain a credential for `scopes` using the client secret bundle at
    /// `client_secrets_path`. May block on the user.
    async fn interactive_login(
        &self,
        scopes: &[String],
        client_secrets_path: &Path,
    ) -> Result<Credential, AuthError>;
}

#[cfg(feature = "sheets")]
pub type HttpsConnector = hyper_rustls::HttpsConnector<hyper::client::HttpConnector>;

#[cfg(feature = "sheets")]
pub fn new_client() -> hyper::Client<HttpsConnector> {
    hyper::Client::builder().build(
        hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .https_only()
            .enable_http1()
            .build(),
    )
}

/// Opens the consent URL in a browser, falling back to
/// `DefaultInstalledFlowDelegate::present_user_url` so the URL is still printed when no browser
/// could be started.
#[cfg(feature = "sheets")]
async fn browser_user_url(url: &str, need_code: bool) -> Result<String, String> {
    if webbrowser::open(url).is_ok() {
        log::info!("webbrowser was successfully opened.");
    }
    let def_delegate = DefaultInstalledFlowDelegate;
    def_delegate.present_user_url(url, need_code).await
}

#[cfg(feature = "sheets")]
#[derive(Copy, Clone)]
struct InstalledFlowBrowserDelegate;

#[cfg(feature = "sheets")]
impl InstalledFlowDelegate for InstalledFlowBrowserDelegate {
    fn present_user_url<'a>(
        &'a self,
        url: &'a str,
        need_code: bool,
    ) -> Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>> {
        Box::pin(browser_user_url(url, need_code))
    }
}

/// In-memory token storage that keeps whatever the flow hands back, so the refresh token can
/// be read out after `token()` returns.
#[cfg(feature = "sheets")]
#[derive(Clone, Default)]
struct CapturedToken {
    slot: Arc<Mutex<Option<TokenInfo>>>,
}

#[cfg(feature = "sheets")]
impl CapturedToken {
    fn refresh_token(&self) -> Option<String> {
        self.slot
            .lock()
            .ok()?
            .as_ref()
            .and_then(|info| info.refresh_token.clone())
    }
}

#[cfg(feature = "sheets")]
#[async_trait]
impl TokenStorage for CapturedToken {
    async fn set(&self, _scopes: &[&str], token: TokenInfo) -> anyhow::Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| anyhow::anyhow!("token slot poisoned: {}", e))?;
        *slot = Some(token);
        Ok(())
    }

    async fn get(&self, _scopes: &[&str]) -> Option<TokenInfo> {
        self.slot.lock().ok()?.clone()
    }
}

/// Installed application flow with an HTTP redirect to localhost.
#[cfg(feature = "sheets")]
#[derive(Clone, Copy, Default)]
pub struct InstalledFlowProvider;

#[cfg(feature = "sheets")]
#[async_trait]
impl AuthProvider for InstalledFlowProvider {
    async fn interactive_login(
        &self,
        scopes: &[String],
        client_secrets_path: &Path,
    ) -> Result<Credential, AuthError> {
        let secret = oauth2::read_application_secret(client_secrets_path)
            .await
            .map_err(|e| AuthError::InvalidClientSecrets {
                path: client_secrets_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let captured = CapturedToken::default();
        let auth = oauth2::InstalledFlowAuthenticator::builder(
            secret.clone(),
            oauth2::InstalledFlowReturnMethod::HTTPRedirect,
        )
        .with_storage(Box::new(captured.clone()))
        .flow_delegate(Box::new(InstalledFlowBrowserDelegate))
        .build()
        .await
        .map_err(|e| AuthError::Flow(e.to_string()))?;

        let token = auth
            .token(scopes)
            .await
            .map_err(|e| AuthError::Flow(e.to_string()))?;
        let access_token = token.token().ok_or(AuthError::NoToken)?;

        let refresh_token = captured.refresh_token();
        if refresh_token.is_none() {
            log::warn!("authorization returned no refresh token");
        }
        Ok(Credential::authorized_user(
            &secret.client_id,
            &secret.client_secret,
            refresh_token.as_deref(),
        )
        .with_access_token(access_token))
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;
