use crate::auth::{AuthProvider, Credential, AUTHORIZED_USER};
use crate::common::error::{AuthError, ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::io;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// On-disk form of a cached credential, compatible with Google's `authorized_user` JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    #[serde(rename = "type")]
    pub kind: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl From<StoredCredential> for Credential {
    fn from(stored: StoredCredential) -> Self {
        Credential::authorized_user(
            &stored.client_id,
            &stored.client_secret,
            Some(&stored.refresh_token),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientKey {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientKey>,
    web: Option<ClientKey>,
}

/// Client secret bundle downloaded from the Cloud console.
///
/// Desktop clients are keyed `installed`, web clients `web`. When a file carries both,
/// `installed` is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientSecret {
    Installed(ClientKey),
    Web(ClientKey),
}

impl ClientSecret {
    pub fn key(&self) -> &ClientKey {
        match self {
            ClientSecret::Installed(key) | ClientSecret::Web(key) => key,
        }
    }

    pub fn parse(path: &Path, content: &str) -> std::result::Result<Self, ConfigError> {
        let file: ClientSecretFile =
            serde_json::from_str(content).map_err(|source| ConfigError::ParseClientSecrets {
                path: path.to_path_buf(),
                source,
            })?;
        match (file.installed, file.web) {
            (Some(key), _) => Ok(ClientSecret::Installed(key)),
            (None, Some(key)) => Ok(ClientSecret::Web(key)),
            (None, None) => Err(ConfigError::UnknownClientSecretShape {
                path: path.to_path_buf(),
            }),
        }
    }

    pub async fn read(path: &Path) -> std::result::Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::ReadClientSecrets {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::parse(path, &content)
    }
}

/// Create or truncate `path` with `contents`, readable by the owner only on unix.
async fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(path).await?;
    // mode() only applies when the file is created
    #[cfg(unix)]
    file.set_permissions(std::fs::Permissions::from_mode(0o600)).await?;
    file.write_all(contents).await?;
    file.flush().await
}

/// Keeps a user credential on disk so the browser login happens only once.
///
/// The token file holds a long lived refresh token and is written with mode `0600` on
/// unix. Elsewhere it inherits the directory's default permissions.
///
/// There is no locking around the token file. Two concurrent `authorize` calls against the
/// same path race and the last write wins.
#[derive(Debug, Clone)]
pub struct CredentialCache {
    token_path: PathBuf,
    client_secrets_path: PathBuf,
}

impl CredentialCache {
    pub fn new(token_path: impl Into<PathBuf>, client_secrets_path: impl Into<PathBuf>) -> Self {
        CredentialCache {
            token_path: token_path.into(),
            client_secrets_path: client_secrets_path.into(),
        }
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    pub fn client_secrets_path(&self) -> &Path {
        &self.client_secrets_path
    }

    /// Read the cached credential. A missing, unreadable or malformed file is a cache miss.
    pub async fn load(&self) -> Option<Credential> {
        let content = match fs::read_to_string(&self.token_path).await {
            Ok(content) => content,
            Err(e) => {
                log::debug!("no cached credential at {:?}: {}", self.token_path, e);
                return None;
            }
        };
        let stored: StoredCredential = match serde_json::from_str(&content) {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("ignoring corrupt credential {:?}: {}", self.token_path, e);
                return None;
            }
        };
        if stored.kind != AUTHORIZED_USER {
            log::warn!(
                "ignoring credential {:?} of type {:?}",
                self.token_path,
                stored.kind
            );
            return None;
        }
        if stored.refresh_token.is_empty() {
            log::warn!(
                "ignoring credential {:?} with an empty refresh token",
                self.token_path
            );
            return None;
        }
        log::debug!("loaded cached credential from {:?}", self.token_path);
        Some(stored.into())
    }

    /// Run the interactive login for `scopes`.
    pub async fn acquire<P>(
        &self,
        provider: &P,
        scopes: &[String],
    ) -> std::result::Result<Credential, AuthError>
    where
        P: AuthProvider + ?Sized,
    {
        log::info!("requesting authorization for {:?}", scopes);
        provider
            .interactive_login(scopes, &self.client_secrets_path)
            .await
    }

    /// Write `credential` to the token file, replacing whatever was there.
    pub async fn persist(&self, credential: &Credential) -> std::result::Result<(), ConfigError> {
        let secret = ClientSecret::read(&self.client_secrets_path).await?;
        let refresh_token = credential
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingRefreshToken)?;
        let key = secret.key();
        let stored = StoredCredential {
            kind: AUTHORIZED_USER.to_string(),
            client_id: key.client_id.clone(),
            client_secret: key.client_secret.clone(),
            refresh_token,
        };
        let payload = serde_json::to_string(&stored)?;
        write_private(&self.token_path, payload.as_bytes())
            .await
            .map_err(|source| ConfigError::WriteToken {
                path: self.token_path.clone(),
                source,
            })?;
        log::info!("stored credential to {:?}", self.token_path);
        Ok(())
    }

    /// Cached credential if there is one, otherwise a fresh login that is cached when it
    /// carries a refresh token.
    pub async fn authorize<P>(&self, provider: &P, scopes: &[String]) -> Result<Credential>
    where
        P: AuthProvider + ?Sized,
    {
        if let Some(credential) = self.load().await {
            return Ok(credential);
        }
        let credential = self.acquire(provider, scopes).await?;
        if credential.is_persistable() {
            self.persist(&credential).await?;
        } else {
            log::info!("credential has no refresh token; not caching it");
        }
        Ok(credential)
    }
}

#[cfg(test)]
#[path = "credential_cache_test.rs"]
mod credential_cache_test;
