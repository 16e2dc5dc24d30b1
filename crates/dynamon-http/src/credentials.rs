//! Signing credentials.
//!
//! Remote endpoints resolve credentials through the AWS default provider
//! chain (environment, shared config and credentials files, `AWS_PROFILE`,
//! web identity, container and instance roles). Endpoints on this machine
//! use the environment when it is set and `local`/`local` otherwise, which
//! DynamoDB Local accepts.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use aws_config::Region;
use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_credential_types::provider::ProvideCredentials;
use tokio::sync::OnceCell;
use tracing::debug;

use dynamon_model::endpoint::ClientOptions;

use crate::error::SigningError;

/// Access key used against local endpoints when the environment provides none.
pub const LOCAL_ACCESS_KEY: &str = "local";
/// Secret key used against local endpoints when the environment provides none.
pub const LOCAL_SECRET_KEY: &str = "local";

/// An AWS access key pair with an optional session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Create credentials without a session token.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Credentials accepted by DynamoDB Local.
    #[must_use]
    pub fn local() -> Self {
        Self::new(LOCAL_ACCESS_KEY, LOCAL_SECRET_KEY)
    }

    /// Read `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
    /// `AWS_SESSION_TOKEN`. `None` unless both keys are set and non-empty.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID")
            .ok()
            .filter(|v| !v.is_empty())?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self {
            access_key_id,
            secret_access_key,
            session_token: std::env::var("AWS_SESSION_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
        })
    }
}

impl From<aws_credential_types::Credentials> for Credentials {
    fn from(creds: aws_credential_types::Credentials) -> Self {
        Self {
            access_key_id: creds.access_key_id().to_owned(),
            secret_access_key: creds.secret_access_key().to_owned(),
            session_token: creds.session_token().map(str::to_owned),
        }
    }
}

/// Source of signing credentials.
#[async_trait]
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Credentials for the next request.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::MissingCredentials`] when none are available
    /// and [`SigningError::Provider`] when a provider chain fails.
    async fn credentials(&self) -> Result<Credentials, SigningError>;
}

/// The provider a client for `options` signs with.
///
/// Only endpoints on this machine may fall back to `local`/`local`.
#[must_use]
pub fn provider_for(options: &ClientOptions) -> Arc<dyn CredentialProvider> {
    if options.is_local() {
        Arc::new(LocalCredentialProvider)
    } else {
        Arc::new(DefaultChainCredentialProvider::new(options.region.clone()))
    }
}

/// Always hands out the same credentials.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credentials: Credentials,
}

impl StaticCredentialProvider {
    /// Wrap fixed credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn credentials(&self) -> Result<Credentials, SigningError> {
        if self.credentials.access_key_id.is_empty() {
            return Err(SigningError::MissingCredentials);
        }
        Ok(self.credentials.clone())
    }
}

/// Re-reads the environment on every request; fails when it is unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialProvider;

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn credentials(&self) -> Result<Credentials, SigningError> {
        Credentials::from_env().ok_or(SigningError::MissingCredentials)
    }
}

/// The environment when set, otherwise [`Credentials::local`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCredentialProvider;

#[async_trait]
impl CredentialProvider for LocalCredentialProvider {
    async fn credentials(&self) -> Result<Credentials, SigningError> {
        Ok(Credentials::from_env().unwrap_or_else(Credentials::local))
    }
}

/// The AWS default provider chain, built on first use.
///
/// The chain caches and refreshes temporary credentials itself.
pub struct DefaultChainCredentialProvider {
    region: String,
    chain: OnceCell<DefaultCredentialsChain>,
}

impl fmt::Debug for DefaultChainCredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultChainCredentialProvider")
            .field("region", &self.region)
            .field("initialized", &self.chain.initialized())
            .finish()
    }
}

impl DefaultChainCredentialProvider {
    /// A chain resolving region-scoped providers (STS, SSO) in `region`.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            chain: OnceCell::new(),
        }
    }
}

#[async_trait]
impl CredentialProvider for DefaultChainCredentialProvider {
    async fn credentials(&self) -> Result<Credentials, SigningError> {
        let chain = self
            .chain
            .get_or_init(|| async {
                debug!(region = %self.region, "building default credential chain");
                DefaultCredentialsChain::builder()
                    .region(Region::new(self.region.clone()))
                    .build()
                    .await
            })
            .await;
        let creds = chain
            .provide_credentials()
            .await
            .map_err(SigningError::Provider)?;
        Ok(creds.into())
    }
}
