//! Dynamon configuration.

use std::env;
use std::path::PathBuf;

use dynamon_model::endpoint::Endpoint;

use crate::error::EngineError;

/// Region used when `DEFAULT_REGION` is unset.
pub const DEFAULT_REGION: &str = "us-east-1";

/// DynamoDB Local URL used when `DYNAMON_LOCAL_ENDPOINT` is unset.
pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:8000";

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct DynamonConfig {
    /// JSON file holding an array of endpoints.
    pub endpoints_file: Option<PathBuf>,
    /// Region of the built-in local endpoint.
    pub default_region: String,
    /// URL of the built-in local endpoint.
    pub local_endpoint: String,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl DynamonConfig {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            endpoints_file: env::var("DYNAMON_ENDPOINTS")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            default_region: env::var("DEFAULT_REGION")
                .unwrap_or_else(|_| DEFAULT_REGION.to_owned()),
            local_endpoint: env::var("DYNAMON_LOCAL_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_LOCAL_ENDPOINT.to_owned()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned()),
        }
    }

    /// The endpoint offered when no endpoint file is configured.
    #[must_use]
    pub fn local_endpoint(&self) -> Endpoint {
        Endpoint::new("Local", self.default_region.clone(), self.local_endpoint.clone())
    }

    /// Load the configured endpoints.
    pub fn load_endpoints(&self) -> Result<Vec<Endpoint>, EngineError> {
        let Some(path) = &self.endpoints_file else {
            return Ok(vec![self.local_endpoint()]);
        };

        let raw = std::fs::read(path)
            .map_err(|e| EngineError::Config(format!("reading {}: {e}", path.display())))?;
        serde_json::from_slice(&raw)
            .map_err(|e| EngineError::Config(format!("parsing {}: {e}", path.display())))
    }
}

impl Default for DynamonConfig {
    fn default() -> Self {
        Self {
            endpoints_file: None,
            default_region: DEFAULT_REGION.to_owned(),
            local_endpoint: DEFAULT_LOCAL_ENDPOINT.to_owned(),
            log_level: "info".to_owned(),
        }
    }
}
