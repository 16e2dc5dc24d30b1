//! Endpoint descriptors.

use serde::{Deserialize, Serialize};

/// A named, region-scoped DynamoDB deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Display name shown to the operator.
    #[serde(default)]
    pub name: String,
    /// AWS region, also the connection cache key.
    pub region: String,
    /// Endpoint URL. Empty means the public regional endpoint.
    #[serde(default)]
    pub endpoint: String,
}

impl Endpoint {
    /// Create an endpoint descriptor.
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            endpoint: endpoint.into(),
        }
    }

    /// The subset of fields used to construct a client.
    ///
    /// The display name never reaches the transport.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

/// Options a client is constructed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    /// AWS region used for signing.
    pub region: String,
    /// Endpoint URL, empty for the regional default.
    pub endpoint: String,
}

impl ClientOptions {
    /// Resolve the URL requests are sent to.
    #[must_use]
    pub fn url(&self) -> String {
        if self.endpoint.is_empty() {
            format!("https://dynamodb.{}.amazonaws.com", self.region)
        } else {
            self.endpoint.trim_end_matches('/').to_owned()
        }
    }

    /// Whether the endpoint URL points at this machine, where DynamoDB Local
    /// and emulators accept any credentials.
    #[must_use]
    pub fn is_local(&self) -> bool {
        let Ok(uri) = self.endpoint.parse::<http::Uri>() else {
            return false;
        };
        uri.host().is_some_and(|host| {
            host == "localhost"
                || host.ends_with(".localhost")
                || host.starts_with("127.")
                || host == "[::1]"
                || host == "::1"
                || host == "0.0.0.0"
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_drop_name_from_client_options() {
        let ep = Endpoint::new("Local", "us-east-1", "http://localhost:8000");
        let opts = ep.client_options();
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"region": "us-east-1", "endpoint": "http://localhost:8000"})
        );
    }

    #[test]
    fn test_should_default_to_regional_url() {
        let opts = Endpoint::new("prod", "ap-northeast-2", "").client_options();
        assert_eq!(opts.url(), "https://dynamodb.ap-northeast-2.amazonaws.com");
    }

    #[test]
    fn test_should_strip_trailing_slash_from_url() {
        let opts = Endpoint::new("", "us-east-1", "http://localhost:8000/").client_options();
        assert_eq!(opts.url(), "http://localhost:8000");
    }

    #[test]
    fn test_should_recognize_local_endpoints() {
        for url in [
            "http://localhost:8000",
            "http://127.0.0.1:8000/",
            "http://[::1]:8000",
            "http://dynamodb.localhost:4566",
        ] {
            assert!(Endpoint::new("", "us-east-1", url).client_options().is_local(), "{url}");
        }
        for url in ["", "https://dynamodb.eu-west-1.amazonaws.com", "http://db.internal:8000"] {
            assert!(!Endpoint::new("", "us-east-1", url).client_options().is_local(), "{url}");
        }
    }
}
