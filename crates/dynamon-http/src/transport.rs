//! `awsJson1_0` client over `reqwest`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use dynamon_model::endpoint::ClientOptions;
use dynamon_model::error::{DynamoDBError, DynamoDBErrorCode};
use dynamon_model::input::{
    CreateTableInput, DeleteTableInput, DescribeTableInput, ListTablesInput, ScanInput,
};
use dynamon_model::operations::DynamoDBOperation;
use dynamon_model::output::{
    CreateTableOutput, DeleteTableOutput, DescribeTableOutput, ListTablesOutput, ScanOutput,
};

use crate::client::DynamoDBApi;
use crate::credentials::{self, CredentialProvider};
use crate::signer::SigV4Signer;

/// Content type of DynamoDB requests and responses.
pub const CONTENT_TYPE: &str = "application/x-amz-json-1.0";

/// Checksum header DynamoDB attaches to every response body.
const CRC32_HEADER: &str = "x-amz-crc32";

/// A DynamoDB client bound to one endpoint and region.
#[derive(Debug, Clone)]
pub struct HttpDynamoDBClient {
    http: reqwest::Client,
    uri: http::Uri,
    signer: SigV4Signer,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpDynamoDBClient {
    /// Build a client signing with the provider [`credentials::provider_for`]
    /// picks for the endpoint.
    pub fn new(options: &ClientOptions) -> Result<Self, DynamoDBError> {
        Self::with_credentials(options, credentials::provider_for(options))
    }

    /// Build a client with an explicit credential source.
    pub fn with_credentials(
        options: &ClientOptions,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, DynamoDBError> {
        let url = format!("{}/", options.url());
        let uri: http::Uri = url.parse().map_err(|e: http::uri::InvalidUri| {
            DynamoDBError::validation(format!("invalid endpoint URL {url}: {e}"))
        })?;
        if uri.authority().is_none() {
            return Err(DynamoDBError::validation(format!(
                "endpoint URL has no host: {url}"
            )));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            uri,
            signer: SigV4Signer::new(options.region.clone()),
            credentials,
        })
    }

    /// The URL requests are posted to.
    #[must_use]
    pub fn uri(&self) -> &http::Uri {
        &self.uri
    }

    async fn call<I, O>(&self, op: DynamoDBOperation, input: &I) -> Result<O, DynamoDBError>
    where
        I: Serialize + Sync,
        O: DeserializeOwned,
    {
        let body = serde_json::to_vec(input).map_err(|e| {
            DynamoDBError::with_message(DynamoDBErrorCode::SerializationException, e.to_string())
                .with_source(e)
        })?;

        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static(CONTENT_TYPE),
        );
        let target = http::HeaderValue::from_str(&op.target())
            .map_err(|e| DynamoDBError::validation(e.to_string()))?;
        headers.insert("x-amz-target", target);

        let credentials = self.credentials.credentials().await.map_err(|e| {
            DynamoDBError::with_message(
                DynamoDBErrorCode::MissingAuthenticationTokenException,
                e.to_string(),
            )
        })?;
        self.signer
            .sign(
                &credentials,
                &http::Method::POST,
                &self.uri,
                &mut headers,
                &body,
                chrono::Utc::now(),
            )
            .map_err(|e| DynamoDBError::validation(e.to_string()).with_source(e))?;

        debug!(operation = %op, uri = %self.uri, "sending DynamoDB request");

        let response = self
            .http
            .post(self.uri.to_string())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(DynamoDBError::transport)?;

        let status = response.status();
        let expected_crc = response
            .headers()
            .get(CRC32_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok());
        let bytes = response.bytes().await.map_err(DynamoDBError::transport)?;

        debug!(operation = %op, status = %status, len = bytes.len(), "received DynamoDB response");

        verify_crc32(expected_crc, &bytes)?;

        if !status.is_success() {
            return Err(DynamoDBError::from_response(status, &bytes));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            DynamoDBError::with_message(
                DynamoDBErrorCode::SerializationException,
                format!("malformed {op} response: {e}"),
            )
            .with_source(e)
        })
    }
}

fn verify_crc32(expected: Option<u32>, body: &[u8]) -> Result<(), DynamoDBError> {
    match expected {
        Some(expected) if expected != crc32fast::hash(body) => {
            Err(DynamoDBError::with_message(
                DynamoDBErrorCode::InternalServerError,
                "response body failed CRC32 verification",
            ))
        }
        _ => Ok(()),
    }
}

#[async_trait]
impl DynamoDBApi for HttpDynamoDBClient {
    async fn list_tables(&self, input: ListTablesInput) -> Result<ListTablesOutput, DynamoDBError> {
        self.call(DynamoDBOperation::ListTables, &input).await
    }

    async fn describe_table(
        &self,
        input: DescribeTableInput,
    ) -> Result<DescribeTableOutput, DynamoDBError> {
        self.call(DynamoDBOperation::DescribeTable, &input).await
    }

    async fn create_table(
        &self,
        input: CreateTableInput,
    ) -> Result<CreateTableOutput, DynamoDBError> {
        self.call(DynamoDBOperation::CreateTable, &input).await
    }

    async fn delete_table(
        &self,
        input: DeleteTableInput,
    ) -> Result<DeleteTableOutput, DynamoDBError> {
        self.call(DynamoDBOperation::DeleteTable, &input).await
    }

    async fn scan(&self, input: ScanInput) -> Result<ScanOutput, DynamoDBError> {
        self.call(DynamoDBOperation::Scan, &input).await
    }
}

#[cfg(test)]
mod tests {
    use dynamon_model::endpoint::Endpoint;

    use super::*;

    #[test]
    fn test_should_target_local_endpoint() {
        let opts = Endpoint::new("Local", "us-east-1", "http://localhost:8000").client_options();
        let client = HttpDynamoDBClient::new(&opts).unwrap();
        assert_eq!(client.uri().to_string(), "http://localhost:8000/");
    }

    #[test]
    fn test_should_target_regional_endpoint_when_url_empty() {
        let opts = Endpoint::new("prod", "eu-west-1", "").client_options();
        let client = HttpDynamoDBClient::new(&opts).unwrap();
        assert_eq!(
            client.uri().host(),
            Some("dynamodb.eu-west-1.amazonaws.com")
        );
    }

    #[test]
    fn test_should_reject_endpoint_without_host() {
        let opts = ClientOptions {
            region: "us-east-1".to_owned(),
            endpoint: "not a url".to_owned(),
        };
        let err = HttpDynamoDBClient::new(&opts).unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ValidationException);
    }

    #[test]
    fn test_should_verify_crc32() {
        let body = br#"{"TableNames":[]}"#;
        assert!(verify_crc32(None, body).is_ok());
        assert!(verify_crc32(Some(crc32fast::hash(body)), body).is_ok());
        assert!(verify_crc32(Some(0), body).is_err());
    }
}
