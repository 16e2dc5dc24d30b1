//! DynamoDB client layer for Dynamon.
//!
//! This crate speaks the `awsJson1_0` protocol to a DynamoDB endpoint:
//!
//! - **Boundary trait**: [`DynamoDBApi`], the operations the engine depends on
//! - **Transport**: [`HttpDynamoDBClient`], `POST /` with `X-Amz-Target`
//! - **Signing**: AWS Signature Version 4 over the canonical request
//! - **Document client**: scan results unwrapped into plain records
#![allow(missing_docs)]

pub mod canonical;
pub mod client;
pub mod credentials;
pub mod document;
pub mod error;
pub mod signer;
pub mod transport;

pub use client::DynamoDBApi;
pub use credentials::{
    CredentialProvider, Credentials, DefaultChainCredentialProvider, EnvCredentialProvider,
    LocalCredentialProvider, StaticCredentialProvider, provider_for,
};
pub use document::{DocumentClient, DocumentScanOutput};
pub use error::SigningError;
pub use signer::SigV4Signer;
pub use transport::HttpDynamoDBClient;
