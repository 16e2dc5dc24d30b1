//! Per-region connection cache.
//!
//! One low-level client and one document client per region, built on first
//! use and kept for the lifetime of the cache. The region is the whole key:
//! a second endpoint with the same region but a different URL reuses the
//! first connection.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use dynamon_http::{DocumentClient, DynamoDBApi, HttpDynamoDBClient};
use dynamon_model::endpoint::{ClientOptions, Endpoint};
use dynamon_model::error::DynamoDBError;

/// Builds low-level clients.
pub trait ConnectionFactory: Send + Sync + fmt::Debug {
    /// Construct a client from connection options.
    fn connect(&self, options: &ClientOptions) -> Result<Arc<dyn DynamoDBApi>, DynamoDBError>;
}

/// Builds [`HttpDynamoDBClient`]s signed with environment credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnectionFactory;

impl ConnectionFactory for HttpConnectionFactory {
    fn connect(&self, options: &ClientOptions) -> Result<Arc<dyn DynamoDBApi>, DynamoDBError> {
        Ok(Arc::new(HttpDynamoDBClient::new(options)?))
    }
}

/// A cached client pair.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Low-level client (table directory, passthroughs).
    pub api: Arc<dyn DynamoDBApi>,
    /// Document client sharing `api` (record reads).
    pub documents: Arc<DocumentClient>,
}

impl Connection {
    fn new(api: Arc<dyn DynamoDBApi>) -> Self {
        let documents = Arc::new(DocumentClient::new(Arc::clone(&api)));
        Self { api, documents }
    }

    /// Whether two handles refer to the same cached clients.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.api, &other.api) && Arc::ptr_eq(&self.documents, &other.documents)
    }
}

/// Connections keyed by region.
#[derive(Debug)]
pub struct ConnectionCache {
    factory: Arc<dyn ConnectionFactory>,
    connections: DashMap<String, Connection>,
}

impl ConnectionCache {
    /// An empty cache building clients with `factory`.
    #[must_use]
    pub fn new(factory: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            factory,
            connections: DashMap::new(),
        }
    }

    /// Get or build the connection for `endpoint.region`.
    ///
    /// The entry is locked while the client is built, so concurrent first
    /// callers for one region construct it once.
    pub fn get_connection(&self, endpoint: &Endpoint) -> Result<Connection, DynamoDBError> {
        match self.connections.entry(endpoint.region.clone()) {
            Entry::Occupied(e) => Ok(e.get().clone()),
            Entry::Vacant(e) => {
                let options = endpoint.client_options();
                debug!(region = %options.region, endpoint = %options.endpoint, "creating connection");
                let connection = Connection::new(self.factory.connect(&options)?);
                e.insert(connection.clone());
                Ok(connection)
            }
        }
    }

    /// Number of cached regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Default for ConnectionCache {
    fn default() -> Self {
        Self::new(Arc::new(HttpConnectionFactory))
    }
}
