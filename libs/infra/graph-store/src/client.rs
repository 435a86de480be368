// [libs/infra/graph-store/src/client.rs]
//! Connection management for the embedded/remote libSQL database.

use crate::errors::GraphError;
use crate::schema::apply_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct GraphStoreClient {
    database: Arc<Database>,
    /// Keeps an in-memory database alive for the life of the client;
    /// `libsql` drops the backing store once every connection closes.
    _memory_anchor: Option<Arc<Connection>>,
}

impl GraphStoreClient {
    #[instrument(skip(auth_token))]
    pub async fn connect(database_url: &str, auth_token: Option<String>) -> Result<Self, GraphError> {
        if database_url.is_empty() {
            return Err(GraphError::Connection("DATABASE_URL is empty".to_string()));
        }

        let is_remote = database_url.starts_with("libsql://") || database_url.starts_with("https://");
        let is_memory = database_url.contains(":memory:");

        let database = if is_remote {
            let token = auth_token.ok_or_else(|| GraphError::Connection("remote database requires an auth token".to_string()))?;
            Builder::new_remote(database_url.to_string(), token).build().await
        } else {
            Builder::new_local(database_url).build().await
        }
        .map_err(|e| GraphError::Connection(e.to_string()))?;

        let database = Arc::new(database);
        let mut anchor = None;

        if is_memory {
            let anchor_connection = database.connect().map_err(|e| GraphError::Connection(e.to_string()))?;
            apply_schema(&anchor_connection).await.map_err(|e| GraphError::Connection(e.to_string()))?;
            anchor = Some(Arc::new(anchor_connection));
        } else {
            let bootstrap_connection = database.connect().map_err(|e| GraphError::Connection(e.to_string()))?;
            apply_schema(&bootstrap_connection).await.map_err(|e| GraphError::Connection(e.to_string()))?;
        }

        info!("graph store connected to {database_url}");
        Ok(Self {
            database,
            _memory_anchor: anchor,
        })
    }

    pub fn connection(&self) -> Result<Connection, GraphError> {
        self.database.connect().map_err(|e| GraphError::Connection(e.to_string()))
    }
}
