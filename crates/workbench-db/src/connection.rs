//! Connection to the SurrealDB instance holding roles, users and grants.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::{debug, info};

use crate::error::DbError;

/// Where the access store lives and how to sign in to it.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `host:port` of the WebSocket endpoint.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "workbench".into(),
            database: "access".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Handle to the access store, scoped to the configured namespace and
/// database. Cloning shares the underlying session.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(url = %config.url, "Opening access store connection");
        let db = Surreal::new::<Ws>(config.url.as_str()).await?;

        let credentials = Root {
            username: config.username.clone(),
            password: config.password.clone(),
        };
        db.signin(credentials).await?;
        debug!(username = %config.username, "Signed in to access store");

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;
        info!(
            namespace = %config.namespace,
            database = %config.database,
            "Access store ready"
        );

        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
