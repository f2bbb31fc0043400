//! # Database Infrastructure
//!
//! Opens the [SurrealDB](https://surrealdb.com) connection the service stores its
//! documents in, and hands out one [`DocumentSession`] per request.
//!
//! ## Key Features
//! - **Engine Agnostic**: Supports `mem://`, `ws://` and `http://` via the `any` engine.
//! - **Resilient Connectivity**: Built-in retry logic for health checks during engine startup.
//! - **Schema on start**: Feature slices contribute idempotent [`Schema`] statements.
//!
//! ## Example
//!
//! ```rust
//! use sc_database::{Database, DatabaseError, Schema};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder()
//!         .url("mem://")
//!         .session("softwarecenter", "software")
//!         .schema(Schema::new("notes", "DEFINE TABLE IF NOT EXISTS note SCHEMALESS;"))
//!         .init()
//!         .await?;
//!
//!     let _session = db.lightweight_session();
//!     Ok(())
//! }
//! ```

mod error;
mod schema;
mod session;

pub use error::{DatabaseError, DatabaseErrorExt};
pub use schema::Schema;
pub use session::{Document, DocumentSession};
pub use surrealdb::types::SurrealValue;

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{info, instrument, warn};

/// Inner state of the [`Database`] wrapper.
#[derive(Debug)]
pub struct DatabaseInner {
    instance: Surreal<Any>,
    ns: String,
    db: String,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(ns = %self.ns, db = %self.db, "SurrealDB session handle dropped");
    }
}

/// `SurrealDB` client wrapper that provides thread-safety and contextual error handling.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Creates a new [`DatabaseBuilder`].
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Opens a session for one unit of work. Sessions share the underlying
    /// connection, so creating one per request is cheap.
    pub fn lightweight_session(&self) -> DocumentSession {
        DocumentSession::new(self.inner.instance.clone())
    }

    pub fn namespace(&self) -> &str {
        &self.inner.ns
    }

    pub fn database(&self) -> &str {
        &self.inner.db
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

/// A fluent builder for configuring and establishing a `SurrealDB` connection.
///
/// This builder ensures that fundamental parameters like the connection URL,
/// namespace, and database name are provided upfront.
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    ns: Option<String>,
    db: Option<String>,
    auth: Option<(String, String)>,
    schemas: Vec<Schema>,
}

impl DatabaseBuilder {
    /// Creates a new [`DatabaseBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connection URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the namespace and database name.
    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.ns = Some(namespace.into());
        self.db = Some(database.into());
        self
    }

    /// Add root credentials to the connection.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some((username.into(), password.into()));
        self
    }

    /// Queues schema statements to apply once the session is active.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn schemas(mut self, schemas: impl IntoIterator<Item = Schema>) -> Self {
        self.schemas.extend(schemas);
        self
    }

    /// Consumes the builder and attempts to establish a connection to the database.
    ///
    /// # Process
    /// 1. **Validation**: Ensures URL, Namespace, and Database name are provided.
    /// 2. **Engine Initialization**: Connects to the underlying `SurrealDB` engine (Any).
    /// 3. **Resilience**: Performs up to 3 health checks. If the first check fails,
    ///    it retries with exponential backoff (starting at 500ms).
    /// 4. **Authentication**: If credentials were provided via [`auth`](Self::auth), signs in as a Root user.
    /// 5. **Session Activation**: Sets the namespace and database for the connection.
    /// 6. **Schema**: Applies every queued [`Schema`], each in its own transaction.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] if required parameters are missing.
    /// * [`DatabaseError::Connection`] if the engine fails to start or remains unhealthy.
    /// * [`DatabaseError::Auth`] if the provided credentials are rejected.
    /// * [`DatabaseError::Surreal`] if the session activation (`use_ns`/`use_db`) fails.
    /// * [`DatabaseError::Schema`] if a schema statement is rejected.
    #[instrument(skip(self), fields(url = self.url, ns = self.ns, db = self.db))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = self.url.filter(|url| !url.trim().is_empty()).ok_or(DatabaseError::Validation {
            message: "URL is required".into(),
            context: None,
        })?;
        let ns = self.ns.ok_or(DatabaseError::Validation {
            message: "Namespace is required".into(),
            context: None,
        })?;
        let db = self.db.ok_or(DatabaseError::Validation {
            message: "Database is required".into(),
            context: None,
        })?;

        let instance = connect(&url).await.map_err(|e| DatabaseError::Connection {
            message: e.to_string().into(),
            context: Some("Initializing engine".into()),
        })?;

        let mut delay = Duration::from_millis(500);
        for attempt in 1..=3 {
            if instance.health().await.is_ok() {
                break;
            }
            if attempt == 3 {
                return Err(DatabaseError::Connection {
                    message: "Unhealthy after retries".into(),
                    context: Some(url.into()),
                });
            }
            warn!(attempt, ?delay, "Database not ready, retrying...");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        if let Some((u, p)) = self.auth {
            instance.signin(Root { username: u, password: p }).await.map_err(|e| {
                DatabaseError::Auth { message: e.to_string().into(), context: Some(url.into()) }
            })?;
        }

        instance.use_ns(&ns).use_db(&db).await.context("Activating session")?;

        let version =
            instance.version().await.map_or_else(|_| "unknown".to_owned(), |v| v.to_string());
        info!(namespace = %ns, database = %db, %version, "SurrealDB connection established");

        schema::apply(&instance, &self.schemas).await?;

        Ok(Database { inner: Arc::new(DatabaseInner { instance, ns, db }) })
    }
}
