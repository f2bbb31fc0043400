use crate::error::{DatabaseError, DatabaseErrorExt};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;
use tracing::{debug, instrument};

/// A record stored in one collection and addressed by a string key field.
///
/// The store's own record id is never read back; documents carry their key in
/// [`Document::ID_FIELD`].
pub trait Document: SurrealValue + Send + Sync + 'static {
    const COLLECTION: &'static str;
    const ID_FIELD: &'static str;
    /// Field that orders [`DocumentSession::list`].
    const ORDER_BY: &'static str = Self::ID_FIELD;
}

/// A short-lived unit of work over the shared connection, created for one request.
#[derive(Debug, Clone)]
pub struct DocumentSession {
    db: Surreal<Any>,
}

impl DocumentSession {
    pub(crate) const fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    /// Stores a new document.
    ///
    /// # Errors
    /// Fails when the store rejects the document, for example on a duplicate key.
    #[instrument(skip_all, fields(collection = D::COLLECTION))]
    pub async fn insert<D: Document>(&self, document: D) -> Result<(), DatabaseError> {
        let query = format!("CREATE {} CONTENT $document RETURN NONE", D::COLLECTION);

        self.db
            .query(&query)
            .bind(("document", document))
            .await
            .context("Inserting document")?
            .check()
            .map_err(surrealdb::Error::from)?;

        debug!("Document stored");
        Ok(())
    }

    /// Loads the document whose key field equals `id`.
    ///
    /// # Errors
    /// Fails when the query fails or the stored shape does not match `D`.
    #[instrument(skip(self), fields(collection = D::COLLECTION))]
    pub async fn load<D: Document>(&self, id: &str) -> Result<Option<D>, DatabaseError> {
        let query = format!("SELECT * OMIT id FROM {} WHERE {} = $id LIMIT 1", D::COLLECTION, D::ID_FIELD);

        let documents = self
            .db
            .query(&query)
            .bind(("id", id.to_owned()))
            .await
            .context("Loading document")?
            .take::<Vec<D>>(0)
            .context("Parsing document")?;

        Ok(documents.into_iter().next())
    }

    /// Lists every document of the collection.
    ///
    /// # Errors
    /// Fails when the query fails or a stored shape does not match `D`.
    #[instrument(skip(self), fields(collection = D::COLLECTION))]
    pub async fn list<D: Document>(&self) -> Result<Vec<D>, DatabaseError> {
        let query = format!("SELECT * OMIT id FROM {} ORDER BY {}", D::COLLECTION, D::ORDER_BY);

        self.db
            .query(&query)
            .await
            .context("Listing documents")?
            .take::<Vec<D>>(0)
            .context("Parsing documents")
    }
}
