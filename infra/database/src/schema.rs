use crate::error::{DatabaseError, DatabaseErrorExt};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tracing::info;

/// Statements a feature needs in place before it serves traffic.
///
/// Statements should be idempotent (`DEFINE ... IF NOT EXISTS`), because they run on
/// every start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub statements: &'static str,
}

impl Schema {
    #[must_use]
    pub const fn new(name: &'static str, statements: &'static str) -> Self {
        Self { name, statements }
    }
}

/// Applies each schema in its own transaction, in order.
pub(crate) async fn apply(db: &Surreal<Any>, schemas: &[Schema]) -> Result<(), DatabaseError> {
    for schema in schemas {
        let query = format!("BEGIN TRANSACTION;\n{}\nCOMMIT TRANSACTION;", schema.statements);

        db.query(&query)
            .await
            .context(format!("Applying schema '{}'", schema.name))?
            .check()
            .map_err(|err| DatabaseError::Schema {
                message: surrealdb::Error::from(err).to_string().into(),
                context: Some(schema.name.into()),
            })?;

        info!(schema = schema.name, "Schema applied");
    }

    Ok(())
}
