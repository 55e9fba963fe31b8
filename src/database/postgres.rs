use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::filter::{is_valid_path, Condition, Filter};
use crate::database::store::{document_id, Collection, Document, Store, StoreError};
use crate::types::ObjectId;

/// Postgres-backed document store: one `(id TEXT, doc JSONB, seq BIGSERIAL)`
/// table per collection, see `migrations/`.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Connected to Postgres document store");

        Ok(Self { pool })
    }
}

/// `doc #>> '{a,b}'` for a validated dotted path; `id` maps to the key column.
fn text_expr(path: &str) -> Result<String, StoreError> {
    if path == "id" {
        return Ok("id".to_string());
    }
    if !is_valid_path(path) {
        return Err(StoreError::InvalidField(path.to_string()));
    }
    Ok(format!("(doc #>> '{{{}}}')", path.replace('.', ",")))
}

/// Point expression matching the species location index.
fn point_expr(path: &str) -> Result<String, StoreError> {
    if !is_valid_path(path) {
        return Err(StoreError::InvalidField(path.to_string()));
    }
    let base = path.replace('.', ",");
    Ok(format!(
        "point((doc #>> '{{{base},coordinates,0}}')::float8, (doc #>> '{{{base},coordinates,1}}')::float8)"
    ))
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn push_where(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) -> Result<(), StoreError> {
    qb.push(" WHERE TRUE");
    for condition in &filter.conditions {
        qb.push(" AND ");
        match condition {
            Condition::Eq(field, value) => {
                qb.push(text_expr(field)?);
                qb.push(" = ");
                qb.push_bind(as_text(value));
            }
            Condition::In(field, values) => {
                qb.push(text_expr(field)?);
                qb.push(" = ANY(");
                qb.push_bind(values.iter().map(as_text).collect::<Vec<_>>());
                qb.push(")");
            }
            Condition::Within(field, bbox) => {
                qb.push(point_expr(field)?);
                qb.push(" <@ box(point(");
                qb.push_bind(bbox.bottom_left.0);
                qb.push(", ");
                qb.push_bind(bbox.bottom_left.1);
                qb.push("), point(");
                qb.push_bind(bbox.top_right.0);
                qb.push(", ");
                qb.push_bind(bbox.top_right.1);
                qb.push("))");
            }
        }
    }
    Ok(())
}

fn into_document(value: Value) -> Result<Document, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Decode(format!("expected object, got {}", other))),
    }
}

/// Unique violations become `Duplicate(field)`; everything else passes through.
fn classify(collection: Collection, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            let constraint = db.constraint().unwrap_or_default().to_string();
            let field = collection
                .unique_fields()
                .iter()
                .find(|f| constraint.contains(*f))
                .map(|f| f.to_string())
                .unwrap_or(constraint);
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Sqlx(err)
}

/// `SELECT doc` in insertion order; `seq` comes from the second migration.
fn find_query(collection: Collection, filter: &Filter) -> Result<QueryBuilder<'static, Postgres>, StoreError> {
    let mut qb = QueryBuilder::new(format!("SELECT doc FROM {}", collection.name()));
    push_where(&mut qb, filter)?;
    qb.push(" ORDER BY seq");
    Ok(qb)
}

#[async_trait]
impl Store for PgStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let mut qb = find_query(collection, filter)?;
        let rows = qb.build_query_scalar::<Value>().fetch_all(&self.pool).await?;
        rows.into_iter().map(into_document).collect()
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), StoreError> {
        let id = document_id(&doc)
            .ok_or_else(|| StoreError::Invalid("document has no valid id".to_string()))?;

        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", collection.name());
        sqlx::query(&sql)
            .bind(id.to_string())
            .bind(Value::Object(doc))
            .execute(&self.pool)
            .await
            .map_err(|e| classify(collection, e))?;
        Ok(())
    }

    async fn replace(&self, collection: Collection, id: &ObjectId, doc: Document) -> Result<bool, StoreError> {
        let sql = format!("UPDATE {} SET doc = $2 WHERE id = $1", collection.name());
        let result = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(Value::Object(doc))
            .execute(&self.pool)
            .await
            .map_err(|e| classify(collection, e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let table = collection.name();
        let mut qb = QueryBuilder::new(format!(
            "DELETE FROM {table} WHERE id = (SELECT id FROM {table}"
        ));
        push_where(&mut qb, filter)?;
        qb.push(" ORDER BY seq LIMIT 1) RETURNING doc");

        let row = qb.build_query_scalar::<Value>().fetch_optional(&self.pool).await?;
        row.map(into_document).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
