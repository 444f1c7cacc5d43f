use std::future::Future;

use liaison_business::{Entity, EntityKind};
use serde_json::Value;
use sqlx::Row as _;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use uuid::Uuid;

use crate::config::Config;

/// Initialize a PostgreSQL connection pool
pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new().connect(config.database_url()).await?;

    tracing::info!("Database connection pool established");

    Ok(pool)
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored document {0} is not a JSON object")]
    MalformedDocument(Uuid),
}

/// One JSON document per record, discriminated by kind. Implementations
/// assign ids on insert and echo the persisted document back.
pub trait DocumentStore: Clone + Send + Sync + 'static {
    fn is_connected(&self) -> impl Future<Output = bool> + Send;

    fn list(&self, kind: EntityKind) -> impl Future<Output = Result<Vec<Entity>, StoreError>> + Send;

    fn get(
        &self,
        kind: EntityKind,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Entity>, StoreError>> + Send;

    fn insert(
        &self,
        kind: EntityKind,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, StoreError>> + Send;

    fn update(
        &self,
        kind: EntityKind,
        id: Uuid,
        entity: Entity,
    ) -> impl Future<Output = Result<Option<Entity>, StoreError>> + Send;

    fn delete(
        &self,
        kind: EntityKind,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Entity>, StoreError>> + Send;

    /// First record of the kind whose top-level field equals `value`.
    fn find_by_field(
        &self,
        kind: EntityKind,
        field: &str,
        value: &str,
    ) -> impl Future<Output = Result<Option<Entity>, StoreError>> + Send;
}

#[derive(Clone)]
pub struct PgDocumentStore {
    pub pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the document table on startup when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS entities (
                id UUID PRIMARY KEY,
                kind TEXT NOT NULL,
                doc JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS entities_kind_idx ON entities (kind)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn row_entity(row: &PgRow) -> Result<Entity, StoreError> {
    let id: Uuid = row.try_get("id")?;
    let doc: Value = row.try_get("doc")?;
    match doc {
        Value::Object(fields) => Ok(Entity::from(fields)),
        _ => Err(StoreError::MalformedDocument(id)),
    }
}

impl DocumentStore for PgDocumentStore {
    async fn is_connected(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<Entity>, StoreError> {
        let rows = sqlx::query("SELECT id, doc FROM entities WHERE kind = $1 ORDER BY created_at")
            .bind(kind.path())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_entity).collect()
    }

    async fn get(&self, kind: EntityKind, id: Uuid) -> Result<Option<Entity>, StoreError> {
        let row = sqlx::query("SELECT id, doc FROM entities WHERE kind = $1 AND id = $2")
            .bind(kind.path())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_entity).transpose()
    }

    async fn insert(&self, kind: EntityKind, mut entity: Entity) -> Result<Entity, StoreError> {
        let id = Uuid::new_v4();
        entity.set("id", Value::String(id.to_string()));
        sqlx::query("INSERT INTO entities (id, kind, doc) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(kind.path())
            .bind(Value::Object(entity.0.clone()))
            .execute(&self.pool)
            .await?;
        Ok(entity)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: Uuid,
        mut entity: Entity,
    ) -> Result<Option<Entity>, StoreError> {
        entity.set("id", Value::String(id.to_string()));
        let result = sqlx::query(
            "UPDATE entities SET doc = $3, updated_at = now() WHERE kind = $1 AND id = $2",
        )
        .bind(kind.path())
        .bind(id)
        .bind(Value::Object(entity.0.clone()))
        .execute(&self.pool)
        .await?;
        Ok((result.rows_affected() > 0).then_some(entity))
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<Option<Entity>, StoreError> {
        let row =
            sqlx::query("DELETE FROM entities WHERE kind = $1 AND id = $2 RETURNING id, doc")
                .bind(kind.path())
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.as_ref().map(row_entity).transpose()
    }

    async fn find_by_field(
        &self,
        kind: EntityKind,
        field: &str,
        value: &str,
    ) -> Result<Option<Entity>, StoreError> {
        let row =
            sqlx::query("SELECT id, doc FROM entities WHERE kind = $1 AND doc->>$2 = $3 LIMIT 1")
                .bind(kind.path())
                .bind(field)
                .bind(value)
                .fetch_optional(&self.pool)
                .await?;
        row.as_ref().map(row_entity).transpose()
    }
}

/// In-memory document store backing the integration tests.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    records: std::sync::Arc<std::sync::RwLock<Vec<(EntityKind, Entity)>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.records
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|(stored, _)| *stored == kind)
            .count()
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn is_connected(&self) -> bool {
        true
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<Entity>, StoreError> {
        let records = self.records.read().expect("lock poisoned");
        Ok(records
            .iter()
            .filter(|(stored, _)| *stored == kind)
            .map(|(_, entity)| entity.clone())
            .collect())
    }

    async fn get(&self, kind: EntityKind, id: Uuid) -> Result<Option<Entity>, StoreError> {
        let id = id.to_string();
        let records = self.records.read().expect("lock poisoned");
        Ok(records
            .iter()
            .find(|(stored, entity)| *stored == kind && entity.id() == Some(id.as_str()))
            .map(|(_, entity)| entity.clone()))
    }

    async fn insert(&self, kind: EntityKind, mut entity: Entity) -> Result<Entity, StoreError> {
        entity.set("id", Value::String(Uuid::new_v4().to_string()));
        let mut records = self.records.write().expect("lock poisoned");
        records.push((kind, entity.clone()));
        Ok(entity)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: Uuid,
        mut entity: Entity,
    ) -> Result<Option<Entity>, StoreError> {
        let id = id.to_string();
        entity.set("id", Value::String(id.clone()));
        let mut records = self.records.write().expect("lock poisoned");
        for (stored, existing) in records.iter_mut() {
            if *stored == kind && existing.id() == Some(id.as_str()) {
                *existing = entity.clone();
                return Ok(Some(entity));
            }
        }
        Ok(None)
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<Option<Entity>, StoreError> {
        let id = id.to_string();
        let mut records = self.records.write().expect("lock poisoned");
        let position = records
            .iter()
            .position(|(stored, entity)| *stored == kind && entity.id() == Some(id.as_str()));
        Ok(position.map(|index| records.remove(index).1))
    }

    async fn find_by_field(
        &self,
        kind: EntityKind,
        field: &str,
        value: &str,
    ) -> Result<Option<Entity>, StoreError> {
        let records = self.records.read().expect("lock poisoned");
        Ok(records
            .iter()
            .find(|(stored, entity)| *stored == kind && entity.text(field) == value)
            .map(|(_, entity)| entity.clone()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entity(value: serde_json::Value) -> Entity {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn memory_store_assigns_ids_on_insert() {
        let store = MemoryDocumentStore::new();
        let inserted = store
            .insert(EntityKind::Person, entity(json!({ "name": "Ada" })))
            .await
            .unwrap();

        let id: Uuid = inserted.id().unwrap().parse().expect("uuid id");
        let fetched = store.get(EntityKind::Person, id).await.unwrap();
        assert_eq!(fetched, Some(inserted));
    }

    #[tokio::test]
    async fn memory_store_scopes_records_by_kind() {
        let store = MemoryDocumentStore::new();
        let person = store
            .insert(EntityKind::Person, entity(json!({ "name": "Ada" })))
            .await
            .unwrap();

        let id: Uuid = person.id().unwrap().parse().unwrap();
        assert!(store.get(EntityKind::Company, id).await.unwrap().is_none());
        assert_eq!(store.count(EntityKind::Person), 1);
    }

    #[tokio::test]
    async fn memory_store_finds_by_field() {
        let store = MemoryDocumentStore::new();
        store
            .insert(
                EntityKind::Person,
                entity(json!({ "name": "Ada", "email": "ada@example.com" })),
            )
            .await
            .unwrap();

        let found = store
            .find_by_field(EntityKind::Person, "email", "ada@example.com")
            .await
            .unwrap();
        assert_eq!(found.unwrap().text("name"), "Ada");

        let missing = store
            .find_by_field(EntityKind::Person, "email", "nobody@example.com")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn memory_store_delete_returns_the_removed_record() {
        let store = MemoryDocumentStore::new();
        let person = store
            .insert(EntityKind::Person, entity(json!({ "name": "Ada" })))
            .await
            .unwrap();
        let id: Uuid = person.id().unwrap().parse().unwrap();

        let deleted = store.delete(EntityKind::Person, id).await.unwrap();
        assert_eq!(deleted, Some(person));
        assert_eq!(store.count(EntityKind::Person), 0);
        assert!(store.delete(EntityKind::Person, id).await.unwrap().is_none());
    }
}
