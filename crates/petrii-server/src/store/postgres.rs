//! PostgreSQL-backed stores
//!
//! Queries are checked at runtime (`query_as` + `FromRow`) so the crate builds
//! without a live database. Schema lives in `migrations/`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{CredentialStore, DatasetStore, StoreError, StoreResult};
use crate::models::{
    Dataset, DatasetId, FileRef, NewDataset, NewUser, UnknownVariant, User, UserId, UserStatus,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, status, created_at";

const DATASET_COLUMNS: &str = "id, owner_id, title, author, experiment_type, tags, \
     file_location, file_key, original_filename, content_type, size_bytes, checksum, \
     content, indexed_text, created_at";

/// Map a unique violation to `Duplicate(field)`, anything else to `Database`.
fn unique_violation(error: sqlx::Error, field: &'static str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = error {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Database(error)
}

/// Escape LIKE metacharacters and wrap the term for a contains match.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = UnknownVariant;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(record.id),
            name: record.name,
            email: record.email,
            password_hash: record.password_hash,
            role: record.role.parse()?,
            status: record.status.parse()?,
            created_at: record.created_at,
        })
    }
}

#[derive(FromRow)]
struct DatasetRecord {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    author: String,
    experiment_type: String,
    tags: Vec<String>,
    file_location: String,
    file_key: String,
    original_filename: Option<String>,
    content_type: Option<String>,
    size_bytes: i64,
    checksum: String,
    content: Option<String>,
    indexed_text: String,
    created_at: DateTime<Utc>,
}

impl From<DatasetRecord> for Dataset {
    fn from(record: DatasetRecord) -> Self {
        Dataset {
            id: DatasetId(record.id),
            owner_id: UserId(record.owner_id),
            title: record.title,
            author: record.author,
            experiment_type: record.experiment_type,
            tags: record.tags,
            file: FileRef {
                location: record.file_location,
                key: record.file_key,
                original_filename: record.original_filename,
                content_type: record.content_type,
                size_bytes: record.size_bytes,
                checksum: record.checksum,
            },
            content: record.content,
            indexed_text: record.indexed_text,
            created_at: record.created_at,
        }
    }
}

fn into_users(records: Vec<UserRecord>) -> StoreResult<Vec<User>> {
    records
        .into_iter()
        .map(|r| User::try_from(r).map_err(StoreError::from))
        .collect()
}

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash, role, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_violation(e, "email"))?;

        Ok(User::try_from(record)?)
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record.map(User::try_from).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record.map(User::try_from).transpose()?)
    }

    async fn list_non_admin(&self) -> StoreResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role <> 'admin' ORDER BY created_at DESC"
        );
        let records = sqlx::query_as::<_, UserRecord>(&sql).fetch_all(&self.pool).await?;

        into_users(records)
    }

    #[tracing::instrument(skip(self))]
    async fn update_status(
        &self,
        id: UserId,
        expected: UserStatus,
        target: UserStatus,
    ) -> StoreResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET status = $3 WHERE id = $1 AND status = $2 RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id.0)
            .bind(expected.as_str())
            .bind(target.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(record.map(User::try_from).transpose()?)
    }
}

#[derive(Clone)]
pub struct PgDatasetStore {
    pool: PgPool,
}

impl PgDatasetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatasetStore for PgDatasetStore {
    #[tracing::instrument(skip(self, dataset), fields(owner_id = %dataset.owner_id, file_key = %dataset.file.key))]
    async fn insert(&self, dataset: NewDataset) -> StoreResult<Dataset> {
        let sql = format!(
            "INSERT INTO datasets (owner_id, title, author, experiment_type, tags, \
                 file_location, file_key, original_filename, content_type, size_bytes, \
                 checksum, content, indexed_text) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {DATASET_COLUMNS}"
        );
        let record = sqlx::query_as::<_, DatasetRecord>(&sql)
            .bind(dataset.owner_id.0)
            .bind(&dataset.title)
            .bind(&dataset.author)
            .bind(&dataset.experiment_type)
            .bind(&dataset.tags)
            .bind(&dataset.file.location)
            .bind(&dataset.file.key)
            .bind(&dataset.file.original_filename)
            .bind(&dataset.file.content_type)
            .bind(dataset.file.size_bytes)
            .bind(&dataset.file.checksum)
            .bind(&dataset.content)
            .bind(&dataset.indexed_text)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_violation(e, "file_key"))?;

        Ok(record.into())
    }

    async fn find_by_id(&self, id: DatasetId) -> StoreResult<Option<Dataset>> {
        let sql = format!("SELECT {DATASET_COLUMNS} FROM datasets WHERE id = $1");
        let record = sqlx::query_as::<_, DatasetRecord>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record.map(Dataset::from))
    }

    async fn list_by_owner(&self, owner: UserId) -> StoreResult<Vec<Dataset>> {
        let sql = format!(
            "SELECT {DATASET_COLUMNS} FROM datasets WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let records = sqlx::query_as::<_, DatasetRecord>(&sql)
            .bind(owner.0)
            .fetch_all(&self.pool)
            .await?;

        Ok(records.into_iter().map(Dataset::from).collect())
    }

    async fn list_all(&self) -> StoreResult<Vec<Dataset>> {
        let sql = format!("SELECT {DATASET_COLUMNS} FROM datasets ORDER BY created_at DESC");
        let records = sqlx::query_as::<_, DatasetRecord>(&sql).fetch_all(&self.pool).await?;

        Ok(records.into_iter().map(Dataset::from).collect())
    }

    async fn search_candidates(&self, owner: UserId, terms: &[String]) -> StoreResult<Vec<Dataset>> {
        if terms.is_empty() {
            return self.list_by_owner(owner).await;
        }

        let patterns: Vec<String> = terms.iter().map(|t| contains_pattern(t)).collect();
        let sql = format!(
            "SELECT {DATASET_COLUMNS} FROM datasets \
             WHERE owner_id = $1 AND indexed_text ILIKE ANY($2) \
             ORDER BY created_at DESC"
        );
        let records = sqlx::query_as::<_, DatasetRecord>(&sql)
            .bind(owner.0)
            .bind(&patterns)
            .fetch_all(&self.pool)
            .await?;

        Ok(records.into_iter().map(Dataset::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: DatasetId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM datasets WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
