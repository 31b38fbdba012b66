//! Record store — persistence boundary for finished candidate records.
//!
//! The store enforces one record per email. `PgRecordStore` is the production
//! implementation; `MemoryRecordStore` backs tests and database-less runs,
//! so screenings still run end to end without a database.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{CandidateProfile, CandidateRecord, QuestionAnswer};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email already exists")]
    Duplicate,

    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persists a finished record, generating id and timestamp. Rejects with
    /// `Duplicate` when the email is already registered.
    async fn insert(&self, profile: &CandidateProfile) -> Result<CandidateRecord, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<CandidateRecord>, StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
struct CandidateRow {
    id: Uuid,
    full_name: String,
    email: String,
    phone: String,
    years_experience: f32,
    desired_positions: Json<Vec<String>>,
    current_location: String,
    tech_stack: Json<Vec<String>>,
    answers: Json<Vec<QuestionAnswer>>,
    created_at: DateTime<Utc>,
}

impl From<CandidateRow> for CandidateRecord {
    fn from(row: CandidateRow) -> Self {
        CandidateRecord {
            id: row.id,
            created_at: row.created_at,
            profile: CandidateProfile {
                full_name: row.full_name,
                email: row.email,
                phone: row.phone,
                years_experience: row.years_experience,
                desired_positions: row.desired_positions.0,
                current_location: row.current_location,
                tech_stack: row.tech_stack.0,
                answers: row.answers.0,
            },
        }
    }
}

#[derive(Debug)]
pub struct PgRecordStore {
    pool: PgPool,
}

/// A handful of connections is plenty: writes are one insert per finished
/// screening and reads are single-row lookups.
const POOL_MAX_CONNECTIONS: u32 = 5;

impl PgRecordStore {
    /// Connects to PostgreSQL with a bounded pool and prepares the store.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(POOL_MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        info!("connected to PostgreSQL record store");
        Self::new(pool).await
    }

    /// Wraps a pool and ensures the candidates table exists.
    pub async fn new(pool: PgPool) -> Result<Self, StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS candidates (
                id                UUID PRIMARY KEY,
                full_name         TEXT NOT NULL,
                email             TEXT NOT NULL UNIQUE,
                phone             TEXT NOT NULL,
                years_experience  REAL NOT NULL,
                desired_positions JSONB NOT NULL,
                current_location  TEXT NOT NULL,
                tech_stack        JSONB NOT NULL,
                answers           JSONB NOT NULL,
                created_at        TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        info!("candidates table ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, profile: &CandidateProfile) -> Result<CandidateRecord, StoreError> {
        let record = CandidateRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            profile: profile.clone(),
        };

        sqlx::query(
            r#"
            INSERT INTO candidates
                (id, full_name, email, phone, years_experience,
                 desired_positions, current_location, tech_stack, answers, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.id)
        .bind(&record.profile.full_name)
        .bind(record.profile.email.to_ascii_lowercase())
        .bind(&record.profile.phone)
        .bind(record.profile.years_experience)
        .bind(Json(&record.profile.desired_positions))
        .bind(&record.profile.current_location)
        .bind(Json(&record.profile.tech_stack))
        .bind(Json(&record.profile.answers))
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Unavailable(e.to_string()),
        })?;

        info!(id = %record.id, "candidate record stored");
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CandidateRecord>, StoreError> {
        let row: Option<CandidateRow> =
            sqlx::query_as("SELECT * FROM candidates WHERE email = $1")
                .bind(email.to_ascii_lowercase())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(row.map(CandidateRecord::from))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, CandidateRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, profile: &CandidateProfile) -> Result<CandidateRecord, StoreError> {
        let key = profile.email.to_ascii_lowercase();
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;

        if records.contains_key(&key) {
            return Err(StoreError::Duplicate);
        }

        let record = CandidateRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            profile: profile.clone(),
        };
        records.insert(key, record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CandidateRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(records.get(&email.to_ascii_lowercase()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(email: &str) -> CandidateProfile {
        CandidateProfile {
            full_name: "Alice Smith".to_string(),
            email: email.to_string(),
            phone: "+15551234567".to_string(),
            years_experience: 3.0,
            desired_positions: vec!["Backend Engineer".to_string()],
            current_location: "Remote".to_string(),
            tech_stack: vec!["python".to_string()],
            answers: vec![],
        }
    }

    #[tokio::test]
    async fn test_memory_insert_and_lookup() {
        let store = MemoryRecordStore::new();
        let stored = store.insert(&profile("alice@example.com")).await.unwrap();
        assert_eq!(stored.profile.email, "alice@example.com");

        let found = store.find_by_email("alice@example.com").await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(stored.id));
    }

    #[tokio::test]
    async fn test_memory_lookup_is_case_insensitive() {
        let store = MemoryRecordStore::new();
        store.insert(&profile("alice@example.com")).await.unwrap();
        let found = store.find_by_email("Alice@Example.COM").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_memory_rejects_duplicate_email() {
        let store = MemoryRecordStore::new();
        store.insert(&profile("alice@example.com")).await.unwrap();
        let err = store
            .insert(&profile("ALICE@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
    }

    #[tokio::test]
    async fn test_memory_missing_email_is_none() {
        let store = MemoryRecordStore::new();
        assert!(store
            .find_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_duplicate_error_message_matches_wire_contract() {
        assert_eq!(StoreError::Duplicate.to_string(), "Email already exists");
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url_as_unavailable() {
        let err = PgRecordStore::connect("not-a-database-url")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
