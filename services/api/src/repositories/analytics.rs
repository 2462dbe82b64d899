//! Analytics repository for database operations
//!
//! Events are append-only; there is no read path here.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{EventKind, EventMetadata};

/// Analytics repository
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    /// Create a new analytics repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one event for a profile
    pub async fn insert(
        &self,
        profile_id: Uuid,
        kind: EventKind,
        metadata: &EventMetadata,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO analytics_events (profile_id, kind, user_agent, referrer, ip)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(profile_id)
        .bind(kind.as_str())
        .bind(&metadata.user_agent)
        .bind(&metadata.referrer)
        .bind(&metadata.ip)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
