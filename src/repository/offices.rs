//! Offices repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::office::Office,
};

use super::OfficeRegistry;

#[derive(Clone)]
pub struct OfficesRepository {
    pool: Pool<Postgres>,
}

impl OfficesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OfficeRegistry for OfficesRepository {
    async fn get_office(&self, id: i64) -> AppResult<Office> {
        sqlx::query_as::<_, Office>("SELECT * FROM offices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Office with id {} not found", id)))
    }

    async fn list_active(&self) -> AppResult<Vec<Office>> {
        let offices = sqlx::query_as::<_, Office>(
            "SELECT * FROM offices WHERE is_active = TRUE ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(offices)
    }
}
