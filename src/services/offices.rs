//! Office lookup service

use std::sync::Arc;

use crate::{error::AppResult, models::office::Office, repository::OfficeRegistry};

#[derive(Clone)]
pub struct OfficesService {
    registry: Arc<dyn OfficeRegistry>,
}

impl OfficesService {
    pub fn new(registry: Arc<dyn OfficeRegistry>) -> Self {
        Self { registry }
    }

    /// Offices employees may check in to
    pub async fn list_active(&self) -> AppResult<Vec<Office>> {
        self.registry.list_active().await
    }

    pub async fn get(&self, id: i64) -> AppResult<Office> {
        self.registry.get_office(id).await
    }
}
