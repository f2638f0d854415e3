// SQLite ServiceCatalog Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;
use waitline_core::domain::{NewService, Service, ServiceId};
use waitline_core::error::Result;
use waitline_core::port::{ServiceCatalog, TimeProvider};

pub struct SqliteServiceCatalog {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteServiceCatalog {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }
}

#[async_trait]
impl ServiceCatalog for SqliteServiceCatalog {
    async fn create(&self, service: &NewService) -> Result<ServiceId> {
        service.validate()?;

        let result = sqlx::query(
            "INSERT INTO services (name, duration_minutes, price_cents, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(service.name.trim())
        .bind(service.duration_minutes)
        .bind(service.price_cents)
        .bind(self.time_provider.now_millis())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let id = result.last_insert_rowid();
        info!(service_id = id, name = %service.name.trim(), "Service created");
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Service>> {
        let rows: Vec<ServiceRow> = sqlx::query_as("SELECT * FROM services ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ServiceRow::into_service).collect())
    }

    async fn get(&self, id: ServiceId) -> Result<Option<Service>> {
        let row = sqlx::query_as::<_, ServiceRow>("SELECT * FROM services WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ServiceRow::into_service))
    }

    async fn update(&self, id: ServiceId, service: &NewService) -> Result<bool> {
        service.validate()?;

        let result = sqlx::query(
            "UPDATE services SET name = ?, duration_minutes = ?, price_cents = ? WHERE id = ?",
        )
        .bind(service.name.trim())
        .bind(service.duration_minutes)
        .bind(service.price_cents)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: ServiceId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let deleted = result.rows_affected() == 1;
        if deleted {
            info!(service_id = id, "Service deleted");
        }
        Ok(deleted)
    }
}

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: i64,
    name: String,
    duration_minutes: i32,
    price_cents: i64,
    created_at: i64,
}

impl ServiceRow {
    fn into_service(self) -> Service {
        Service {
            id: self.id,
            name: self.name,
            duration_minutes: self.duration_minutes,
            price_cents: self.price_cents,
            created_at: self.created_at,
        }
    }
}
