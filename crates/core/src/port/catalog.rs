// Service Catalog Port

use crate::domain::{NewService, Service, ServiceId};
use crate::error::Result;
use async_trait::async_trait;

/// Services clients can enroll for. Display data only; never used for ordering.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    /// Create a service and return its ID
    async fn create(&self, service: &NewService) -> Result<ServiceId>;

    /// All services ordered by name
    async fn list(&self) -> Result<Vec<Service>>;

    /// Find service by ID
    async fn get(&self, id: ServiceId) -> Result<Option<Service>>;

    /// Replace name, duration and price. Returns false if the service does not exist.
    async fn update(&self, id: ServiceId, service: &NewService) -> Result<bool>;

    /// Delete a service. Fails with a database error while entries reference it.
    async fn delete(&self, id: ServiceId) -> Result<bool>;
}
