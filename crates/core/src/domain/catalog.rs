// Service Catalog Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Service ID
pub type ServiceId = i64;

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub duration_minutes: i32,
    /// Price in minor currency units
    pub price_cents: i64,
    pub created_at: i64, // epoch ms
}

/// Fields supplied when creating or replacing a service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewService {
    pub name: String,
    pub duration_minutes: i32,
    pub price_cents: i64,
}

impl NewService {
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationError(
                "Service name cannot be empty".to_string(),
            ));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(DomainError::ValidationError(format!(
                "Service name too long (max {} chars)",
                MAX_NAME_LEN
            )));
        }
        if self.duration_minutes <= 0 {
            return Err(DomainError::ValidationError(format!(
                "Duration must be positive, got {}",
                self.duration_minutes
            )));
        }
        if self.price_cents < 0 {
            return Err(DomainError::ValidationError(format!(
                "Price cannot be negative, got {}",
                self.price_cents
            )));
        }
        Ok(())
    }
}
