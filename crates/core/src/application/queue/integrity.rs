// Integrity check for the {1..N} position invariant

use crate::domain::error::{DomainError, Result};
use crate::domain::Position;
use serde::{Deserialize, Serialize};

/// Snapshot returned by a successful integrity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub waiting: i64,
    pub completed: i64,
    pub cancelled: i64,
}

/// Check that ascending `positions` are exactly 1..N
pub fn check_contiguous(positions: &[Position]) -> Result<()> {
    for (index, &position) in positions.iter().enumerate() {
        let expected = index as Position + 1;
        if position == expected {
            continue;
        }
        let fault = if index > 0 && positions[index - 1] == position {
            format!("duplicate waiting position {}", position)
        } else {
            format!(
                "expected waiting position {}, found {} ({} waiting)",
                expected,
                position,
                positions.len()
            )
        };
        return Err(DomainError::IntegrityFault(fault));
    }
    Ok(())
}
