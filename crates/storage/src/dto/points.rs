use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{ClassPointsTotal, LedgerEntry};

/// A zero delta is accepted: it produces an audit entry without changing
/// the total or the sticky flag.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdjustPointsRequest {
    pub delta: i32,
    #[validate(length(min = 1, max = 500, message = "reason must be 1-500 characters"))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkAdjustPointsRequest {
    pub student_ids: Vec<Uuid>,
    pub delta: i32,
    #[validate(length(min = 1, max = 500, message = "reason must be 1-500 characters"))]
    pub reason: String,
}

/// Committed ledger entry plus the aggregate row it produced.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdjustPointsResponse {
    pub entry: LedgerEntry,
    pub total: ClassPointsTotal,
}

impl From<(LedgerEntry, ClassPointsTotal)> for AdjustPointsResponse {
    fn from((entry, total): (LedgerEntry, ClassPointsTotal)) -> Self {
        Self { entry, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reason_rejected() {
        let req = AdjustPointsRequest {
            delta: 5,
            reason: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_zero_delta_accepted() {
        let req = AdjustPointsRequest {
            delta: 0,
            reason: "attendance check".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_bulk_ids_accepted() {
        let req = BulkAdjustPointsRequest {
            student_ids: vec![],
            delta: 10,
            reason: "group work".to_string(),
        };
        assert!(req.validate().is_ok());
    }
}
