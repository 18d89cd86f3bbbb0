//! Per-user profile record held by the data backend.

use serde::{Deserialize, Serialize};

use crate::auth::UserId;

/// Row shape of the `profiles` table as far as this layer cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: UserId,
    #[serde(default)]
    pub is_onboarded: bool,
}

impl ProfileRecord {
    /// Record created on first lookup of a user with no profile.
    pub fn default_for(id: UserId) -> Self {
        Self {
            id,
            is_onboarded: false,
        }
    }
}

/// Projection returned by `select=is_onboarded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OnboardingRow {
    #[serde(default)]
    pub is_onboarded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_serializes_as_not_onboarded() {
        let record = ProfileRecord::default_for(UserId::from("u1"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"id": "u1", "is_onboarded": false}));
    }

    #[test]
    fn null_flag_reads_as_false() {
        let rows: Vec<OnboardingRow> = serde_json::from_str(r#"[{"is_onboarded": false}, {}]"#).unwrap();
        assert!(rows.iter().all(|row| !row.is_onboarded));
    }
}
