use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Medical records are append-only: there is no update or delete operation
/// anywhere in the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub diagnosis: String,
    pub treatment: String,
    pub prescription: String,
    pub notes: Option<String>,
    pub date: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicalRecord {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub diagnosis: String,
    pub treatment: String,
    pub prescription: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub date: String,
}
