// src/upload/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::StoredAssignment;

/// One normalized row of an uploaded contact list.
///
/// Only the parser builds these, and only after checking that both
/// `first_name` and `phone` are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub first_name: String,
    pub phone: String,
    #[serde(default)]
    pub notes: String,
}

impl ContactRecord {
    /// Build a record from raw cell values.
    ///
    /// Returns `None` when the trimmed first name or phone is blank.
    pub fn from_fields(first_name: &str, phone: &str, notes: &str) -> Option<Self> {
        let first_name = first_name.trim();
        let phone = phone.trim();
        if first_name.is_empty() || phone.is_empty() {
            return None;
        }

        Some(Self {
            first_name: first_name.to_string(),
            phone: phone.to_string(),
            notes: notes.trim().to_string(),
        })
    }
}

/// Metadata about the uploaded file echoed back to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub original_name: String,
    pub size: usize,
    pub mimetype: String,
    pub upload_time: DateTime<Utc>,
}

/// Response body of a successful `POST /upload`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub message: String,
    pub total_items: usize,
    pub distributions: Vec<StoredAssignment>,
    pub file_info: FileInfo,
}

/// Everything the orchestrator needs to know about one uploaded file.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fields_trims_and_defaults_notes() {
        let record = ContactRecord::from_fields("  Alice ", " 555-0001", "").unwrap();
        assert_eq!(record.first_name, "Alice");
        assert_eq!(record.phone, "555-0001");
        assert_eq!(record.notes, "");
    }

    #[test]
    fn from_fields_rejects_blank_required_fields() {
        assert!(ContactRecord::from_fields("   ", "555", "x").is_none());
        assert!(ContactRecord::from_fields("Bob", "", "x").is_none());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let record = ContactRecord::from_fields("Cara", "555-0003", "vip").unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["firstName"], "Cara");
        assert_eq!(json["phone"], "555-0003");
        assert_eq!(json["notes"], "vip");
    }
}
