//! Models for scraped pharmacy records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pharmacy on scheduled duty, scraped from the public listing page.
///
/// Records have no identity beyond structural equality within one
/// response; they are created on scrape and discarded after serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pharmacy {
    /// Pharmacy name.
    pub name: String,
    /// Primary street address (note lines removed).
    pub address: String,
    /// Phone number as displayed on the page.
    pub phone: String,
    /// Auxiliary note lines from the address block (marker stripped).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    /// Duty-date label from the page, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duty_date: Option<String>,
    /// URL the record was scraped from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// When the record was captured.
    pub fetched_at: DateTime<Utc>,
}

impl Pharmacy {
    /// Create a new record with the required fields.
    pub fn new(name: String, address: String, phone: String) -> Self {
        Self {
            name,
            address,
            phone,
            notes: Vec::new(),
            duty_date: None,
            source_url: None,
            fetched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_notes_not_serialized() {
        let record = Pharmacy::new(
            "Merkez Eczanesi".to_string(),
            "Atatürk Cad. No:1".to_string(),
            "0212 555 00 00".to_string(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("notes").is_none());
        assert!(json.get("duty_date").is_none());
        assert_eq!(json["name"], "Merkez Eczanesi");
    }

    #[test]
    fn test_notes_serialized_when_present() {
        let mut record = Pharmacy::new(
            "Sağlık Eczanesi".to_string(),
            "İstasyon Cad. No:12".to_string(),
            "0216 555 11 11".to_string(),
        );
        record.notes.push("Hastane karşısı".to_string());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["notes"][0], "Hastane karşısı");
    }
}
