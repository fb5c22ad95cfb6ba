//! E-prescription request and document types.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::prediction::PredictionResult;

/// The body sent to `POST /api/eprescription`.
///
/// This is a `Prescription` without the server-assigned `prescriptionId`
/// and `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDraft {
    pub patient_id: String,
    pub bacterial_species: String,
    pub region: Option<String>,
    pub antibiotic: String,
    pub dosage: String,
    pub duration: String,
    pub instructions: Option<String>,
    pub confidence: Option<f64>,
}

impl PrescriptionDraft {
    /// Build a draft for `antibiotic` from a prediction and the typed fields.
    ///
    /// Blank instructions are sent as `null`.
    pub fn from_prediction(
        prediction: &PredictionResult,
        antibiotic: &str,
        dosage: &str,
        duration: &str,
        instructions: &str,
    ) -> Self {
        let instructions = instructions.trim();
        Self {
            patient_id: prediction.patient_id.clone(),
            bacterial_species: prediction.bacterial_species.clone(),
            region: prediction.region.clone(),
            antibiotic: antibiotic.to_string(),
            dosage: dosage.trim().to_string(),
            duration: duration.trim().to_string(),
            instructions: (!instructions.is_empty()).then(|| instructions.to_string()),
            confidence: prediction.confidence,
        }
    }
}

/// A finalized prescription as returned by the backend.
///
/// Immutable once displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub prescription_id: String,
    pub patient_id: String,
    /// ISO-8601 timestamp. The backend emits naive UTC timestamps, so this is
    /// kept as the raw string and parsed only for display.
    pub date: String,
    pub bacterial_species: String,
    #[serde(default)]
    pub region: Option<String>,
    pub antibiotic: String,
    pub dosage: String,
    pub duration: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl Prescription {
    /// The calendar date of `date`, if it parses as RFC 3339, a naive
    /// timestamp, or a plain `YYYY-MM-DD`.
    pub fn issued_on(&self) -> Option<NaiveDate> {
        let raw = self.date.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.date_naive());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt.date());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}
