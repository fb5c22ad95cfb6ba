//! Prediction request and result types.
//!
//! Field names on the wire are camelCase because that is what the
//! prediction service emits and accepts.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// The outcome of one prediction run, as returned by the backend.
///
/// Produced once per submission and read-only afterwards. The E-Prescription
/// screen receives a clone of it; nothing mutates the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub bacterial_species: String,
    #[serde(default)]
    pub susceptible_antibiotics: Vec<String>,
    #[serde(default)]
    pub resistant_antibiotics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Model confidence in percent (0–100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub patient_id: String,
}

impl PredictionResult {
    /// Antibiotics the backend reported as both susceptible and resistant.
    ///
    /// The two sets are expected to be disjoint. Nothing enforces it; callers
    /// use this only to log the contract violation.
    pub fn overlapping_antibiotics(&self) -> Vec<&str> {
        self.susceptible_antibiotics
            .iter()
            .filter(|name| self.resistant_antibiotics.contains(name))
            .map(String::as_str)
            .collect()
    }
}

/// A sample file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl SampleFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a sample from disk, keeping only the final path component as name.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { file_name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lower-cased extension without the dot, if the name has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }
}

/// Everything sent to `POST /api/prediction/run`.
///
/// Sent as multipart form data: the sample as `file`, the rest as text
/// fields. Optional fields that are `None` are omitted entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub organism: String,
    pub patient_age: Option<u32>,
    pub patient_gender: Option<String>,
    pub region: Option<String>,
    pub sample: SampleFile,
}

impl PredictionRequest {
    /// The text fields in wire order, skipping absent optionals.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("organism", self.organism.clone())];
        if let Some(age) = self.patient_age {
            fields.push(("patientAge", age.to_string()));
        }
        if let Some(gender) = &self.patient_gender {
            fields.push(("patientGender", gender.clone()));
        }
        if let Some(region) = &self.region {
            fields.push(("region", region.clone()));
        }
        fields
    }
}
