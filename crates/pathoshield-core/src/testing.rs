//! Shared fixtures for the workflow tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use pathoshield_contracts::{
    error::{AmrError, AmrResult},
    health::HealthStatus,
    prediction::{PredictionRequest, PredictionResult},
    prescription::{Prescription, PrescriptionDraft},
    surveillance::{OrganismShare, RegionRecord, Trend, TrendPoint},
};

use crate::traits::DataSource;

pub fn sample_prediction() -> PredictionResult {
    PredictionResult {
        bacterial_species: "E. coli".to_string(),
        susceptible_antibiotics: vec![
            "Meropenem".to_string(),
            "Amoxicillin".to_string(),
            "Ciprofloxacin".to_string(),
        ],
        resistant_antibiotics: vec!["Tetracycline".to_string()],
        region: Some("Punjab".to_string()),
        confidence: Some(87.5),
        patient_id: "PAT-12345".to_string(),
    }
}

pub fn region(name: &str, cases: u64, rate: f64, organisms: &[&str]) -> RegionRecord {
    RegionRecord {
        region: name.to_string(),
        lat: 30.0,
        lng: 70.0,
        cases,
        avg_resistance_rate: rate,
        organisms: organisms.iter().map(|o| o.to_string()).collect(),
        trend: Trend::Stable,
    }
}

/// A `DataSource` that records how often each call was made.
///
/// When `failure` is set, predictions, prescriptions, regions and the
/// organism distribution fail with that HTTP detail. `trends` always answers,
/// and `health` follows `set_healthy` alone.
#[derive(Clone, Default)]
pub struct StubSource {
    failure: Option<String>,
    healthy: Arc<Mutex<bool>>,
    pub predictions: Arc<Mutex<Vec<PredictionRequest>>>,
    pub drafts: Arc<Mutex<Vec<PrescriptionDraft>>>,
    pub health_checks: Arc<Mutex<usize>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self {
            healthy: Arc::new(Mutex::new(true)),
            ..Self::default()
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            failure: Some(detail.to_string()),
            ..Self::default()
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        *self.healthy.lock().unwrap() = healthy;
    }

    pub fn prediction_calls(&self) -> usize {
        self.predictions.lock().unwrap().len()
    }

    pub fn prescription_calls(&self) -> usize {
        self.drafts.lock().unwrap().len()
    }

    pub fn health_calls(&self) -> usize {
        *self.health_checks.lock().unwrap()
    }

    fn fail<T>(&self) -> AmrResult<T> {
        Err(AmrError::Http {
            status: 500,
            detail: self.failure.clone().unwrap_or_default(),
        })
    }
}

#[async_trait]
impl DataSource for StubSource {
    fn label(&self) -> &str {
        "stub"
    }

    async fn health(&self) -> AmrResult<HealthStatus> {
        *self.health_checks.lock().unwrap() += 1;
        if *self.healthy.lock().unwrap() {
            Ok(HealthStatus {
                status: Some("healthy".to_string()),
                message: "AMR Prediction API is running".to_string(),
                database: Some("connected".to_string()),
            })
        } else {
            Err(AmrError::Network {
                reason: "connection refused".to_string(),
            })
        }
    }

    async fn run_prediction(&self, request: &PredictionRequest) -> AmrResult<PredictionResult> {
        self.predictions.lock().unwrap().push(request.clone());
        if self.failure.is_some() {
            return self.fail();
        }
        Ok(PredictionResult {
            bacterial_species: request.organism.clone(),
            region: request.region.clone(),
            ..sample_prediction()
        })
    }

    async fn create_prescription(&self, draft: &PrescriptionDraft) -> AmrResult<Prescription> {
        self.drafts.lock().unwrap().push(draft.clone());
        if self.failure.is_some() {
            return self.fail();
        }
        Ok(Prescription {
            prescription_id: "PRES-1700000000000".to_string(),
            patient_id: draft.patient_id.clone(),
            date: "2026-03-14T09:26:53.589793".to_string(),
            bacterial_species: draft.bacterial_species.clone(),
            region: draft.region.clone(),
            antibiotic: draft.antibiotic.clone(),
            dosage: draft.dosage.clone(),
            duration: draft.duration.clone(),
            instructions: draft.instructions.clone(),
            confidence: draft.confidence,
        })
    }

    async fn regions(&self) -> AmrResult<Vec<RegionRecord>> {
        if self.failure.is_some() {
            return self.fail();
        }
        Ok(vec![
            region("Punjab", 10, 0.2, &["E. coli", "K. pneumoniae"]),
            region("Sindh", 0, 0.4, &["E. coli", "S. aureus"]),
        ])
    }

    async fn trends(&self) -> AmrResult<Vec<TrendPoint>> {
        Ok(vec![TrendPoint {
            month: Some("Jan".to_string()),
            resistance_rate: Some(0.25),
            cases: Some(120),
            ..TrendPoint::default()
        }])
    }

    async fn organism_distribution(&self) -> AmrResult<Vec<OrganismShare>> {
        if self.failure.is_some() {
            return self.fail();
        }
        Ok(vec![OrganismShare {
            organism: "E. coli".to_string(),
            cases: 342,
            percentage: Some(33.0),
        }])
    }
}
