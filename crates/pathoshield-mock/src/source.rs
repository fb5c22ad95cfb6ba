//! `DataSource` that answers from an in-process simulated backend.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use pathoshield_contracts::{
    error::{AmrError, AmrResult},
    health::HealthStatus,
    prediction::{PredictionRequest, PredictionResult},
    prescription::{Prescription, PrescriptionDraft},
    surveillance::{OrganismShare, RegionRecord, TrendPoint},
};
use pathoshield_core::traits::DataSource;

use crate::mock_data::{
    sample_confidence, sample_names, sample_patient_id, seed_history, ORGANISM_POOL, RESISTANT_PICKS,
    RESISTANT_POOL, SUSCEPTIBLE_PICKS, SUSCEPTIBLE_POOL,
};
use crate::store::{PredictionStore, StoredPrediction};

/// Number of historical predictions a fresh mock starts with.
pub const SEED_RECORDS: usize = 240;

pub const HEALTH_MESSAGE: &str = "AMR Prediction API is running";

struct MockState {
    rng: StdRng,
    store: PredictionStore,
}

/// Simulated backend.
///
/// Predictions are random but plausible and are remembered, so the
/// surveillance screens reflect what was submitted during the session.
pub struct MockDataSource {
    state: Mutex<MockState>,
}

impl MockDataSource {
    /// A mock seeded from entropy with a generated history.
    pub fn new() -> Self {
        Self::seeded(StdRng::from_entropy(), SEED_RECORDS)
    }

    /// A deterministic mock: the same seed yields the same history and the
    /// same predictions.
    pub fn with_seed(seed: u64) -> Self {
        Self::seeded(StdRng::seed_from_u64(seed), SEED_RECORDS)
    }

    /// A mock with no history. Surveillance collections start empty.
    pub fn empty(seed: u64) -> Self {
        Self::seeded(StdRng::seed_from_u64(seed), 0)
    }

    fn seeded(mut rng: StdRng, records: usize) -> Self {
        let history = seed_history(&mut rng, Utc::now(), records);
        debug!(records = history.len(), "mock history generated");
        Self {
            state: Mutex::new(MockState {
                rng,
                store: PredictionStore::new(history),
            }),
        }
    }

    /// Number of predictions the mock currently remembers.
    pub fn stored_predictions(&self) -> AmrResult<usize> {
        Ok(self.lock()?.store.len())
    }

    fn lock(&self) -> AmrResult<std::sync::MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|_| AmrError::state("mock backend state is poisoned"))
    }
}

impl Default for MockDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    fn label(&self) -> &str {
        "mock"
    }

    async fn health(&self) -> AmrResult<HealthStatus> {
        Ok(HealthStatus {
            status: Some("healthy".to_string()),
            message: HEALTH_MESSAGE.to_string(),
            database: Some("connected".to_string()),
        })
    }

    async fn run_prediction(&self, request: &PredictionRequest) -> AmrResult<PredictionResult> {
        if request.sample.file_name.trim().is_empty() {
            return Err(AmrError::Http {
                status: 400,
                detail: "File is required".to_string(),
            });
        }

        let mut state = self.lock()?;
        let MockState { rng, store } = &mut *state;

        let organism = request.organism.trim();
        let bacterial_species = if organism.is_empty() {
            ORGANISM_POOL.choose(rng).map(|s| s.to_string()).unwrap_or_default()
        } else {
            organism.to_string()
        };

        let result = PredictionResult {
            bacterial_species,
            susceptible_antibiotics: sample_names(rng, &SUSCEPTIBLE_POOL, SUSCEPTIBLE_PICKS),
            resistant_antibiotics: sample_names(rng, &RESISTANT_POOL, RESISTANT_PICKS),
            region: request.region.clone(),
            confidence: Some(sample_confidence(rng)),
            patient_id: sample_patient_id(rng),
        };

        store.insert(StoredPrediction {
            bacterial_species: result.bacterial_species.clone(),
            region: result.region.clone(),
            susceptible_antibiotics: result.susceptible_antibiotics.clone(),
            resistant_antibiotics: result.resistant_antibiotics.clone(),
            created_at: Utc::now(),
        });

        info!(
            patient_id = %result.patient_id,
            species = %result.bacterial_species,
            bytes = request.sample.size(),
            "mock prediction generated"
        );
        Ok(result)
    }

    async fn create_prescription(&self, draft: &PrescriptionDraft) -> AmrResult<Prescription> {
        let now = Utc::now();
        let prescription = Prescription {
            prescription_id: format!("PRES-{}", now.timestamp_millis()),
            patient_id: draft.patient_id.clone(),
            date: now.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            bacterial_species: draft.bacterial_species.clone(),
            region: draft.region.clone(),
            antibiotic: draft.antibiotic.clone(),
            dosage: draft.dosage.clone(),
            duration: draft.duration.clone(),
            instructions: draft.instructions.clone(),
            confidence: draft.confidence,
        };
        info!(prescription_id = %prescription.prescription_id, "mock prescription issued");
        Ok(prescription)
    }

    async fn regions(&self) -> AmrResult<Vec<RegionRecord>> {
        Ok(self.lock()?.store.regions(Utc::now()))
    }

    async fn trends(&self) -> AmrResult<Vec<TrendPoint>> {
        Ok(self.lock()?.store.trends(Utc::now()))
    }

    async fn organism_distribution(&self) -> AmrResult<Vec<OrganismShare>> {
        Ok(self.lock()?.store.organism_distribution())
    }
}
