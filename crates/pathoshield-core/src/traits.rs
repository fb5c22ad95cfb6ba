//! The data source seam between the workflows and the backend.
//!
//! Every screen talks to the backend through `DataSource`. The live
//! implementation issues HTTP requests; the mock implementation answers from
//! simulated data. The workflows cannot tell them apart.

use async_trait::async_trait;

use pathoshield_contracts::{
    error::AmrResult,
    health::HealthStatus,
    prediction::{PredictionRequest, PredictionResult},
    prescription::{Prescription, PrescriptionDraft},
    surveillance::{OrganismShare, RegionRecord, TrendPoint},
};

/// A provider of prediction, prescription and surveillance data.
///
/// Every call is a single attempt. Implementations never retry.
///
/// Collection calls return `Ok(vec![])` when the backend answered with an
/// absent or malformed collection. `Err` is reserved for transport and
/// HTTP failures, which the dashboard shows as a failed panel.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name shown in the header and in logs ("live", "mock").
    fn label(&self) -> &str;

    async fn health(&self) -> AmrResult<HealthStatus>;

    /// Submit one sample for prediction.
    async fn run_prediction(&self, request: &PredictionRequest) -> AmrResult<PredictionResult>;

    /// Finalize a prescription. The backend assigns its ID and date.
    async fn create_prescription(&self, draft: &PrescriptionDraft) -> AmrResult<Prescription>;

    async fn regions(&self) -> AmrResult<Vec<RegionRecord>>;

    async fn trends(&self) -> AmrResult<Vec<TrendPoint>>;

    async fn organism_distribution(&self) -> AmrResult<Vec<OrganismShare>>;
}
