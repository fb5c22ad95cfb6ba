//! The prediction workflow state machine.
//!
//! ```text
//!   Idle ──submit──▶ Submitting{ticket} ──ok──▶ Success(result)
//!    ▲                      │
//!    │                      └──err──▶ Failure(message)
//!    └────────── clear (from any state) ─────────┘
//! ```
//!
//! A submit that fails validation leaves the state untouched and sends
//! nothing. Every accepted submit gets a fresh ticket; a response carrying
//! any other ticket is discarded.

use std::path::Path;

use tracing::{debug, info, warn};

use pathoshield_contracts::{
    error::{AmrError, AmrResult},
    prediction::{PredictionRequest, PredictionResult, SampleFile},
};

use crate::traits::DataSource;

const MIB: u64 = 1024 * 1024;
const MAX_AGE: u32 = 120;

/// Limits applied when a sample file is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadLimits {
    pub max_bytes: u64,
    /// Accepted extensions, lower-case, without the dot.
    pub extensions: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: 10 * MIB,
            extensions: vec!["txt".to_string(), "csv".to_string()],
        }
    }
}

impl UploadLimits {
    /// "10.00 MB" style rendering of the size limit.
    pub fn max_size_label(&self) -> String {
        format!("{:.2} MB", self.max_bytes as f64 / MIB as f64)
    }

    /// ".txt, .csv" style rendering of the accepted extensions.
    pub fn accepted_label(&self) -> String {
        self.extensions
            .iter()
            .map(|e| format!(".{e}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn check_size(&self, bytes: u64) -> AmrResult<()> {
        if bytes > self.max_bytes {
            return Err(AmrError::validation(
                "file",
                format!("File size exceeds {}", self.max_size_label()),
            ));
        }
        Ok(())
    }

    pub fn check(&self, sample: &SampleFile) -> AmrResult<()> {
        self.check_size(sample.size())?;
        match sample.extension() {
            Some(ext) if self.extensions.iter().any(|e| *e == ext) => Ok(()),
            _ => Err(AmrError::validation(
                "file",
                format!("Only {} files are accepted", self.accepted_label()),
            )),
        }
    }
}

/// The values typed into the prediction form.
///
/// Text fields hold exactly what the user typed; they are only parsed when
/// a request is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionForm {
    pub organism: String,
    pub patient_age: String,
    pub patient_gender: String,
    pub region: String,
    sample: Option<SampleFile>,
}

impl PredictionForm {
    pub fn sample(&self) -> Option<&SampleFile> {
        self.sample.as_ref()
    }

    /// Validate the form and build the request body.
    pub fn to_request(&self) -> AmrResult<PredictionRequest> {
        let organism = self.organism.trim();
        if organism.is_empty() {
            return Err(AmrError::validation("organism", "Please select an organism"));
        }
        let Some(sample) = &self.sample else {
            return Err(AmrError::validation("file", "Please upload a sample file"));
        };

        let patient_age = match self.patient_age.trim() {
            "" => None,
            raw => match raw.parse::<u32>() {
                Ok(age) if age <= MAX_AGE => Some(age),
                _ => {
                    return Err(AmrError::validation(
                        "patientAge",
                        format!("Age must be a whole number between 0 and {MAX_AGE}"),
                    ))
                }
            },
        };

        Ok(PredictionRequest {
            organism: organism.to_string(),
            patient_age,
            patient_gender: non_blank(&self.patient_gender),
            region: non_blank(&self.region),
            sample: sample.clone(),
        })
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionState {
    Idle,
    Submitting { ticket: u64 },
    Success(PredictionResult),
    Failure(String),
}

/// Owns the prediction form, its state, and ticket bookkeeping.
#[derive(Debug)]
pub struct PredictionWorkflow {
    form: PredictionForm,
    state: PredictionState,
    limits: UploadLimits,
    /// Validation message for the last rejected submit or attach.
    notice: Option<String>,
    next_ticket: u64,
}

impl Default for PredictionWorkflow {
    fn default() -> Self {
        Self::new(UploadLimits::default())
    }
}

impl PredictionWorkflow {
    pub fn new(limits: UploadLimits) -> Self {
        Self {
            form: PredictionForm::default(),
            state: PredictionState::Idle,
            limits,
            notice: None,
            next_ticket: 1,
        }
    }

    pub fn form(&self) -> &PredictionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PredictionForm {
        &mut self.form
    }

    pub fn state(&self) -> &PredictionState {
        &self.state
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, PredictionState::Submitting { .. })
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match &self.state {
            PredictionState::Success(result) => Some(result),
            _ => None,
        }
    }

    /// A copy of the current result for the E-Prescription screen.
    pub fn handoff(&self) -> Option<PredictionResult> {
        self.result().cloned()
    }

    /// Attach a sample after checking it against the upload limits.
    ///
    /// A rejected file leaves the previously attached one in place.
    pub fn attach_sample(&mut self, sample: SampleFile) -> AmrResult<()> {
        if let Err(e) = self.limits.check(&sample) {
            debug!(file = %sample.file_name, error = %e, "sample rejected");
            self.notice = Some(e.to_string());
            return Err(e);
        }
        debug!(file = %sample.file_name, bytes = sample.size(), "sample attached");
        self.form.sample = Some(sample);
        self.notice = None;
        Ok(())
    }

    /// Read the file at `path` and attach it.
    ///
    /// The size limit is checked against the file's metadata first, so an
    /// oversized file is rejected without being read.
    pub fn attach_path(&mut self, path: &Path) -> AmrResult<()> {
        let unreadable = |e: std::io::Error| AmrError::Io {
            reason: format!("could not read '{}': {}", path.display(), e),
        };
        let bytes = std::fs::metadata(path).map_err(unreadable)?.len();
        if let Err(e) = self.limits.check_size(bytes) {
            debug!(path = %path.display(), bytes, "sample rejected before reading");
            self.notice = Some(e.to_string());
            return Err(e);
        }
        let sample = SampleFile::read(path).map_err(unreadable)?;
        self.attach_sample(sample)
    }

    pub fn detach_sample(&mut self) {
        self.form.sample = None;
    }

    /// Validate and move to `Submitting`, returning the ticket and request.
    ///
    /// On a validation failure nothing changes except the notice.
    pub fn begin_submit(&mut self) -> AmrResult<(u64, PredictionRequest)> {
        if let PredictionState::Submitting { ticket } = self.state {
            debug!(ticket, "submit ignored; prediction already in flight");
            return Err(AmrError::state("a prediction is already being submitted"));
        }

        let request = match self.form.to_request() {
            Ok(request) => request,
            Err(e) => {
                self.notice = Some(e.to_string());
                return Err(e);
            }
        };

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.notice = None;
        self.state = PredictionState::Submitting { ticket };

        debug!(ticket, organism = %request.organism, "prediction submitting");
        Ok((ticket, request))
    }

    /// Apply the backend response for `ticket`.
    ///
    /// Returns false, leaving the state alone, when `ticket` is stale.
    pub fn complete(&mut self, ticket: u64, outcome: AmrResult<PredictionResult>) -> bool {
        if self.state != (PredictionState::Submitting { ticket }) {
            warn!(ticket, "dropping stale prediction response");
            return false;
        }

        self.state = match outcome {
            Ok(result) => {
                info!(
                    ticket,
                    patient_id = %result.patient_id,
                    species = %result.bacterial_species,
                    susceptible = result.susceptible_antibiotics.len(),
                    resistant = result.resistant_antibiotics.len(),
                    "prediction complete"
                );
                PredictionState::Success(result)
            }
            Err(e) => {
                warn!(ticket, error = %e, "prediction failed");
                PredictionState::Failure(e.to_string())
            }
        };
        true
    }

    /// Reset the form and state. Any in-flight response becomes stale.
    pub fn clear(&mut self) {
        debug!("prediction form cleared");
        self.form = PredictionForm::default();
        self.state = PredictionState::Idle;
        self.notice = None;
    }

    /// Abandon an in-flight submission when the screen is left.
    pub fn leave(&mut self) {
        if self.is_submitting() {
            debug!("prediction screen left while submitting");
            self.state = PredictionState::Idle;
        }
    }

    /// Submit the form through `source` and wait for the response.
    ///
    /// Validation errors are returned without contacting `source`.
    pub async fn submit(&mut self, source: &dyn DataSource) -> AmrResult<PredictionResult> {
        let (ticket, request) = self.begin_submit()?;
        let outcome = source.run_prediction(&request).await;
        let returned = outcome.clone();
        self.complete(ticket, outcome);
        returned
    }
}
