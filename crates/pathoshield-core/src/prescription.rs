//! The e-prescription workflow state machine.
//!
//! ```text
//!   NoAntibioticSelected ──select──▶ AntibioticSelected ──submit──▶ Submitting
//!                                      ▲      ▲                      │
//!                                      │      └──────── err ─────────┤
//!                                      └──── close ── Displayed ◀─ ok┘
//! ```
//!
//! The workflow is only usable once a prediction has been handed over.
//! Only susceptible antibiotics can be selected.

use tracing::{debug, info, warn};

use pathoshield_contracts::{
    error::{AmrError, AmrResult},
    prediction::PredictionResult,
    prescription::{Prescription, PrescriptionDraft},
};

use crate::{ranking::Recommendations, traits::DataSource};

/// The three free-text fields of the prescription form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrescriptionFields {
    pub dosage: String,
    pub duration: String,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrescriptionState {
    NoAntibioticSelected,
    AntibioticSelected { antibiotic: String },
    Submitting { antibiotic: String, ticket: u64 },
    Displayed { antibiotic: String, prescription: Prescription },
}

impl PrescriptionState {
    pub fn antibiotic(&self) -> Option<&str> {
        match self {
            PrescriptionState::NoAntibioticSelected => None,
            PrescriptionState::AntibioticSelected { antibiotic }
            | PrescriptionState::Submitting { antibiotic, .. }
            | PrescriptionState::Displayed { antibiotic, .. } => Some(antibiotic),
        }
    }
}

#[derive(Debug)]
pub struct PrescriptionWorkflow {
    prediction: Option<PredictionResult>,
    recommendations: Recommendations,
    state: PrescriptionState,
    fields: PrescriptionFields,
    /// Page-level message from the last failed submit.
    notice: Option<String>,
    next_ticket: u64,
}

impl Default for PrescriptionWorkflow {
    fn default() -> Self {
        Self {
            prediction: None,
            recommendations: Recommendations::default(),
            state: PrescriptionState::NoAntibioticSelected,
            fields: PrescriptionFields::default(),
            notice: None,
            next_ticket: 1,
        }
    }
}

impl PrescriptionWorkflow {
    /// A workflow with nothing to prescribe. The screen shows a placeholder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prediction(prediction: PredictionResult) -> Self {
        let mut wf = Self::default();
        wf.load_prediction(prediction);
        wf
    }

    /// Replace the handed-over prediction and start from scratch.
    pub fn load_prediction(&mut self, prediction: PredictionResult) {
        debug!(patient_id = %prediction.patient_id, "prediction handed over");
        self.recommendations = Recommendations::from_prediction(&prediction);
        self.prediction = Some(prediction);
        self.state = PrescriptionState::NoAntibioticSelected;
        self.fields = PrescriptionFields::default();
        self.notice = None;
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        self.prediction.as_ref()
    }

    pub fn recommendations(&self) -> &Recommendations {
        &self.recommendations
    }

    pub fn state(&self) -> &PrescriptionState {
        &self.state
    }

    pub fn fields(&self) -> &PrescriptionFields {
        &self.fields
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.state.antibiotic()
    }

    pub fn displayed(&self) -> Option<&Prescription> {
        match &self.state {
            PrescriptionState::Displayed { prescription, .. } => Some(prescription),
            _ => None,
        }
    }

    /// Select `name`. Switching to a different antibiotic empties the fields.
    pub fn select(&mut self, name: &str) -> AmrResult<()> {
        if self.prediction.is_none() {
            return Err(AmrError::state("no prediction to prescribe from"));
        }
        match &self.state {
            PrescriptionState::Submitting { .. } | PrescriptionState::Displayed { .. } => {
                return Err(AmrError::state("cannot change antibiotic now"));
            }
            PrescriptionState::AntibioticSelected { antibiotic } if antibiotic == name => {
                return Ok(());
            }
            _ => {}
        }
        if !self.recommendations.is_selectable(name) {
            return Err(AmrError::validation(
                "antibiotic",
                format!("{name} is not a susceptible antibiotic"),
            ));
        }

        debug!(antibiotic = %name, "antibiotic selected");
        self.fields = PrescriptionFields::default();
        self.notice = None;
        self.state = PrescriptionState::AntibioticSelected {
            antibiotic: name.to_string(),
        };
        Ok(())
    }

    /// The fields, editable only while an antibiotic is selected and idle.
    pub fn fields_mut(&mut self) -> AmrResult<&mut PrescriptionFields> {
        match self.state {
            PrescriptionState::AntibioticSelected { .. } => Ok(&mut self.fields),
            _ => Err(AmrError::state("prescription form is not editable")),
        }
    }

    pub fn set_dosage(&mut self, value: impl Into<String>) -> AmrResult<()> {
        self.fields_mut()?.dosage = value.into();
        Ok(())
    }

    pub fn set_duration(&mut self, value: impl Into<String>) -> AmrResult<()> {
        self.fields_mut()?.duration = value.into();
        Ok(())
    }

    pub fn set_instructions(&mut self, value: impl Into<String>) -> AmrResult<()> {
        self.fields_mut()?.instructions = value.into();
        Ok(())
    }

    pub fn clear_fields(&mut self) -> AmrResult<()> {
        *self.fields_mut()? = PrescriptionFields::default();
        self.notice = None;
        Ok(())
    }

    pub fn begin_submit(&mut self) -> AmrResult<(u64, PrescriptionDraft)> {
        let PrescriptionState::AntibioticSelected { antibiotic } = &self.state else {
            return Err(AmrError::state("select an antibiotic before submitting"));
        };
        let Some(prediction) = &self.prediction else {
            return Err(AmrError::state("no prediction to prescribe from"));
        };

        if self.fields.dosage.trim().is_empty() {
            return Err(AmrError::validation("dosage", "Please enter dosage"));
        }
        if self.fields.duration.trim().is_empty() {
            return Err(AmrError::validation("duration", "Please enter duration"));
        }

        let draft = PrescriptionDraft::from_prediction(
            prediction,
            antibiotic,
            &self.fields.dosage,
            &self.fields.duration,
            &self.fields.instructions,
        );
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.notice = None;
        self.state = PrescriptionState::Submitting {
            antibiotic: antibiotic.clone(),
            ticket,
        };

        debug!(ticket, antibiotic = %draft.antibiotic, "prescription submitting");
        Ok((ticket, draft))
    }

    /// Apply the backend response for `ticket`. Returns false when stale.
    pub fn complete(&mut self, ticket: u64, outcome: AmrResult<Prescription>) -> bool {
        let antibiotic = match &self.state {
            PrescriptionState::Submitting {
                antibiotic,
                ticket: current,
            } if *current == ticket => antibiotic.clone(),
            _ => {
                warn!(ticket, "dropping stale prescription response");
                return false;
            }
        };

        match outcome {
            Ok(prescription) => {
                info!(
                    ticket,
                    prescription_id = %prescription.prescription_id,
                    antibiotic = %prescription.antibiotic,
                    "prescription created"
                );
                self.state = PrescriptionState::Displayed {
                    antibiotic,
                    prescription,
                };
            }
            Err(e) => {
                warn!(ticket, error = %e, "prescription failed");
                self.notice = Some(e.to_string());
                self.state = PrescriptionState::AntibioticSelected { antibiotic };
            }
        }
        true
    }

    /// Close the summary and return to an empty form for the same antibiotic.
    pub fn close_summary(&mut self) -> AmrResult<()> {
        let PrescriptionState::Displayed { antibiotic, .. } = &self.state else {
            return Err(AmrError::state("no prescription summary is open"));
        };
        self.state = PrescriptionState::AntibioticSelected {
            antibiotic: antibiotic.clone(),
        };
        self.fields = PrescriptionFields::default();
        Ok(())
    }

    pub async fn submit(&mut self, source: &dyn DataSource) -> AmrResult<Prescription> {
        let (ticket, draft) = self.begin_submit()?;
        let outcome = source.create_prescription(&draft).await;
        let returned = outcome.clone();
        self.complete(ticket, outcome);
        returned
    }
}
