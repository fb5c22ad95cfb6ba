//! # pathoshield-core
//!
//! The presentation logic of the PathoShield console, independent of any
//! terminal or HTTP library.
//!
//! This crate provides:
//! - `DataSource`, the seam every backend call goes through
//! - The prediction and prescription workflow state machines
//! - Antibiotic ranking, surveillance reductions, chart and map shaping
//! - The printable prescription summary
//! - `HealthMonitor`, the periodic connectivity task
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pathoshield_core::{PredictionWorkflow, PrescriptionWorkflow};
//!
//! let mut prediction = PredictionWorkflow::default();
//! prediction.form_mut().organism = "E. coli".into();
//! prediction.attach_sample(sample)?;
//! let result = prediction.submit(&source).await?;
//!
//! let mut prescription = PrescriptionWorkflow::with_prediction(result);
//! ```

pub mod charts;
pub mod health;
pub mod prediction;
pub mod prescription;
pub mod ranking;
pub mod summary;
pub mod surveillance;
pub mod traits;

#[cfg(test)]
mod testing;

pub use health::HealthMonitor;
pub use prediction::{PredictionWorkflow, UploadLimits};
pub use prescription::PrescriptionWorkflow;
pub use surveillance::SurveillanceDashboard;
pub use traits::DataSource;
