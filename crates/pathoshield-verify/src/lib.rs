//! # pathoshield-verify
//!
//! Response validation for the PathoShield console.
//!
//! This crate provides [`engine::ResponseValidator`], which checks backend
//! response bodies against a JSON Schema per endpoint (see [`schemas`]) and
//! decodes them into the contract types. Collections drop the rows that do
//! not validate; single objects fail with `AmrError::MalformedPayload`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use pathoshield_contracts::endpoint::Endpoint;
//! use pathoshield_verify::engine::ResponseValidator;
//!
//! let validator = ResponseValidator::new()?;
//! let regions: Vec<RegionRecord> = validator.decode_collection(Endpoint::Regions, body);
//! ```

pub mod engine;
pub mod schemas;

pub use engine::ResponseValidator;
