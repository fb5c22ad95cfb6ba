//! # pathoshield-contracts
//!
//! Shared wire types, schemas, and error contracts for the PathoShield
//! console.
//!
//! All crates in the workspace import from here. No behaviour lives in this
//! crate, only data definitions and the error type.

pub mod endpoint;
pub mod error;
pub mod health;
pub mod prediction;
pub mod prescription;
pub mod schema;
pub mod surveillance;
