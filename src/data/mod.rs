//! Remote data access for tickerdesk
//!
//! Contains the client for the external analysis service. The service is an
//! opaque collaborator: it accepts a ticker and returns a markdown report with
//! artifact locators. Nothing here interprets the report body.

pub mod analysis;

pub use analysis::{AnalysisClient, AnalysisError, AnalysisResponse};
