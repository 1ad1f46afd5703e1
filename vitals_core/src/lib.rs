#![forbid(unsafe_code)]

//! Core domain model and business logic for the Vitals health tracker.
//!
//! This crate provides:
//! - Domain types (daily records, BMI snapshots, accounts)
//! - Metrics engine (BMI, calorie targets, health score)
//! - Date-keyed record store and bounded BMI history
//! - Persistence (locked, atomic JSON user database)
//! - Authentication and reports

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod records;
pub mod history;
pub mod metrics;
pub mod password;
pub mod report;
pub mod state;
pub mod store;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use records::RecordStore;
pub use history::BmiHistory;
pub use metrics::{
    compute_bmi, compute_calorie_target, compute_health_score, healthy_weight_range,
    BmiCategory, BmiResult, CalorieInput, CalorieTarget, RangePosition, WindowAverages,
};
pub use report::{HealthReport, ScoreRating};
pub use state::UserDatabase;
pub use store::{AuthenticatedUser, HealthStore, ProfileUpdate, RegistrationDetails};
pub use export::export_records_csv;
