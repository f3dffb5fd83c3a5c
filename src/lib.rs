// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod clients;
pub mod config;
pub mod engine;
pub mod favorites;
pub mod history;
pub mod normalize;
pub mod observation;
pub mod suitability;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::engine::{analyze, quick_score, score_with, ScoreModel};
pub use crate::observation::{ConditionCategory, ConditionKind, WeatherObservation};
pub use crate::suitability::{Level, SuitabilityResult};
