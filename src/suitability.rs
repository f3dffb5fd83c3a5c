//! suitability.rs — Result types for the fishing-suitability score.
//!
//! The shape the API returns: a clamped 0–100 score, a qualitative level
//! derived from fixed thresholds, a recommendation tied 1:1 to the level,
//! and ordered explainability lists (negative factors + advisory tips).

use serde::{Deserialize, Serialize};

/// Qualitative suitability level, a pure function of the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl Level {
    /// Fixed thresholds shared by both scoring models.
    pub fn from_score(score: i32) -> Self {
        if score >= 80 {
            Level::Excellent
        } else if score >= 60 {
            Level::Good
        } else if score >= 40 {
            Level::Fair
        } else if score >= 20 {
            Level::Poor
        } else {
            Level::VeryPoor
        }
    }

    /// Short Chinese label ("钓鱼指数" badge in the UI).
    pub fn label(self) -> &'static str {
        match self {
            Level::Excellent => "优秀",
            Level::Good => "良好",
            Level::Fair => "一般",
            Level::Poor => "较差",
            Level::VeryPoor => "很差",
        }
    }

    /// Human-readable summary, 1:1 with the level.
    pub fn recommendation(self) -> &'static str {
        match self {
            Level::Excellent => "非常适合钓鱼！",
            Level::Good => "比较适合钓鱼",
            Level::Fair => "可以钓鱼，但条件一般",
            Level::Poor => "不太适合钓鱼",
            Level::VeryPoor => "不建议钓鱼",
        }
    }
}

/// Complete scoring output. Produced fresh on every call; no shared state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityResult {
    pub score: i32,
    pub level: Level,
    pub recommendation: String,
    /// Negative factors, in rule-evaluation order.
    #[serde(default)]
    pub reasons: Vec<String>,
    /// Advisory messages, in rule-evaluation order.
    #[serde(default)]
    pub tips: Vec<String>,
}

impl SuitabilityResult {
    /// Clamp the raw score, derive level + recommendation, keep the lists as
    /// assembled by the engine.
    pub fn from_raw(raw_score: i32, reasons: Vec<String>, tips: Vec<String>) -> Self {
        let score = raw_score.clamp(0, 100);
        let level = Level::from_score(score);
        Self {
            score,
            level,
            recommendation: level.recommendation().to_string(),
            reasons,
            tips,
        }
    }
}
