//! # Suitability Engine
//! Pure, testable logic that maps `(observation, hour)` → `SuitabilityResult`.
//! No I/O, no hidden state; identical inputs always yield identical results.
//!
//! Two models share one threshold table:
//! - [`analyze`] — canonical weighted model: base 60, five ordered factors
//!   (temperature → pressure → wind → condition → humidity), plus a
//!   non-scoring hour-of-day advisory pass.
//! - [`quick_score`] — legacy subtract-only model (base 100) kept for compact
//!   per-forecast-day summaries. Where the two disagree (moderate rain), the
//!   weighted model is canonical.

use serde::{Deserialize, Serialize};

use crate::observation::{ConditionKind, WeatherObservation};
use crate::suitability::SuitabilityResult;

/// Which scoring model to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreModel {
    /// Canonical five-factor weighted model.
    Weighted,
    /// Legacy per-day summary model.
    Simple,
}

/// Dispatch over the model variants behind one seam.
pub fn score_with(model: ScoreModel, obs: &WeatherObservation, hour_of_day: u8) -> SuitabilityResult {
    match model {
        ScoreModel::Weighted => analyze(obs, hour_of_day),
        ScoreModel::Simple => quick_score(obs),
    }
}

/// Canonical weighted analysis.
///
/// `hour_of_day` (0–23) feeds only the non-scoring advisory pass; it never
/// changes the numeric score.
pub fn analyze(obs: &WeatherObservation, hour_of_day: u8) -> SuitabilityResult {
    let mut score: i32 = 60;
    let mut reasons: Vec<String> = Vec::new();
    let mut tips: Vec<String> = Vec::new();
    // Positive factors among temperature/pressure/wind/condition; humidity
    // never counts toward the stacked-conditions summary.
    let mut positives: u32 = 0;

    // 1) Temperature (weight 25)
    let t = obs.temperature_c;
    if (15.0..=25.0).contains(&t) {
        score += 25;
        positives += 1;
        tips.push("温度适宜，鱼类活跃觅食".into());
    } else if (10.0..15.0).contains(&t) {
        score += 15;
        positives += 1;
        tips.push("水温偏低，鱼口较慢，宜钓深水".into());
    } else if t > 25.0 && t <= 30.0 {
        score += 10;
        positives += 1;
        tips.push("天气偏热，宜钓阴凉处或深水区".into());
    } else if t < 10.0 {
        score -= 15;
        reasons.push("温度过低".into());
        tips.push("低温鱼口轻，建议冬钓手法".into());
    } else {
        // t > 30
        score -= 20;
        reasons.push("温度过高".into());
        tips.push("建议清晨或傍晚出钓".into());
    }

    // 2) Pressure (weight 20)
    let p = obs.pressure_hpa;
    if (1005.0..=1020.0).contains(&p) {
        score += 20;
        positives += 1;
        tips.push("气压稳定，鱼类觅食积极".into());
    } else if p > 1020.0 {
        score += 10;
        positives += 1;
        tips.push("高气压天气，鱼多在底层活动".into());
    } else if (995.0..1005.0).contains(&p) {
        score -= 5;
        tips.push("气压偏低，鱼口一般".into());
    } else {
        score -= 15;
        reasons.push("气压异常".into());
    }

    // 3) Wind (weight 15)
    let w = obs.wind_speed_ms;
    if (0.5..=2.0).contains(&w) {
        score += 15;
        positives += 1;
        tips.push("微风习习，水中溶氧充足".into());
    } else if w > 2.0 && w <= 4.0 {
        score += 10;
        positives += 1;
        tips.push("风力适中，宜钓下风口".into());
    } else if w > 4.0 && w <= 6.0 {
        score -= 5;
        tips.push("风力偏大，抛竿注意准度".into());
    } else if w > 6.0 {
        score -= 20;
        reasons.push("风力过大".into());
    } else {
        // near-calm
        score += 5;
        positives += 1;
        tips.push("无风浪静，浮漂信号清晰".into());
    }

    // 4) Condition (weight 20)
    match obs.condition {
        ConditionKind::Drizzle | ConditionKind::LightRain => {
            score += 20;
            positives += 1;
            tips.push("小雨天气鱼类觅食活跃，极佳钓机".into());
        }
        ConditionKind::Overcast => {
            score += 15;
            positives += 1;
            tips.push("阴天鱼儿胆大，可钓近岸".into());
        }
        ConditionKind::PartlyCloudy => {
            score += 10;
            positives += 1;
            tips.push("多云天气光线柔和，利于垂钓".into());
        }
        ConditionKind::Clear => {
            tips.push("晴天宜钓阴凉处或浑水区".into());
        }
        ConditionKind::ModerateRain => {
            score -= 10;
            reasons.push("中雨天气".into());
        }
        ConditionKind::HeavyRain => {
            score -= 30;
            reasons.push("大雨天气".into());
        }
        ConditionKind::Thunderstorm => {
            score -= 50;
            reasons.push("雷电天气".into());
            tips.push("危险！禁止钓鱼".into());
        }
        ConditionKind::Snow => {
            score -= 20;
            reasons.push("降雪天气".into());
        }
        ConditionKind::Fog => {
            score -= 5;
            tips.push("雾霾天气注意视线与安全".into());
        }
    }

    // 5) Humidity (weight 10)
    let h = obs.humidity_pct;
    if (70..=90).contains(&h) {
        score += 10;
        tips.push("湿度适宜，体感舒适".into());
    } else if h > 90 {
        score += 5;
        tips.push("湿度很高，可能有降雨，鱼口转好".into());
    } else if h < 50 {
        score -= 5;
        tips.push("空气干燥，注意补水防晒".into());
    }

    // Non-scoring advisory pass.
    if (5..=9).contains(&hour_of_day) || (16..=19).contains(&hour_of_day) {
        tips.push("当前为鱼类觅食高峰时段，抓紧出钓".into());
    } else if (11..=15).contains(&hour_of_day) {
        tips.push("正午时段鱼儿离岸，宜钓深水或阴凉处".into());
    }
    if positives >= 3 {
        tips.insert(0, "多项条件叠加利好，钓况值得期待".into());
    }

    SuitabilityResult::from_raw(score, reasons, tips)
}

/// Legacy quick score for per-forecast-day summaries.
///
/// Base 100, subtract-only over temperature/wind/precipitation extremes, with
/// a single small bonus for light-rain days. Shares [`Level`] thresholds with
/// the weighted model.
///
/// [`Level`]: crate::suitability::Level
pub fn quick_score(obs: &WeatherObservation) -> SuitabilityResult {
    let mut score: i32 = 100;
    let mut reasons: Vec<String> = Vec::new();
    let mut tips: Vec<String> = Vec::new();

    let t = obs.temperature_c;
    if t < 5.0 || t > 35.0 {
        score -= 30;
        reasons.push("温度过于极端".into());
        tips.push("鱼类活动减少，建议选择其他时间".into());
    } else if t < 10.0 || t > 30.0 {
        score -= 15;
        reasons.push("温度不够理想".into());
    } else if (15.0..=25.0).contains(&t) {
        tips.push("温度适宜，鱼类活跃".into());
    }

    let w = obs.wind_speed_ms;
    if w > 10.0 {
        score -= 30;
        reasons.push("风力过大".into());
        tips.push("大风影响抛竿，注意安全".into());
    } else if w > 7.0 {
        score -= 15;
        reasons.push("风力较大".into());
    } else if (2.0..=5.0).contains(&w) {
        tips.push("微风拂面，氧气充足".into());
    } else if w < 2.0 {
        tips.push("风力较小，可能需要打窝".into());
    }

    let precip = obs.precipitation_mm.unwrap_or(0.0);
    if precip > 10.0 {
        score -= 20;
        reasons.push("降水量较大".into());
        tips.push("大雨天气影响出钓".into());
    } else if precip > 5.0 {
        score -= 10;
        reasons.push("有降水".into());
    } else if precip > 0.0 {
        score += 5;
        tips.push("小雨天气鱼类觅食活跃".into());
    }

    SuitabilityResult::from_raw(score, reasons, tips)
}
