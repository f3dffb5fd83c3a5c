//! history.rs — bounded in-memory log of recent analyses for the debug endpoints.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::suitability::{Level, SuitabilityResult};

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub ts_unix: u64,
    pub location: String,
    pub score: i32,
    pub level: Level,
    /// First few negative factors, for quick diagnostics.
    pub top_reasons: Vec<String>,
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<Vec<HistoryEntry>>,
    cap: usize,
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::with_capacity(cap.min(10_000))),
            cap: cap.min(10_000),
        }
    }

    pub fn push(&self, location: &str, result: &SuitabilityResult) {
        let entry = HistoryEntry {
            ts_unix: now_unix(),
            location: location.to_string(),
            score: result.score,
            level: result.level,
            top_reasons: result.reasons.iter().take(3).cloned().collect(),
        };

        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let v = self.inner.lock().expect("history mutex poisoned");
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: i32) -> SuitabilityResult {
        SuitabilityResult::from_raw(score, vec!["风力过大".into()], vec![])
    }

    #[test]
    fn capped_and_ordered() {
        let h = History::with_capacity(3);
        for i in 0..5 {
            h.push(&format!("loc-{i}"), &result(50 + i));
        }
        let snap = h.snapshot_last_n(10);
        assert_eq!(snap.len(), 3);
        assert_eq!(snap[0].location, "loc-2");
        assert_eq!(snap[2].location, "loc-4");
        assert_eq!(snap[2].score, 54);
    }

    #[test]
    fn snapshot_smaller_than_len() {
        let h = History::with_capacity(10);
        h.push("a", &result(80));
        h.push("b", &result(20));
        let snap = h.snapshot_last_n(1);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].location, "b");
        assert_eq!(snap[0].level, Level::Poor);
    }
}
