//! Timer and per-category attribution.
//!
//! The engine never reads the clock itself, every transition receives `now`. This keeps it
//! deterministic in tests and lets the session decide when to refresh the display.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::utils::time::format_hms;

/// Period of the cosmetic display refresh while the timer runs.
pub const TICK_PERIOD: std::time::Duration = std::time::Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTransition {
    Started,
    Paused { delta: Duration },
    Unchanged,
}

/// Total elapsed time and the running flag, written when the application exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    #[serde(with = "duration_ms")]
    pub elapsed_ms: Duration,
    pub is_running: bool,
}

impl TimerSnapshot {
    /// Lenient read of a stored snapshot. Fields of the wrong type read as zero / not running.
    pub fn load(raw: Option<&str>) -> Option<Self> {
        let raw = raw?;
        let value = match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!("Stored timer snapshot is malformed: {e}");
                return None;
            }
        };
        Some(Self {
            elapsed_ms: value
                .get("elapsedMs")
                .map(millis_from_value)
                .unwrap_or_else(Duration::zero),
            is_running: value
                .get("isRunning")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        })
    }
}

/// Largest stored duration taken at face value, a little over 30 000 years. Anything larger is
/// treated as malformed so later arithmetic can't overflow.
const MAX_STORED_MS: f64 = 1e15;

fn millis_from_value(value: &serde_json::Value) -> Duration {
    value
        .as_f64()
        .filter(|v| v.is_finite() && (0.0..=MAX_STORED_MS).contains(v))
        .map(|v| Duration::milliseconds(v as i64))
        .unwrap_or_else(Duration::zero)
}

mod duration_ms {
    use chrono::Duration;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(duration.num_milliseconds())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = i64::deserialize(deserializer)?;
        Ok(Duration::milliseconds(ms))
    }
}

/// Accumulated time per category key.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CategoryTotals(BTreeMap<String, Duration>);

impl CategoryTotals {
    /// Reads `{ key: ms }`. Malformed JSON gives an empty map, non numeric entries count as zero.
    pub fn load(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str::<BTreeMap<String, serde_json::Value>>(raw) {
            Ok(map) => Self(
                map.into_iter()
                    .map(|(key, value)| (key, millis_from_value(&value)))
                    .collect(),
            ),
            Err(e) => {
                warn!("Stored category totals are malformed: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> BTreeMap<&str, i64> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.num_milliseconds()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Duration {
        self.0.get(key).copied().unwrap_or_else(Duration::zero)
    }

    fn add(&mut self, key: &str, delta: Duration) {
        *self.0.entry(key.to_string()).or_insert_with(Duration::zero) += delta;
    }
}

/// Two states: stopped, and running since `start`.
#[derive(Debug, Default, Clone)]
pub struct TimerEngine {
    elapsed: Duration,
    start: Option<DateTime<Utc>>,
    active_category: Option<String>,
    totals: CategoryTotals,
}

impl TimerEngine {
    /// Rebuilds the timer after a restart. Totals and the active category load independently of
    /// the snapshot. A timer that was running resumes from `now`: the time the application was
    /// closed is not counted anywhere.
    pub fn restore(
        snapshot: Option<TimerSnapshot>,
        totals: CategoryTotals,
        active_category: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let snapshot = snapshot.unwrap_or(TimerSnapshot {
            elapsed_ms: Duration::zero(),
            is_running: false,
        });
        Self {
            elapsed: snapshot.elapsed_ms,
            start: snapshot.is_running.then_some(now),
            active_category: active_category.filter(|v| !v.is_empty()),
            totals,
        }
    }

    pub fn is_running(&self) -> bool {
        self.start.is_some()
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> TimerTransition {
        if self.is_running() {
            return TimerTransition::Unchanged;
        }
        debug!("Starting timer for {:?}", self.active_category);
        self.start = Some(now);
        TimerTransition::Started
    }

    /// Stops the timer and flushes the running segment into the total and the active category.
    pub fn pause(&mut self, now: DateTime<Utc>) -> TimerTransition {
        let Some(start) = self.start.take() else {
            return TimerTransition::Unchanged;
        };
        let delta = (now - start).max(Duration::zero());
        self.elapsed += delta;
        if let Some(active) = &self.active_category {
            self.totals.add(active, delta);
        }
        debug!("Paused timer after {delta} for {:?}", self.active_category);
        TimerTransition::Paused { delta }
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) -> TimerTransition {
        if self.is_running() {
            self.pause(now)
        } else {
            self.start(now)
        }
    }

    /// Switches attribution to `key`. Time running so far is flushed to the previous category
    /// first, then the timer runs for the new one.
    pub fn attribute_and_restart(&mut self, key: &str, now: DateTime<Utc>) -> TimerTransition {
        let flushed = self.pause(now);
        self.active_category = Some(key.to_string());
        self.start(now);
        flushed
    }

    pub fn current(&self, now: DateTime<Utc>) -> Duration {
        let running = self
            .start
            .map(|start| (now - start).max(Duration::zero()))
            .unwrap_or_else(Duration::zero);
        self.elapsed + running
    }

    pub fn display(&self, now: DateTime<Utc>) -> String {
        format_hms(self.current(now))
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> TimerSnapshot {
        TimerSnapshot {
            elapsed_ms: self.current(now),
            is_running: self.is_running(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn active_category(&self) -> Option<&str> {
        self.active_category.as_deref()
    }

    pub fn totals(&self) -> &CategoryTotals {
        &self.totals
    }
}
