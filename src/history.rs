//! history.rs: bounded in-memory log of scoring runs, newest last.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::DataUsage;
use crate::prediction::Prediction;

/// One finished run as served to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSnapshot {
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<String>,
    pub data_usage: DataUsage,
    pub predictions: Vec<Prediction>,
}

impl RunSnapshot {
    pub fn prediction_for(&self, driver_id: &str) -> Option<&Prediction> {
        self.predictions.iter().find(|p| p.driver.id == driver_id)
    }
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<Vec<RunSnapshot>>,
    cap: usize,
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 1_000);
        Self {
            inner: Mutex::new(Vec::with_capacity(cap)),
            cap,
        }
    }

    pub fn push(&self, snapshot: RunSnapshot) {
        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push(snapshot);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    pub fn latest(&self) -> Option<RunSnapshot> {
        let v = self.inner.lock().expect("history mutex poisoned");
        v.last().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("history mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
