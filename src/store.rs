//! # Record Store
//! Boundary to wherever standings and results come from. The engine itself
//! never calls it; callers assemble an `InputBundle` first.
//!
//! `JsonRecordStore` layout under its data directory:
//! - `standings.json`          → `[DriverStanding]` (required)
//! - `team_standings.json`     → `[TeamStanding]`
//! - `events.json`             → `[EventResult]`, oldest first
//! - `venues/<venue_id>.json`  → `[EventResult]`, oldest first
//! - `qualifying.json`         → `QualifyingSession`
//!
//! Optional files that are missing read as empty (or `None`).

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::model::{DriverStanding, EventResult, InputBundle, QualifyingSession, TeamStanding};

/// Recent events fetched per bundle.
pub const RECENT_EVENTS_LIMIT: usize = 10;
/// Venue editions fetched per bundle.
pub const VENUE_HISTORY_LIMIT: usize = 10;

pub trait RecordStore: Send + Sync {
    fn get_standings(&self) -> Result<Vec<DriverStanding>>;
    fn get_team_standings(&self) -> Result<Vec<TeamStanding>>;
    /// Last `limit` events, chronological (oldest → newest).
    fn get_recent_events(&self, limit: usize) -> Result<Vec<EventResult>>;
    /// Last `limit` editions held at `venue_id`, chronological.
    fn get_venue_history(&self, venue_id: &str, limit: usize) -> Result<Vec<EventResult>>;
    fn get_current_qualifying(&self) -> Result<Option<QualifyingSession>>;
}

impl InputBundle {
    /// Pull everything one scoring run needs from `store`.
    pub fn from_store(store: &dyn RecordStore, venue_id: Option<&str>) -> Result<Self> {
        let venue_history = match venue_id {
            Some(v) => store.get_venue_history(v, VENUE_HISTORY_LIMIT)?,
            None => Vec::new(),
        };
        Ok(Self {
            standings: store.get_standings()?,
            team_standings: store.get_team_standings()?,
            recent_events: store.get_recent_events(RECENT_EVENTS_LIMIT)?,
            venue_history,
            current_qualifying: store.get_current_qualifying()?,
        })
    }
}

/// Venue ids become file names under `venues/`, so they may not contain
/// path separators or dots.
pub fn is_valid_venue_id(venue_id: &str) -> bool {
    !venue_id.is_empty() && !venue_id.contains(['/', '\\', '.'])
}

fn tail<T>(mut items: Vec<T>, limit: usize) -> Vec<T> {
    let start = items.len().saturating_sub(limit);
    items.drain(..start);
    items
}

#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    root: PathBuf,
}

impl JsonRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_json<T: DeserializeOwned>(&self, rel: &Path) -> Result<T> {
        let path = self.root.join(rel);
        let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
    }

    fn read_optional<T: DeserializeOwned>(&self, rel: &Path) -> Result<Option<T>> {
        if !self.root.join(rel).exists() {
            debug!(file = %rel.display(), "optional record file missing");
            return Ok(None);
        }
        self.read_json(rel).map(Some)
    }
}

impl RecordStore for JsonRecordStore {
    fn get_standings(&self) -> Result<Vec<DriverStanding>> {
        self.read_json(Path::new("standings.json"))
    }

    fn get_team_standings(&self) -> Result<Vec<TeamStanding>> {
        Ok(self
            .read_optional(Path::new("team_standings.json"))?
            .unwrap_or_default())
    }

    fn get_recent_events(&self, limit: usize) -> Result<Vec<EventResult>> {
        let all: Vec<EventResult> = self
            .read_optional(Path::new("events.json"))?
            .unwrap_or_default();
        Ok(tail(all, limit))
    }

    fn get_venue_history(&self, venue_id: &str, limit: usize) -> Result<Vec<EventResult>> {
        if !is_valid_venue_id(venue_id) {
            anyhow::bail!("invalid venue id: {venue_id:?}");
        }
        let rel = Path::new("venues").join(format!("{venue_id}.json"));
        let all: Vec<EventResult> = self.read_optional(&rel)?.unwrap_or_default();
        Ok(tail(all, limit))
    }

    fn get_current_qualifying(&self) -> Result<Option<QualifyingSession>> {
        self.read_optional(Path::new("qualifying.json"))
    }
}

/// Fixed in-memory records, handy for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    pub bundle: InputBundle,
}

impl InMemoryRecordStore {
    pub fn new(bundle: InputBundle) -> Self {
        Self { bundle }
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get_standings(&self) -> Result<Vec<DriverStanding>> {
        Ok(self.bundle.standings.clone())
    }

    fn get_team_standings(&self) -> Result<Vec<TeamStanding>> {
        Ok(self.bundle.team_standings.clone())
    }

    fn get_recent_events(&self, limit: usize) -> Result<Vec<EventResult>> {
        Ok(tail(self.bundle.recent_events.clone(), limit))
    }

    fn get_venue_history(&self, venue_id: &str, limit: usize) -> Result<Vec<EventResult>> {
        let at_venue = self
            .bundle
            .venue_history
            .iter()
            .filter(|e| e.venue_id.as_deref() == Some(venue_id))
            .cloned()
            .collect();
        Ok(tail(at_venue, limit))
    }

    fn get_current_qualifying(&self) -> Result<Option<QualifyingSession>> {
        Ok(self.bundle.current_qualifying.clone())
    }
}
