//! # Data Model
//! Raw records handed to the engine by the record store: standings, past
//! event results, venue history and the current qualifying session.
//!
//! Everything here is owned by the caller and treated as immutable for the
//! duration of one scoring run. "Recent" always means closest to the end of a
//! sequence; sequences are chronological, oldest first.

use serde::{Deserialize, Serialize};

/// A ranked competitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    /// Three-letter abbreviation (e.g. "VER"). Derived from the family name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub given_name: String,
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
}

impl Driver {
    pub fn new(
        id: impl Into<String>,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            code: None,
            given_name: given_name.into(),
            family_name: family_name.into(),
            nationality: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }

    /// Explicit code, or the first three letters of the family name uppercased.
    pub fn display_code(&self) -> String {
        match &self.code {
            Some(c) if !c.trim().is_empty() => c.clone(),
            _ => self
                .family_name
                .chars()
                .take(3)
                .collect::<String>()
                .to_uppercase(),
        }
    }
}

/// Team / constructor affiliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One row of the drivers' championship.
///
/// `position` is the stored rank as reported by the source. Scoring never
/// reads it: the rank used for features is the row's index in the ordered
/// sequence, since the two can diverge in malformed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStanding {
    pub driver: Driver,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    pub position: u32,
    pub points: f64,
}

impl DriverStanding {
    pub fn team_id(&self) -> Option<&str> {
        self.team.as_ref().map(|t| t.id.as_str())
    }
}

/// One row of the teams' championship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team: Team,
    pub position: u32,
    pub points: f64,
}

/// A single driver's outcome in one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishRecord {
    pub driver_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    /// Starting grid slot. `None` or `Some(0)` both mean "no grid position".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<u32>,
    /// 1-based finishing position.
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl FinishRecord {
    pub fn new(driver_id: impl Into<String>, position: u32) -> Self {
        Self {
            driver_id: driver_id.into(),
            team_id: None,
            grid: None,
            position,
            status: None,
        }
    }

    pub fn with_grid(mut self, grid: u32) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Grid slot if it is a usable positive integer.
    pub fn grid_position(&self) -> Option<u32> {
        self.grid.filter(|g| *g > 0)
    }
}

/// One past event and its classified results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResult {
    pub season: String,
    pub round: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub results: Vec<FinishRecord>,
}

impl EventResult {
    pub fn new(season: impl Into<String>, round: u32, name: impl Into<String>) -> Self {
        Self {
            season: season.into(),
            round,
            name: name.into(),
            venue_id: None,
            date: None,
            results: Vec::new(),
        }
    }

    pub fn at_venue(mut self, venue_id: impl Into<String>) -> Self {
        self.venue_id = Some(venue_id.into());
        self
    }

    pub fn with_result(mut self, record: FinishRecord) -> Self {
        self.results.push(record);
        self
    }

    /// First record for `driver_id`, if the driver took part.
    pub fn result_for(&self, driver_id: &str) -> Option<&FinishRecord> {
        self.results.iter().find(|r| r.driver_id == driver_id)
    }

    pub fn has_grid_data(&self) -> bool {
        self.results.iter().any(|r| r.grid_position().is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifyingEntry {
    pub driver_id: String,
    /// Qualifying classification, which becomes the starting grid slot.
    pub position: u32,
}

/// Qualifying for the upcoming event, if it has already taken place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifyingSession {
    pub season: String,
    pub round: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<String>,
    #[serde(default)]
    pub results: Vec<QualifyingEntry>,
}

impl QualifyingSession {
    pub fn grid_for(&self, driver_id: &str) -> Option<u32> {
        self.results
            .iter()
            .find(|q| q.driver_id == driver_id)
            .map(|q| q.position)
            .filter(|p| *p > 0)
    }
}

/// Everything one scoring run reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputBundle {
    pub standings: Vec<DriverStanding>,
    #[serde(default)]
    pub team_standings: Vec<TeamStanding>,
    #[serde(default)]
    pub recent_events: Vec<EventResult>,
    #[serde(default)]
    pub venue_history: Vec<EventResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_qualifying: Option<QualifyingSession>,
}

impl InputBundle {
    /// Index-derived 1-based rank of a driver in the standings.
    pub fn standings_rank(&self, driver_id: &str) -> Option<usize> {
        self.standings
            .iter()
            .position(|s| s.driver.id == driver_id)
            .map(|i| i + 1)
    }

    pub fn standing_for(&self, driver_id: &str) -> Option<&DriverStanding> {
        self.standings.iter().find(|s| s.driver.id == driver_id)
    }
}
