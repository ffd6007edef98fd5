// 🔎 Match Filters - Which matches take part in the statistics
//
// The engine accepts any predicate; MatchFilter is the named vocabulary
// shared by the CLI, the TUI and the HTTP API.

use crate::model::{Match, Team};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Caller-supplied condition over a match
pub type MatchPredicate = Arc<dyn Fn(&Match) -> bool + Send + Sync>;

/// Predicate that keeps every match
pub fn all_matches() -> MatchPredicate {
    Arc::new(|_: &Match| true)
}

// ============================================================================
// FILTER ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unknown filter {0:?} (expected all, round, team, home, away, venue, state or between)")]
    UnknownKey(String),

    #[error("filter {0:?} needs a value, e.g. round:5")]
    MissingValue(String),

    #[error("invalid round {0:?}")]
    InvalidRound(String),

    #[error("invalid date range {0:?} (expected YYYY-MM-DD..YYYY-MM-DD)")]
    InvalidRange(String),
}

// ============================================================================
// MATCH FILTER
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MatchFilter {
    #[default]
    All,
    Round(u32),
    /// Team on either side
    Team(Team),
    HomeTeam(Team),
    AwayTeam(Team),
    Venue(String),
    /// State code of either side, case-insensitive
    State(String),
    /// Inclusive date range
    Between(NaiveDate, NaiveDate),
    And(Vec<MatchFilter>),
}

impl MatchFilter {
    pub fn matches(&self, m: &Match) -> bool {
        match self {
            MatchFilter::All => true,
            MatchFilter::Round(round) => m.round == *round,
            MatchFilter::Team(team) => m.involves(team),
            MatchFilter::HomeTeam(team) => &m.home == team,
            MatchFilter::AwayTeam(team) => &m.away == team,
            MatchFilter::Venue(venue) => &m.venue == venue,
            MatchFilter::State(state) => {
                m.home_state.eq_ignore_ascii_case(state) || m.away_state.eq_ignore_ascii_case(state)
            }
            MatchFilter::Between(from, to) => *from <= m.date.date && m.date.date <= *to,
            MatchFilter::And(filters) => filters.iter().all(|f| f.matches(m)),
        }
    }

    /// Owned predicate for the statistics engine
    pub fn predicate(&self) -> MatchPredicate {
        let filter = self.clone();
        Arc::new(move |m: &Match| filter.matches(m))
    }

    /// Parse a comma-separated list; entries combine with AND.
    /// An empty list means `all`.
    ///
    /// A piece that does not start with a known key continues the name of a
    /// preceding team/home/away/venue entry, so `team:Foo, Bar` keeps its comma.
    /// A name containing `,key:` cannot be written this way.
    pub fn parse_list(list: &str) -> Result<MatchFilter, FilterError> {
        let mut entries: Vec<String> = Vec::new();
        for piece in list.split(',') {
            match entries.last_mut() {
                Some(entry) if !starts_entry(piece) && takes_name(entry) => {
                    entry.push(',');
                    entry.push_str(piece);
                }
                _ => entries.push(piece.to_string()),
            }
        }

        let filters = entries
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<MatchFilter>, _>>()?;

        Ok(MatchFilter::combine(filters))
    }

    /// AND together several filters, collapsing the trivial cases
    pub fn combine(mut filters: Vec<MatchFilter>) -> MatchFilter {
        filters.retain(|f| *f != MatchFilter::All);
        match filters.len() {
            0 => MatchFilter::All,
            1 => filters.remove(0),
            _ => MatchFilter::And(filters),
        }
    }
}

impl FromStr for MatchFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(MatchFilter::All);
        }

        let (key, value) = s
            .split_once(':')
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or_else(|| match s.to_lowercase().as_str() {
                "round" | "team" | "home" | "away" | "venue" | "state" | "between" => {
                    FilterError::MissingValue(s.to_string())
                }
                _ => FilterError::UnknownKey(s.to_string()),
            })?;

        if value.is_empty() {
            return Err(FilterError::MissingValue(key.to_string()));
        }

        match key.to_lowercase().as_str() {
            "round" => value
                .parse()
                .map(MatchFilter::Round)
                .map_err(|_| FilterError::InvalidRound(value.to_string())),
            "team" => Ok(MatchFilter::Team(Team::new(value))),
            "home" => Ok(MatchFilter::HomeTeam(Team::new(value))),
            "away" => Ok(MatchFilter::AwayTeam(Team::new(value))),
            "venue" => Ok(MatchFilter::Venue(value.to_string())),
            "state" => Ok(MatchFilter::State(value.to_uppercase())),
            "between" => parse_range(value),
            _ => Err(FilterError::UnknownKey(key.to_string())),
        }
    }
}

const KEYS: [&str; 7] = ["round", "team", "home", "away", "venue", "state", "between"];

/// Whether a list piece begins a new filter (`all`, `key:...`, or a bare key)
fn starts_entry(piece: &str) -> bool {
    let piece = piece.trim();
    if piece.is_empty() || piece.eq_ignore_ascii_case("all") {
        return true;
    }
    let key = piece.split_once(':').map_or(piece, |(key, _)| key).trim();
    KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// Entries whose value is a free-text name
fn takes_name(entry: &str) -> bool {
    entry
        .split_once(':')
        .map(|(key, _)| {
            let key = key.trim().to_lowercase();
            matches!(key.as_str(), "team" | "home" | "away" | "venue")
        })
        .unwrap_or(false)
}

fn parse_range(value: &str) -> Result<MatchFilter, FilterError> {
    let invalid = || FilterError::InvalidRange(value.to_string());

    let (from, to) = value.split_once("..").ok_or_else(invalid)?;
    let from = NaiveDate::parse_from_str(from.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    let to = NaiveDate::parse_from_str(to.trim(), "%Y-%m-%d").map_err(|_| invalid())?;

    if from > to {
        return Err(invalid());
    }

    Ok(MatchFilter::Between(from, to))
}

impl fmt::Display for MatchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchFilter::All => write!(f, "all"),
            MatchFilter::Round(round) => write!(f, "round:{}", round),
            MatchFilter::Team(team) => write!(f, "team:{}", team),
            MatchFilter::HomeTeam(team) => write!(f, "home:{}", team),
            MatchFilter::AwayTeam(team) => write!(f, "away:{}", team),
            MatchFilter::Venue(venue) => write!(f, "venue:{}", venue),
            MatchFilter::State(state) => write!(f, "state:{}", state),
            MatchFilter::Between(from, to) => {
                write!(f, "between:{}..{}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))
            }
            MatchFilter::And(filters) => {
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", filter)?;
                }
                Ok(())
            }
        }
    }
}
