// ⚽ Match Model - Immutable values loaded once per championship
// Team, MatchDate, Score and Match are plain values: equality by content, no identity.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TEAM
// ============================================================================

/// Team - identified by its name only
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Team(String);

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Team(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Team {
    fn from(name: &str) -> Self {
        Team::new(name)
    }
}

// ============================================================================
// MATCH DATE
// ============================================================================

/// MatchDate - calendar day plus kickoff time when it is known
///
/// The weekday is always derived from `date`, so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchDate {
    pub date: NaiveDate,

    /// None = kickoff time not recorded in the source file
    pub kickoff: Option<NaiveTime>,
}

impl MatchDate {
    pub fn new(date: NaiveDate, kickoff: Option<NaiveTime>) -> Self {
        MatchDate { date, kickoff }
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

impl fmt::Display for MatchDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.date.format("%d/%m/%Y"), self.weekday())?;
        if let Some(kickoff) = self.kickoff {
            write!(f, " {}", kickoff.format("%Hh%M"))?;
        }
        Ok(())
    }
}

// ============================================================================
// SCORE
// ============================================================================

/// Score - final scoreline (home goals, away goals)
///
/// Ordered by home goals, then away goals. Used as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Score { home, away }
    }

    /// Widened so that no pair of loaded scores can overflow
    pub fn total(&self) -> u64 {
        u64::from(self.home) + u64::from(self.away)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.home, self.away)
    }
}

// ============================================================================
// MATCH
// ============================================================================

/// Match - one row of the championship record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub round: u32,
    pub date: MatchDate,
    pub home: Team,
    pub away: Team,

    /// Declared winner (None for a draw)
    pub winner: Option<Team>,

    pub venue: String,
    pub home_score: u32,
    pub away_score: u32,

    // State codes (UF) of each side
    pub home_state: String,
    pub away_state: String,
    pub winner_state: Option<String>,
}

impl Match {
    pub fn score(&self) -> Score {
        Score::new(self.home_score, self.away_score)
    }

    pub fn total_goals(&self) -> u64 {
        self.score().total()
    }

    pub fn is_home_win(&self) -> bool {
        self.home_score > self.away_score
    }

    pub fn is_away_win(&self) -> bool {
        self.away_score > self.home_score
    }

    pub fn is_draw(&self) -> bool {
        self.home_score == self.away_score
    }

    /// True if `team` played this match on either side
    pub fn involves(&self, team: &Team) -> bool {
        &self.home == team || &self.away == team
    }

    /// Goals scored by `team`; home side takes precedence when a team meets itself
    pub fn goals_for(&self, team: &Team) -> u32 {
        if &self.home == team {
            self.home_score
        } else {
            self.away_score
        }
    }

    pub fn goals_against(&self, team: &Team) -> u32 {
        if &self.home == team {
            self.away_score
        } else {
            self.home_score
        }
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R{} {} {} {} {} @ {}",
            self.round,
            self.date,
            self.home,
            self.score(),
            self.away,
            self.venue
        )
    }
}
