// 🏆 Standings - One row of the championship table
//
// Ranking order: points desc, then wins desc, then goal difference desc.

use crate::model::Team;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub const POINTS_PER_WIN: u64 = 3;
pub const POINTS_PER_DRAW: u64 = 1;

/// StandingsEntry - aggregated record of one team over the filtered matches
///
/// Built fresh for every standings request; holds no link back to the engine.
///
/// Equality is *ranking* equality: two entries compare equal when points, wins
/// and goal difference all match, whatever the team. A `BTreeSet` of entries
/// therefore keeps only one of several fully tied teams. Use
/// `ChampionshipStatistics::ranked_standings` when every team must be listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub team: Team,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    pub goals_for: u64,
    pub goals_against: u64,
    pub goal_difference: i64,
    pub matches_played: u64,
}

impl StandingsEntry {
    pub fn points(&self) -> u64 {
        POINTS_PER_WIN * self.wins + POINTS_PER_DRAW * self.draws
    }

    /// Ranking comparison (Less = ranks higher)
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .points()
            .cmp(&self.points())
            .then_with(|| other.wins.cmp(&self.wins))
            .then_with(|| other.goal_difference.cmp(&self.goal_difference))
    }

    /// Same team, same numbers (unlike `==`, which only compares ranking keys)
    pub fn same_record(&self, other: &Self) -> bool {
        self.team == other.team
            && self.wins == other.wins
            && self.losses == other.losses
            && self.draws == other.draws
            && self.goals_for == other.goals_for
            && self.goals_against == other.goals_against
            && self.goal_difference == other.goal_difference
            && self.matches_played == other.matches_played
    }
}

impl Ord for StandingsEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank_cmp(other)
    }
}

impl PartialOrd for StandingsEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for StandingsEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StandingsEntry {}

impl fmt::Display for StandingsEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, points={}, wins={}, losses={}, draws={}, goals_for={}, goals_against={}, goal_difference={}, matches={}",
            self.team,
            self.points(),
            self.wins,
            self.losses,
            self.draws,
            self.goals_for,
            self.goals_against,
            self.goal_difference,
            self.matches_played
        )
    }
}
