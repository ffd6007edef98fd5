// 📊 Championship Statistics Engine
//
// Owns the immutable match list and the active filter. Every query filters
// the full list again and folds over the survivors; nothing is cached.

use crate::filter::{all_matches, MatchPredicate};
use crate::loader::load_matches;
use crate::model::{Match, Score, Team};
use crate::standings::StandingsEntry;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Matches with fewer combined goals are "low scoring"; more are "high scoring".
/// A match with exactly this many goals is neither.
pub const GOAL_LINE: u64 = 3;

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Count/min/max/sum of combined goals per match
///
/// An empty match set gives all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSummary {
    pub count: u64,
    pub sum: u64,
    pub min: u64,
    pub max: u64,
}

impl GoalSummary {
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    fn accept(mut self, goals: u64) -> Self {
        if self.count == 0 {
            self.min = goals;
            self.max = goals;
        } else {
            self.min = self.min.min(goals);
            self.max = self.max.max(goals);
        }
        self.count += 1;
        self.sum += goals;
        self
    }
}

impl fmt::Display for GoalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "matches={}, goals={}, min={}, max={}, average={:.2}",
            self.count,
            self.sum,
            self.min,
            self.max,
            self.average()
        )
    }
}

/// A scoreline and how many filtered matches ended with it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFrequency {
    pub score: Score,
    pub count: u64,
}

impl fmt::Display for ScoreFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x)", self.score, self.count)
    }
}

// ============================================================================
// STATISTICS ENGINE
// ============================================================================

/// ChampionshipStatistics - read-only queries over one championship
///
/// The match list and the filter are fixed at construction. `with_filter`
/// builds another view over the same list instead of mutating this one.
#[derive(Clone)]
pub struct ChampionshipStatistics {
    matches: Arc<[Match]>,
    filter: MatchPredicate,
}

impl ChampionshipStatistics {
    pub fn new(matches: Vec<Match>, filter: MatchPredicate) -> Self {
        log::debug!("Statistics engine over {} matches", matches.len());
        ChampionshipStatistics {
            matches: matches.into(),
            filter,
        }
    }

    /// Engine with the always-true filter
    pub fn unfiltered(matches: Vec<Match>) -> Self {
        Self::new(matches, all_matches())
    }

    /// Load a championship file; any load failure prevents construction
    pub fn from_file(path: &Path, filter: MatchPredicate) -> Result<Self> {
        let matches = load_matches(path)?;
        Ok(Self::new(matches, filter))
    }

    /// Another view over the same matches with a different filter
    pub fn with_filter(&self, filter: MatchPredicate) -> Self {
        ChampionshipStatistics {
            matches: Arc::clone(&self.matches),
            filter,
        }
    }

    /// Every loaded match, filter ignored
    pub fn all_matches(&self) -> &[Match] {
        &self.matches
    }

    /// Matches that pass the active filter, in file order
    pub fn filtered_matches(&self) -> impl Iterator<Item = &Match> + '_ {
        self.matches.iter().filter(move |m| (self.filter)(*m))
    }

    pub fn match_count(&self) -> u64 {
        self.count_where(|_| true)
    }

    fn count_where<P>(&self, condition: P) -> u64
    where
        P: Fn(&Match) -> bool,
    {
        self.filtered_matches().filter(|m| condition(*m)).count() as u64
    }

    // ========================================================================
    // MATCH AGGREGATES
    // ========================================================================

    pub fn goal_summary(&self) -> GoalSummary {
        self.filtered_matches()
            .map(Match::total_goals)
            .fold(GoalSummary::default(), GoalSummary::accept)
    }

    pub fn home_wins(&self) -> u64 {
        self.count_where(Match::is_home_win)
    }

    pub fn away_wins(&self) -> u64 {
        self.count_where(Match::is_away_win)
    }

    pub fn draws(&self) -> u64 {
        self.count_where(Match::is_draw)
    }

    /// Matches with fewer than 3 combined goals
    pub fn low_scoring_matches(&self) -> u64 {
        self.count_where(|m| m.total_goals() < GOAL_LINE)
    }

    /// Matches with more than 3 combined goals (exactly 3 is not counted)
    pub fn high_scoring_matches(&self) -> u64 {
        self.count_where(|m| m.total_goals() > GOAL_LINE)
    }

    // ========================================================================
    // SCORELINES
    // ========================================================================

    /// Every scoreline seen, most frequent first; equal counts in `Score` order
    pub fn score_frequencies(&self) -> Vec<ScoreFrequency> {
        let mut counts: HashMap<Score, u64> = HashMap::new();
        for m in self.filtered_matches() {
            *counts.entry(m.score()).or_insert(0) += 1;
        }

        let mut frequencies: Vec<ScoreFrequency> = counts
            .into_iter()
            .map(|(score, count)| ScoreFrequency { score, count })
            .collect();

        frequencies.sort_by(|a, b| b.count.cmp(&a.count).then(a.score.cmp(&b.score)));
        frequencies
    }

    /// Most repeated scoreline; ties go to the smallest `Score`.
    /// None only when no match passes the filter.
    pub fn most_frequent_score(&self) -> Option<ScoreFrequency> {
        self.score_frequencies().into_iter().next()
    }

    /// Least repeated scoreline; ties go to the smallest `Score`.
    /// None only when no match passes the filter.
    pub fn least_frequent_score(&self) -> Option<ScoreFrequency> {
        self.score_frequencies()
            .into_iter()
            .min_by(|a, b| a.count.cmp(&b.count).then(a.score.cmp(&b.score)))
    }

    // ========================================================================
    // STANDINGS
    // ========================================================================

    /// Teams listed in the table: distinct home sides of the filtered matches,
    /// in order of first appearance. A team seen only as visitor is left out.
    pub fn teams(&self) -> Vec<Team> {
        let mut seen = HashSet::new();
        self.filtered_matches()
            .filter(|m| seen.insert(&m.home))
            .map(|m| m.home.clone())
            .collect()
    }

    /// Standings as an ordered set (leader first).
    ///
    /// Teams tied on points, wins and goal difference occupy a single slot;
    /// the first one in `teams()` order is kept.
    pub fn standings(&self) -> BTreeSet<StandingsEntry> {
        let mut table: BTreeSet<StandingsEntry> = BTreeSet::new();
        for team in self.teams() {
            let entry = self.standings_entry(team);
            if let Some(kept) = table.get(&entry) {
                log::debug!("{} tied with {} on every ranking key, not listed", entry.team, kept.team);
                continue;
            }
            table.insert(entry);
        }
        table
    }

    /// Standings with every team, stable-sorted by ranking (leader first)
    pub fn ranked_standings(&self) -> Vec<StandingsEntry> {
        let mut table: Vec<StandingsEntry> = self
            .teams()
            .into_iter()
            .map(|team| self.standings_entry(team))
            .collect();
        table.sort_by(StandingsEntry::rank_cmp);
        table
    }

    pub fn standings_entry(&self, team: Team) -> StandingsEntry {
        StandingsEntry {
            wins: self.wins_for(&team),
            losses: self.losses_for(&team),
            draws: self.draws_for(&team),
            goals_for: self.goals_for(&team),
            goals_against: self.goals_against(&team),
            goal_difference: self.goal_difference_for(&team),
            matches_played: self.matches_played_for(&team),
            team,
        }
    }

    // ========================================================================
    // PER-TEAM AGGREGATES (each one an independent scan)
    // ========================================================================

    fn team_matches<'a>(&'a self, team: &'a Team) -> impl Iterator<Item = &'a Match> + 'a {
        self.filtered_matches().filter(move |m| m.involves(team))
    }

    pub fn matches_played_for(&self, team: &Team) -> u64 {
        self.team_matches(team).count() as u64
    }

    pub fn wins_for(&self, team: &Team) -> u64 {
        self.filtered_matches()
            .filter(|m| {
                (&m.home == team && m.home_score > m.away_score)
                    || (&m.away == team && m.away_score > m.home_score)
            })
            .count() as u64
    }

    pub fn losses_for(&self, team: &Team) -> u64 {
        self.filtered_matches()
            .filter(|m| {
                (&m.home == team && m.home_score < m.away_score)
                    || (&m.away == team && m.away_score < m.home_score)
            })
            .count() as u64
    }

    pub fn draws_for(&self, team: &Team) -> u64 {
        self.team_matches(team).filter(|m| m.is_draw()).count() as u64
    }

    pub fn goals_for(&self, team: &Team) -> u64 {
        self.team_matches(team)
            .map(|m| u64::from(m.goals_for(team)))
            .sum()
    }

    pub fn goals_against(&self, team: &Team) -> u64 {
        self.team_matches(team)
            .map(|m| u64::from(m.goals_against(team)))
            .sum()
    }

    /// Summed per match, not derived from goals_for - goals_against
    pub fn goal_difference_for(&self, team: &Team) -> i64 {
        self.team_matches(team)
            .map(|m| i64::from(m.goals_for(team)) - i64::from(m.goals_against(team)))
            .sum()
    }
}

impl fmt::Debug for ChampionshipStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChampionshipStatistics")
            .field("matches", &self.matches.len())
            .field("filtered", &self.match_count())
            .finish()
    }
}
