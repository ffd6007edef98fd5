// 📋 Championship Report - Snapshot of every query for one filter
// Serializable so the CLI (--json) and the HTTP API share one shape.

use crate::statistics::{ChampionshipStatistics, GoalSummary, ScoreFrequency};
use crate::standings::StandingsEntry;
use crate::model::{Match, Team};
use serde::Serialize;

// ============================================================================
// STANDINGS ROW
// ============================================================================

/// Table row as presented: entry plus position and points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingsRow {
    pub position: usize,
    pub team: Team,
    pub points: u64,
    pub matches_played: u64,
    pub wins: u64,
    pub draws: u64,
    pub losses: u64,
    pub goals_for: u64,
    pub goals_against: u64,
    pub goal_difference: i64,
}

impl From<(usize, StandingsEntry)> for StandingsRow {
    fn from((position, entry): (usize, StandingsEntry)) -> Self {
        Self {
            position,
            points: entry.points(),
            team: entry.team,
            matches_played: entry.matches_played,
            wins: entry.wins,
            draws: entry.draws,
            losses: entry.losses,
            goals_for: entry.goals_for,
            goals_against: entry.goals_against,
            goal_difference: entry.goal_difference,
        }
    }
}

/// Number the ranked entries from 1
pub fn standings_rows(entries: Vec<StandingsEntry>) -> Vec<StandingsRow> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| StandingsRow::from((i + 1, entry)))
        .collect()
}

// ============================================================================
// CHAMPIONSHIP REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChampionshipReport {
    /// Human-readable description of the filter used
    pub filter: String,
    pub goals: GoalSummary,
    pub average_goals: f64,
    pub home_wins: u64,
    pub away_wins: u64,
    pub draws: u64,
    pub low_scoring_matches: u64,
    pub high_scoring_matches: u64,
    pub most_frequent_score: Option<ScoreFrequency>,
    pub least_frequent_score: Option<ScoreFrequency>,
    pub standings: Vec<StandingsRow>,
}

impl ChampionshipReport {
    pub fn build(stats: &ChampionshipStatistics, filter: impl Into<String>) -> Self {
        let goals = stats.goal_summary();

        ChampionshipReport {
            filter: filter.into(),
            goals,
            average_goals: goals.average(),
            home_wins: stats.home_wins(),
            away_wins: stats.away_wins(),
            draws: stats.draws(),
            low_scoring_matches: stats.low_scoring_matches(),
            high_scoring_matches: stats.high_scoring_matches(),
            most_frequent_score: stats.most_frequent_score(),
            least_frequent_score: stats.least_frequent_score(),
            standings: standings_rows(stats.ranked_standings()),
        }
    }

    pub fn match_count(&self) -> u64 {
        self.goals.count
    }

    pub fn leader(&self) -> Option<&StandingsRow> {
        self.standings.first()
    }

    pub fn summary(&self) -> String {
        format!(
            "Championship ({}): {} matches, {} goals ({:.2}/match), {} home wins, {} away wins, {} draws, leader {}",
            self.filter,
            self.match_count(),
            self.goals.sum,
            self.average_goals,
            self.home_wins,
            self.away_wins,
            self.draws,
            self.leader()
                .map(|row| format!("{} ({} pts)", row.team, row.points))
                .unwrap_or_else(|| "-".to_string())
        )
    }
}

// ============================================================================
// TEAM REPORT
// ============================================================================

/// One team's record plus the filtered matches it played, oldest first
#[derive(Debug, Clone, Serialize)]
pub struct TeamReport {
    pub team: Team,
    pub points: u64,
    pub record: StandingsEntry,
    pub matches: Vec<Match>,
}

impl TeamReport {
    pub fn build(stats: &ChampionshipStatistics, team: Team) -> Self {
        let mut matches: Vec<Match> = stats
            .filtered_matches()
            .filter(|m| m.involves(&team))
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.date.date, m.round));

        let record = stats.standings_entry(team.clone());
        TeamReport {
            team,
            points: record.points(),
            record,
            matches,
        }
    }

    /// Whether the team appears in any filtered match
    pub fn is_known(&self) -> bool {
        !self.matches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MatchFilter;
    use crate::model::{Match, MatchDate, Score};
    use chrono::NaiveDate;

    fn create_test_match(round: u32, home: &str, home_score: u32, away: &str, away_score: u32) -> Match {
        Match {
            round,
            date: MatchDate::new(NaiveDate::from_ymd_opt(2021, 7, round).unwrap(), None),
            home: Team::new(home),
            away: Team::new(away),
            winner: None,
            venue: "Mineirão".to_string(),
            home_score,
            away_score,
            home_state: "MG".to_string(),
            away_state: "MG".to_string(),
            winner_state: None,
        }
    }

    fn create_test_engine() -> ChampionshipStatistics {
        ChampionshipStatistics::unfiltered(vec![
            create_test_match(1, "Atlético-MG", 2, "Cruzeiro", 0),
            create_test_match(2, "Cruzeiro", 1, "Atlético-MG", 1),
            create_test_match(3, "América-MG", 2, "Cruzeiro", 0),
        ])
    }

    #[test]
    fn test_report_collects_every_query() {
        let report = ChampionshipReport::build(&create_test_engine(), "all");

        assert_eq!(report.match_count(), 3);
        assert_eq!(report.goals.sum, 6);
        assert!((report.average_goals - 2.0).abs() < 1e-9);
        assert_eq!(report.home_wins, 2);
        assert_eq!(report.away_wins, 0);
        assert_eq!(report.draws, 1);
        assert_eq!(report.low_scoring_matches, 3);
        assert_eq!(report.high_scoring_matches, 0);

        let most = report.most_frequent_score.unwrap();
        assert_eq!(most.score, Score::new(2, 0));
        assert_eq!(most.count, 2);
        assert_eq!(report.least_frequent_score.unwrap().score, Score::new(1, 1));
    }

    #[test]
    fn test_rows_are_numbered_from_leader() {
        let report = ChampionshipReport::build(&create_test_engine(), "all");

        let rows: Vec<_> = report
            .standings
            .iter()
            .map(|r| (r.position, r.team.name().to_string(), r.points))
            .collect();
        assert_eq!(
            rows,
            vec![
                (1, "Atlético-MG".to_string(), 4),
                (2, "América-MG".to_string(), 3),
                (3, "Cruzeiro".to_string(), 1),
            ]
        );
        assert_eq!(report.leader().unwrap().team, Team::new("Atlético-MG"));
    }

    #[test]
    fn test_empty_report() {
        let engine = create_test_engine().with_filter(MatchFilter::Round(9).predicate());
        let report = ChampionshipReport::build(&engine, "round:9");

        assert_eq!(report.match_count(), 0);
        assert!(report.most_frequent_score.is_none());
        assert!(report.standings.is_empty());
        assert!(report.summary().contains("leader -"));
    }

    #[test]
    fn test_report_serializes() {
        let report = ChampionshipReport::build(&create_test_engine(), "all");
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["home_wins"], 2);
        assert_eq!(json["standings"][0]["team"], "Atlético-MG");
        assert_eq!(json["most_frequent_score"]["score"]["home"], 2);
    }

    #[test]
    fn test_team_report() {
        let report = TeamReport::build(&create_test_engine(), Team::new("Cruzeiro"));

        assert!(report.is_known());
        assert_eq!(report.points, 1);
        assert_eq!(report.record.losses, 2);
        assert_eq!(report.record.goals_against, 5);
        let rounds: Vec<_> = report.matches.iter().map(|m| m.round).collect();
        assert_eq!(rounds, vec![1, 2, 3]);
    }

    #[test]
    fn test_team_report_unknown_team() {
        let report = TeamReport::build(&create_test_engine(), Team::new("Vasco"));

        assert!(!report.is_known());
        assert_eq!(report.record.matches_played, 0);
        assert_eq!(report.points, 0);
    }

    #[test]
    fn test_summary() {
        let report = ChampionshipReport::build(&create_test_engine(), "all");
        assert_eq!(
            report.summary(),
            "Championship (all): 3 matches, 6 goals (2.00/match), 2 home wins, 0 away wins, 1 draws, leader Atlético-MG (4 pts)"
        );
    }
}
