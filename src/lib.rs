// Championship Statistics - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod model;
pub mod loader;
pub mod filter;
pub mod standings;
pub mod statistics;
pub mod report;
pub mod config;

// Re-export commonly used types
pub use model::{Match, MatchDate, Score, Team};
pub use loader::{load_matches, read_matches, parse_record, LoadError};
pub use filter::{all_matches, FilterError, MatchFilter, MatchPredicate};
pub use standings::StandingsEntry;
pub use statistics::{ChampionshipStatistics, GoalSummary, ScoreFrequency, GOAL_LINE};
pub use report::{standings_rows, ChampionshipReport, StandingsRow, TeamReport};
pub use config::{Config, DEFAULT_CONFIG_PATH};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
