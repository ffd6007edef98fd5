// 📥 Match Loader - `;`-delimited championship file → Vec<Match>
//
// Column layout (0-indexed):
//   0 round | 1 date dd/mm/yyyy | 2 kickoff HHhMM (may be empty) | 3 unused
//   4 home | 5 away | 6 winner ("-" = draw) | 7 venue
//   8 home score | 9 away score | 10 home UF | 11 away UF | 12 winner UF

use crate::model::{Match, MatchDate, Team};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

pub const DELIMITER: u8 = b';';
pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const KICKOFF_FORMAT: &str = "%Hh%M";

/// Number of columns every row must carry
pub const COLUMN_COUNT: usize = 13;

/// Marker the source file uses for "no winner" / "no winner state"
const NO_WINNER: &str = "-";

// ============================================================================
// LOAD ERROR
// ============================================================================

/// Row-level load failure. `line` is the 1-based line in the file (header = 1).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("line {line}: missing column {column}")]
    MissingColumn { line: usize, column: usize },

    #[error("line {line}: column {column} is not a non-negative integer: {value:?}")]
    InvalidNumber {
        line: usize,
        column: usize,
        value: String,
    },

    #[error("line {line}: round must be a positive integer: {value:?}")]
    InvalidRound { line: usize, value: String },

    #[error("line {line}: invalid date {value:?} (expected dd/mm/yyyy)")]
    InvalidDate { line: usize, value: String },

    #[error("line {line}: invalid kickoff time {value:?} (expected HHhMM)")]
    InvalidTime { line: usize, value: String },
}

// ============================================================================
// LOADING
// ============================================================================

/// Load every match from a championship file.
///
/// Fails on the first unreadable row; there is no partially loaded result.
pub fn load_matches(path: &Path) -> Result<Vec<Match>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open championship file: {}", path.display()))?;

    let matches = read_matches(file)
        .with_context(|| format!("Failed to load championship file: {}", path.display()))?;

    log::info!("Loaded {} matches from {}", matches.len(), path.display());
    Ok(matches)
}

/// Read matches from any reader (header line first)
pub fn read_matches<R: Read>(reader: R) -> Result<Vec<Match>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut matches = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record {}", index + 1))?;

        // The reader skips empty lines, so the record index alone drifts from the file line
        let line = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(index + 2);

        // Whitespace-only lines
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        matches.push(parse_record(&record, line)?);
    }

    Ok(matches)
}

/// Convert one raw row into a Match
pub fn parse_record(record: &StringRecord, line: usize) -> std::result::Result<Match, LoadError> {
    if record.len() < COLUMN_COUNT {
        return Err(LoadError::MissingColumn {
            line,
            column: record.len(),
        });
    }

    let round = parse_round(column(record, 0), line)?;
    let date = parse_date(column(record, 1), line)?;
    let kickoff = parse_kickoff(column(record, 2), line)?;
    if kickoff.is_none() {
        log::debug!("line {}: kickoff time unknown", line);
    }

    Ok(Match {
        round,
        date: MatchDate::new(date, kickoff),
        home: Team::new(column(record, 4)),
        away: Team::new(column(record, 5)),
        winner: optional(column(record, 6)).map(Team::new),
        venue: column(record, 7).to_string(),
        home_score: parse_number(column(record, 8), line, 8)?,
        away_score: parse_number(column(record, 9), line, 9)?,
        home_state: column(record, 10).to_string(),
        away_state: column(record, 11).to_string(),
        winner_state: optional(column(record, 12)).map(str::to_string),
    })
}

fn column(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("").trim()
}

fn parse_number(value: &str, line: usize, column: usize) -> std::result::Result<u32, LoadError> {
    value.parse().map_err(|_| LoadError::InvalidNumber {
        line,
        column,
        value: value.to_string(),
    })
}

fn parse_round(value: &str, line: usize) -> std::result::Result<u32, LoadError> {
    match value.parse::<u32>() {
        Ok(round) if round > 0 => Ok(round),
        _ => Err(LoadError::InvalidRound {
            line,
            value: value.to_string(),
        }),
    }
}

fn parse_date(value: &str, line: usize) -> std::result::Result<NaiveDate, LoadError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| LoadError::InvalidDate {
        line,
        value: value.to_string(),
    })
}

/// Empty field = unknown kickoff, not an error
fn parse_kickoff(value: &str, line: usize) -> std::result::Result<Option<NaiveTime>, LoadError> {
    if value.is_empty() {
        return Ok(None);
    }

    NaiveTime::parse_from_str(value, KICKOFF_FORMAT)
        .map(Some)
        .map_err(|_| LoadError::InvalidTime {
            line,
            value: value.to_string(),
        })
}

fn optional(value: &str) -> Option<&str> {
    if value.is_empty() || value == NO_WINNER {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use std::io::Write;

    const HEADER: &str = "rodada;data;hora;dia;mandante;visitante;vencedor;arena;mandante_placar;visitante_placar;estado_mandante;estado_visitante;estado_vencedor";

    fn write_file(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    #[test]
    fn test_load_valid_file() {
        let file = write_file(&[
            "1;29/05/2021;16h00;Sábado;Fluminense;Grêmio;Fluminense;Maracanã;1;0;RJ;RS;RJ",
            "1;30/05/2021;18h15;Domingo;Palmeiras;Chapecoense;-;Allianz Parque;1;1;SP;SC;-",
        ]);

        let matches = load_matches(file.path()).unwrap();
        assert_eq!(matches.len(), 2);

        let first = &matches[0];
        assert_eq!(first.round, 1);
        assert_eq!(first.date.date, NaiveDate::from_ymd_opt(2021, 5, 29).unwrap());
        assert_eq!(first.date.kickoff, NaiveTime::from_hms_opt(16, 0, 0));
        assert_eq!(first.date.weekday(), Weekday::Sat);
        assert_eq!(first.home, Team::new("Fluminense"));
        assert_eq!(first.away, Team::new("Grêmio"));
        assert_eq!(first.winner, Some(Team::new("Fluminense")));
        assert_eq!(first.venue, "Maracanã");
        assert_eq!((first.home_score, first.away_score), (1, 0));
        assert_eq!(first.home_state, "RJ");
        assert_eq!(first.away_state, "RS");
        assert_eq!(first.winner_state.as_deref(), Some("RJ"));

        let draw = &matches[1];
        assert_eq!(draw.winner, None);
        assert_eq!(draw.winner_state, None);
        assert_eq!(draw.date.kickoff, NaiveTime::from_hms_opt(18, 15, 0));
    }

    #[test]
    fn test_empty_kickoff_is_unknown() {
        let file = write_file(&[
            "38;09/12/2021;;Quinta-feira;Bahia;Fortaleza;Fortaleza;Arena Fonte Nova;1;2;BA;CE;CE",
        ]);

        let matches = load_matches(file.path()).unwrap();
        assert_eq!(matches[0].date.kickoff, None);
        assert_eq!(matches[0].date.weekday(), Weekday::Thu);
    }

    #[test]
    fn test_quoted_fields() {
        let file = write_file(&[
            "\"2\";\"05/06/2021\";\"21h00\";\"Sábado\";\"Athletico-PR\";\"América-MG\";\"Athletico-PR\";\"Arena da Baixada\";\"2\";\"1\";\"PR\";\"MG\";\"PR\"",
        ]);

        let matches = load_matches(file.path()).unwrap();
        assert_eq!(matches[0].home, Team::new("Athletico-PR"));
        assert_eq!(matches[0].round, 2);
    }

    #[test]
    fn test_blank_trailing_line_is_ignored() {
        let file = write_file(&[
            "1;29/05/2021;16h00;Sábado;Fluminense;Grêmio;Fluminense;Maracanã;1;0;RJ;RS;RJ",
            "",
        ]);

        assert_eq!(load_matches(file.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file_fails() {
        let result = load_matches(Path::new("/nonexistent/championship.csv"));
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("Failed to open"));
    }

    #[test]
    fn test_malformed_score_fails_whole_load() {
        let file = write_file(&[
            "1;29/05/2021;16h00;Sábado;Fluminense;Grêmio;Fluminense;Maracanã;1;0;RJ;RS;RJ",
            "1;30/05/2021;18h15;Domingo;Palmeiras;Chapecoense;-;Allianz Parque;x;1;SP;SC;-",
        ]);

        let err = load_matches(file.path()).unwrap_err();
        let load_error = err.downcast_ref::<LoadError>().unwrap();
        assert_eq!(
            *load_error,
            LoadError::InvalidNumber {
                line: 3,
                column: 8,
                value: "x".to_string()
            }
        );
    }

    #[test]
    fn test_error_line_counts_blank_lines() {
        let file = write_file(&[
            "1;29/05/2021;16h00;Sábado;Fluminense;Grêmio;Fluminense;Maracanã;1;0;RJ;RS;RJ",
            "",
            "",
            "1;30/05/2021;18h15;Domingo;Palmeiras;Chapecoense;-;Allianz Parque;x;1;SP;SC;-",
        ]);

        let err = load_matches(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::InvalidNumber {
                line: 5,
                column: 8,
                value: "x".to_string()
            })
        );
    }

    #[test]
    fn test_round_zero_is_rejected() {
        let file = write_file(&[
            "0;29/05/2021;16h00;Sábado;Fluminense;Grêmio;Fluminense;Maracanã;1;0;RJ;RS;RJ",
        ]);

        let err = load_matches(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::InvalidRound {
                line: 2,
                value: "0".to_string()
            })
        );
    }

    #[test]
    fn test_parse_record_errors() {
        let bad_date = StringRecord::from(vec![
            "1", "2021-05-29", "16h00", "", "A", "B", "A", "V", "1", "0", "RJ", "SP", "RJ",
        ]);
        assert!(matches!(
            parse_record(&bad_date, 2),
            Err(LoadError::InvalidDate { line: 2, .. })
        ));

        let bad_time = StringRecord::from(vec![
            "1", "29/05/2021", "16:00", "", "A", "B", "A", "V", "1", "0", "RJ", "SP", "RJ",
        ]);
        assert!(matches!(
            parse_record(&bad_time, 5),
            Err(LoadError::InvalidTime { line: 5, .. })
        ));

        let negative = StringRecord::from(vec![
            "1", "29/05/2021", "16h00", "", "A", "B", "A", "V", "-1", "0", "RJ", "SP", "RJ",
        ]);
        assert!(matches!(
            parse_record(&negative, 2),
            Err(LoadError::InvalidNumber { column: 8, .. })
        ));

        let short = StringRecord::from(vec!["1", "29/05/2021", "16h00"]);
        assert_eq!(
            parse_record(&short, 7),
            Err(LoadError::MissingColumn { line: 7, column: 3 })
        );
    }
}
