// Championship Statistics - Web Server
// Read-only JSON API with Axum

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use championship_stats::{
    ChampionshipReport, ChampionshipStatistics, Config, MatchFilter, ScoreFrequency, Team,
    TeamReport, DEFAULT_CONFIG_PATH, VERSION,
};
use env_logger::Env;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    /// Unfiltered engine; requests derive their own filtered views
    engine: Arc<ChampionshipStatistics>,
    /// Used when a request has no `?filter=`
    default_filter: MatchFilter,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FilterQuery {
    filter: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    matches: usize,
}

#[derive(Serialize)]
struct ScoresResponse {
    filter: String,
    matches: u64,
    scorelines: Vec<ScoreFrequency>,
}

impl AppState {
    /// Filtered view for one request, or a 400 for an unparseable filter
    fn view(&self, query: &FilterQuery) -> Result<(ChampionshipStatistics, MatchFilter), Response> {
        let filter = match query.filter.as_deref() {
            Some(list) => MatchFilter::parse_list(list).map_err(|e| {
                log::debug!("Rejected filter {:?}: {}", list, e);
                (StatusCode::BAD_REQUEST, Json(ApiResponse::error(e.to_string()))).into_response()
            })?,
            None => self.default_filter.clone(),
        };

        Ok((self.engine.with_filter(filter.predicate()), filter))
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "OK",
        version: VERSION,
        matches: state.engine.all_matches().len(),
    }))
}

/// GET /api/report - Every statistic for the filter
async fn get_report(State(state): State<AppState>, Query(query): Query<FilterQuery>) -> Response {
    match state.view(&query) {
        Ok((view, filter)) => {
            let report = ChampionshipReport::build(&view, filter.to_string());
            (StatusCode::OK, Json(ApiResponse::ok(report))).into_response()
        }
        Err(response) => response,
    }
}

/// GET /api/standings - Ranked table, every team listed
async fn get_standings(State(state): State<AppState>, Query(query): Query<FilterQuery>) -> Response {
    match state.view(&query) {
        Ok((view, filter)) => {
            let report = ChampionshipReport::build(&view, filter.to_string());
            (StatusCode::OK, Json(ApiResponse::ok(report.standings))).into_response()
        }
        Err(response) => response,
    }
}

/// GET /api/scores - Scoreline frequencies
async fn get_scores(State(state): State<AppState>, Query(query): Query<FilterQuery>) -> Response {
    match state.view(&query) {
        Ok((view, filter)) => {
            let response = ScoresResponse {
                filter: filter.to_string(),
                matches: view.match_count(),
                scorelines: view.score_frequencies(),
            };
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(response) => response,
    }
}

/// GET /api/teams/:name - One team's record and matches
async fn get_team(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let (view, filter) = match state.view(&query) {
        Ok(view) => view,
        Err(response) => return response,
    };

    let report = TeamReport::build(&view, Team::new(name));
    if !report.is_known() {
        let message = format!("no matches for {} ({})", report.team, filter);
        return (StatusCode::NOT_FOUND, Json(ApiResponse::error(message))).into_response();
    }

    (StatusCode::OK, Json(ApiResponse::ok(report))).into_response()
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/report", get(get_report))
        .route("/standings", get(get_standings))
        .route("/scores", get(get_scores))
        .route("/teams/:name", get(get_team))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    println!("⚽ Championship Statistics - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config_path =
        std::env::var("CHAMPIONSHIP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load_or_default(std::path::Path::new(&config_path))?;
    let default_filter = config
        .default_filter()
        .with_context(|| format!("Invalid [report] filters in {}", config_path))?;

    let engine = ChampionshipStatistics::from_file(&config.data.path, championship_stats::all_matches())?;
    println!("✓ Loaded {} matches from {}", engine.all_matches().len(), config.data.path.display());

    let example_team = engine
        .teams()
        .into_iter()
        .next()
        .map(|team| urlencoding::encode(team.name()).into_owned());

    let state = AppState {
        engine: Arc::new(engine),
        default_filter,
    };

    let addr = config.server.addr.as_str();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   Report:    http://{}/api/report", addr);
    println!("   Standings: http://{}/api/standings?filter=round:1", addr);
    if let Some(team) = example_team {
        println!("   Team:      http://{}/api/teams/{}", addr, team);
    }
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use championship_stats::{Match, MatchDate};
    use chrono::NaiveDate;

    fn create_test_match(round: u32, home: &str, home_score: u32, away: &str, away_score: u32) -> Match {
        Match {
            round,
            date: MatchDate::new(NaiveDate::from_ymd_opt(2021, 8, round).unwrap(), None),
            home: Team::new(home),
            away: Team::new(away),
            winner: None,
            venue: "Morumbi".to_string(),
            home_score,
            away_score,
            home_state: "SP".to_string(),
            away_state: "SP".to_string(),
            winner_state: None,
        }
    }

    fn create_test_state() -> AppState {
        AppState {
            engine: Arc::new(ChampionshipStatistics::unfiltered(vec![
                create_test_match(1, "São Paulo", 2, "Santos", 0),
                create_test_match(2, "Santos", 1, "São Paulo", 1),
            ])),
            default_filter: MatchFilter::All,
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn query(filter: &str) -> Query<FilterQuery> {
        Query(FilterQuery {
            filter: Some(filter.to_string()),
        })
    }

    #[tokio::test]
    async fn test_report_uses_query_filter() {
        let response = get_report(State(create_test_state()), query("round:2")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["filter"], "round:2");
        assert_eq!(json["data"]["draws"], 1);
        assert_eq!(json["data"]["home_wins"], 0);
    }

    #[tokio::test]
    async fn test_bad_filter_is_400() {
        let response = get_standings(State(create_test_state()), query("round:x")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("round"));
    }

    #[tokio::test]
    async fn test_standings_default_filter() {
        let response = get_standings(State(create_test_state()), Query(FilterQuery::default())).await;
        let json = body_json(response).await;

        assert_eq!(json["data"][0]["team"], "São Paulo");
        assert_eq!(json["data"][0]["points"], 4);
        assert_eq!(json["data"][1]["team"], "Santos");
    }

    #[tokio::test]
    async fn test_unknown_team_is_404() {
        let response = get_team(
            State(create_test_state()),
            Path("Corinthians".to_string()),
            Query(FilterQuery::default()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_team_record() {
        let response = get_team(
            State(create_test_state()),
            Path("Santos".to_string()),
            Query(FilterQuery::default()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["data"]["points"], 1);
        assert_eq!(json["data"]["matches"].as_array().unwrap().len(), 2);
    }
}
