// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::{Path, PathBuf};

use championship_stats::{
    all_matches, ChampionshipReport, ChampionshipStatistics, Config, MatchFilter, Team,
    TeamReport, DEFAULT_CONFIG_PATH, GOAL_LINE,
};

#[derive(Parser)]
#[command(name = "championship-stats")]
#[command(about = "Statistics and standings for a round-robin football championship")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Championship file (overrides [data] path)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Comma-separated filters, e.g. "round:38,state:SP" (overrides [report] filters)
    #[arg(short, long, global = true)]
    filter: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Goal totals, results and scorelines
    Summary,

    /// Championship table
    Standings {
        /// Ordered-set view: fully tied teams share one slot
        #[arg(long)]
        collapsed: bool,
    },

    /// Scoreline frequencies, most common first
    Scores {
        /// Show only the first N scorelines
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Record and matches of one team
    Team {
        /// Team name, exactly as in the data file
        name: String,
    },

    /// Interactive terminal UI
    Tui,

    /// Write a default config file
    Init,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Commands::Init = cli.command {
        return commands::init(&cli.config);
    }

    let config = Config::load_or_default(&cli.config)?;
    let filter = resolve_filter(cli, &config)?;
    let data = cli.data.clone().unwrap_or_else(|| config.data.path.clone());

    let engine = ChampionshipStatistics::from_file(&data, all_matches())?;
    log::info!("Filter: {}", filter);

    match &cli.command {
        Commands::Summary => commands::summary(&engine, &filter, cli.json),
        Commands::Standings { collapsed } => {
            commands::standings(&engine, &filter, *collapsed, cli.json)
        }
        Commands::Scores { limit } => commands::scores(&engine, &filter, *limit, cli.json),
        Commands::Team { name } => commands::team(&engine, &filter, name, cli.json),
        Commands::Tui => run_ui_mode(engine, filter),
        Commands::Init => Ok(()),
    }
}

/// Command-line filters win over the config file
fn resolve_filter(cli: &Cli, config: &Config) -> Result<MatchFilter> {
    match &cli.filter {
        Some(list) => {
            MatchFilter::parse_list(list).with_context(|| format!("Invalid --filter {:?}", list))
        }
        None => config
            .default_filter()
            .with_context(|| format!("Invalid [report] filters in {}", cli.config.display())),
    }
}

mod commands {
    use super::*;

    pub fn init(config_path: &Path) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("✓ Created default config at {}", config_path.display());
        println!("  Championship file: {}", config.data.path.display());
        println!("  Server address:    {}", config.server.addr);
        Ok(())
    }

    pub fn summary(engine: &ChampionshipStatistics, filter: &MatchFilter, json: bool) -> Result<()> {
        let view = engine.with_filter(filter.predicate());
        let report = ChampionshipReport::build(&view, filter.to_string());

        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("📊 Championship Summary ({})", report.filter);
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("⚽ Matches:       {}", report.match_count());
        println!("🥅 Goals:         {} (min {}, max {}, {:.2} per match)",
            report.goals.sum, report.goals.min, report.goals.max, report.average_goals);
        println!("🏠 Home wins:     {}", report.home_wins);
        println!("✈️  Away wins:     {}", report.away_wins);
        println!("🤝 Draws:         {}", report.draws);
        println!("📉 Under {} goals: {}", GOAL_LINE, report.low_scoring_matches);
        println!("📈 Over {} goals:  {}", GOAL_LINE, report.high_scoring_matches);
        println!("🔝 Most frequent score:  {}", describe(report.most_frequent_score));
        println!("🔻 Least frequent score: {}", describe(report.least_frequent_score));

        if let Some(leader) = report.leader() {
            println!("\n🏆 Leader: {} ({} pts)", leader.team, leader.points);
        }

        Ok(())
    }

    pub fn standings(
        engine: &ChampionshipStatistics,
        filter: &MatchFilter,
        collapsed: bool,
        json: bool,
    ) -> Result<()> {
        let view = engine.with_filter(filter.predicate());

        if collapsed {
            let table = view.standings();
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                println!("🏆 Standings ({}) - {} slots", filter, table.len());
                for (i, entry) in table.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, entry);
                }
            }
            return Ok(());
        }

        let report = ChampionshipReport::build(&view, filter.to_string());
        if json {
            println!("{}", serde_json::to_string_pretty(&report.standings)?);
            return Ok(());
        }

        println!("🏆 Standings ({})", report.filter);
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!(
            "{:>3}  {:<28} {:>4} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5}",
            "#", "Team", "Pts", "P", "W", "D", "L", "GF", "GA", "GD"
        );
        for row in &report.standings {
            println!(
                "{:>3}  {:<28} {:>4} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+5}",
                row.position,
                row.team.name(),
                row.points,
                row.matches_played,
                row.wins,
                row.draws,
                row.losses,
                row.goals_for,
                row.goals_against,
                row.goal_difference
            );
        }

        if report.standings.is_empty() {
            println!("   (no matches for this filter)");
        }

        Ok(())
    }

    pub fn scores(
        engine: &ChampionshipStatistics,
        filter: &MatchFilter,
        limit: Option<usize>,
        json: bool,
    ) -> Result<()> {
        let view = engine.with_filter(filter.predicate());
        let mut frequencies = view.score_frequencies();
        if let Some(limit) = limit {
            frequencies.truncate(limit);
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&frequencies)?);
            return Ok(());
        }

        println!("🔢 Scorelines ({}) - {} matches", filter, view.match_count());
        for frequency in &frequencies {
            println!("  {:>7}  {:>4}", frequency.score.to_string(), frequency.count);
        }

        Ok(())
    }

    pub fn team(
        engine: &ChampionshipStatistics,
        filter: &MatchFilter,
        name: &str,
        json: bool,
    ) -> Result<()> {
        let view = engine.with_filter(filter.predicate());
        let report = TeamReport::build(&view, Team::new(name));

        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        if !report.is_known() {
            println!("⚠️  No matches for {} ({})", report.team, filter);
            return Ok(());
        }

        let record = &report.record;
        println!("👕 {} ({})", report.team, filter);
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("Points: {}  Played: {}  W {} / D {} / L {}",
            report.points, record.matches_played, record.wins, record.draws, record.losses);
        println!("Goals: {} for, {} against ({:+})\n",
            record.goals_for, record.goals_against, record.goal_difference);

        for m in &report.matches {
            println!("  {}", m);
        }

        Ok(())
    }

    fn describe(frequency: Option<championship_stats::ScoreFrequency>) -> String {
        frequency
            .map(|f| format!("{} ({} matches)", f.score, f.count))
            .unwrap_or_else(|| "-".to_string())
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(engine: ChampionshipStatistics, filter: MatchFilter) -> Result<()> {
    println!("🖥️  Loading Championship UI...\n");
    println!("✓ Loaded {} matches", engine.all_matches().len());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(engine, filter);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_engine: ChampionshipStatistics, _filter: MatchFilter) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin championship-server --features server");
    std::process::exit(1);
}
