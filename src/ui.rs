use anyhow::Result;
use championship_stats::{
    ChampionshipReport, ChampionshipStatistics, MatchFilter, ScoreFrequency, TeamReport,
    GOAL_LINE,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Summary,
    Standings,
    Scorelines,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Summary => Page::Standings,
            Page::Standings => Page::Scorelines,
            Page::Scorelines => Page::Summary,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Summary => Page::Scorelines,
            Page::Standings => Page::Summary,
            Page::Scorelines => Page::Standings,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Summary => "Summary",
            Page::Standings => "Standings",
            Page::Scorelines => "Scorelines",
        }
    }
}

pub struct App {
    /// Unfiltered engine; every filter change derives a fresh view from it
    pub engine: ChampionshipStatistics,
    pub filter: MatchFilter,
    pub report: ChampionshipReport,
    pub scorelines: Vec<ScoreFrequency>,
    pub state: TableState,
    pub scores_state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
    last_round: u32,
}

impl App {
    pub fn new(engine: ChampionshipStatistics, filter: MatchFilter) -> Self {
        let last_round = engine.all_matches().iter().map(|m| m.round).max().unwrap_or(0);
        let view = engine.with_filter(filter.predicate());

        let mut app = Self {
            report: ChampionshipReport::build(&view, filter.to_string()),
            scorelines: view.score_frequencies(),
            engine,
            filter,
            state: TableState::default(),
            scores_state: TableState::default(),
            current_page: Page::Standings,
            show_detail: false,
            last_round,
        };
        app.reset_selection();
        app
    }

    pub fn apply_filter(&mut self, filter: MatchFilter) {
        let view = self.engine.with_filter(filter.predicate());
        self.report = ChampionshipReport::build(&view, filter.to_string());
        self.scorelines = view.score_frequencies();
        self.filter = filter;
        self.reset_selection();
    }

    pub fn clear_filter(&mut self) {
        self.apply_filter(MatchFilter::All);
    }

    fn reset_selection(&mut self) {
        let first = |len: usize| if len == 0 { None } else { Some(0) };
        self.state.select(first(self.report.standings.len()));
        self.scores_state.select(first(self.scorelines.len()));
    }

    /// Round currently selected by the filter, if any
    pub fn current_round(&self) -> Option<u32> {
        match &self.filter {
            MatchFilter::Round(round) => Some(*round),
            MatchFilter::And(filters) => filters.iter().find_map(|f| match f {
                MatchFilter::Round(round) => Some(*round),
                _ => None,
            }),
            _ => None,
        }
    }

    /// Same filter with the round condition replaced (or removed)
    fn with_round(&self, round: Option<u32>) -> MatchFilter {
        let mut filters = match &self.filter {
            MatchFilter::And(filters) => filters.clone(),
            other => vec![other.clone()],
        };
        filters.retain(|f| !matches!(f, MatchFilter::Round(_)));
        if let Some(round) = round {
            filters.insert(0, MatchFilter::Round(round));
        }
        MatchFilter::combine(filters)
    }

    /// ']' - whole championship -> round 1 -> ... -> last round -> whole championship
    pub fn next_round(&mut self) {
        if self.last_round == 0 {
            return;
        }
        let round = match self.current_round() {
            None => Some(1),
            Some(r) if r >= self.last_round => None,
            Some(r) => Some(r + 1),
        };
        self.apply_filter(self.with_round(round));
    }

    /// '[' - the reverse of `next_round`
    pub fn previous_round(&mut self) {
        if self.last_round == 0 {
            return;
        }
        let round = match self.current_round() {
            None => Some(self.last_round),
            Some(r) if r <= 1 => None,
            Some(r) => Some(r - 1),
        };
        self.apply_filter(self.with_round(round));
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    /// Record of the team highlighted in the standings table
    pub fn selected_team(&self) -> Option<TeamReport> {
        let row = self.state.selected().and_then(|i| self.report.standings.get(i))?;
        let view = self.engine.with_filter(self.filter.predicate());
        Some(TeamReport::build(&view, row.team.clone()))
    }

    fn active_table(&mut self) -> (&mut TableState, usize) {
        match self.current_page {
            Page::Scorelines => (&mut self.scores_state, self.scorelines.len()),
            _ => (&mut self.state, self.report.standings.len()),
        }
    }

    pub fn next(&mut self) {
        let (state, len) = self.active_table();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let (state, len) = self.active_table();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn first(&mut self) {
        let (state, len) = self.active_table();
        if len > 0 {
            state.select(Some(0));
        }
    }

    pub fn last(&mut self) {
        let (state, len) = self.active_table();
        if len > 0 {
            state.select(Some(len - 1));
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter if app.current_page == Page::Standings => app.toggle_detail(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('1') => app.current_page = Page::Summary,
                KeyCode::Char('2') => app.current_page = Page::Standings,
                KeyCode::Char('3') => app.current_page = Page::Scorelines,
                KeyCode::Char(']') => app.next_round(),
                KeyCode::Char('[') => app.previous_round(),
                KeyCode::Char('c') => app.clear_filter(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => app.first(),
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::Standings {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_standings(f, content_chunks[0], app);
        render_team_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Summary => render_summary(f, chunks[1], app),
            Page::Standings => render_standings(f, chunks[1], app),
            Page::Scorelines => render_scorelines(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Summary, Page::Standings, Page::Scorelines];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Matches: {}", app.report.match_count()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Goals: {}", app.report.goals.sum),
        Style::default().fg(Color::Green),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn label(text: &str) -> Span<'static> {
    Span::styled(
        format!("  {:<24}", text),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )
}

fn render_summary(f: &mut Frame, area: Rect, app: &App) {
    let report = &app.report;
    let score = |frequency: Option<ScoreFrequency>| {
        frequency
            .map(|fq| format!("{}  ({} matches)", fq.score, fq.count))
            .unwrap_or_else(|| "-".to_string())
    };

    let content = vec![
        Line::from(""),
        Line::from(vec![label("Matches"), Span::raw(report.match_count().to_string())]),
        Line::from(vec![
            label("Goals"),
            Span::styled(report.goals.sum.to_string(), Style::default().fg(Color::Green)),
            Span::raw(format!(
                "  (min {}, max {}, {:.2} per match)",
                report.goals.min, report.goals.max, report.average_goals
            )),
        ]),
        Line::from(""),
        Line::from(vec![label("Home wins"), Span::raw(report.home_wins.to_string())]),
        Line::from(vec![label("Away wins"), Span::raw(report.away_wins.to_string())]),
        Line::from(vec![label("Draws"), Span::raw(report.draws.to_string())]),
        Line::from(""),
        Line::from(vec![
            label(&format!("Under {} goals", GOAL_LINE)),
            Span::raw(report.low_scoring_matches.to_string()),
        ]),
        Line::from(vec![
            label(&format!("Over {} goals", GOAL_LINE)),
            Span::raw(report.high_scoring_matches.to_string()),
        ]),
        Line::from(""),
        Line::from(vec![
            label("Most frequent score"),
            Span::styled(score(report.most_frequent_score), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            label("Least frequent score"),
            Span::styled(score(report.least_frequent_score), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(vec![
            label("Leader"),
            Span::styled(
                report
                    .leader()
                    .map(|row| format!("{} ({} pts)", row.team, row.points))
                    .unwrap_or_else(|| "-".to_string()),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" Summary - {} ", app.filter)),
    );

    f.render_widget(paragraph, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn render_standings(f: &mut Frame, area: Rect, app: &mut App) {
    let header = header_row(&["#", "Team", "Pts", "P", "W", "D", "L", "GF", "GA", "GD"]);

    let rows = app.report.standings.iter().map(|row| {
        let gd_color = match row.goal_difference {
            gd if gd > 0 => Color::Green,
            gd if gd < 0 => Color::Red,
            _ => Color::White,
        };

        Row::new(vec![
            Cell::from(row.position.to_string()),
            Cell::from(truncate(row.team.name(), 24)),
            Cell::from(row.points.to_string())
                .style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from(row.matches_played.to_string()),
            Cell::from(row.wins.to_string()),
            Cell::from(row.draws.to_string()),
            Cell::from(row.losses.to_string()),
            Cell::from(row.goals_for.to_string()),
            Cell::from(row.goals_against.to_string()),
            Cell::from(format!("{:+}", row.goal_difference)).style(Style::default().fg(gd_color)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(26),
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" Standings - {} ", app.filter)),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_scorelines(f: &mut Frame, area: Rect, app: &mut App) {
    let header = header_row(&["Score", "Matches", "Share"]);
    let total = app.report.match_count().max(1) as f64;

    let rows = app.scorelines.iter().map(|frequency| {
        Row::new(vec![
            Cell::from(frequency.score.to_string()),
            Cell::from(frequency.count.to_string()),
            Cell::from(format!("{:.1}%", 100.0 * frequency.count as f64 / total)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [Constraint::Length(10), Constraint::Length(10), Constraint::Length(10)],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" Scorelines - {} ", app.filter)),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.scores_state);
}

fn render_team_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Team ");

    let team = match app.selected_team() {
        Some(team) => team,
        None => {
            f.render_widget(Paragraph::new("No team selected").block(block), area);
            return;
        }
    };

    let record = &team.record;
    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", team.team),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(""),
        Line::from(format!(
            "  {} pts  W {} / D {} / L {}",
            team.points, record.wins, record.draws, record.losses
        )),
        Line::from(format!(
            "  Goals {}:{} ({:+})",
            record.goals_for, record.goals_against, record.goal_difference
        )),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
    ];

    for m in &team.matches {
        let color = match m.goals_for(&team.team).cmp(&m.goals_against(&team.team)) {
            std::cmp::Ordering::Greater => Color::Green,
            std::cmp::Ordering::Less => Color::Red,
            std::cmp::Ordering::Equal => Color::White,
        };
        content.push(Line::from(vec![
            Span::styled(format!("  R{:<3}", m.round), Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{} {} {}", truncate(m.home.name(), 14), m.score(), truncate(m.away.name(), 14)),
                Style::default().fg(color),
            ),
        ]));
    }

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![Span::styled(
        format!(" Filter: {} ", app.filter),
        Style::default().fg(Color::Green),
    )];

    if app.filter != MatchFilter::All {
        status_spans.push(Span::raw("("));
        status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    status_spans.extend([
        Span::raw(" | "),
        key("[/]"),
        Span::raw(" Round | "),
        key("Tab"),
        Span::raw(" Page | "),
        key("↑/↓"),
        Span::raw(" Nav | "),
        key("Enter"),
        Span::raw(" Team | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ]);

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

/// Shorten to `max_len` characters (team names are not ASCII-only)
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use championship_stats::{Match, MatchDate, Team};
    use chrono::NaiveDate;

    fn create_test_match(round: u32, home: &str, home_score: u32, away: &str, away_score: u32) -> Match {
        Match {
            round,
            date: MatchDate::new(NaiveDate::from_ymd_opt(2021, 6, round).unwrap(), None),
            home: Team::new(home),
            away: Team::new(away),
            winner: None,
            venue: "Arena".to_string(),
            home_score,
            away_score,
            home_state: "RS".to_string(),
            away_state: "RS".to_string(),
            winner_state: None,
        }
    }

    fn create_test_app() -> App {
        let engine = ChampionshipStatistics::unfiltered(vec![
            create_test_match(1, "Grêmio", 2, "Internacional", 1),
            create_test_match(1, "Juventude", 0, "Caxias", 0),
            create_test_match(2, "Internacional", 3, "Juventude", 0),
            create_test_match(2, "Caxias", 1, "Grêmio", 1),
        ]);
        App::new(engine, MatchFilter::All)
    }

    #[test]
    fn test_new_app_selects_leader() {
        let app = create_test_app();
        assert_eq!(app.report.match_count(), 4);
        assert_eq!(app.state.selected(), Some(0));
        assert_eq!(app.current_page, Page::Standings);
        assert_eq!(app.current_round(), None);
    }

    #[test]
    fn test_round_stepping_wraps_through_all() {
        let mut app = create_test_app();

        app.next_round();
        assert_eq!(app.filter, MatchFilter::Round(1));
        assert_eq!(app.report.match_count(), 2);

        app.next_round();
        assert_eq!(app.current_round(), Some(2));

        app.next_round();
        assert_eq!(app.filter, MatchFilter::All);

        app.previous_round();
        assert_eq!(app.current_round(), Some(2));
    }

    #[test]
    fn test_round_stepping_keeps_other_filters() {
        let engine = create_test_app().engine;
        let mut app = App::new(engine, MatchFilter::Team(Team::new("Grêmio")));

        app.next_round();
        assert_eq!(
            app.filter,
            MatchFilter::And(vec![MatchFilter::Round(1), MatchFilter::Team(Team::new("Grêmio"))])
        );
        assert_eq!(app.report.match_count(), 1);

        app.previous_round();
        assert_eq!(app.filter, MatchFilter::Team(Team::new("Grêmio")));
    }

    #[test]
    fn test_clear_filter() {
        let mut app = create_test_app();
        app.apply_filter(MatchFilter::Round(2));
        assert_eq!(app.report.match_count(), 2);

        app.clear_filter();
        assert_eq!(app.filter, MatchFilter::All);
        assert_eq!(app.report.match_count(), 4);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = create_test_app();
        let rows = app.report.standings.len();

        app.previous();
        assert_eq!(app.state.selected(), Some(rows - 1));
        app.next();
        assert_eq!(app.state.selected(), Some(0));

        app.current_page = Page::Scorelines;
        app.last();
        assert_eq!(app.scores_state.selected(), Some(app.scorelines.len() - 1));
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_selected_team() {
        let app = create_test_app();
        let leader = app.selected_team().unwrap();
        assert_eq!(Some(&leader.team), app.report.leader().map(|row| &row.team));
        assert!(leader.is_known());
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Grêmio", 10), "Grêmio");
        assert_eq!(truncate("Atlético Goianiense", 10), "Atlétic...");
    }
}
