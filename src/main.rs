pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use neon_click::{
    app_dirs::AppDirs,
    arena::MeasuredArena,
    best_score::{BestScoreStore, FileBestScoreStore},
    celebration::Celebration,
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    DifficultyLevel, Phase, SessionController,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use crate::ui::screen::current_screen;

const TICK_RATE_MS: u64 = 50;

/// reaction-time arcade game: click the target before it moves
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A neon reaction-time arcade game for the terminal. Targets appear at random spots in the arena; click them with the mouse before they jump away. Each hit scores a point until the countdown runs out."
)]
pub struct Cli {
    /// difficulty to preselect in the menu (defaults to the last one played)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<DifficultyLevel>,

    /// pause in milliseconds between a hit and the next target appearing
    #[clap(long)]
    respawn_delay_ms: Option<u64>,

    /// where to keep the best score (defaults to the platform state directory)
    #[clap(long)]
    best_score_file: Option<PathBuf>,

    /// print the stored best score and exit
    #[clap(long)]
    print_best: bool,

    /// clear the stored best score and exit
    #[clap(long)]
    reset_best: bool,
}

/// Effective settings after merging stored preferences with CLI flags
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub difficulty: DifficultyLevel,
    pub respawn_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::resolve(&Config::default(), None, None)
    }
}

impl Settings {
    fn resolve(
        config: &Config,
        difficulty: Option<DifficultyLevel>,
        respawn_delay_ms: Option<u64>,
    ) -> Self {
        Self {
            difficulty: difficulty.unwrap_or_else(|| config.difficulty_level()),
            respawn_delay: respawn_delay_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.respawn_delay()),
        }
    }
}

impl Cli {
    fn settings(&self, config: &Config) -> Settings {
        Settings::resolve(config, self.difficulty, self.respawn_delay_ms)
    }

    fn best_score_store(&self) -> FileBestScoreStore {
        match &self.best_score_file {
            Some(path) => FileBestScoreStore::with_path(path),
            None => FileBestScoreStore::new(),
        }
    }
}

pub struct App {
    pub controller: SessionController<Box<dyn BestScoreStore>>,
    pub celebration: Celebration,
    pub arena_area: Rect,
    /// Target rectangle as of the last drawn frame; clicks are tested against this
    pub drawn_target: Option<Rect>,
}

impl App {
    pub fn new(settings: Settings, store: Box<dyn BestScoreStore>) -> Self {
        let controller = SessionController::new(store, MeasuredArena::new())
            .with_difficulty(settings.difficulty)
            .with_respawn_delay(settings.respawn_delay);

        Self {
            controller,
            celebration: Celebration::new(),
            arena_area: Rect::default(),
            drawn_target: None,
        }
    }

    /// Lay the frame out and report the play surface size to the controller
    pub fn measure(&mut self, area: Rect) {
        let inner = ui::regions(area).arena_inner;
        self.arena_area = inner;
        if inner.is_empty() {
            self.controller.arena_mut().clear();
        } else {
            let (width, height) = ui::arena_px(inner);
            self.controller.arena_mut().measure(width, height);
        }
    }

    pub fn start(&mut self) {
        self.celebration.stop();
        self.controller.start_session();
    }

    pub fn back_to_menu(&mut self) {
        self.celebration.stop();
        self.controller.reset_to_menu();
    }

    /// Feed elapsed wall-clock time to the session and the animation
    pub fn on_elapsed(&mut self, elapsed: Duration) {
        self.celebration.update(elapsed.as_secs_f64());

        let was_playing = self.controller.state().is_playing();
        self.controller.advance(elapsed);

        let state = self.controller.state();
        if was_playing && state.phase == Phase::Ended && state.new_best {
            self.celebration
                .start(self.arena_area.width, self.arena_area.height);
        }
    }

    /// Hit-test a click against the target the player saw, then score it if
    /// the session is still running
    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let Some(target) = self.drawn_target else {
            return;
        };
        if !ui::hit_test(target, mouse.column, mouse.row) {
            return;
        }
        if !self.controller.state().is_playing() {
            return;
        }
        self.controller.handle_target_click();
        if !self.controller.target().visible {
            self.drawn_target = None;
        }
    }

    /// Returns true when the app should exit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        let ctrl_c =
            key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if key.code == KeyCode::Esc || ctrl_c {
            return true;
        }
        let phase = self.controller.state().phase;
        current_screen(&phase).on_key(key, self);
        false
    }

    /// Rendered target rectangle, if one is on screen
    pub fn target_cells(&self) -> Option<Rect> {
        let target = self.controller.target();
        if !self.controller.state().is_playing() || !target.visible {
            return None;
        }
        Some(ui::target_cells(
            self.arena_area,
            target.position,
            self.controller.profile().target_size_px,
        ))
    }

    pub fn to_config(&self) -> Config {
        Config {
            difficulty: self.controller.state().difficulty.to_string(),
            respawn_delay_ms: self.controller.respawn_delay().as_millis() as u64,
        }
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let mut store = cli.best_score_store();
    if cli.reset_best {
        store.write(0)?;
        println!("best score reset ({})", store.path().display());
        return Ok(());
    }
    if cli.print_best {
        println!("{}", store.read());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let settings = cli.settings(&config_store.load());
    let mut app = App::new(settings, Box::new(store));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen,
    )?;
    terminal.show_cursor()?;

    if let Err(e) = config_store.save(&app.to_config()) {
        log::warn!("failed to save preferences: {}", e);
    }

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        let size = terminal.size()?;
        app.measure(Rect::new(0, 0, size.width, size.height));
        draw(terminal, app)?;

        let event = runner.step();
        // time passes before the event is applied
        app.on_elapsed(runner.elapsed());

        match event {
            GameEvent::Tick | GameEvent::Resize => {}
            GameEvent::Mouse(mouse) => app.on_mouse(mouse),
            GameEvent::Key(key) => {
                if app.on_key(key) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn draw<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    terminal.draw(|f| ui(app, f))?;
    app.drawn_target = app.target_cells();
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    let phase = app.controller.state().phase;
    current_screen(&phase).render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use neon_click::arena::{ArenaGeometry, ArenaSize};
    use neon_click::best_score::MemoryBestScoreStore;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn left_click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn test_app(best: u32) -> (App, MemoryBestScoreStore) {
        let store = MemoryBestScoreStore::new(best);
        let mut app = App::new(Settings::default(), Box::new(store.clone()));
        app.measure(Rect::new(0, 0, 100, 30));
        (app, store)
    }

    /// Draw one frame the way the event loop does and return the target on screen
    fn show_frame(app: &mut App) -> Option<Rect> {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        draw(&mut terminal, app).unwrap();
        app.drawn_target
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["neon-click"]);
        assert_eq!(cli.difficulty, None);
        assert_eq!(cli.respawn_delay_ms, None);
        assert!(!cli.print_best);
        assert!(!cli.reset_best);
    }

    #[test]
    fn test_cli_difficulty() {
        let cli = Cli::parse_from(["neon-click", "-d", "hard"]);
        assert_eq!(cli.difficulty, Some(DifficultyLevel::Hard));

        let cli = Cli::parse_from(["neon-click", "--difficulty", "easy"]);
        assert_eq!(cli.difficulty, Some(DifficultyLevel::Easy));

        assert!(Cli::try_parse_from(["neon-click", "-d", "insane"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = Config {
            difficulty: "easy".into(),
            respawn_delay_ms: 300,
        };
        let cli = Cli::parse_from(["neon-click", "-d", "hard"]);
        let settings = cli.settings(&config);
        assert_eq!(settings.difficulty, DifficultyLevel::Hard);
        assert_eq!(settings.respawn_delay, Duration::from_millis(300));

        let cli = Cli::parse_from(["neon-click", "--respawn-delay-ms", "0"]);
        let settings = cli.settings(&config);
        assert_eq!(settings.difficulty, DifficultyLevel::Easy);
        assert_eq!(settings.respawn_delay, Duration::ZERO);
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.difficulty, DifficultyLevel::Medium);
        assert_eq!(settings.respawn_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_measure_reports_arena_px() {
        let (app, _) = test_app(0);
        let (width, height) = ui::arena_px(app.arena_area);
        assert_eq!(
            app.controller.arena().dimensions(),
            Some(ArenaSize::new(width, height))
        );
    }

    #[test]
    fn test_measure_tiny_terminal_clears_arena() {
        let (mut app, _) = test_app(0);
        app.measure(Rect::new(0, 0, 3, 3));
        assert_eq!(app.controller.arena().dimensions(), None);
    }

    #[test]
    fn test_click_on_target_scores() {
        let (mut app, _) = test_app(0);
        app.start();
        let target = show_frame(&mut app).unwrap();

        app.on_mouse(left_click(target.x, target.y));
        assert_eq!(app.controller.state().score, 1);
        assert!(app.target_cells().is_none());
    }

    #[test]
    fn test_click_off_target_is_ignored() {
        let (mut app, _) = test_app(0);
        app.start();
        let target = show_frame(&mut app).unwrap();

        let miss_col = if target.x > app.arena_area.x {
            target.x - 1
        } else {
            target.right()
        };
        app.on_mouse(left_click(miss_col, target.y));
        assert_eq!(app.controller.state().score, 0);
    }

    #[test]
    fn test_click_hits_drawn_target_after_relocation() {
        for _ in 0..20 {
            let (mut app, _) = test_app(0);
            app.start();
            let drawn = show_frame(&mut app).unwrap();

            // medium relocates every 1.5s; the frame on screen is now stale
            app.on_elapsed(Duration::from_millis(1500));
            assert_eq!(app.controller.placements(), 2);

            app.on_mouse(left_click(drawn.x, drawn.y));
            assert_eq!(app.controller.state().score, 1);
            assert!(!app.controller.target().visible);
        }
    }

    #[test]
    fn test_click_on_undrawn_position_is_ignored() {
        let (mut app, _) = test_app(0);
        app.start();
        let mut drawn = show_frame(&mut app).unwrap();

        let mut moved = drawn;
        // 15 relocations stay inside the 30s medium round
        for _ in 0..15 {
            app.on_elapsed(Duration::from_millis(1500));
            moved = app.target_cells().unwrap();
            if !moved.intersects(drawn) {
                break;
            }
            drawn = show_frame(&mut app).unwrap();
        }
        assert!(!moved.intersects(drawn));

        app.on_mouse(left_click(moved.x, moved.y));
        assert_eq!(app.controller.state().score, 0);
        assert!(app.controller.target().visible);
    }

    #[test]
    fn test_second_click_on_same_frame_does_not_score() {
        let (mut app, _) = test_app(0);
        app.start();
        let drawn = show_frame(&mut app).unwrap();

        app.on_mouse(left_click(drawn.x, drawn.y));
        app.on_elapsed(Duration::from_millis(100));
        assert!(app.controller.target().visible);
        app.on_mouse(left_click(drawn.x, drawn.y));

        assert_eq!(app.controller.state().score, 1);
    }

    #[test]
    fn test_click_loses_to_expiry_in_same_step() {
        let (mut app, _) = test_app(0);
        app.on_key(key(KeyCode::Char('3')));
        app.start();
        let drawn = show_frame(&mut app).unwrap();

        app.on_elapsed(Duration::from_secs(20));
        app.on_mouse(left_click(drawn.x, drawn.y));

        assert_matches!(app.controller.state().phase, Phase::Ended);
        assert_eq!(app.controller.state().score, 0);
    }

    #[test]
    fn test_right_click_and_release_are_ignored() {
        let (mut app, _) = test_app(0);
        app.start();
        let target = show_frame(&mut app).unwrap();

        let mut right = left_click(target.x, target.y);
        right.kind = MouseEventKind::Down(MouseButton::Right);
        app.on_mouse(right);
        let mut release = left_click(target.x, target.y);
        release.kind = MouseEventKind::Up(MouseButton::Left);
        app.on_mouse(release);

        assert_eq!(app.controller.state().score, 0);
    }

    #[test]
    fn test_esc_and_ctrl_c_quit() {
        let (mut app, _) = test_app(0);
        assert!(app.on_key(key(KeyCode::Esc)));
        assert!(app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!app.on_key(key(KeyCode::Char('c'))));
    }

    #[test]
    fn test_keys_drive_full_session() {
        let (mut app, store) = test_app(0);
        app.on_key(key(KeyCode::Char('3')));
        app.on_key(key(KeyCode::Enter));
        assert_matches!(app.controller.state().phase, Phase::Playing);
        assert_eq!(app.controller.state().time_left_secs, 20);

        let target = show_frame(&mut app).unwrap();
        app.on_mouse(left_click(target.x, target.y));
        app.on_elapsed(Duration::from_secs(20));

        assert_matches!(app.controller.state().phase, Phase::Ended);
        assert_eq!(store.writes(), vec![1]);
        assert!(app.celebration.is_active);

        app.on_key(key(KeyCode::Char('m')));
        assert_matches!(app.controller.state().phase, Phase::Idle);
        assert!(!app.celebration.is_active);
    }

    #[test]
    fn test_no_celebration_without_record() {
        let (mut app, store) = test_app(10);
        app.start();
        app.on_elapsed(Duration::from_secs(30));
        assert_matches!(app.controller.state().phase, Phase::Ended);
        assert!(!app.celebration.is_active);
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_empty_session_is_not_a_record() {
        let (mut app, store) = test_app(0);
        app.start();
        app.on_elapsed(Duration::from_secs(30));
        assert_matches!(app.controller.state().phase, Phase::Ended);
        assert!(!app.controller.state().new_best);
        assert!(!app.celebration.is_active);
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_key_release_events_are_harmless() {
        let (mut app, _) = test_app(0);
        let mut release = key(KeyCode::Char('1'));
        release.kind = KeyEventKind::Release;
        assert!(!app.on_key(release));
        assert_eq!(app.controller.state().difficulty, DifficultyLevel::Medium);

        let mut esc_release = key(KeyCode::Esc);
        esc_release.kind = KeyEventKind::Release;
        assert!(!app.on_key(esc_release));
    }

    #[test]
    fn test_to_config_reflects_choice() {
        let (mut app, _) = test_app(0);
        app.on_key(key(KeyCode::Char('1')));
        let cfg = app.to_config();
        assert_eq!(cfg.difficulty, "easy");
        assert_eq!(cfg.respawn_delay_ms, 100);
    }

    #[test]
    fn test_ui_draws_each_phase() {
        let (mut app, _) = test_app(0);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| ui(&app, f)).unwrap();
        app.start();
        terminal.draw(|f| ui(&app, f)).unwrap();
        app.controller.end_session();
        terminal.draw(|f| ui(&app, f)).unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("GAME OVER"));
    }

    #[test]
    fn test_tick_rate_constant() {
        assert_eq!(TICK_RATE_MS, 50);
    }
}
