use crossterm::event::{KeyCode, KeyEvent};
use neon_click::{DifficultyLevel, Phase};
use ratatui::Frame;

use crate::ui::{regions, render_celebration, render_game_over_overlay, render_menu_overlay};
use crate::App;

/// A UI Screen boundary: responsible for rendering and optional key handling
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
    /// Optional per-screen key handling. Returns true if the key was handled.
    fn on_key(&mut self, _key: KeyEvent, _app: &mut App) -> bool {
        false
    }
}

/// Menu screen - arena plus the difficulty selector
pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        f.render_widget(app, area);
        render_menu_overlay(app, regions(area).arena_inner, f.buffer_mut());
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> bool {
        let level = match key.code {
            KeyCode::Char('1') | KeyCode::Char('e') => Some(DifficultyLevel::Easy),
            KeyCode::Char('2') | KeyCode::Char('m') => Some(DifficultyLevel::Medium),
            KeyCode::Char('3') | KeyCode::Char('h') => Some(DifficultyLevel::Hard),
            _ => None,
        };
        if let Some(level) = level {
            app.controller.configure_difficulty(level);
            return true;
        }

        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                app.start();
                true
            }
            _ => false,
        }
    }
}

/// Playing screen - only the arena; input arrives as mouse clicks
pub struct PlayingScreen;

impl Screen for PlayingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Game over screen - final score, optional new-best burst
pub struct GameOverScreen;

impl Screen for GameOverScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        let inner = regions(area).arena_inner;
        f.render_widget(app, area);
        if app.celebration.is_active {
            render_celebration(&app.celebration, inner, f.buffer_mut());
        }
        render_game_over_overlay(app, inner, f.buffer_mut());
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> bool {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('r') => {
                app.start();
                true
            }
            KeyCode::Char('m') | KeyCode::Backspace => {
                app.back_to_menu();
                true
            }
            _ => false,
        }
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: &Phase) -> Box<dyn Screen> {
    match phase {
        Phase::Idle => Box::new(MenuScreen),
        Phase::Playing => Box::new(PlayingScreen),
        Phase::Ended => Box::new(GameOverScreen),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use neon_click::best_score::MemoryBestScoreStore;
    use ratatui::{backend::TestBackend, layout::Rect, Terminal};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        let mut app = App::new(
            crate::Settings::default(),
            Box::new(MemoryBestScoreStore::new(0)),
        );
        app.measure(Rect::new(0, 0, 100, 30));
        app
    }

    #[test]
    fn menu_keys_pick_difficulty() {
        let mut app = app();
        assert!(MenuScreen.on_key(key(KeyCode::Char('3')), &mut app));
        assert_eq!(app.controller.state().difficulty, DifficultyLevel::Hard);
        assert!(MenuScreen.on_key(key(KeyCode::Char('e')), &mut app));
        assert_eq!(app.controller.state().difficulty, DifficultyLevel::Easy);
        assert!(!MenuScreen.on_key(key(KeyCode::Char('x')), &mut app));
    }

    #[test]
    fn menu_enter_starts_session() {
        let mut app = app();
        assert!(MenuScreen.on_key(key(KeyCode::Enter), &mut app));
        assert_eq!(app.controller.state().phase, Phase::Playing);
    }

    #[test]
    fn playing_screen_ignores_keys() {
        let mut app = app();
        app.start();
        assert!(!PlayingScreen.on_key(key(KeyCode::Char('m')), &mut app));
        assert_eq!(app.controller.state().phase, Phase::Playing);
    }

    #[test]
    fn game_over_keys() {
        let mut app = app();
        app.start();
        app.controller.end_session();

        assert!(GameOverScreen.on_key(key(KeyCode::Char('m')), &mut app));
        assert_eq!(app.controller.state().phase, Phase::Idle);

        app.start();
        app.controller.end_session();
        assert!(GameOverScreen.on_key(key(KeyCode::Enter), &mut app));
        assert_eq!(app.controller.state().phase, Phase::Playing);
    }

    #[test]
    fn screens_render_for_every_phase() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        for phase in [Phase::Idle, Phase::Playing, Phase::Ended] {
            match phase {
                Phase::Idle => {}
                Phase::Playing => app.start(),
                Phase::Ended => app.controller.end_session(),
            }
            assert_eq!(app.controller.state().phase, phase);
            terminal
                .draw(|f| current_screen(&phase).render(&app, f))
                .unwrap();
        }

        let content: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("GAME OVER"));
    }
}
