use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Tuning;
use crate::input::KeyTracker;
use crate::scores::HighScores;
use crate::sim::GameSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Start,
    Quit,
}

/// What a key does on the menu screen, if anything.
pub fn menu_action(key: &KeyEvent) -> Option<MenuAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => Some(MenuAction::Start),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(MenuAction::Quit),
        _ => None,
    }
}

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    pub session: Option<GameSession>,
    pub high_scores: HighScores,
    /// Score of the game that just ended, highlighted on the menu.
    pub last_score: Option<u32>,
    keys: KeyTracker,
    tuning: Tuning,
    rng: StdRng,
}

impl App {
    /// `seed` makes every game of this run reproducible.
    pub fn new(tuning: Tuning, high_scores: HighScores, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            should_quit: false,
            screen: Screen::Menu,
            session: None,
            high_scores,
            last_score: None,
            keys: KeyTracker::default(),
            tuning,
            rng,
        }
    }

    /// Track held keys by their release events instead of a hold window.
    pub fn set_key_releases(&mut self, releases: bool) {
        self.keys = KeyTracker::with_key_releases(releases);
    }

    pub fn start_game(&mut self) {
        let rng = StdRng::seed_from_u64(self.rng.gen());
        self.session = Some(GameSession::new(self.tuning.clone(), rng));
        self.keys.reset();
        self.screen = Screen::Playing;
        tracing::info!("new game started");
    }

    pub fn on_tick(&mut self) {
        if self.screen != Screen::Playing {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            self.screen = Screen::Menu;
            return;
        };
        let intents = self.keys.next_frame();
        session.update(&intents);
        if session.is_finished() {
            tracing::info!(
                "session over at level {}: score {}, ships left {}",
                session.level(),
                session.score(),
                session.ships()
            );
            let score = session.final_score();
            self.finish_game(score);
        }
    }

    fn finish_game(&mut self, score: u32) {
        tracing::info!("game finished with score {}", score);
        if self.high_scores.add(score) {
            tracing::info!("new high score {}", score);
        }
        self.last_score = Some(score);
        self.session = None;
        self.screen = Screen::Menu;
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.kind == KeyEventKind::Press
            && key.code == KeyCode::Char('c')
            && key.modifiers.contains(KeyModifiers::CONTROL)
        {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Menu => match menu_action(&key) {
                Some(MenuAction::Start) => self.start_game(),
                Some(MenuAction::Quit) => self.should_quit = true,
                None => {}
            },
            Screen::Playing => self.keys.handle(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(dir: &tempfile::TempDir) -> App {
        let scores = HighScores::load(dir.path().join("scores.txt"));
        App::new(Tuning::default(), scores, Some(7))
    }

    #[test]
    fn menu_keys() {
        assert_eq!(menu_action(&press(KeyCode::Enter)), Some(MenuAction::Start));
        assert_eq!(menu_action(&press(KeyCode::Char('q'))), Some(MenuAction::Quit));
        assert_eq!(menu_action(&press(KeyCode::Esc)), Some(MenuAction::Quit));
        assert_eq!(menu_action(&press(KeyCode::Left)), None);
        let release = KeyEvent::new_with_kind(
            KeyCode::Enter,
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );
        assert_eq!(menu_action(&release), None);
    }

    #[test]
    fn enter_starts_a_game() {
        let dir = tempdir().unwrap();
        let mut app = app(&dir);
        app.on_key(press(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Playing);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.level(), 1);
        assert_eq!(session.ships(), 3);
    }

    #[test]
    fn quit_from_menu() {
        let dir = tempdir().unwrap();
        let mut app = app(&dir);
        app.on_key(press(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn ctrl_c_quits_mid_game() {
        let dir = tempdir().unwrap();
        let mut app = app(&dir);
        app.start_game();
        app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn quitting_a_game_returns_to_menu_with_score() {
        let dir = tempdir().unwrap();
        let mut app = app(&dir);
        app.start_game();
        let rng = StdRng::seed_from_u64(3);
        app.session = Some(GameSession::at_level(Tuning::default(), rng, 2, 750, 2));

        app.on_tick();
        assert_eq!(app.screen, Screen::Playing);
        app.on_key(press(KeyCode::Esc));
        app.on_tick();

        assert_eq!(app.screen, Screen::Menu);
        assert!(app.session.is_none());
        assert_eq!(app.last_score, Some(750));
        assert_eq!(app.high_scores.top(), &[750]);
        assert!(!app.should_quit);
    }

    #[test]
    fn thrust_held_across_ticks_when_releases_are_reported() {
        let dir = tempdir().unwrap();
        let fuel_after = |releases: bool| {
            let mut app = app(&dir);
            app.set_key_releases(releases);
            app.start_game();
            app.on_key(press(KeyCode::Up));
            for _ in 0..30 {
                app.on_tick();
            }
            app.session.as_ref().unwrap().hud().fuel
        };
        let burn = Tuning::default().fuel_consumption;
        let max = Tuning::default().max_fuel;
        assert!((fuel_after(true) - (max - 30.0 * burn)).abs() < 1e-6);
        let window = (crate::input::HOLD_WINDOW + 1) as f64;
        assert!((fuel_after(false) - (max - window * burn)).abs() < 1e-6);
    }

    #[test]
    fn zero_score_game_is_not_recorded() {
        let dir = tempdir().unwrap();
        let mut app = app(&dir);
        app.start_game();
        app.on_key(press(KeyCode::Char('q')));
        app.on_tick();
        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.last_score, Some(0));
        assert!(app.high_scores.top().is_empty());
    }

    #[test]
    fn same_seed_same_first_level() {
        let dir = tempdir().unwrap();
        let mut a = app(&dir);
        let mut b = app(&dir);
        a.start_game();
        b.start_game();
        let beacons = |app: &App| -> Vec<(f64, f64)> {
            let session = app.session.as_ref().unwrap();
            session
                .entities()
                .beacons
                .iter()
                .map(|beacon| (beacon.pos.x, beacon.pos.y))
                .collect()
        };
        assert_eq!(beacons(&a), beacons(&b));
    }
}
