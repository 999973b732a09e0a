//! Key events → per-frame [`Intents`].
//!
//! Terminals that honour the keyboard-enhancement flags send proper
//! `Press` / `Repeat` / `Release` events, so a control is released the moment
//! its key comes up and stays held until then. Classic terminals only send
//! `Press` (OS key-repeat shows up as more presses), so there a control
//! expires after [`HOLD_WINDOW`] frames without a fresh event. The window
//! covers the usual repeat interval, which keeps a held key live while it is
//! repeating.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::Intents;

/// Frames a control stays held after its last press or repeat when the
/// terminal sends no releases (about 133 ms at 60 Hz).
pub const HOLD_WINDOW: u64 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Control {
    RotateLeft,
    RotateRight,
    Thrust,
    Boost,
    Fire,
    Quit,
}

fn controls_for(key: &KeyEvent) -> &'static [Control] {
    use Control::*;
    match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => &[RotateLeft],
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => &[RotateRight],
        KeyCode::Up if key.modifiers.contains(KeyModifiers::SHIFT) => &[Thrust, Boost],
        KeyCode::Up | KeyCode::Char('w') => &[Thrust],
        // Shift+w arrives as an uppercase W
        KeyCode::Char('W') => &[Thrust, Boost],
        KeyCode::Char('b') | KeyCode::Char('B') => &[Boost],
        KeyCode::Char(' ') => &[Fire],
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => &[Quit],
        _ => &[],
    }
}

#[derive(Debug, Default)]
pub struct KeyTracker {
    /// Control → frame it was last seen on.
    held: HashMap<Control, u64>,
    fire: bool,
    quit: bool,
    frame: u64,
    /// The terminal reports key releases, so held controls never go stale.
    releases: bool,
}

impl KeyTracker {
    pub fn with_key_releases(releases: bool) -> Self {
        Self {
            releases,
            ..Self::default()
        }
    }

    /// Forget everything, e.g. when a new game starts.
    pub fn reset(&mut self) {
        self.held.clear();
        self.fire = false;
        self.quit = false;
    }

    pub fn handle(&mut self, key: KeyEvent) {
        for &control in controls_for(&key) {
            match key.kind {
                KeyEventKind::Press => {
                    self.held.insert(control, self.frame);
                    match control {
                        Control::Fire => self.fire = true,
                        Control::Quit => self.quit = true,
                        _ => {}
                    }
                }
                // Refresh only; a repeat never fires again.
                KeyEventKind::Repeat => {
                    self.held.insert(control, self.frame);
                }
                KeyEventKind::Release => {
                    self.held.remove(&control);
                }
            }
        }
    }

    fn is_fresh(&self, last: u64) -> bool {
        self.releases || self.frame.saturating_sub(last) <= HOLD_WINDOW
    }

    fn is_held(&self, control: Control) -> bool {
        self.held.get(&control).is_some_and(|&last| self.is_fresh(last))
    }

    /// Intents for the frame that is about to run. One-shot presses are
    /// consumed and stale held controls dropped.
    pub fn next_frame(&mut self) -> Intents {
        let thrust = self.is_held(Control::Thrust);
        let intents = Intents {
            rotate_left: self.is_held(Control::RotateLeft),
            rotate_right: self.is_held(Control::RotateRight),
            thrust,
            boost: thrust && self.is_held(Control::Boost),
            fire: std::mem::take(&mut self.fire),
            quit: std::mem::take(&mut self.quit),
        };
        self.frame += 1;
        if !self.releases {
            let frame = self.frame;
            self.held
                .retain(|_, last| frame.saturating_sub(*last) <= HOLD_WINDOW);
        }
        intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn event(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn held_key_expires_after_window() {
        let mut keys = KeyTracker::default();
        keys.handle(press(KeyCode::Left));
        for frame in 0..=HOLD_WINDOW {
            assert!(keys.next_frame().rotate_left, "frame {frame}");
        }
        assert!(!keys.next_frame().rotate_left);
    }

    #[test]
    fn held_key_without_events_stays_held_when_releases_are_reported() {
        let mut keys = KeyTracker::with_key_releases(true);
        keys.handle(press(KeyCode::Up));
        for frame in 0..30 {
            assert!(keys.next_frame().thrust, "frame {frame}");
        }
        keys.handle(event(KeyCode::Up, KeyEventKind::Release));
        assert!(!keys.next_frame().thrust);
    }

    #[test]
    fn release_mode_still_delivers_fire_once() {
        let mut keys = KeyTracker::with_key_releases(true);
        keys.handle(press(KeyCode::Char(' ')));
        assert!(keys.next_frame().fire);
        assert!(!keys.next_frame().fire);
    }

    #[test]
    fn repeats_keep_key_held() {
        let mut keys = KeyTracker::default();
        keys.handle(press(KeyCode::Up));
        for _ in 0..20 {
            keys.handle(event(KeyCode::Up, KeyEventKind::Repeat));
            assert!(keys.next_frame().thrust);
        }
    }

    #[test]
    fn release_drops_key_immediately() {
        let mut keys = KeyTracker::default();
        keys.handle(press(KeyCode::Right));
        assert!(keys.next_frame().rotate_right);
        keys.handle(event(KeyCode::Right, KeyEventKind::Release));
        assert!(!keys.next_frame().rotate_right);
    }

    #[test]
    fn fire_is_delivered_once_per_press() {
        let mut keys = KeyTracker::default();
        keys.handle(press(KeyCode::Char(' ')));
        keys.handle(event(KeyCode::Char(' '), KeyEventKind::Repeat));
        assert!(keys.next_frame().fire);
        keys.handle(event(KeyCode::Char(' '), KeyEventKind::Repeat));
        assert!(!keys.next_frame().fire);
        keys.handle(press(KeyCode::Char(' ')));
        assert!(keys.next_frame().fire);
    }

    #[test]
    fn quit_keys() {
        for code in [KeyCode::Esc, KeyCode::Char('q')] {
            let mut keys = KeyTracker::default();
            keys.handle(press(code));
            assert!(keys.next_frame().quit);
            assert!(!keys.next_frame().quit);
        }
    }

    #[test]
    fn boost_variants_imply_thrust() {
        let mut keys = KeyTracker::default();
        keys.handle(KeyEvent::new(KeyCode::Up, KeyModifiers::SHIFT));
        let intents = keys.next_frame();
        assert!(intents.thrust && intents.boost);

        let mut keys = KeyTracker::default();
        keys.handle(press(KeyCode::Char('W')));
        let intents = keys.next_frame();
        assert!(intents.thrust && intents.boost);

        let mut keys = KeyTracker::default();
        keys.handle(press(KeyCode::Char('w')));
        keys.handle(press(KeyCode::Char('b')));
        let intents = keys.next_frame();
        assert!(intents.thrust && intents.boost);
    }

    #[test]
    fn boost_alone_does_nothing() {
        let mut keys = KeyTracker::default();
        keys.handle(press(KeyCode::Char('b')));
        let intents = keys.next_frame();
        assert!(!intents.thrust && !intents.boost);
    }

    #[test]
    fn simultaneous_controls() {
        let mut keys = KeyTracker::default();
        keys.handle(press(KeyCode::Char('a')));
        keys.handle(press(KeyCode::Char('w')));
        keys.handle(press(KeyCode::Char(' ')));
        assert_eq!(
            keys.next_frame(),
            Intents {
                rotate_left: true,
                thrust: true,
                fire: true,
                ..Intents::default()
            }
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut keys = KeyTracker::default();
        keys.handle(press(KeyCode::Up));
        keys.handle(press(KeyCode::Char(' ')));
        keys.reset();
        assert_eq!(keys.next_frame(), Intents::default());
    }
}
