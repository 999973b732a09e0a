//! The per-session state machine: lives, score, level progression, and the
//! PLAYING → PLAYER_EXPLODING → GAME_OVER / LEVEL_COMPLETE flow.
//!
//! A session is driven one frame at a time through [`GameSession::update`].
//! End-of-level and game-over pauses are timed states rather than sleeps, and
//! the next level is built in place, so any number of levels runs in the
//! same loop.

use rand::rngs::StdRng;

use crate::config::Tuning;

use super::collision;
use super::entities::EntitySet;
use super::level;
use super::particles::{emit_explosion, emit_smoke};
use super::player::Player;
use super::vec2::Vec2;

/// Logical controls for one frame. Rotation, thrust and boost are held;
/// fire and quit are one-shot presses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Intents {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub thrust: bool,
    pub boost: bool,
    pub fire: bool,
    pub quit: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Playing,
    PlayerExploding,
    LevelComplete,
    GameOver,
}

/// Scalars for the status bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    pub fuel: f64,
    pub max_fuel: f64,
    pub angle: f64,
    pub landed: bool,
    pub beacons_remaining: usize,
    pub score: u32,
    pub level: u32,
    pub ships: u32,
}

pub struct GameSession {
    tuning: Tuning,
    rng: StdRng,
    entities: EntitySet,
    level: u32,
    score: u32,
    ships: u32,
    extra_life_threshold: u32,
    state: GameState,
    state_since_ms: f64,
    clock_ms: f64,
    finished: bool,
}

impl GameSession {
    /// A new game from level 1 with the configured number of ships.
    pub fn new(tuning: Tuning, rng: StdRng) -> Self {
        let ships = tuning.initial_ships;
        Self::at_level(tuning, rng, 1, 0, ships)
    }

    pub fn at_level(tuning: Tuning, rng: StdRng, level: u32, score: u32, ships: u32) -> Self {
        let mut session = Self {
            tuning,
            rng,
            entities: EntitySet::default(),
            level,
            score,
            ships,
            extra_life_threshold: 0,
            state: GameState::Playing,
            state_since_ms: 0.0,
            clock_ms: 0.0,
            finished: false,
        };
        session.start_level(level);
        session
    }

    fn start_level(&mut self, level: u32) {
        let layout = level::generate(level, &self.tuning, &mut self.rng);
        self.level = level;
        self.entities = EntitySet {
            player: Some(Player::spawn(&self.tuning)),
            beacons: layout.beacons,
            obstacles: layout.obstacles,
            ..EntitySet::default()
        };
        let step = self.tuning.extra_life_score;
        self.extra_life_threshold = (self.score / step + 1) * step;
        self.enter(GameState::Playing);
        tracing::info!(
            "level {} started: {} beacons, {} obstacles, score {}, ships {}",
            level,
            self.entities.beacons.len(),
            self.entities.obstacles.len(),
            self.score,
            self.ships
        );
    }

    fn enter(&mut self, state: GameState) {
        self.state = state;
        self.state_since_ms = self.clock_ms;
    }

    fn in_state_for(&self) -> f64 {
        self.clock_ms - self.state_since_ms
    }

    /// Advance one frame.
    pub fn update(&mut self, intents: &Intents) {
        if self.finished {
            return;
        }
        self.clock_ms += self.tuning.frame_ms;

        if intents.quit {
            tracing::info!("session quit at level {} with score {}", self.level, self.score);
            self.finished = true;
            return;
        }

        match self.state {
            GameState::Playing => self.update_playing(intents),
            GameState::PlayerExploding => {
                self.advance_scenery();
                if self.in_state_for() > self.tuning.death_anim_ms {
                    self.lose_ship();
                }
            }
            GameState::LevelComplete => {
                self.advance_scenery();
                if self.in_state_for() >= self.tuning.level_complete_pause_ms {
                    self.start_level(self.level + 1);
                }
            }
            GameState::GameOver => {
                self.advance_scenery();
                if self.in_state_for() >= self.tuning.game_over_pause_ms {
                    self.finished = true;
                }
            }
        }
    }

    fn advance_scenery(&mut self) {
        self.entities.advance_free_entities(&self.tuning, self.clock_ms);
        self.entities.sweep();
    }

    fn update_playing(&mut self, intents: &Intents) {
        let now = self.clock_ms;

        // ── Ship ─────────────────────────────────────────────────────────────
        if let Some(player) = self.entities.player.as_mut() {
            if intents.fire {
                if let Some(laser) = player.shoot(now, &self.tuning) {
                    self.entities.lasers.push(laser);
                }
            }
            if intents.rotate_left {
                player.rotate(-1, &self.tuning);
            }
            if intents.rotate_right {
                player.rotate(1, &self.tuning);
            }
            if !player.crashed {
                player.update(intents.thrust, intents.boost, &self.tuning);
            }
        }

        // ── Lasers, particles, touchdown smoke ───────────────────────────────
        self.entities.advance_free_entities(&self.tuning, now);
        let smoke_at = self
            .entities
            .player
            .as_ref()
            .filter(|p| p.just_landed || p.just_took_off)
            .map(|p| Vec2::new(p.pos.x, p.bottom(&self.tuning)));
        if let Some(origin) = smoke_at {
            let puffs = emit_smoke(origin, &self.tuning, now, &mut self.rng);
            self.entities.particles.extend(puffs);
        }

        // ── Collisions ───────────────────────────────────────────────────────
        if self.entities.player.is_none() {
            self.entities.sweep();
            return;
        }
        let report = collision::resolve(&mut self.entities, &self.tuning);
        if report.beacons_destroyed > 0 || report.obstacle_hit {
            tracing::debug!(
                "frame collisions: {} beacons for {} points, obstacle hit: {}",
                report.beacons_destroyed,
                report.points,
                report.obstacle_hit
            );
        }
        if report.points > 0 {
            self.award_beacons(report.points);
        }
        self.entities.sweep();

        // ── Transitions ──────────────────────────────────────────────────────
        let Some(player) = self.entities.player.as_ref() else {
            return;
        };
        if player.crashed {
            let wreck = player.pos;
            tracing::info!("ship destroyed at ({:.0}, {:.0})", wreck.x, wreck.y);
            let debris = emit_explosion(wreck, &self.tuning, now, &mut self.rng);
            self.entities.particles.extend(debris);
            self.entities.player = None;
            self.enter(GameState::PlayerExploding);
        } else if player.is_out_of_fuel() {
            tracing::info!("ship out of fuel mid-air");
            self.lose_ship();
        } else if self.entities.beacons_remaining() == 0 {
            self.score += self.tuning.level_bonus;
            if self.score >= self.extra_life_threshold {
                self.ships += 1;
                tracing::info!("extra life from level bonus, ships {}", self.ships);
            }
            tracing::info!("level {} complete, score {}", self.level, self.score);
            self.enter(GameState::LevelComplete);
        }
    }

    /// Score a batch of beacon hits. At most one extra life per batch, no
    /// matter how many thresholds the batch crosses.
    fn award_beacons(&mut self, points: u32) {
        self.score += points;
        if self.score >= self.extra_life_threshold {
            self.ships += 1;
            self.extra_life_threshold += self.tuning.extra_life_score;
            tracing::info!(
                "extra life: ships {}, next at {}",
                self.ships,
                self.extra_life_threshold
            );
        }
    }

    /// Spend a ship: respawn if any are left, otherwise game over.
    fn lose_ship(&mut self) {
        if self.ships <= 1 {
            self.ships = 0;
            tracing::info!("game over, final score {}", self.score);
            self.enter(GameState::GameOver);
        } else {
            self.ships -= 1;
            tracing::info!("ship lost, {} remaining", self.ships);
            self.entities.player = Some(Player::spawn(&self.tuning));
            self.enter(GameState::Playing);
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn ships(&self) -> u32 {
        self.ships
    }

    #[cfg(test)]
    pub fn extra_life_threshold(&self) -> u32 {
        self.extra_life_threshold
    }

    pub fn entities(&self) -> &EntitySet {
        &self.entities
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn final_score(&self) -> u32 {
        self.score
    }

    pub fn hud(&self) -> Hud {
        let player = self.entities.player.as_ref();
        Hud {
            fuel: player.map_or(0.0, |p| p.fuel),
            max_fuel: self.tuning.max_fuel,
            angle: player.map_or(0.0, |p| p.angle),
            landed: player.is_some_and(|p| p.landed),
            beacons_remaining: self.entities.beacons_remaining(),
            score: self.score,
            level: self.level,
            ships: self.ships,
        }
    }
}

/// Play a session from `level` until game over or quit, asking `input` for
/// each frame's intents. Returns the final score. The terminal front end
/// drives [`GameSession::update`] from its own tick loop instead.
#[cfg(test)]
pub fn run_level<F>(
    tuning: Tuning,
    rng: StdRng,
    level: u32,
    score: u32,
    ships: u32,
    mut input: F,
) -> u32
where
    F: FnMut(&GameSession) -> Intents,
{
    let mut session = GameSession::at_level(tuning, rng, level, score, ships);
    while !session.is_finished() {
        let intents = input(&session);
        session.update(&intents);
    }
    session.final_score()
}
