use crate::config::Tuning;

use super::particles::Particle;
use super::player::Player;
use super::vec2::Vec2;

/// Whether an entity still takes part in the frame. Collision and expiry
/// only ever mark entities; [`EntitySet::sweep`] is the one place that
/// removes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Alive,
    PendingRemoval,
}

impl Lifecycle {
    pub fn is_alive(self) -> bool {
        self == Lifecycle::Alive
    }
}

#[derive(Clone, Debug)]
pub struct Laser {
    pub pos: Vec2,
    pub vel: Vec2,
    pub created_ms: f64,
    pub lifecycle: Lifecycle,
}

impl Laser {
    pub fn new(pos: Vec2, angle: f64, speed: f64, now_ms: f64) -> Self {
        Self {
            pos,
            vel: Vec2::from_degrees(angle) * speed,
            created_ms: now_ms,
            lifecycle: Lifecycle::Alive,
        }
    }

    /// Milliseconds of session time since the shot was fired.
    pub fn age_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.created_ms).max(0.0)
    }

    /// Move one tick; lasers that leave the field are marked for removal.
    pub fn advance(&mut self, tuning: &Tuning) {
        self.pos += self.vel;
        let margin = tuning.laser_length / 2.0;
        if self.pos.x < -margin
            || self.pos.x > tuning.field_width + margin
            || self.pos.y < -margin
            || self.pos.y > tuning.field_height + margin
        {
            self.lifecycle = Lifecycle::PendingRemoval;
        }
    }

    /// The beam as a segment of `length`, centred on the laser position.
    pub fn segment(&self, length: f64) -> (Vec2, Vec2) {
        let half = self.vel.scale_to_length(length / 2.0);
        (self.pos - half, self.pos + half)
    }
}

#[derive(Clone, Debug)]
pub struct Beacon {
    pub pos: Vec2,
    pub radius: f64,
    pub score: u32,
    pub lifecycle: Lifecycle,
}

impl Beacon {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            pos,
            radius: tuning.beacon_radius,
            score: tuning.beacon_score,
            lifecycle: Lifecycle::Alive,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Obstacle {
    pub pos: Vec2,
    pub radius: f64,
}

/// Everything on the field for one level.
#[derive(Clone, Debug, Default)]
pub struct EntitySet {
    /// `None` between a crash and the respawn.
    pub player: Option<Player>,
    pub lasers: Vec<Laser>,
    pub beacons: Vec<Beacon>,
    pub obstacles: Vec<Obstacle>,
    pub particles: Vec<Particle>,
}

impl EntitySet {
    /// Advance everything that moves on its own: lasers and particles.
    pub fn advance_free_entities(&mut self, tuning: &Tuning, now_ms: f64) {
        for laser in self.lasers.iter_mut().filter(|l| l.lifecycle.is_alive()) {
            laser.advance(tuning);
        }
        for particle in self.particles.iter_mut().filter(|p| p.lifecycle.is_alive()) {
            particle.advance(now_ms);
        }
    }

    pub fn sweep(&mut self) {
        self.lasers.retain(|l| l.lifecycle.is_alive());
        self.beacons.retain(|b| b.lifecycle.is_alive());
        self.particles.retain(|p| p.lifecycle.is_alive());
    }

    pub fn beacons_remaining(&self) -> usize {
        self.beacons.iter().filter(|b| b.lifecycle.is_alive()).count()
    }
}
