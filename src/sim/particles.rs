//! Cosmetic smoke and explosion bursts. Particles never collide with
//! anything; they drift, fade and expire.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::Tuning;

use super::entities::Lifecycle;
use super::vec2::Vec2;

const SMOKE_COLORS: [[u8; 3]; 3] = [[180, 180, 180], [150, 150, 150], [120, 120, 120]];
const EXPLOSION_COLORS: [[u8; 3]; 4] = [
    [255, 0, 0],
    [255, 165, 0],
    [255, 255, 0],
    [255, 255, 255],
];

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: u32,
    pub color: [u8; 3],
    /// Seconds.
    pub lifespan: f64,
    pub spawn_ms: f64,
    /// 1.0 when fresh, falling to 0.0 at expiry. Renderers dim by this.
    pub fade: f64,
    pub lifecycle: Lifecycle,
}

impl Particle {
    pub fn advance(&mut self, now_ms: f64) {
        self.pos += self.vel;
        let elapsed = (now_ms - self.spawn_ms) / 1000.0;
        if elapsed >= self.lifespan {
            self.lifecycle = Lifecycle::PendingRemoval;
            self.fade = 0.0;
        } else {
            self.fade = (1.0 - elapsed / self.lifespan).max(0.0);
        }
    }
}

/// Grey puffs kicked up on touchdown and takeoff, biased upward.
pub fn emit_smoke(origin: Vec2, tuning: &Tuning, now_ms: f64, rng: &mut impl Rng) -> Vec<Particle> {
    (0..tuning.smoke_particle_count)
        .map(|_| {
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let speed = rng.gen_range(tuning.smoke_speed_min..=tuning.smoke_speed_max);
            let mut vel = Vec2::new(angle.cos(), angle.sin()) * speed;
            vel.y += rng.gen_range(-1.5..=-0.5);
            let jitter = Vec2::new(rng.gen_range(-5..=5) as f64, rng.gen_range(-5..=5) as f64);
            Particle {
                pos: origin + jitter,
                vel,
                size: rng.gen_range(2..=6),
                color: *SMOKE_COLORS.choose(rng).unwrap_or(&SMOKE_COLORS[0]),
                lifespan: rng.gen_range(tuning.smoke_lifespan_min..=tuning.smoke_lifespan_max),
                spawn_ms: now_ms,
                fade: 1.0,
                lifecycle: Lifecycle::Alive,
            }
        })
        .collect()
}

/// A radial burst of hot debris where the ship died.
pub fn emit_explosion(
    origin: Vec2,
    tuning: &Tuning,
    now_ms: f64,
    rng: &mut impl Rng,
) -> Vec<Particle> {
    (0..tuning.explosion_particle_count)
        .map(|_| {
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let speed = rng.gen_range(tuning.explosion_speed_min..=tuning.explosion_speed_max);
            let jitter = Vec2::new(rng.gen_range(-8..=8) as f64, rng.gen_range(-8..=8) as f64);
            Particle {
                pos: origin + jitter,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                size: rng.gen_range(3..=7),
                color: *EXPLOSION_COLORS.choose(rng).unwrap_or(&EXPLOSION_COLORS[0]),
                lifespan: rng
                    .gen_range(tuning.explosion_lifespan_min..=tuning.explosion_lifespan_max),
                spawn_ms: now_ms,
                fade: 1.0,
                lifecycle: Lifecycle::Alive,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn burst_sizes_follow_tuning() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(7);
        let smoke = emit_smoke(Vec2::new(100.0, 500.0), &tuning, 0.0, &mut rng);
        let boom = emit_explosion(Vec2::new(100.0, 500.0), &tuning, 0.0, &mut rng);
        assert_eq!(smoke.len(), 25);
        assert_eq!(boom.len(), 50);
        assert!(smoke.iter().all(|p| (2..=6).contains(&p.size)));
        assert!(boom.iter().all(|p| (3..=7).contains(&p.size)));
    }

    #[test]
    fn smoke_drifts_upward_on_average() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(11);
        let smoke = emit_smoke(Vec2::new(0.0, 0.0), &tuning, 0.0, &mut rng);
        let mean_vy: f64 = smoke.iter().map(|p| p.vel.y).sum::<f64>() / smoke.len() as f64;
        assert!(mean_vy < 0.0);
    }

    #[test]
    fn particle_expires_after_lifespan() {
        let tuning = Tuning::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = emit_explosion(Vec2::ZERO, &tuning, 0.0, &mut rng).remove(0);
        let lifespan_ms = p.lifespan * 1000.0;

        p.advance(lifespan_ms / 2.0);
        assert!(p.lifecycle.is_alive());
        assert!(p.fade > 0.0 && p.fade < 1.0);

        p.advance(lifespan_ms);
        assert_eq!(p.lifecycle, Lifecycle::PendingRemoval);
    }
}
