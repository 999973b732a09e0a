use rand::Rng;

use crate::config::Tuning;

use super::collision::{circles_overlap, Aabb};
use super::entities::{Beacon, Obstacle};
use super::player::Player;
use super::vec2::Vec2;

/// Beacons and obstacles for one level, plus what was asked for so a
/// crowded field can be detected.
#[derive(Clone, Debug)]
pub struct LevelLayout {
    pub beacons: Vec<Beacon>,
    pub obstacles: Vec<Obstacle>,
    pub requested_beacons: u32,
    pub requested_obstacles: u32,
}

impl LevelLayout {
    pub fn is_complete(&self) -> bool {
        self.beacons.len() as u32 == self.requested_beacons
            && self.obstacles.len() as u32 == self.requested_obstacles
    }
}

pub fn beacon_count(level: u32, tuning: &Tuning) -> u32 {
    tuning.beacons_base + level.saturating_sub(1)
}

pub fn obstacle_count(level: u32, tuning: &Tuning) -> u32 {
    level.saturating_sub(1) * tuning.obstacles_per_level
}

fn sample(rng: &mut impl Rng, lo: f64, hi: f64) -> Option<f64> {
    if lo < hi {
        Some(rng.gen_range(lo..hi))
    } else {
        None
    }
}

/// Scatter the level's beacons, then its obstacles, away from the spawn
/// point and from each other. Each entity gets `spawn_attempts` tries;
/// ones that can't be placed are dropped and the level runs short.
pub fn generate(level: u32, tuning: &Tuning, rng: &mut impl Rng) -> LevelLayout {
    let requested_beacons = beacon_count(level, tuning);
    let requested_obstacles = obstacle_count(level, tuning);
    let play_bottom = tuning.ground_y();

    let spawn_box = Player::spawn(tuning).bounds(tuning);
    let spawn_radius = spawn_box.circumradius();

    // ── Beacons: box test against spawn and earlier beacons ─────────────────
    let r = tuning.beacon_radius;
    let mut beacon_boxes = vec![spawn_box];
    let mut beacons = Vec::with_capacity(requested_beacons as usize);
    for _ in 0..requested_beacons {
        for _ in 0..tuning.spawn_attempts {
            let (Some(x), Some(y)) = (
                sample(rng, r, tuning.field_width - r),
                sample(rng, r, play_bottom - r * 4.0),
            ) else {
                break;
            };
            let pos = Vec2::new(x, y);
            let candidate = Aabb::centered(pos, r * 2.0, r * 2.0);
            if beacon_boxes.iter().all(|b| !candidate.overlaps(b)) {
                beacon_boxes.push(candidate);
                beacons.push(Beacon::new(pos, tuning));
                break;
            }
        }
    }

    // ── Obstacles: circle test against everything placed so far ─────────────
    let mut occupied: Vec<(Vec2, f64)> = vec![(spawn_box.center(), spawn_radius)];
    occupied.extend(beacons.iter().map(|b| (b.pos, b.radius)));
    let mut obstacles = Vec::with_capacity(requested_obstacles as usize);
    for _ in 0..requested_obstacles {
        for _ in 0..tuning.spawn_attempts {
            let radius =
                rng.gen_range(tuning.obstacle_radius_min..=tuning.obstacle_radius_max) as f64;
            let (Some(x), Some(y)) = (
                sample(rng, radius, tuning.field_width - radius),
                sample(rng, radius, play_bottom - radius * 2.0),
            ) else {
                continue;
            };
            let pos = Vec2::new(x, y);
            if occupied
                .iter()
                .all(|&(other, other_r)| !circles_overlap(pos, radius, other, other_r))
            {
                occupied.push((pos, radius));
                obstacles.push(Obstacle { pos, radius });
                break;
            }
        }
    }

    let layout = LevelLayout {
        beacons,
        obstacles,
        requested_beacons,
        requested_obstacles,
    };
    if !layout.is_complete() {
        tracing::warn!(
            "level {}: placed {} of {} beacons and {} of {} obstacles",
            level,
            layout.beacons.len(),
            requested_beacons,
            layout.obstacles.len(),
            requested_obstacles
        );
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn counts_scale_with_level() {
        let t = Tuning::default();
        assert_eq!(beacon_count(1, &t), 5);
        assert_eq!(obstacle_count(1, &t), 0);
        assert_eq!(beacon_count(3, &t), 7);
        assert_eq!(obstacle_count(3, &t), 4);
    }

    #[test]
    fn default_field_fits_everything_without_overlap() {
        let t = Tuning::default();
        let mut rng = StdRng::seed_from_u64(2024);
        let layout = generate(4, &t, &mut rng);
        assert!(layout.is_complete());
        assert_eq!(layout.beacons.len(), 8);
        assert_eq!(layout.obstacles.len(), 6);

        let spawn = Player::spawn(&t).bounds(&t);
        for (i, a) in layout.beacons.iter().enumerate() {
            let boxed = Aabb::centered(a.pos, 20.0, 20.0);
            assert!(!boxed.overlaps(&spawn));
            assert!(a.pos.y < t.ground_y() - 3.0 * t.beacon_radius);
            for b in &layout.beacons[i + 1..] {
                assert!(!boxed.overlaps(&Aabb::centered(b.pos, 20.0, 20.0)));
            }
        }
        for (i, o) in layout.obstacles.iter().enumerate() {
            assert!(o.radius >= 15.0 && o.radius <= 30.0);
            for b in &layout.beacons {
                assert!(!circles_overlap(o.pos, o.radius, b.pos, b.radius));
            }
            for p in &layout.obstacles[i + 1..] {
                assert!(!circles_overlap(o.pos, o.radius, p.pos, p.radius));
            }
        }
    }

    #[test]
    fn crowded_field_runs_short_without_failing() {
        let t = Tuning {
            field_width: 60.0,
            field_height: 140.0,
            ..Tuning::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let layout = generate(3, &t, &mut rng);
        assert_eq!(layout.requested_beacons, 7);
        assert!(layout.beacons.len() < 7);
        assert!(!layout.is_complete());
    }

    #[test]
    fn field_with_no_room_places_nothing() {
        let t = Tuning {
            field_width: 15.0,
            field_height: 100.0,
            ground_height: 60.0,
            ..Tuning::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let layout = generate(2, &t, &mut rng);
        assert!(layout.beacons.is_empty());
        assert!(layout.obstacles.is_empty());
    }
}
