use crate::config::Tuning;

use super::entities::{EntitySet, Lifecycle};
use super::vec2::Vec2;

/// Axis-aligned box, used for placement checks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn centered(center: Vec2, width: f64, height: f64) -> Self {
        let half = Vec2::new(width / 2.0, height / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap: boxes that only share an edge don't collide.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Radius of the circle through the corners.
    pub fn circumradius(&self) -> f64 {
        (self.max - self.min).length() / 2.0
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

pub fn circles_overlap(a: Vec2, ra: f64, b: Vec2, rb: f64) -> bool {
    let reach = ra + rb;
    let d = a - b;
    d.dot(d) < reach * reach
}

pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn point_in_triangle(p: Vec2, tri: &[Vec2; 3]) -> bool {
    let cross = |a: Vec2, b: Vec2, c: Vec2| (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    let d1 = cross(tri[0], tri[1], p);
    let d2 = cross(tri[1], tri[2], p);
    let d3 = cross(tri[2], tri[0], p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Exact shape test between the ship hull and a round obstacle.
pub fn triangle_circle_overlap(tri: &[Vec2; 3], center: Vec2, radius: f64) -> bool {
    if point_in_triangle(center, tri) {
        return true;
    }
    (0..3).any(|i| point_segment_distance(center, tri[i], tri[(i + 1) % 3]) <= radius)
}

/// What happened during one collision pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub beacons_destroyed: u32,
    pub points: u32,
    pub obstacle_hit: bool,
}

/// Resolve laser↔beacon and ship↔obstacle contacts. Hit entities are only
/// marked; the caller sweeps them afterwards. Beacons and the ship never
/// interact directly.
pub fn resolve(entities: &mut EntitySet, tuning: &Tuning) -> CollisionReport {
    let mut report = CollisionReport::default();

    // ── Lasers ↔ beacons ─────────────────────────────────────────────────────
    for laser in entities.lasers.iter_mut().filter(|l| l.lifecycle.is_alive()) {
        let (a, b) = laser.segment(tuning.laser_length);
        let hit = entities
            .beacons
            .iter_mut()
            .filter(|beacon| beacon.lifecycle.is_alive())
            .find(|beacon| point_segment_distance(beacon.pos, a, b) <= beacon.radius + 1.0);
        if let Some(beacon) = hit {
            beacon.lifecycle = Lifecycle::PendingRemoval;
            laser.lifecycle = Lifecycle::PendingRemoval;
            report.beacons_destroyed += 1;
            report.points += beacon.score;
            tracing::debug!("beacon hit at ({:.0}, {:.0})", beacon.pos.x, beacon.pos.y);
        }
    }

    // ── Ship ↔ obstacles ─────────────────────────────────────────────────────
    if let Some(player) = entities.player.as_mut() {
        if !player.crashed {
            let hull = player.hull(tuning);
            if entities
                .obstacles
                .iter()
                .any(|o| triangle_circle_overlap(&hull, o.pos, o.radius))
            {
                player.mark_crashed();
                report.obstacle_hit = true;
                tracing::debug!("ship hit an obstacle");
            }
        }
    }

    report
}
