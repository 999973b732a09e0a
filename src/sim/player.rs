//! Ship physics: thrust, gravity, friction, fuel, landing gear and the
//! land-or-crash decision on touchdown.
//!
//! Every quantity is a per-tick delta. One call to [`Player::update`] is one
//! frame; nothing here looks at wall-clock time.

use crate::config::Tuning;

use super::collision::Aabb;
use super::entities::Laser;
use super::vec2::Vec2;

/// Heading of a ship pointing straight up (y grows downward).
pub const UPRIGHT: f64 = 270.0;

// Fuel left over from float subtraction below this is treated as empty.
const FUEL_EPSILON: f64 = 1e-9;

/// Degrees between `angle` and upright, folded into [0, 180].
pub fn upright_deviation(angle: f64) -> f64 {
    ((angle - UPRIGHT + 180.0).rem_euclid(360.0) - 180.0).abs()
}

fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round a tiny negative up to exactly 360.0
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Degrees in [0, 360). 0 faces right, 270 faces up.
    pub angle: f64,
    pub fuel: f64,
    pub thrusting: bool,
    pub boosting: bool,
    pub landed: bool,
    pub crashed: bool,
    pub gear_deployed: bool,
    /// Set for exactly the frame of a legal touchdown.
    pub just_landed: bool,
    /// Set for exactly the frame of a boost takeoff.
    pub just_took_off: bool,
    pub last_shot_ms: Option<f64>,
}

impl Player {
    /// A fresh ship at the spawn point, upright, fully fuelled.
    pub fn spawn(tuning: &Tuning) -> Self {
        Self {
            pos: Self::spawn_point(tuning),
            vel: Vec2::ZERO,
            angle: UPRIGHT,
            fuel: tuning.max_fuel,
            thrusting: false,
            boosting: false,
            landed: false,
            crashed: false,
            gear_deployed: false,
            just_landed: false,
            just_took_off: false,
            last_shot_ms: None,
        }
    }

    pub fn spawn_point(tuning: &Tuning) -> Vec2 {
        Vec2::new(
            (tuning.field_width / 2.0).floor(),
            (tuning.field_height / 4.0).floor(),
        )
    }

    /// Width and height of the axis-aligned box around the rotated hull.
    pub fn bounding_size(&self, tuning: &Tuning) -> (f64, f64) {
        rotated_box(tuning.ship_width, tuning.ship_height, self.angle)
    }

    pub fn bounds(&self, tuning: &Tuning) -> Aabb {
        let (w, h) = self.bounding_size(tuning);
        Aabb::centered(self.pos, w, h)
    }

    pub fn bottom(&self, tuning: &Tuning) -> f64 {
        self.pos.y + self.bounding_size(tuning).1 / 2.0
    }

    /// World-space hull triangle: nose, then the two tail corners.
    pub fn hull(&self, tuning: &Tuning) -> [Vec2; 3] {
        let hw = tuning.ship_width / 2.0;
        let hh = tuning.ship_height / 2.0;
        [
            Vec2::new(hw, 0.0),
            Vec2::new(-hw, -hh),
            Vec2::new(-hw, hh),
        ]
        .map(|corner| self.pos + corner.rotated(self.angle))
    }

    /// Where a flame or exhaust would come out.
    pub fn tail(&self, tuning: &Tuning) -> Vec2 {
        self.pos - Vec2::from_degrees(self.angle) * (tuning.ship_width / 2.0 + 2.0)
    }

    pub fn is_out_of_fuel(&self) -> bool {
        self.fuel <= 0.0 && !self.landed
    }

    /// Turn by `direction` steps of the rotation speed. Landed ships are
    /// locked upright.
    pub fn rotate(&mut self, direction: i32, tuning: &Tuning) {
        if self.landed {
            return;
        }
        self.angle = normalize_angle(self.angle + direction as f64 * tuning.rotation_speed);
    }

    /// Fire from the nose if the cooldown has passed. Landed or wrecked
    /// ships can't shoot.
    pub fn shoot(&mut self, now_ms: f64, tuning: &Tuning) -> Option<Laser> {
        if self.landed || self.crashed {
            return None;
        }
        if let Some(last) = self.last_shot_ms {
            if now_ms - last <= tuning.laser_cooldown_ms {
                return None;
            }
        }
        self.last_shot_ms = Some(now_ms);
        let nose = self.pos + Vec2::from_degrees(self.angle) * (tuning.ship_width / 2.0 + 5.0);
        Some(Laser::new(nose, self.angle, tuning.laser_speed, now_ms))
    }

    /// Obstacle hits and bad landings both end up here.
    pub fn mark_crashed(&mut self) {
        self.crashed = true;
        self.landed = false;
        self.thrusting = false;
        self.boosting = false;
    }

    /// Advance one tick with the given held intents.
    pub fn update(&mut self, thrust: bool, boost: bool, tuning: &Tuning) {
        self.just_landed = false;
        self.just_took_off = false;
        self.thrusting = false;
        self.boosting = false;
        if self.crashed {
            return;
        }

        let ground_y = tuning.ground_y();

        // ── 1. Landing gear ──────────────────────────────────────────────────
        let altitude = ground_y - self.bottom(tuning);
        self.gear_deployed = altitude <= tuning.gear_deploy_altitude
            && upright_deviation(self.angle) <= tuning.gear_deploy_angle_tolerance
            && !self.landed;

        // ── 2. Thrust ────────────────────────────────────────────────────────
        let mut acc = Vec2::ZERO;
        if thrust && self.fuel > 0.0 {
            if boost && self.has_fuel_for(tuning.boost_fuel_consumption) {
                self.boosting = true;
                self.thrusting = true;
                self.burn(tuning.boost_fuel_consumption);
                if self.landed {
                    self.vel.y -= tuning.boost_takeoff_kick;
                    self.landed = false;
                    self.gear_deployed = false;
                    self.just_took_off = true;
                    tracing::debug!("boost takeoff, fuel {:.1}", self.fuel);
                } else {
                    acc = Vec2::from_degrees(self.angle) * tuning.boost_force;
                }
            } else if !boost && !self.landed && self.has_fuel_for(tuning.fuel_consumption) {
                self.thrusting = true;
                self.burn(tuning.fuel_consumption);
                acc = Vec2::from_degrees(self.angle) * tuning.thrust_force;
            }
        }

        // ── 3. Integrate velocity ────────────────────────────────────────────
        self.vel += acc;
        if !self.landed {
            self.vel.y += tuning.gravity;
            self.vel *= tuning.friction;
        }

        // ── 4. Speed cap ─────────────────────────────────────────────────────
        if self.vel.length() > tuning.max_speed {
            self.vel = self.vel.scale_to_length(tuning.max_speed);
        }

        // ── 5. Position ──────────────────────────────────────────────────────
        if !self.landed {
            self.pos += self.vel;
        }

        // ── 6. Horizontal wrap, ceiling clamp ────────────────────────────────
        let (w, h) = self.bounding_size(tuning);
        if self.pos.x > tuning.field_width + w / 2.0 {
            self.pos.x = -w / 2.0;
        } else if self.pos.x < -w / 2.0 {
            self.pos.x = tuning.field_width + w / 2.0;
        }
        if self.pos.y < h / 2.0 {
            self.pos.y = h / 2.0;
            if self.vel.y < 0.0 {
                self.vel.y = 0.0;
            }
        }

        // ── 7. Touchdown ─────────────────────────────────────────────────────
        if self.landed || self.pos.y + h / 2.0 >= ground_y {
            if !self.landed {
                self.touch_down(tuning);
            }
            // ── 8. Refuel on the pad ─────────────────────────────────────────
            if self.landed {
                self.fuel = (self.fuel + tuning.fuel_recharge_rate).min(tuning.max_fuel);
            }
        }

        debug_assert!(self.fuel >= 0.0 && self.fuel <= tuning.max_fuel);
        debug_assert!((0.0..360.0).contains(&self.angle));
        debug_assert!(!(self.landed && self.crashed));
    }

    fn touch_down(&mut self, tuning: &Tuning) {
        let upright = upright_deviation(self.angle) <= tuning.landing_angle_tolerance;
        let gentle = self.vel.length() <= tuning.landing_speed_tolerance;
        if upright && gentle {
            self.angle = UPRIGHT;
            let (_, h) = self.bounding_size(tuning);
            self.pos.y = tuning.ground_y() - h / 2.0;
            self.vel = Vec2::ZERO;
            self.gear_deployed = true;
            self.landed = true;
            self.just_landed = true;
            tracing::debug!("landed at x={:.0}", self.pos.x);
        } else {
            tracing::debug!(
                "crash landing: deviation {:.1}, speed {:.2}",
                upright_deviation(self.angle),
                self.vel.length()
            );
            self.mark_crashed();
        }
    }

    fn has_fuel_for(&self, cost: f64) -> bool {
        self.fuel + FUEL_EPSILON >= cost
    }

    fn burn(&mut self, cost: f64) {
        self.fuel -= cost;
        if self.fuel < FUEL_EPSILON {
            self.fuel = 0.0;
        }
    }
}

fn rotated_box(w: f64, h: f64, angle: f64) -> (f64, f64) {
    let (sin, cos) = angle.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    (w * cos + h * sin, w * sin + h * cos)
}
