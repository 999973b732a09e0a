//! Gameplay tuning loaded from a TOML file.
//!
//! [`Tuning`] holds every force, tolerance, count and timer the simulation
//! uses. The compiled defaults below are the authoritative values; a TOML file
//! only needs the keys it wants to change:
//!
//! ```toml
//! gravity = 0.03
//! max_fuel = 150.0
//! ```
//!
//! Forces are per-tick deltas. The simulation assumes a fixed `frame_ms`
//! timestep and never rescales them by wall-clock time.

use std::path::Path;

use serde::Deserialize;

use crate::error::{GameError, GameResult};

// ── Field ────────────────────────────────────────────────────────────────────
const FIELD_WIDTH: f64 = 800.0;
const FIELD_HEIGHT: f64 = 600.0;
const GROUND_HEIGHT: f64 = 50.0;
const SHIP_WIDTH: f64 = 20.0;
const SHIP_HEIGHT: f64 = 15.0;

// ── Ship physics ─────────────────────────────────────────────────────────────
const THRUST_FORCE: f64 = 0.33;
const BOOST_FORCE: f64 = 0.66;
const BOOST_TAKEOFF_KICK: f64 = 5.0;
const ROTATION_SPEED: f64 = 4.0;
const GRAVITY: f64 = 0.02;
const FRICTION: f64 = 0.995;
const MAX_SPEED: f64 = 12.0;
const MAX_FUEL: f64 = 100.0;
const FUEL_CONSUMPTION: f64 = 0.1;
const BOOST_FUEL_CONSUMPTION: f64 = 0.3;
const FUEL_RECHARGE_RATE: f64 = 0.5;
const LANDING_ANGLE_TOLERANCE: f64 = 15.0;
const LANDING_SPEED_TOLERANCE: f64 = 1.5;
const GEAR_DEPLOY_ALTITUDE: f64 = 120.0;
const GEAR_DEPLOY_ANGLE_TOLERANCE: f64 = 45.0;

// ── Weapons & targets ────────────────────────────────────────────────────────
const LASER_SPEED: f64 = 8.0;
const LASER_LENGTH: f64 = 6.0;
const LASER_COOLDOWN_MS: f64 = 200.0;
const BEACONS_BASE: u32 = 5;
const BEACON_RADIUS: f64 = 10.0;
const BEACON_SCORE: u32 = 100;
const OBSTACLE_RADIUS_MIN: u32 = 15;
const OBSTACLE_RADIUS_MAX: u32 = 30;
const OBSTACLES_PER_LEVEL: u32 = 2;
const SPAWN_ATTEMPTS: u32 = 200;

// ── Particles ────────────────────────────────────────────────────────────────
const SMOKE_PARTICLE_COUNT: u32 = 25;
const SMOKE_LIFESPAN_MIN: f64 = 0.4;
const SMOKE_LIFESPAN_MAX: f64 = 0.9;
const SMOKE_SPEED_MIN: f64 = 0.5;
const SMOKE_SPEED_MAX: f64 = 2.5;
const EXPLOSION_PARTICLE_COUNT: u32 = 50;
const EXPLOSION_LIFESPAN_MIN: f64 = 0.5;
const EXPLOSION_LIFESPAN_MAX: f64 = 1.2;
const EXPLOSION_SPEED_MIN: f64 = 1.0;
const EXPLOSION_SPEED_MAX: f64 = 4.0;

// ── Session ──────────────────────────────────────────────────────────────────
const DEATH_ANIM_MS: f64 = 1000.0;
const INITIAL_SHIPS: u32 = 3;
const EXTRA_LIFE_SCORE: u32 = 1000;
const LEVEL_BONUS: u32 = 500;
const LEVEL_COMPLETE_PAUSE_MS: f64 = 2000.0;
const GAME_OVER_PAUSE_MS: f64 = 2500.0;
const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // ── Field ───────────────────────────────────────────────────────────────
    pub field_width: f64,
    pub field_height: f64,
    pub ground_height: f64,
    pub ship_width: f64,
    pub ship_height: f64,

    // ── Ship physics ────────────────────────────────────────────────────────
    pub thrust_force: f64,
    pub boost_force: f64,
    pub boost_takeoff_kick: f64,
    /// Degrees per tick.
    pub rotation_speed: f64,
    pub gravity: f64,
    /// Velocity multiplier applied every airborne tick.
    pub friction: f64,
    pub max_speed: f64,
    pub max_fuel: f64,
    pub fuel_consumption: f64,
    pub boost_fuel_consumption: f64,
    pub fuel_recharge_rate: f64,
    /// Max degrees away from upright for a legal landing.
    pub landing_angle_tolerance: f64,
    pub landing_speed_tolerance: f64,
    pub gear_deploy_altitude: f64,
    pub gear_deploy_angle_tolerance: f64,

    // ── Weapons & targets ───────────────────────────────────────────────────
    pub laser_speed: f64,
    pub laser_length: f64,
    pub laser_cooldown_ms: f64,
    pub beacons_base: u32,
    pub beacon_radius: f64,
    pub beacon_score: u32,
    pub obstacle_radius_min: u32,
    pub obstacle_radius_max: u32,
    pub obstacles_per_level: u32,
    /// Placement tries per beacon/obstacle before it is skipped.
    pub spawn_attempts: u32,

    // ── Particles ───────────────────────────────────────────────────────────
    pub smoke_particle_count: u32,
    pub smoke_lifespan_min: f64,
    pub smoke_lifespan_max: f64,
    pub smoke_speed_min: f64,
    pub smoke_speed_max: f64,
    pub explosion_particle_count: u32,
    pub explosion_lifespan_min: f64,
    pub explosion_lifespan_max: f64,
    pub explosion_speed_min: f64,
    pub explosion_speed_max: f64,

    // ── Session ─────────────────────────────────────────────────────────────
    pub death_anim_ms: f64,
    pub initial_ships: u32,
    pub extra_life_score: u32,
    pub level_bonus: u32,
    pub level_complete_pause_ms: f64,
    pub game_over_pause_ms: f64,
    /// Simulated milliseconds per update.
    pub frame_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            ground_height: GROUND_HEIGHT,
            ship_width: SHIP_WIDTH,
            ship_height: SHIP_HEIGHT,
            thrust_force: THRUST_FORCE,
            boost_force: BOOST_FORCE,
            boost_takeoff_kick: BOOST_TAKEOFF_KICK,
            rotation_speed: ROTATION_SPEED,
            gravity: GRAVITY,
            friction: FRICTION,
            max_speed: MAX_SPEED,
            max_fuel: MAX_FUEL,
            fuel_consumption: FUEL_CONSUMPTION,
            boost_fuel_consumption: BOOST_FUEL_CONSUMPTION,
            fuel_recharge_rate: FUEL_RECHARGE_RATE,
            landing_angle_tolerance: LANDING_ANGLE_TOLERANCE,
            landing_speed_tolerance: LANDING_SPEED_TOLERANCE,
            gear_deploy_altitude: GEAR_DEPLOY_ALTITUDE,
            gear_deploy_angle_tolerance: GEAR_DEPLOY_ANGLE_TOLERANCE,
            laser_speed: LASER_SPEED,
            laser_length: LASER_LENGTH,
            laser_cooldown_ms: LASER_COOLDOWN_MS,
            beacons_base: BEACONS_BASE,
            beacon_radius: BEACON_RADIUS,
            beacon_score: BEACON_SCORE,
            obstacle_radius_min: OBSTACLE_RADIUS_MIN,
            obstacle_radius_max: OBSTACLE_RADIUS_MAX,
            obstacles_per_level: OBSTACLES_PER_LEVEL,
            spawn_attempts: SPAWN_ATTEMPTS,
            smoke_particle_count: SMOKE_PARTICLE_COUNT,
            smoke_lifespan_min: SMOKE_LIFESPAN_MIN,
            smoke_lifespan_max: SMOKE_LIFESPAN_MAX,
            smoke_speed_min: SMOKE_SPEED_MIN,
            smoke_speed_max: SMOKE_SPEED_MAX,
            explosion_particle_count: EXPLOSION_PARTICLE_COUNT,
            explosion_lifespan_min: EXPLOSION_LIFESPAN_MIN,
            explosion_lifespan_max: EXPLOSION_LIFESPAN_MAX,
            explosion_speed_min: EXPLOSION_SPEED_MIN,
            explosion_speed_max: EXPLOSION_SPEED_MAX,
            death_anim_ms: DEATH_ANIM_MS,
            initial_ships: INITIAL_SHIPS,
            extra_life_score: EXTRA_LIFE_SCORE,
            level_bonus: LEVEL_BONUS,
            level_complete_pause_ms: LEVEL_COMPLETE_PAUSE_MS,
            game_over_pause_ms: GAME_OVER_PAUSE_MS,
            frame_ms: FRAME_MS,
        }
    }
}

impl Tuning {
    /// Read and validate a tuning file. Keys absent from the file keep
    /// their compiled defaults.
    pub fn load(path: &Path) -> GameResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|err| match err {
            GameError::ConfigParse { source, .. } => GameError::ConfigParse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml(text: &str) -> GameResult<Self> {
        let tuning: Tuning = toml::from_str(text).map_err(|source| GameError::ConfigParse {
            path: "<inline>".into(),
            source,
        })?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Like [`Tuning::load`], but never fails: a missing file is normal, and
    /// a broken one is logged before falling back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(tuning) => {
                tracing::info!("loaded tuning from {}", path.display());
                tuning
            }
            Err(GameError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no tuning file at {}; using compiled defaults", path.display());
                Self::default()
            }
            Err(err) => {
                tracing::warn!("{err}; using compiled defaults");
                Self::default()
            }
        }
    }

    fn float_fields(&self) -> [(&'static str, f64); 36] {
        [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("ground_height", self.ground_height),
            ("ship_width", self.ship_width),
            ("ship_height", self.ship_height),
            ("thrust_force", self.thrust_force),
            ("boost_force", self.boost_force),
            ("boost_takeoff_kick", self.boost_takeoff_kick),
            ("rotation_speed", self.rotation_speed),
            ("gravity", self.gravity),
            ("friction", self.friction),
            ("max_speed", self.max_speed),
            ("max_fuel", self.max_fuel),
            ("fuel_consumption", self.fuel_consumption),
            ("boost_fuel_consumption", self.boost_fuel_consumption),
            ("fuel_recharge_rate", self.fuel_recharge_rate),
            ("landing_angle_tolerance", self.landing_angle_tolerance),
            ("landing_speed_tolerance", self.landing_speed_tolerance),
            ("gear_deploy_altitude", self.gear_deploy_altitude),
            ("gear_deploy_angle_tolerance", self.gear_deploy_angle_tolerance),
            ("laser_speed", self.laser_speed),
            ("laser_length", self.laser_length),
            ("laser_cooldown_ms", self.laser_cooldown_ms),
            ("beacon_radius", self.beacon_radius),
            ("smoke_lifespan_min", self.smoke_lifespan_min),
            ("smoke_lifespan_max", self.smoke_lifespan_max),
            ("smoke_speed_min", self.smoke_speed_min),
            ("smoke_speed_max", self.smoke_speed_max),
            ("explosion_lifespan_min", self.explosion_lifespan_min),
            ("explosion_lifespan_max", self.explosion_lifespan_max),
            ("explosion_speed_min", self.explosion_speed_min),
            ("explosion_speed_max", self.explosion_speed_max),
            ("death_anim_ms", self.death_anim_ms),
            ("level_complete_pause_ms", self.level_complete_pause_ms),
            ("game_over_pause_ms", self.game_over_pause_ms),
            ("frame_ms", self.frame_ms),
        ]
    }

    pub fn validate(&self) -> GameResult<()> {
        for (name, value) in self.float_fields() {
            if !value.is_finite() {
                return Err(GameError::InvalidTuning {
                    name,
                    value,
                    expected: "a finite number",
                });
            }
        }
        positive("field_width", self.field_width)?;
        positive("field_height", self.field_height)?;
        positive("ship_width", self.ship_width)?;
        positive("ship_height", self.ship_height)?;
        positive("max_fuel", self.max_fuel)?;
        positive("max_speed", self.max_speed)?;
        positive("frame_ms", self.frame_ms)?;
        positive("extra_life_score", self.extra_life_score as f64)?;
        if self.ground_height < 0.0 || self.ground_height >= self.field_height {
            return Err(GameError::InvalidTuning {
                name: "ground_height",
                value: self.ground_height,
                expected: "[0, field_height)",
            });
        }
        if self.friction <= 0.0 || self.friction > 1.0 {
            return Err(GameError::InvalidTuning {
                name: "friction",
                value: self.friction,
                expected: "(0, 1]",
            });
        }
        if self.obstacle_radius_min > self.obstacle_radius_max {
            return Err(GameError::InvalidTuning {
                name: "obstacle_radius_min",
                value: self.obstacle_radius_min as f64,
                expected: "<= obstacle_radius_max",
            });
        }
        ordered("smoke_speed_min", self.smoke_speed_min, self.smoke_speed_max)?;
        ordered("smoke_lifespan_min", self.smoke_lifespan_min, self.smoke_lifespan_max)?;
        ordered("explosion_speed_min", self.explosion_speed_min, self.explosion_speed_max)?;
        ordered(
            "explosion_lifespan_min",
            self.explosion_lifespan_min,
            self.explosion_lifespan_max,
        )?;
        non_negative("death_anim_ms", self.death_anim_ms)?;
        non_negative("level_complete_pause_ms", self.level_complete_pause_ms)?;
        non_negative("game_over_pause_ms", self.game_over_pause_ms)?;
        non_negative("laser_cooldown_ms", self.laser_cooldown_ms)?;
        Ok(())
    }

    /// y coordinate of the ground line; everything below is terrain.
    pub fn ground_y(&self) -> f64 {
        self.field_height - self.ground_height
    }
}

fn positive(name: &'static str, value: f64) -> GameResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(GameError::InvalidTuning {
            name,
            value,
            expected: "> 0",
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> GameResult<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(GameError::InvalidTuning {
            name,
            value,
            expected: ">= 0",
        })
    }
}

/// Particle ranges are sampled with `min..=max`, which needs min <= max.
fn ordered(name: &'static str, min: f64, max: f64) -> GameResult<()> {
    if min <= max {
        Ok(())
    } else {
        Err(GameError::InvalidTuning {
            name,
            value: min,
            expected: "<= the matching max",
        })
    }
}
