//! The game model. Nothing in here touches the terminal; a session is
//! driven purely by [`Intents`] and a seeded RNG.

pub mod collision;
pub mod entities;
pub mod level;
pub mod particles;
pub mod player;
pub mod session;
pub mod vec2;

pub use session::{GameSession, GameState, Hud, Intents};
