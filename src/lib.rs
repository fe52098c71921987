//! Core of a maze-chase arcade game.
//!
//! A maze is generated once from a random or static piece layout, then a
//! player and a set of ghosts move through it one tick at a time. Ghosts
//! fall back to A* pathfinding towards the player whenever they reach a
//! junction or a dead end.

pub mod collision;
pub mod components;
pub mod config;
pub mod error;
pub mod game;
pub mod ghost;
pub mod level;
pub mod motion;
pub mod network;
pub mod pathfinding;
pub mod player;


pub use components::Direction;
pub use config::GameOptions;
pub use error::{ConfigError, GameError, MessageError};
pub use game::{Game, GameMode, GameState};
pub use level::Grid;
