//! Core configuration and constants for the TazeAI gateway.
//!
//! This crate is the leaf dependency of everything else: it validates
//! process configuration and centralizes shared constants.

mod config;
mod constants;
mod env_config;
mod error;

pub use config::*;
pub use constants::*;
pub use env_config::*;
pub use error::*;
