//! Redis-backed cache façade for the TazeAI gateway.
//!
//! Provides a uniform get/set/delete vocabulary over Redis with an
//! ergonomic compute-if-absent pattern ([`Cache::remember`]) and a
//! namespacing key prefix. Values cross a generic serialization boundary:
//! encoded to JSON on write, decoded with a caller-supplied type on read.

mod cache;
mod error;

pub use cache::{Cache, Remembered};
pub use error::CacheError;
