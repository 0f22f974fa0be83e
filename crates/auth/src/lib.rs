//! Session validation for the TazeAI gateway.
//!
//! Session lifecycle (issuance, OAuth, OTP) is owned by the identity
//! provider; this crate supplies the storage adapter it plugs into and a
//! read path: token from the request headers, looked up in the cache
//! store first, the relational `sessions` table second.

mod error;
mod session;
mod storage;

pub use error::AuthError;
pub use session::{Auth, Session};
pub use storage::{CacheSessionStorage, SessionStorage};
