//! `qs-core` — foundational types for the `rust_qs` queueing simulator.
//!
//! This crate is a dependency of every other `qs-*` crate.  It has no `qs-*`
//! dependencies and few external ones (`rand`, `rand_distr`, `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `ClientId`, `ServerId`                                |
//! | [`time`]        | `Tick`                                                |
//! | [`config`]      | `SimConfig`, `Capacity`                               |
//! | [`rng`]         | `RandomSource`, `SimRng`, `ScriptedSource`            |
//! | [`error`]       | `QsError`, `QsResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to config, ticks, and IDs.  |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{Capacity, SimConfig};
pub use error::{QsError, QsResult};
pub use ids::{ClientId, ServerId};
pub use rng::{RandomSource, ScriptedSource, SimRng};
pub use time::Tick;
