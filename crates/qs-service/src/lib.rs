//! `qs-service` — clients and the servers that serve them.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`client`]  | `ClientRecord`, `ClientStatus`, `CompletionRecord`                |
//! | [`server`]  | `ServerUnit`, `ServerState` — per-server countdown state machine  |
//! | [`error`]   | `ServiceError`, `ServiceResult<T>`                                |
//!
//! # Service model (tick countdown)
//!
//! 1. `ServerUnit::assign` takes ownership of a waiting client at tick `t`,
//!    stamps its service start, and samples a whole-tick duration `d ≥ 1`.
//! 2. Every later tick, `ServerUnit::advance` first checks for completion and
//!    otherwise consumes one tick of work.
//! 3. After `d` units of work the next `advance` (at tick `t + d + 1`) stamps the
//!    departure, releases the client, and returns a `CompletionRecord`.

pub mod client;
pub mod error;
pub mod server;


pub use client::{ClientRecord, ClientStatus, CompletionRecord};
pub use error::{ServiceError, ServiceResult};
pub use server::{ServerState, ServerUnit};
