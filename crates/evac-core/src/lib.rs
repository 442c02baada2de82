//! `evac-core` — foundational types for the evacuation simulation engine.
//!
//! This crate is a dependency of every other `evac-*` crate.  It has no
//! `evac-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `NodeId`, `EdgeId`                         |
//! | [`geo`]         | `Point` (planar x/y metres), interpolation            |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`config`]      | `SimConfig` and its defaults                          |
//! | [`rng`]         | `SimRng` (simulation-owned, seeded)                   |
//! | [`status`]      | `AgentStatus` enum                                    |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod status;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{SimConfig, validate_speed};
pub use error::{CoreError, CoreResult};
pub use geo::Point;
pub use ids::{AgentId, EdgeId, NodeId};
pub use rng::SimRng;
pub use status::AgentStatus;
pub use time::{SimClock, Tick};
