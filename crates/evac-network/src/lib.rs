//! `evac-network` — the immutable road network and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `NetworkModel` (undirected CSR), `NetworkBuilder`           |
//! | [`targets`] | `TargetSet` — ordered target nodes + shared capacity        |
//! | [`router`]  | `Router` trait, `Route`, `DijkstraRouter` (multi-target)   |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                         |
//!
//! Hazard filtering, OSM parsing, and snapping happen before a network gets
//! here: the builder receives the final node and edge lists and the model is
//! never mutated after `build()`.
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | FxHash for the target lookup map.                          |
//! | `serde`   | Derives `Serialize`/`Deserialize` on public types.         |

pub mod error;
pub mod network;
pub mod router;
pub mod targets;


pub use error::{NetworkError, NetworkResult};
pub use network::{NetworkBuilder, NetworkModel};
pub use router::{DijkstraRouter, Route, Router};
pub use targets::TargetSet;
