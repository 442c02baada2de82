//! `evac-agent` — evacuee movement and rerouting.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`agent`]     | `Agent` record and its `step` state machine, `StepOutcome`   |
//! | [`occupancy`] | `TargetOccupancy` — admitted-agent counts per target         |
//! | [`error`]     | `AgentError`, `AgentResult<T>`                               |
//!
//! # Movement model
//!
//! Agents move continuously along their route.  Each tick an agent receives a
//! distance budget (`speed × tick duration`) and spends it edge by edge:
//!
//! 1. Whole edges are consumed while the budget covers the distance to the
//!    next route node.
//! 2. On reaching the route's last node the agent asks the target for
//!    admission.  Admitted → **Evacuated**.  Full → the target is dropped from
//!    the agent's candidates, the reroute counter goes up, and a new route is
//!    computed from the current node.  No reachable candidate → **Stranded**.
//!    A new route is followed immediately with whatever budget is left.
//! 3. A budget too small for the next node is added to the distance along the
//!    current edge.
//!
//! Candidates only ever shrink, so the reroute loop inside one `step` is
//! bounded by the number of targets.

pub mod agent;
pub mod error;
pub mod occupancy;


pub use agent::{Agent, StepOutcome};
pub use error::{AgentError, AgentResult};
pub use occupancy::TargetOccupancy;
