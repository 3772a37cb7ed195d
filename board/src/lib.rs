#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure board algorithms for the Rescue Replay engine.
//!
//! Everything in this crate is a deterministic function of its inputs: the
//! wall codec translating per-row code strings into an edge grid, the
//! coordinate mapper between board cells and world positions, and the door
//! geometry resolver. State, identity and lifecycle live in the scene crate;
//! nothing here touches a sink or retains data between calls.

pub mod codec;
pub mod doors;
pub mod mapper;
