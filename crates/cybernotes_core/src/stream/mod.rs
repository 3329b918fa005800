//! Change notification for note collections.
//!
//! # Responsibility
//! - Fan out complete note snapshots to every subscriber of a store.
//! - Replay the latest snapshot to new subscribers.
//!
//! # Invariants
//! - Snapshot versions strictly increase per publisher.
//! - A subscriber never receives a snapshot older than one it already got.

pub mod snapshot;
