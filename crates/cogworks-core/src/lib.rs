//! Cogworks Core -- a deterministic gear-board simulation engine.
//!
//! This crate provides the grid store, gear registry, connectivity
//! resolver, rotation propagator, and production accumulator behind a
//! gear-placement puzzle board, with deterministic fixed-point arithmetic
//! throughout.
//!
//! # Operation Pipeline
//!
//! Every successful topology mutation through [`engine::GearEngine`]
//! (spawn, drag placement, removal) runs the same epilogue:
//!
//! 1. **Resolve** -- Recompute the motor-to-character active path from
//!    scratch via dual flood fill.
//! 2. **Activate** -- Stamp every gear's activation flag from the path.
//! 3. **Recalculate** -- Refresh each character's cached fill-per-rotation
//!    yield from the modifiers on the path.
//! 4. **Publish** -- Store the path and emit one
//!    [`event::Event::ActivePathChanged`].
//! 5. **Bookkeeping** -- Increment the tick counter.
//!
//! Rotation is a separate trigger: [`engine::GearEngine::propagate`] walks
//! the physically-meshed cluster, alternating spin per mesh edge, and
//! advances each active character's accumulator once.
//!
//! # Key Types
//!
//! - [`engine::GearEngine`] -- Owns the board and sequences all operations.
//! - [`grid::GearGrid`] -- Dense rectangular cell store with the published
//!   active path.
//! - [`gear::GearRegistry`] -- Slotmap-backed gear storage; four gear
//!   kinds (Motor, Character, Number, Multiplier) parameterized by fixed
//!   subtype tables.
//! - [`link`] -- Stateless connectivity resolution and chain queries.
//! - [`rotate`] -- Geometric meshing test and spin propagation.
//! - [`production`] -- Yield recomputation and threshold spawning.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.
//! - [`event::EventBus`] -- Buffering event bus with per-kind listeners.

pub mod config;
pub mod engine;
pub mod event;
pub mod fixed;
pub mod gear;
pub mod grid;
pub mod id;
pub mod link;
pub mod placement;
pub mod production;
pub mod rng;
pub mod rotate;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
