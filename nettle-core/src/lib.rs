//! Procedural nettle growth, animation and lifecycle.
//!
//! Main components:
//! - [`motion`] - eased tweens driving sizes and offsets.
//! - [`branch`] - fixed-shape binary branch trees.
//! - [`root`] - size-budgeted rendering of the woody skeleton.
//! - [`plant`] - the leafy canopy fractal and its pluck animation.
//! - [`nettle`] - one plant and its lifecycle.
//! - [`population`] - the z-ordered collection and the pluck/rhizome rules.
//! - [`sketch`] - frame loop and pointer handling over a population.
//! - [`canvas`] - drawing surface trait and a recording implementation.
//! - [`frame`] - per-frame clock, noise offset and seeded randomness.
//! - [`config`] - tunable constants.
//! - [`types`] - shared ids and colours.

pub mod branch;
pub mod canvas;
pub mod config;
pub mod frame;
pub mod motion;
pub mod nettle;
pub mod plant;
pub mod population;
pub mod root;
pub mod sketch;
pub mod types;
