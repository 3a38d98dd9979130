#![forbid(unsafe_code)]

//! Core: geometric primitives shared across tilery crates.
//!
//! # Role in tilery
//! `tilery-core` owns the plain value types that cross crate boundaries.
//! The layout engine (`tilery-layout`) computes [`geometry::Rect`]s and hands
//! them to clients; window-manager shells construct them from monitor
//! geometry. Nothing here allocates or logs.

pub mod geometry;

pub use geometry::Rect;
