//! # Domain
//!
//! Plain data shared by every crate: configuration shapes, well-known names and the
//! feature slice registry. No I/O lives here.

pub mod config;
pub mod constants;
pub mod registry;
