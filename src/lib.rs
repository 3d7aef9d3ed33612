//! citymap library
//!
//! This module exposes the pipeline pieces for use by the binary and in
//! integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod map;
pub mod resolver;
