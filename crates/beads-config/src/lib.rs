//! Configuration management for the beads system.
//!
//! Loads and layers `server.yaml`/`.beads/config.yaml`-equivalent repo
//! configuration and provides typed access to the result.

pub mod config;
