//! Core dispatcher configuration
//!
//! Holds the tunable constants of the depth-key rules and the buffer/orderer
//! policies, loadable from TOML or RON through [`crate::config::Config`].

pub mod config;

pub use config::{DispatchConfig, CapacityPolicy, OrderStrategy, MAX_CAPACITY};
