//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the dispatcher:
//! - Math types shared with the projection collaborator
//! - Non-owning object handles
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
