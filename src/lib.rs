//! Artforge - artwork resolution engine for personal media libraries
//!
//! This library crate exposes the core functionality for integration testing.

pub mod art;
pub mod config;
pub mod gatherer;
pub mod library;
pub mod media;
pub mod notify;
pub mod picker;
pub mod processor;
pub mod providers;
pub mod schedule;
pub mod selection;
