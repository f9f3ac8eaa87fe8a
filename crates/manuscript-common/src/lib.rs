//! manuscript-common: capabilities shared by the manuscript crates.
//!
//! This crate provides:
//! - `Clock` / `IdGenerator` - injected sources of time and entity ids
//! - `SyncConfig` - sync endpoint configuration with file/env loading
//! - `telemetry` - tracing subscriber setup

pub mod clock;
pub mod config;
pub mod telemetry;

pub use clock::{
    Clock, IdGenerator, ManualClock, MonotonicClock, RandomIdGenerator, SequentialIdGenerator,
    SystemClock, WallClock,
};
pub use config::{FileStore, Loader, Saver, SyncConfig};
