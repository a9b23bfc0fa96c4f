//! OpenSesame firmware library.
//!
//! Exposes the protocol core, ports and adapters for the binary, the
//! integration tests and the fuzz targets. ESP-IDF specific code is guarded
//! by `#[cfg(target_os = "espidf")]` inside each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod geofence;
pub mod link;
pub mod pins;
pub mod scheduler;
