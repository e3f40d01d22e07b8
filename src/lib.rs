pub mod client;
pub mod config;
pub mod controller;
pub mod snapshot;
pub mod view;

pub use client::{ClientError, GameBackend, HttpBackend};
pub use config::{load_config, Config};
pub use controller::{Controller, Timings};
