//! Voice engine
//!
//! Wires the speech services and the responder into one event loop behind
//! an `EngineHandle`.

pub mod config;
pub mod orchestrator;

pub use config::EngineConfig;
pub use orchestrator::{EngineHandle, Orchestrator};
