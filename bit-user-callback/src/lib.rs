//! Back In Time user-callback waking a backup server
//!
//! When Back In Time asks to mount the drives of the configured profile and
//! the laptop is on the home wireless network, send a Wake-on-LAN packet to
//! the backup server and wait until it answers over HTTP:
//! - Invocation gate (profile + reason code)
//! - Wireless presence check via `iwconfig`
//! - Single wake packet per run
//! - Fixed-delay readiness polling with timeout

pub mod config;
pub mod discovery;
pub mod duration;
pub mod error;
pub mod gate;
pub mod logging;
pub mod orchestrator;
pub mod readiness;
pub mod setup;
pub mod wol;

#[cfg(test)]
mod testing;

pub use config::CallbackConfig;
pub use duration::HumanDuration;
pub use error::CallbackError;
pub use gate::{Invocation, Reason};
pub use orchestrator::{Orchestrator, Outcome};
