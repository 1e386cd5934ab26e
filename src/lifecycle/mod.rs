//! Process lifecycle.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → wait_for_signal() returns
//!
//! Shutdown (shutdown.rs):
//!     trigger() → servers stop accepting → in-flight requests drain → exit
//!     (main gives the drain a deadline)
//! ```
//!
//! # Design Decisions
//! - One broadcast channel fans the shutdown out to every server task

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
