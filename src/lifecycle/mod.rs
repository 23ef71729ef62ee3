//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main):
//!     Load config → Init observability → Open store → First sync → Serve API
//!
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → broadcast → sync loop and API server exit
//! ```
//!
//! # Design Decisions
//! - Startup sync must complete before the API is considered ready
//! - Shutdown is a broadcast every long-running task subscribes to

pub mod shutdown;

pub use shutdown::Shutdown;
