//! Runtime core: run supervision and exit-code mapping.
//!
//! The public API from this module is [`Supervisor`] (with its builder and
//! [`Config`]), the free functions [`run`] and [`execute`], and the outcome
//! types used to derive exit codes.
//!
//! Internal modules:
//! - [`supervisor`]: root context lifetime, main routine, cleanup, logging;
//! - [`outcome`]: classification of (error, cause) into a [`Verdict`];
//! - [`config`]: supervisor settings;
//! - [`builder`]: supervisor construction with custom collaborators.

mod builder;
mod config;
mod outcome;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::Config;
pub use outcome::{EXIT_FAILURE, EXIT_SUCCESS, Outcome, Verdict};
pub use supervisor::{Supervisor, execute, run};
