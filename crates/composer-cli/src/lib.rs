//! Composer command line
//!
//! `composer run` walks the article wizard from keywords to export, live
//! against the automation backend, simulated, or live with simulated fallback.
//! The other subcommands expose the link validator and the backend utilities.

pub mod cli;
pub mod wizard;

pub use cli::{Cli, Command};
pub use wizard::{RunMode, Wizard, WizardOptions, WizardSummary};
