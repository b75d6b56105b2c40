//! Two small shell utilities sharing one crate:
//!
//! * `install-theme` compiles a prompt format string ([`layout`]) and writes a
//!   shell prompt configuration ([`theme`], [`installer`]).
//! * `ai-commit` gathers a size-bounded diff report ([`diff_report`]), asks a
//!   model for a commit message ([`llm`]) and commits it ([`git`]).

pub mod cli_args;
pub mod config;
pub mod diff_report;
pub mod git;
pub mod installer;
pub mod layout;
pub mod llm;
pub mod logging;
pub mod setup;
pub mod theme;
