//! # Tag Monger CLI
//!
//! The binary is thin: the CLI lives in `cli/`, and this file only invokes
//! `cli::run()` and handles process termination.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/tag_monger/cli/)                            │
//! │  - clap argument parsing + env binding (setup.rs)           │
//! │  - config layering, provider, logging (commands.rs)         │
//! │  - colored terminal output (print.rs)                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every fatal error ends up here as a single `Error: ...` line on stderr and
//! exit status 1. Usage errors are reported by clap with status 2.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
