//! # Tag Monger Architecture
//!
//! Tag monger keeps a bucket of date-stamped manifest files ("tags") tidy: it
//! lists the bucket, keeps the keys that look like tags, decides which ones
//! have outlived the retention window and moves those under an archive
//! directory next to where they were.
//!
//! It is a library with a CLI client, laid out in three layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses flags, env and config files, picks the provider   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Resolves config into a plan, time zone into "today"      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - fetch → filter → classify → relocate, and sweep          │
//! │  - Pure logic over Rust types, returns CmdResult            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - ObjectStore trait                                        │
//! │  - CloudStore (S3, GCS, local dir), InMemoryStore (testing) │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never calls
//! `std::process::exit`. Progress goes through `tracing`; user-facing text
//! comes back as [`commands::CmdMessage`]s for the UI to render.
//!
//! ## Lifecycle
//!
//! Every tag key is `Fresh`, `Expired` or `Retired` (see [`model::TagState`]).
//! Keys whose filename does not parse are reported and left alone. Only
//! `Expired` keys are ever moved, and a moved key is `Retired` on the next run,
//! so sweeping twice is the same as sweeping once.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: One module per pipeline stage
//! - [`store`]: Object storage abstraction and implementations
//! - [`tag`]: Daily and weekly tag grammar
//! - [`model`]: Key paths, lifecycle states and classified records
//! - [`config`]: Configuration file, defaults and validation
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod tag;
