//! thesis - Dissertation Progress Tracker Library
//!
//! This library provides the core functionality for the `thesis` CLI:
//! weighted progress, task ordering and writing streaks over a small
//! file-backed store.
//!
//! # Core Concepts
//!
//! - **Progress**: task status and word-count effort blended by configurable
//!   weights, rolled up per milestone and project
//! - **Sequencing**: tasks inside a milestone always numbered 1..N
//! - **Streaks and badges**: consecutive writing days and lifetime words
//! - **Store**: one JSON snapshot replaced atomically under a file lock
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.thesis.toml`
//! - `error`: Error types and result aliases
//! - `model`: Projects, milestones, tasks, word logs and notes
//! - `progress`: Status, effort and combined percentages
//! - `sequencer`: Task moves and drag-and-drop reordering
//! - `streak`: Writing streaks and badges
//! - `templates`: Core chapter templates for new projects
//! - `report`: Digest, export and summary read models
//! - `motivation`: Quote of the day
//! - `store`: Transactional project store
//! - `audit`: Append-only change log
//! - `storage`: File layout and JSON helpers
//! - `lock`: File locking and atomic writes

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod model;
pub mod motivation;
pub mod output;
pub mod progress;
pub mod report;
pub mod sequencer;
pub mod storage;
pub mod store;
pub mod streak;
pub mod templates;

pub use error::{Error, Result};
