//! # Housekeep
//!
//! Category-based disk cleanup for macOS and Linux.
//!
//! Housekeep sizes well-known junk locations and removes them on request:
//!
//! - **Categories**: caches, logs, temp, trash, Xcode DerivedData, package
//!   manager caches, node_modules, build output, Docker volumes and
//!   leftover application data
//! - **Bounded scans**: every walk is capped by depth, count and time
//! - **Protected metadata**: `.git`, `.claude`, `.cursor` and `.task-flow`
//!   are never entered, counted or deleted
//! - **Confirm before delete**: dry runs, per-category prompts and an
//!   extra warning whenever development files are involved

pub mod apps;
pub mod cleaner;
pub mod cli;
pub mod common;
pub mod scanner;
