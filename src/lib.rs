//! Shop floor: manufacturing process tracking for FRC teams
//!
//! Processes, their steps and quality checkpoints are stored as plain YAML
//! files under a `.shop/` project and driven through their lifecycle from
//! the `shop` command line.

pub mod cli;
pub mod core;
pub mod entities;
