//! Core domain types and logic.

pub mod alignment;
pub mod backtest;
pub mod config;
pub mod config_validation;
pub mod error;
pub mod event;
pub mod notes;
pub mod prediction;
pub mod run_log;
pub mod scheduler;
pub mod strategy;
pub mod universe;
