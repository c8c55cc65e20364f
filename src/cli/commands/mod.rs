//! CLI Commands

pub mod analyze;
pub mod config;
pub mod demo;
pub mod generate;
pub mod individual;
