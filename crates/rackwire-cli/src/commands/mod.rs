//! CLI command implementations.

pub mod check;
pub mod common;
pub mod models;
pub mod new;
pub mod render;
pub mod run;
