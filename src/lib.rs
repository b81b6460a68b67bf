pub mod check;
pub mod cli;
pub mod config;
pub mod contracts;
pub mod logging;
