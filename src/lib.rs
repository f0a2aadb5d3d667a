//! rplex: a terminal dashboard for live CPU, memory, process and network
//! statistics read from `/proc`.

pub mod app;
pub mod config;
pub mod history;
pub mod input;
pub mod system;
pub mod ui;
