//! UI rendering module for tickerdesk
//!
//! This module contains all the rendering logic for the terminal user
//! interface, using the ratatui library for TUI components.

pub mod home;
pub mod markdown;
pub mod report;

pub use home::render as render_home;
pub use report::render as render_report;
