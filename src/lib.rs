//! Vixen 98: a simulated desktop shell.
//!
//! [`core`] holds the toolkit-independent desktop (registry, auth gate,
//! router, window manager, gestures and the [`core::Shell`] that ties them
//! together). [`apps`] holds the window content. The remaining modules are
//! the terminal front-end.

pub mod apps;
pub mod boot;
pub mod config;
pub mod core;
pub mod desktop;
pub mod ui;
