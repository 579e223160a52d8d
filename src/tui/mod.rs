//! TUI module for the terminal front end

mod probe_app;

pub use probe_app::ProbeApp;
