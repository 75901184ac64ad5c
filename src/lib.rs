// Read-only filesystem over a remote LSIF content index - exposes all core modules for testing

pub mod config;
pub mod fs;
pub mod services;
