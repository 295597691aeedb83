#[cfg(windows)]
#[macro_use]
pub mod debug;
#[cfg(windows)]
pub mod time;
#[cfg(windows)]
pub mod window;

pub mod app;
pub mod config;
pub mod error;
pub mod graphics;
pub mod host;
pub mod memory;
pub mod present;

pub use error::Error;
