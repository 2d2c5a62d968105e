pub mod api;
pub mod canvas;
pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod external;
pub mod format;
pub mod server;

#[cfg(test)]
mod testing;
