//! Bookstore application library
//!
//! Wires the feature modules into the kernel and exposes [`App`], which owns
//! settings, the module registry and the database pool.

pub mod app;
pub mod modules;
pub mod utils;

pub use app::App;
