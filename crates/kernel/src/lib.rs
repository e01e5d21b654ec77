//! Kernel of the bookstore service: layered settings, the [`Module`] trait
//! every feature module implements, and the [`ModuleRegistry`] that drives
//! their lifecycle.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Migration, Module, RouteCtx};
pub use registry::ModuleRegistry;
pub use settings::Settings;
