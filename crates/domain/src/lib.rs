//! ad-poster domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `settings`: Per-platform publishing constraints and creative guidance
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Application use cases / business logic

pub mod model;
pub mod ports;
pub mod settings;
pub mod usecases;

pub use model::*;
pub use ports::*;
pub use settings::*;
