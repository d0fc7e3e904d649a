mod component_registry;
mod component_sync;
mod sweep;

pub use component_registry::ComponentRegistry;
pub use component_sync::ComponentSync;
