mod asset_registry;
mod asset_service;
mod asset_sync;

pub use asset_registry::{AssetChangeSet, AssetRegistry};
pub use asset_service::AssetService;
pub use asset_sync::AssetSync;
