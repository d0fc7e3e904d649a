use thiserror::Error;

use replicant_shared::{ConfigError, GlobalEntity, SyncError, ViewerKey};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplicationError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{entity} already has a {object_type} component attached")]
    ComponentAlreadyAttached {
        object_type: &'static str,
        entity: GlobalEntity,
    },

    #[error("{entity} has no {object_type} component attached")]
    ComponentNotAttached {
        object_type: &'static str,
        entity: GlobalEntity,
    },

    #[error("Asset {key} of type {object_type} is not loaded")]
    AssetNotLoaded {
        object_type: &'static str,
        key: String,
    },

    #[error("{viewer} is already connected")]
    ViewerAlreadyConnected { viewer: ViewerKey },

    #[error("{viewer} is not connected")]
    ViewerNotConnected { viewer: ViewerKey },
}
