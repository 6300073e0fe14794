pub mod config;
pub mod limits;

pub use config::{
    CredentialConfig, PasteboxConfig, ServerConfig, StorageBackendKind, StorageConfig,
    StoreConfig,
};
pub use limits::*;
