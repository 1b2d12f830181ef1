use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("registry error: {0}")]
    Registry(#[from] evplan_registry::RegistryError),

    #[error("recent index error: {0}")]
    RecentIndex(#[from] evplan_xorlist::XorListError),

    #[error("cannot read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),
}

impl From<toml::de::Error> for SdkError {
    fn from(e: toml::de::Error) -> Self {
        SdkError::Config(e.to_string())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
