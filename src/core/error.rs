use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unknown building type: {0}")]
    UnknownBuildingType(String),

    #[error("Unknown agent type: {0}")]
    UnknownAgentType(String),

    #[error("Unknown place: {0}")]
    UnknownPlace(String),

    #[error("Unknown transport bank: {0}")]
    UnknownBank(String),

    #[error("Invalid clock time: {0}")]
    InvalidClock(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
