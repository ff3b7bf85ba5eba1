use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("remote query failed: {0}")]
    RemoteQuery(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl StatsError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StatsError::Validation(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, StatsError::RemoteQuery(_))
    }
}

impl serde::Serialize for StatsError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
