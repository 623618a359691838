use thiserror::Error;

/// Failures at the edges of the core: loading settings and species tables.
/// The simulation itself never fails; bad requests there are logged no-ops.
#[derive(Debug, Error)]
pub enum PetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown species `{0}`")]
    UnknownSpecies(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("no display with id {0}")]
    UnknownDisplay(u32),
}

pub type Result<T> = std::result::Result<T, PetError>;

/// Read a file to a string, tagging IO errors with the path.
pub(crate) fn read_to_string(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| PetError::Io {
        path: path.display().to_string(),
        source,
    })
}
