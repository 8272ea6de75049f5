use thiserror::Error;

/// Failures surfaced by the route pipeline and the report store.
///
/// None of these are fatal: a malformed polyline drops the geometry of one
/// step, a missing field turns a step into a zero-length one, and an
/// unavailable storage backend leaves the report store running in memory.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// `position` is the byte offset, or the coordinate index for an
    /// off-globe point, when it is known.
    #[error("malformed polyline geometry: {reason}")]
    MalformedGeometry {
        position: Option<usize>,
        reason: String,
    },

    #[error("route step is missing `{0}`")]
    MissingField(&'static str),

    #[error("report storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl Error {
    pub(crate) fn storage(error: anyhow::Error) -> Self {
        Error::StorageUnavailable(format!("{:#}", error))
    }
}
