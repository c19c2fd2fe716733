use std::{io, path::PathBuf};

use thiserror::Error;

use crate::graph::GraphError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io failed for '{path}': '{source}'")]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    YamlSerError(#[from] serde_yaml::Error),
    #[error(transparent)]
    JsonSerError(#[from] serde_json::Error),
    #[error("Invalid feature tag '{0}'")]
    InvalidFeatureTag(String),
    #[error("Invalid glyph reference '{0}'")]
    InvalidGlyphRef(String),
    #[error("No glyph class named '{0}'")]
    UnknownClass(String),
    #[error("A glyph class named '{0}' already exists")]
    DuplicateClass(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
}
