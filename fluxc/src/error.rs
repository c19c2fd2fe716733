use std::{io, path::PathBuf};

use fluxir::graph::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io failed for '{path}': '{source}'")]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write to stdout or stderr: '{0}'")]
    StdioWriteFail(#[source] io::Error),
    #[error("Unrecognized source {0}, expected a .ufo")]
    UnrecognizedSource(PathBuf),
    #[error("Missing file '{0}'")]
    FileExpected(PathBuf),
    #[error("'{0}' already exists")]
    ProjectExists(PathBuf),
    #[error("No routine named '{0}'")]
    UnknownRoutine(String),
    #[error("Glyph names follow no known Arabic naming scheme")]
    NoNamingScheme,
    #[error(transparent)]
    Project(#[from] fluxir::error::Error),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Ufo(#[from] ufo2flux::error::Error),
}
