use std::path::PathBuf;

use norad::error::FontLoadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing file '{0}'")]
    FileExpected(PathBuf),
    #[error("Failed to load '{path}'")]
    FontLoadError {
        path: PathBuf,
        #[source]
        source: Box<FontLoadError>,
    },
}
