use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which of the two exported objects a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRole {
    Camera,
    Target,
}

impl fmt::Display for ObjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectRole::Camera => write!(f, "camera"),
            ObjectRole::Target => write!(f, "target"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{0} object not found in scene")]
    MissingObject(ObjectRole),
    #[error("No output file selected")]
    NoOutputPath,
    #[error("Could not write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Export cancelled")]
    Cancelled,
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short message for the person who started the export.
    pub fn user_message(&self) -> String {
        match self {
            ExportError::MissingObject(_) => {
                "You need to select both camera and target objects".to_string()
            }
            ExportError::NoOutputPath => "You need to select a file to export".to_string(),
            other => other.to_string(),
        }
    }
}
