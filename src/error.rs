use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type for map, tileset and template loading.
#[derive(Debug)]
pub enum Error {
    /// A referenced file could not be read.
    Io {
        /// Path the read was attempted on.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A document is not well-formed XML.
    Xml {
        /// Underlying parse error.
        source: roxmltree::Error,
    },
    /// A required node or attribute is missing or malformed.
    Structure(String),
    /// Layer data could not be decoded.
    Decode(String),
}

impl From<roxmltree::Error> for Error {
    fn from(source: roxmltree::Error) -> Self {
        Error::Xml { source }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Error::Xml { source } => write!(f, "malformed XML: {}", source),
            Error::Structure(what) => write!(f, "invalid document: {}", what),
            Error::Decode(what) => write!(f, "failed to decode layer data: {}", what),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Xml { source } => Some(source),
            Error::Structure(_) | Error::Decode(_) => None,
        }
    }
}
