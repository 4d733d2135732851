// Error kinds for the compile pipeline.
// Nothing here is retried or recovered; every failure carries its context
// up to the caller of the compile request.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error during a compile request.
#[derive(Error, Debug)]
pub enum CompilerError {
    /// A required path was unset at call time; raised before any I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Read/write/mkdir failure during scaffolding or persistence.
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The build toolchain exited non-zero, failed to launch, or its
    /// declared output artifact was absent after a reported success.
    #[error("build failed: {0}")]
    Build(String),

    /// The ABI analyzer failed to launch, exited non-zero, or emitted
    /// output that is not valid JSON.
    #[error("ABI extraction failed: {0}")]
    AbiExtraction(String),

    /// Facade wrapper around any of the above; context is the source file
    /// path or "compilation failed".
    #[error("failed to compile {context}: {source}")]
    Compilation {
        context: String,
        #[source]
        source: Box<CompilerError>,
    },
}

impl CompilerError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CompilerError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn wrap(self, context: impl Into<String>) -> Self {
        CompilerError::Compilation {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompilerError>;
