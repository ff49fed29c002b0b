use std::{
    io,
    path::{Path, PathBuf},
};

use crate::MessageError;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum IngestError {
    /// A trainer output line could not be interpreted.
    #[display("trainer output line {line_number} violates the output protocol")]
    ProtocolViolation {
        line_number: usize,
        source: MessageError,
    },
    #[display("failed to launch trainer {}", program.display())]
    Launch { program: PathBuf, source: io::Error },
    /// Reading or writing under the networks directory failed.
    #[display("filesystem operation on {} failed", path.display())]
    Filesystem { path: PathBuf, source: io::Error },
    #[display("failed to read trainer output")]
    Read { source: io::Error },
}

impl IngestError {
    pub(crate) fn filesystem(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Filesystem {
            path: path.to_owned(),
            source,
        }
    }
}
