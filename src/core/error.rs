//! Error types for the merge-and-tag pipeline.

use std::path::PathBuf;

/// Every fatal outcome of a merge or tagging call.
///
/// Branch on the variant (or on [`Error::kind`]); the messages are for humans.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source list was empty.
    #[error("No files provided for merging")]
    NoInput,

    /// The output path is also one of the inputs.
    #[error("Output path '{path}' is also an input file")]
    TargetIsSource { path: PathBuf },

    /// Deployment configuration could not be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A source could not be opened or decoded. Aborts the whole merge.
    #[error("Error processing file {file}: {reason}")]
    SourceDecode {
        file: String,
        path: PathBuf,
        reason: String,
    },

    /// The in-process MP3 encoder rejected its settings or input.
    #[error("MP3 encoding failed: {0}")]
    Encode(String),

    /// The external transcoder could not be started at all.
    #[error("External tool '{tool}' not found or not executable: {source}")]
    ExternalToolMissing {
        tool: PathBuf,
        source: std::io::Error,
    },

    /// The external transcoder ran and exited non-zero. `stderr` is verbatim.
    #[error("External tool '{tool}' failed (exit code {status:?}):\n{stderr}")]
    ExternalToolFailed {
        tool: PathBuf,
        status: Option<i32>,
        stderr: String,
    },

    /// The output container could not be opened or its tag could not be parsed.
    #[error("Failed to open tag container '{path}': {source}")]
    ContainerOpen { path: PathBuf, source: id3::Error },

    /// Tags could not be written back to the container.
    #[error("Failed to save tags to '{path}': {source}")]
    Persistence { path: PathBuf, source: id3::Error },

    /// Creating or writing an engine-owned file (output, manifest) failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Field-free mirror of [`Error`] for callers that only need the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoInput,
    TargetIsSource,
    InvalidConfig,
    SourceDecode,
    Encode,
    ExternalToolMissing,
    ExternalToolFailed,
    ContainerOpen,
    Persistence,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NoInput => ErrorKind::NoInput,
            Error::TargetIsSource { .. } => ErrorKind::TargetIsSource,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Error::SourceDecode { .. } => ErrorKind::SourceDecode,
            Error::Encode(_) => ErrorKind::Encode,
            Error::ExternalToolMissing { .. } => ErrorKind::ExternalToolMissing,
            Error::ExternalToolFailed { .. } => ErrorKind::ExternalToolFailed,
            Error::ContainerOpen { .. } => ErrorKind::ContainerOpen,
            Error::Persistence { .. } => ErrorKind::Persistence,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    /// True for errors raised before any file was touched.
    pub fn is_config(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NoInput | ErrorKind::TargetIsSource | ErrorKind::InvalidConfig
        )
    }

    pub(crate) fn source_decode(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Error::SourceDecode {
            file: display_name(path),
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// File name for messages; falls back to the full path.
pub(crate) fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn decode_error_names_the_file() {
        let err = Error::source_decode(Path::new("/tmp/in/track 2.ogg"), "bad header");
        match &err {
            Error::SourceDecode { file, .. } => assert_eq!(file, "track 2.ogg"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(err.to_string(), "Error processing file track 2.ogg: bad header");
        assert_eq!(err.kind(), ErrorKind::SourceDecode);
    }

    #[test]
    fn tool_failure_message_keeps_stderr() {
        let err = Error::ExternalToolFailed {
            tool: PathBuf::from("ffmpeg"),
            status: Some(1),
            stderr: "concat.txt: Invalid data found".into(),
        };
        assert!(err.to_string().contains("concat.txt: Invalid data found"));
        assert!(!err.is_config());
    }

    #[test]
    fn config_errors_are_grouped() {
        assert!(Error::NoInput.is_config());
        assert!(Error::InvalidConfig("x".into()).is_config());
    }
}
