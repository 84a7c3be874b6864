//! Error types for chansync-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Config file too large: {path} is {size} bytes (max {max})")]
    ConfigTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("{path} is a directory, expected a single configuration file")]
    DirectoryNotSupported { path: PathBuf },

    #[error(
        "Channel name duplicate in config file. Channel name is unique: channel name = {name}"
    )]
    DuplicateChannel { name: String },

    #[error("Channel #{position} in config file has no name")]
    EmptyChannelName { position: usize },

    #[error("Auth config is missing {field}")]
    MissingAuthField { field: &'static str },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
