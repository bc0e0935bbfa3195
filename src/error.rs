//! Crate level errors.
//!
//! # Error Hierarchy
//!
//! The crate uses a two-layer error hierarchy:
//!
//! ## Coordination Layer (`crate::cluster`)
//!
//! - [`ClusterError`]: store failures, connection failures, bad records and
//!   instance types that may not lead
//!
//! ## Pipeline Layer (`crate::pipeline`)
//!
//! - [`StageError`]: missing event attributes, or a [`ClusterError`] raised
//!   while loading cluster data for a pass
//!
//! ## Conversion
//!
//! Both convert into [`Error`] via `From`, so embedding applications can use
//! one error type with `?` across startup, election and pipeline calls.
//!
//! [`ClusterError`]: crate::cluster::ClusterError
//! [`StageError`]: crate::pipeline::StageError

use std::result;

use thiserror::Error as ThisError;

use crate::cluster::ClusterError;
use crate::pipeline::StageError;

pub type Result<T> = result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Coordination or election failure.
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// A pipeline pass was aborted.
    #[error(transparent)]
    Stage(#[from] StageError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<Box<dyn std::error::Error>> for Error {
    fn from(e: Box<dyn std::error::Error>) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<Vec<String>> for Error {
    /// Collapse the list returned by
    /// [`ControllerConfig::validate`](crate::cluster::ControllerConfig::validate).
    fn from(errors: Vec<String>) -> Self {
        Error::Config(errors.join("; "))
    }
}

impl Error {
    /// Check if retrying the failed operation later may succeed.
    pub fn is_retriable(&self) -> bool {
        match self {
            Error::Cluster(e) | Error::Stage(StageError::Cluster(e)) => e.is_retriable(),
            Error::Stage(StageError::MissingAttributes { .. }) | Error::Config(_) => false,
        }
    }
}
