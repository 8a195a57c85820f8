//! Error handling for gopm
//!
//! This module provides the typed error taxonomy and user-friendly error reporting used by
//! every other part of the crate. Two layers cooperate:
//! 1. [`GopmError`] - strongly-typed failure cases, raised inside library code
//! 2. [`ErrorContext`] - a wrapper adding suggestions and details for CLI users
//!
//! Library functions return [`anyhow::Result`] and raise typed errors with
//! `GopmError::...into()`. Context added on the way up (for example the dependency id being
//! resolved) does not hide the typed error: `anyhow::Error::downcast_ref::<GopmError>()`
//! still finds it.
//!
//! # Error categories
//!
//! - **Classification**: [`GopmError::UnclassifiableDependency`], [`GopmError::VcsValidation`],
//!   [`GopmError::RepositoryLookupFailed`]
//! - **Transport**: [`GopmError::GitCommandError`], [`GopmError::FetchFailed`],
//!   [`GopmError::IllegalReference`], [`GopmError::NetworkError`]
//! - **Scanning**: [`GopmError::ScannerFailed`]
//! - **Configuration**: [`GopmError::ConfigParseError`], [`GopmError::InvalidUpdatePolicy`],
//!   [`GopmError::InvalidNotation`], [`GopmError::InvalidVersion`]
//! - **File system**: [`GopmError::FileSystemError`], [`GopmError::IoError`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use gopm::core::{GopmError, user_friendly_error};
//!
//! let error = anyhow::Error::from(GopmError::UnclassifiableDependency {
//!     id: "example.com/unknown".to_string(),
//! });
//! let context = user_friendly_error(error);
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The error taxonomy of gopm.
///
/// Each variant carries the identifier, URI, path or operation needed to produce one clear
/// message naming the offending dependency.
#[derive(Error, Debug)]
pub enum GopmError {
    /// Git executable not found in PATH
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// A git subprocess exited unsuccessfully or timed out
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git subcommand that failed (e.g. "ls-remote", "fetch")
        operation: String,
        /// Captured standard error output
        stderr: String,
    },

    /// Fetching repository content from a remote failed
    #[error("Failed to fetch repository {uri}: {reason}")]
    FetchFailed {
        /// Remote URI being fetched
        uri: String,
        /// Underlying reason
        reason: String,
    },

    /// No hosting provider recognizes the identifier
    #[error("Could not classify dependency '{id}': no repository provider recognizes it")]
    UnclassifiableDependency {
        /// The raw identifier
        id: String,
    },

    /// A reference failed validation (missing fields, conflicting explicit type, bad name)
    #[error("{message}")]
    VcsValidation {
        /// Human readable reason
        message: String,
    },

    /// The requested ref or major version does not exist on the remote
    #[error("{message}")]
    IllegalReference {
        /// Human readable reason
        message: String,
    },

    /// The operation is not implemented for this VCS kind
    #[error("Unsupported VCS kind '{vcs_type}' for operation '{operation}'")]
    UnsupportedVcs {
        /// The VCS kind, e.g. "hg"
        vcs_type: String,
        /// The attempted operation
        operation: String,
    },

    /// A repository introspection API answered with a non-success status
    #[error("Repository lookup at {url} failed with HTTP status {status}")]
    RepositoryLookupFailed {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Network request failed before a response was received
    #[error("Network error during {operation}: {reason}")]
    NetworkError {
        /// What was being attempted
        operation: String,
        /// Underlying reason
        reason: String,
    },

    /// The import scanner could not process a source file
    #[error("Failed to scan imports of {file}: {reason}")]
    ScannerFailed {
        /// Source file being scanned
        file: String,
        /// Underlying reason
        reason: String,
    },

    /// An update policy string could not be parsed
    #[error("Illegal update policy '{value}': {reason}")]
    InvalidUpdatePolicy {
        /// The rejected input
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// An integer version string could not be parsed
    #[error("Illegal version '{value}'")]
    InvalidVersion {
        /// The rejected input
        value: String,
    },

    /// A `group[:version]` notation could not be parsed
    #[error("Illegal dependency notation '{value}'")]
    InvalidNotation {
        /// The rejected input
        value: String,
    },

    /// The configuration file is malformed
    #[error("Invalid configuration in {file}: {reason}")]
    ConfigParseError {
        /// Configuration file path
        file: String,
        /// Parser message
        reason: String,
    },

    /// File system operation failed
    #[error("File system error during {operation}: {path}")]
    FileSystemError {
        /// The attempted operation
        operation: String,
        /// Path involved
        path: String,
    },

    /// Wrapped I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Anything else
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl Clone for GopmError {
    fn clone(&self) -> Self {
        match self {
            Self::GitNotFound => Self::GitNotFound,
            Self::GitCommandError {
                operation,
                stderr,
            } => Self::GitCommandError {
                operation: operation.clone(),
                stderr: stderr.clone(),
            },
            Self::FetchFailed {
                uri,
                reason,
            } => Self::FetchFailed {
                uri: uri.clone(),
                reason: reason.clone(),
            },
            Self::UnclassifiableDependency {
                id,
            } => Self::UnclassifiableDependency {
                id: id.clone(),
            },
            Self::VcsValidation {
                message,
            } => Self::VcsValidation {
                message: message.clone(),
            },
            Self::IllegalReference {
                message,
            } => Self::IllegalReference {
                message: message.clone(),
            },
            Self::UnsupportedVcs {
                vcs_type,
                operation,
            } => Self::UnsupportedVcs {
                vcs_type: vcs_type.clone(),
                operation: operation.clone(),
            },
            Self::RepositoryLookupFailed {
                url,
                status,
            } => Self::RepositoryLookupFailed {
                url: url.clone(),
                status: *status,
            },
            Self::NetworkError {
                operation,
                reason,
            } => Self::NetworkError {
                operation: operation.clone(),
                reason: reason.clone(),
            },
            Self::ScannerFailed {
                file,
                reason,
            } => Self::ScannerFailed {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::InvalidUpdatePolicy {
                value,
                reason,
            } => Self::InvalidUpdatePolicy {
                value: value.clone(),
                reason: reason.clone(),
            },
            Self::InvalidVersion {
                value,
            } => Self::InvalidVersion {
                value: value.clone(),
            },
            Self::InvalidNotation {
                value,
            } => Self::InvalidNotation {
                value: value.clone(),
            },
            Self::ConfigParseError {
                file,
                reason,
            } => Self::ConfigParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::FileSystemError {
                operation,
                path,
            } => Self::FileSystemError {
                operation: operation.clone(),
                path: path.clone(),
            },
            // io::Error is not Clone; keep kind and message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error wrapper carrying a suggestion and details for terminal display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: GopmError,
    /// What the user could do about it
    pub suggestion: Option<String>,
    /// Additional explanation
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wraps an error without suggestion or details.
    #[must_use]
    pub const fn new(error: GopmError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Adds a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Adds details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prints the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Converts any error into an [`ErrorContext`] with a suggestion for the user.
///
/// Typed [`GopmError`]s are found anywhere in the context chain. The outermost context
/// message (usually naming the dependency being resolved) becomes the details line.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let outer = error.to_string();

    if let Some(gopm_error) = error.downcast_ref::<GopmError>() {
        let context = create_error_context(gopm_error.clone());
        let inner = gopm_error.to_string();
        if outer != inner && context.details.is_none() {
            return context.with_details(outer);
        }
        return context;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorContext::new(GopmError::FileSystemError {
                operation: "file access".to_string(),
                path: "unknown".to_string(),
            })
            .with_suggestion("Check the permissions of the dependency cache directory")
            .with_details(outer),
            std::io::ErrorKind::NotFound => ErrorContext::new(GopmError::FileSystemError {
                operation: "file access".to_string(),
                path: "unknown".to_string(),
            })
            .with_suggestion("Check that the file or directory exists and the path is correct")
            .with_details(outer),
            _ => ErrorContext::new(GopmError::Other {
                message: outer,
            }),
        };
    }

    let mut message = outer;
    let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !causes.is_empty() {
        message = format!("{message}: {}", causes.join(": "));
    }
    ErrorContext::new(GopmError::Other {
        message,
    })
}

fn create_error_context(error: GopmError) -> ErrorContext {
    match &error {
        GopmError::GitNotFound => ErrorContext::new(error)
            .with_suggestion("Install git from https://git-scm.com/ and make sure it is on PATH"),
        GopmError::GitCommandError {
            stderr,
            ..
        } => {
            let details = stderr.trim().to_string();
            let context = ErrorContext::new(error)
                .with_suggestion("Check network connectivity and that the repository is reachable");
            if details.is_empty() {
                context
            } else {
                context.with_details(details)
            }
        }
        GopmError::FetchFailed {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Check the repository URI and your credentials, or pin a different version",
        ),
        GopmError::UnclassifiableDependency {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Declare the dependency with an explicit `uri` and `type`, or add a [[providers]] entry",
        ),
        GopmError::VcsValidation {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the dependency name and any explicit type or uri override"),
        GopmError::IllegalReference {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Pin a version that exists as a tag or branch on the remote"),
        GopmError::UnsupportedVcs {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Only git repositories can be fetched; vendor the dependency manually"),
        GopmError::RepositoryLookupFailed {
            ..
        }
        | GopmError::NetworkError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check network connectivity or declare an explicit repository type"),
        GopmError::ScannerFailed {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Set `scanner = \"regex\"` under [dependencies] if the Go toolchain is unavailable",
        ),
        GopmError::InvalidUpdatePolicy {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use one of: never, always, daily, interval:<minutes>"),
        GopmError::InvalidNotation {
            ..
        } => ErrorContext::new(error).with_suggestion("Use the form <group>[:<version>]"),
        GopmError::ConfigParseError {
            ..
        } => ErrorContext::new(error).with_suggestion("Fix the syntax of gopm.toml"),
        _ => ErrorContext::new(error),
    }
}
