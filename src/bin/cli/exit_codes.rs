//! Exit codes for the CLI tool.

use z21cfg::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Operation completed with warnings
pub const WARNING: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Container or payload could not be read
pub const BAD_CONTAINER: i32 = 3;
/// Operation not supported for this container
pub const UNSUPPORTED: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Warning,
    FatalError,
    BadContainer,
    Unsupported,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::Warning => WARNING,
            Self::FatalError => FATAL_ERROR,
            Self::BadContainer => BAD_CONTAINER,
            Self::Unsupported => UNSUPPORTED,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a z21cfg error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::Zip(_) | Error::Database(_) => ExitCode::BadContainer,
        Error::UnsupportedFeature { .. } | Error::MissingPayload => ExitCode::Unsupported,
        Error::InvalidFunctionNumber { .. }
        | Error::InvalidValue { .. }
        | Error::FunctionNotFound { .. } => ExitCode::BadArgs,
        Error::ResourceLimitExceeded(_) => ExitCode::FatalError,
        Error::UnresolvedLocomotives { .. } => ExitCode::FatalError,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
