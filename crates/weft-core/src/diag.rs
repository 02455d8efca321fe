//! Logging and abort entry points.
//!
//! [`log_ext`] forwards a located, formatted message to `tracing` at the level
//! matching its [`Severity`]. [`abort_ext`] logs at error level and then
//! panics; with `panic = "abort"` that terminates the process, under the test
//! harness it unwinds and is observable with `#[should_panic]`.
//!
//! The `log_error!`, `log_warning!`, `log_info!` and `fatal!` macros capture
//! the call site with `module_path!()`, `file!()` and `line!()`.

use std::fmt;
use std::panic::Location;

/// Category of a logged diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// An error the program can continue past.
    Error,
    /// Something suspicious but not wrong.
    Warning,
    /// Informational.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// Where a diagnostic was raised: procedure name, file path and line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Procedure (or module path) that raised the diagnostic.
    pub procedure: &'static str,
    /// Source file path.
    pub file: &'static str,
    /// Line number within `file`.
    pub line: u32,
}

impl SourceLocation {
    /// Build a location from explicit parts.
    pub const fn new(procedure: &'static str, file: &'static str, line: u32) -> Self {
        Self {
            procedure,
            file,
            line,
        }
    }

    /// Location of the caller of the enclosing `#[track_caller]` chain.
    ///
    /// `procedure` names the operation that detected the problem; file and
    /// line come from the outermost caller that is not itself
    /// `#[track_caller]`, i.e. the user's call site.
    #[track_caller]
    pub fn caller(procedure: &'static str) -> Self {
        let loc = Location::caller();
        Self {
            procedure,
            file: loc.file(),
            line: loc.line(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.procedure, self.file, self.line)
    }
}

/// Emit one diagnostic through `tracing`.
pub fn log_ext(severity: Severity, location: SourceLocation, args: fmt::Arguments<'_>) {
    let SourceLocation {
        procedure,
        file,
        line,
    } = location;
    match severity {
        Severity::Error => tracing::error!(procedure, file, line, "{args}"),
        Severity::Warning => tracing::warn!(procedure, file, line, "{args}"),
        Severity::Info => tracing::info!(procedure, file, line, "{args}"),
    }
}

/// Log a fatal diagnostic and abort the current operation.
///
/// The panic payload is `"<location>: <message>"`.
#[cold]
#[inline(never)]
pub fn abort_ext(location: SourceLocation, args: fmt::Arguments<'_>) -> ! {
    let message = args.to_string();
    tracing::error!(
        procedure = location.procedure,
        file = location.file,
        line = location.line,
        fatal = true,
        "{message}"
    );
    panic!("{location}: {message}")
}

/// Log an error-level diagnostic located at the macro call site.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::diag::log_ext(
            $crate::diag::Severity::Error,
            $crate::diag::SourceLocation::new(module_path!(), file!(), line!()),
            format_args!($($arg)+),
        )
    };
}

/// Log a warning-level diagnostic located at the macro call site.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => {
        $crate::diag::log_ext(
            $crate::diag::Severity::Warning,
            $crate::diag::SourceLocation::new(module_path!(), file!(), line!()),
            format_args!($($arg)+),
        )
    };
}

/// Log an info-level diagnostic located at the macro call site.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::diag::log_ext(
            $crate::diag::Severity::Info,
            $crate::diag::SourceLocation::new(module_path!(), file!(), line!()),
            format_args!($($arg)+),
        )
    };
}

/// Abort with a message located at the macro call site.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {
        $crate::diag::abort_ext(
            $crate::diag::SourceLocation::new(module_path!(), file!(), line!()),
            format_args!($($arg)+),
        )
    };
}
