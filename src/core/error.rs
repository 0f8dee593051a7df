//! Error types for desk-updates with contextual messages and exit codes
//!
//! Every failure in the pipeline maps onto one of these categories. Each error
//! knows its exit code and, where there is something useful to say, a help line.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for desk-updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, bad input)
  User = 1,
  /// System error (external tools, notarization service, I/O)
  System = 2,
  /// Release state is not what the step expects
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for desk-updates
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors
  Config(ConfigError),

  /// External process errors
  Process(ProcessError),

  /// Notarization service errors
  Notary(NotaryError),

  /// Release state and input validation errors
  Validation(ValidationError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// I/O errors fold the context into the message. Structured errors are
  /// returned unchanged so their help line and exit code survive.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(e) => ReleaseError::Message {
        message: format!("{}: {}", ctx_str, e),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Process(_) => ExitCode::System,
      ReleaseError::Notary(_) => ExitCode::System,
      ReleaseError::Validation(e) => e.exit_code(),
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Process(e) => e.help_message(),
      ReleaseError::Notary(e) => e.help_message(),
      ReleaseError::Validation(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      ReleaseError::Io(_) => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Process(e) => write!(f, "{}", e),
      ReleaseError::Notary(e) => write!(f, "{}", e),
      ReleaseError::Validation(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<ProcessError> for ReleaseError {
  fn from(err: ProcessError) -> Self {
    ReleaseError::Process(err)
  }
}

impl From<NotaryError> for ReleaseError {
  fn from(err: NotaryError) -> Self {
    ReleaseError::Notary(err)
  }
}

impl From<ValidationError> for ReleaseError {
  fn from(err: ValidationError) -> Self {
    ReleaseError::Validation(err)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicit --config path does not exist
  NotFound { path: PathBuf },

  /// Field has a value the pipeline cannot work with
  InvalidField { field: String, reason: String },

  /// Required environment variable is not set
  MissingEnv { name: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Drop the --config flag to use updates.toml from the root, or the built-in defaults.".to_string())
      }
      ConfigError::MissingEnv { name } => Some(format!(
        "Export the notarization account first, e.g. `export {}=you@example.com`.",
        name
      )),
      ConfigError::InvalidField { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "Config file not found: {}", path.display()),
      ConfigError::InvalidField { field, reason } => write!(f, "Invalid config field '{}': {}", field, reason),
      ConfigError::MissingEnv { name } => write!(f, "{} not found!", name),
    }
  }
}

/// External tool errors
#[derive(Debug)]
pub enum ProcessError {
  /// Tool could not be started at all
  Spawn {
    step: String,
    command: String,
    reason: String,
  },

  /// Tool ran and exited unsuccessfully
  Failed {
    step: String,
    command: String,
    status: Option<i32>,
    output: Option<String>,
  },
}

impl ProcessError {
  fn help_message(&self) -> Option<String> {
    match self {
      ProcessError::Spawn { command, .. } => {
        let program = command.split_whitespace().next().unwrap_or("the tool");
        Some(format!("Make sure `{}` is installed and on PATH.", program))
      }
      ProcessError::Failed { .. } => Some("Re-run with --verbose to see every command line.".to_string()),
    }
  }
}

impl fmt::Display for ProcessError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ProcessError::Spawn { step, command, reason } => {
        write!(f, "{}\nCould not start `{}`: {}", step, command, reason)
      }
      ProcessError::Failed {
        step,
        command,
        status,
        output,
      } => {
        write!(f, "{}\n`{}` ", step, command)?;
        match status {
          Some(code) => write!(f, "exited with status {}", code)?,
          None => write!(f, "was terminated by a signal")?,
        }
        if let Some(out) = output
          && !out.trim().is_empty()
        {
          write!(f, "\n{}", out.trim_end())?;
        }
        Ok(())
      }
    }
  }
}

/// Notarization service errors
#[derive(Debug)]
pub enum NotaryError {
  /// Submit response carried no request UUID
  NoRequestUuid { response: String },

  /// Service finished with a status other than success
  Rejected { status: String, request_uuid: String },

  /// Service did not finish within the configured timeout
  TimedOut { request_uuid: String, waited_secs: u64 },
}

impl NotaryError {
  fn help_message(&self) -> Option<String> {
    match self {
      NotaryError::TimedOut { request_uuid, .. } => Some(format!(
        "Resume polling later with `desk-updates build --request-uuid {}`.",
        request_uuid
      )),
      NotaryError::Rejected { .. } => Some("Check the notarization log printed above for the rejected files.".to_string()),
      NotaryError::NoRequestUuid { .. } => None,
    }
  }
}

impl fmt::Display for NotaryError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      NotaryError::NoRequestUuid { response } => {
        write!(f, "Could not extract Request UUID. Response: {}", response)
      }
      NotaryError::Rejected { status, request_uuid } => {
        write!(f, "Notarization failed (status '{}', request {}).", status, request_uuid)
      }
      NotaryError::TimedOut {
        request_uuid,
        waited_secs,
      } => write!(
        f,
        "Notarization of request {} did not finish after {}s.",
        request_uuid, waited_secs
      ),
    }
  }
}

/// Validation errors
#[derive(Debug)]
pub enum ValidationError {
  /// Published archive for the date is already there
  AlreadyBuilt { path: PathBuf },

  /// A file the step needs is missing
  MissingFile { what: String, path: PathBuf },

  /// Invalid command-line input
  InvalidInput { what: String, value: String },

  /// Git log contained message text before any commit header
  BadGitLog { log: String },

  /// No commits between the given one and HEAD
  NoCommits { since: String },

  /// Caption line missing from the command file
  CaptionMissing { path: PathBuf },

  /// Caption does not start with the expected header
  CaptionPrefix { expected: String },

  /// Caption exceeds the configured limit
  CaptionTooLarge { length: usize, limit: usize },
}

impl ValidationError {
  fn exit_code(&self) -> ExitCode {
    match self {
      ValidationError::InvalidInput { .. } => ExitCode::User,
      _ => ExitCode::Validation,
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::AlreadyBuilt { path } => Some(format!(
        "Pick another --date or remove {} to rebuild.",
        path.display()
      )),
      ValidationError::NoCommits { .. } => Some("Check the --from commit; nothing new was found up to HEAD.".to_string()),
      ValidationError::CaptionMissing { .. } | ValidationError::CaptionPrefix { .. } => {
        Some("Run `desk-updates compose --from <sha>` to regenerate the command file.".to_string())
      }
      ValidationError::CaptionTooLarge { .. } => Some("Shorten the changelog in the command file.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::AlreadyBuilt { path } => {
        write!(f, "Today's updates version exists: {}", path.display())
      }
      ValidationError::MissingFile { what, path } => write!(f, "{} not found: {}", what, path.display()),
      ValidationError::InvalidInput { what, value } => write!(f, "Wrong {}: {}", what, value),
      ValidationError::BadGitLog { log } => write!(f, "Bad git log output.\n{}", log.trim_end()),
      ValidationError::NoCommits { since } => write!(f, "No commits since last build :( ({}..HEAD)", since),
      ValidationError::CaptionMissing { path } => write!(f, "Caption not found in {}", path.display()),
      ValidationError::CaptionPrefix { expected } => {
        write!(f, "Wrong caption start, expected '{}'.", expected)
      }
      ValidationError::CaptionTooLarge { length, limit } => {
        write!(f, "Too large. Caption length {} exceeds {}.", length, limit)
      }
    }
  }
}

/// Result type alias for desk-updates
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
