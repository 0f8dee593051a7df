//! Notarization: submit an archive, poll until the service decides, read the log
//!
//! The service itself sits behind [`NotaryService`] so the polling logic can be
//! driven by scripted responses. [`altool::Altool`] is the production backend.

pub mod altool;
pub mod report;

use crate::core::error::{NotaryError, ReleaseResult};
use report::{InfoReport, LogIssues, PollStatus, parse_info, parse_request_uuid, scan_log_issues};
use std::path::Path;
use std::time::{Duration, Instant};

pub use altool::Altool;

/// Raw access to the notarization service
///
/// Each method returns the tool's combined output; parsing happens in
/// [`report`].
pub trait NotaryService {
  /// Upload an archive, returning the submit response
  fn submit(&self, archive: &Path) -> ReleaseResult<String>;

  /// Query the state of a request
  fn info(&self, request_uuid: &str) -> ReleaseResult<String>;

  /// Download the notarization log
  fn fetch_log(&self, url: &str) -> ReleaseResult<String>;
}

/// Result of waiting for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
  /// Final status word (`success`, `invalid`, ...)
  pub status: String,
  /// Last log url the service reported
  pub log_url: Option<String>,
  /// Last raw info response
  pub last_response: String,
}

impl Outcome {
  pub fn is_success(&self) -> bool {
    self.status == "success"
  }
}

/// Drives one notarization request
pub struct Notarizer<S> {
  service: S,
  interval: Duration,
  timeout: Duration,
}

impl<S: NotaryService> Notarizer<S> {
  pub fn new(service: S, interval: Duration, timeout: Duration) -> Self {
    Self {
      service,
      interval,
      timeout,
    }
  }

  /// Submit an archive and return its request UUID
  pub fn submit(&self, archive: &Path) -> ReleaseResult<String> {
    println!("📤 Beginning notarization process.");
    let response = self.service.submit(archive)?;
    println!("   Response received.");

    let uuid = parse_request_uuid(&response).ok_or(NotaryError::NoRequestUuid { response })?;
    println!("   Request UUID: {}", uuid);
    tracing::info!(request_uuid = %uuid, "submitted for notarization");
    Ok(uuid)
  }

  /// Poll until the request leaves the in-progress state
  ///
  /// Every round sleeps first, then queries. The log url is remembered across
  /// rounds since the service only fills it in at the end.
  pub fn wait(&self, request_uuid: &str) -> ReleaseResult<Outcome> {
    let started = Instant::now();
    let mut log_url: Option<String> = None;

    loop {
      std::thread::sleep(self.interval);
      println!("   Checking...");

      let response = self.service.info(request_uuid)?;
      let InfoReport { status, log_url: url } = parse_info(&response);
      if url.is_some() {
        log_url = url;
      }

      match status {
        PollStatus::Finished(status) => {
          println!("   Status: {}", status);
          tracing::info!(request_uuid, status = %status, "notarization finished");
          return Ok(Outcome {
            status,
            log_url,
            last_response: response,
          });
        }
        PollStatus::InProgress => println!("   In progress."),
        PollStatus::Unknown => println!("   Nothing: {}", response.trim_end()),
      }

      if started.elapsed() >= self.timeout {
        return Err(
          NotaryError::TimedOut {
            request_uuid: request_uuid.to_string(),
            waited_secs: started.elapsed().as_secs(),
          }
          .into(),
        );
      }
    }
  }

  /// Fail unless the request was accepted
  ///
  /// On rejection the raw response and, when available, the log are printed
  /// before returning the error.
  pub fn require_success(&self, request_uuid: &str, outcome: &Outcome) -> ReleaseResult<()> {
    if outcome.is_success() {
      return Ok(());
    }

    println!("⚠️  Notarization problems, response:\n{}", outcome.last_response.trim_end());
    if let Some(url) = &outcome.log_url {
      println!("   Requesting log...");
      println!("{}", self.service.fetch_log(url)?);
    }

    Err(
      NotaryError::Rejected {
        status: outcome.status.clone(),
        request_uuid: request_uuid.to_string(),
      }
      .into(),
    )
  }

  /// Download the log of a finished request, if the service gave a url
  pub fn fetch_log(&self, outcome: &Outcome) -> ReleaseResult<Option<String>> {
    match &outcome.log_url {
      Some(url) => {
        println!("   Requesting log...");
        self.service.fetch_log(url).map(Some)
      }
      None => Ok(None),
    }
  }
}

/// Print what the notarization log says about issues
///
/// Issues never fail the release; they are surfaced for a human to read.
pub fn report_log(log: Option<&str>) {
  if let Some(message) = log_report(log) {
    println!("{}", message);
  }
}

/// Message for the notarization log, `None` when it is clean
fn log_report(log: Option<&str>) -> Option<String> {
  let Some(log) = log else {
    return Some("⚠️  NB! Notarization log not found.".to_string());
  };

  match scan_log_issues(log) {
    LogIssues::Clean => {
      tracing::debug!("notarization log has no issues");
      None
    }
    LogIssues::Found(issues) => {
      tracing::warn!("notarization log lists issues");
      Some(format!("⚠️  NB! Notarization log issues:\n{}", issues))
    }
    LogIssues::Missing => Some(format!("⚠️  NB! Notarization issues not found: {}", log)),
  }
}
