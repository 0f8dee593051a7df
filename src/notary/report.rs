//! Parsers for notarization tool output
//!
//! altool prints loosely structured `Key: value` text. Only a handful of lines
//! matter and everything else is ignored:
//!
//! ```text
//! No errors uploading 'tdesktop_macOS_16_10_26.zip'.
//! RequestUUID = 2f1e...            (submit)
//!
//!    Status: in progress           (info)
//!    LogFileURL: (null)
//!    Status: success
//!    LogFileURL: https://osxapps-ssl.itunes.apple.com/...
//! ```

use serde_json::Value;

/// State of a request as reported by one info query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
  /// `Status: in progress`
  InProgress,
  /// Any other status word (`success`, `invalid`, ...)
  Finished(String),
  /// No status line in the response
  Unknown,
}

/// What one info query told us
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoReport {
  pub status: PollStatus,
  pub log_url: Option<String>,
}

/// Request UUID from a submit response
pub fn parse_request_uuid(output: &str) -> Option<String> {
  output.lines().find_map(|line| {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
      ["RequestUUID", _, uuid, ..] => Some((*uuid).to_string()),
      _ => None,
    }
  })
}

/// Status and log location from an info response
///
/// When several status lines appear the last one wins, matching how the
/// tool prints a history of states.
pub fn parse_info(output: &str) -> InfoReport {
  let mut status = PollStatus::Unknown;
  let mut log_url = None;

  for line in output.lines() {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
      ["LogFileURL:", url, ..] => {
        log_url = (*url != "(null)").then(|| (*url).to_string());
      }
      ["Status:", "in", ..] => status = PollStatus::InProgress,
      ["Status:", word, ..] => status = PollStatus::Finished((*word).to_string()),
      _ => {}
    }
  }

  InfoReport { status, log_url }
}

/// Issues section of a notarization log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogIssues {
  /// Log says `"issues": null`
  Clean,
  /// Issue text to show the user
  Found(String),
  /// Log has no issues section at all
  Missing,
}

/// Find the issues section of a notarization log
///
/// The log is JSON. If it does not parse, fall back to looking for a line
/// starting with `"issues":` and take everything from there on.
pub fn scan_log_issues(log: &str) -> LogIssues {
  match serde_json::from_str::<Value>(log) {
    Ok(Value::Object(map)) => match map.get("issues") {
      None => LogIssues::Missing,
      Some(Value::Null) => LogIssues::Clean,
      Some(Value::Array(items)) if items.is_empty() => LogIssues::Clean,
      Some(issues) => LogIssues::Found(serde_json::to_string_pretty(issues).unwrap_or_else(|_| issues.to_string())),
    },
    _ => scan_log_lines(log),
  }
}

fn scan_log_lines(log: &str) -> LogIssues {
  let lines: Vec<&str> = log.lines().collect();
  for (index, line) in lines.iter().enumerate() {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("\"issues\":") {
      continue;
    }
    return match parts.next() {
      Some(value) if value.trim_end_matches(',') == "null" => LogIssues::Clean,
      Some(_) => LogIssues::Found(lines[index..].join("\n")),
      None => continue,
    };
  }
  LogIssues::Missing
}
