//! Command file templating and caption extraction
//!
//! The command file is what the application's `-sendpath` mode consumes. It is
//! rendered from a private template with two placeholders:
//!
//! - `{path}`: absolute path of the final archive
//! - `{caption}`: release caption (`<prefix> at <date>:` + blank line + changelog)
//!
//! Template lines starting with `//` are comments and are dropped.

use crate::core::error::{ReleaseResult, ValidationError};
use std::path::Path;

const CAPTION_KEY: &str = "caption: ";

/// Full caption text for a release
pub fn caption(header: &str, changelog: &str) -> String {
  format!("{}\n\n{}", header, changelog)
}

/// Render the command file from template text
///
/// Line endings are preserved. Placeholders are substituted per line, so a
/// multi-line caption expands in place of the `{caption}` token.
pub fn render(template: &str, archive: &Path, caption: &str) -> String {
  let archive = archive.to_string_lossy();
  let mut output = String::with_capacity(template.len() + caption.len());

  for line in template.split_inclusive('\n') {
    if line.starts_with("//") {
      continue;
    }
    output.push_str(&line.replace("{path}", &archive).replace("{caption}", caption));
  }

  output
}

/// Caption read back from a command file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
  text: String,
}

impl Caption {
  /// Extract the caption from command file contents
  ///
  /// The caption starts after `caption: ` on the first line with that prefix
  /// and runs to the end of the file, line endings included.
  pub fn extract(contents: &str, path: &Path) -> ReleaseResult<Self> {
    let mut text: Option<String> = None;

    for line in contents.split_inclusive('\n') {
      match text.as_mut() {
        Some(caption) => caption.push_str(line),
        None => {
          if let Some(rest) = line.strip_prefix(CAPTION_KEY) {
            text = Some(rest.to_string());
          }
        }
      }
    }

    text.map(|text| Self { text }).ok_or_else(|| {
      ValidationError::CaptionMissing {
        path: path.to_path_buf(),
      }
      .into()
    })
  }

  /// Require the release header at the start of the caption
  pub fn require_header(&self, header: &str) -> ReleaseResult<()> {
    if self.text.starts_with(header) {
      Ok(())
    } else {
      Err(
        ValidationError::CaptionPrefix {
          expected: header.to_string(),
        }
        .into(),
      )
    }
  }

  /// Length in characters, the unit the messenger limits captions by
  pub fn char_count(&self) -> usize {
    self.text.chars().count()
  }

  pub fn fits(&self, limit: usize) -> bool {
    self.char_count() <= limit
  }

  pub fn as_str(&self) -> &str {
    &self.text
  }
}
