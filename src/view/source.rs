//! Extracts inline template text from source files.
//!
//! Templates live in line comments immediately below the render call:
//!
//! ```text
//! fn profile(&self) -> Result<String, Error> {
//!     erb!(self)
//!     // <h1><%= name %></h1>
//! }
//! ```
//!
//! [`locate`] reads the file, skips down to the call site and consumes
//! the contiguous run of comment lines that follows. The extracted text
//! is de-indented so templates can be indented to match the
//! surrounding code.
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::template::Error;

static COMMENTED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*//(.*)$").unwrap());

/// Read the template text that starts on the line after `line_number`
/// (1-based) in the file at `path`.
///
/// Consumes consecutive comment lines, stripping the `//` marker and
/// one following space from each. Stops at the first line that isn't a
/// comment. No comment lines at all is not an error; the template is
/// simply empty.
pub fn locate(path: &Path, line_number: usize) -> Result<String, Error> {
    let file = std::fs::read_to_string(path)?;
    let mut lines = vec![];

    for line in file.lines().skip(line_number) {
        match COMMENTED_LINE.captures(line) {
            Some(captures) => {
                let text = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                lines.push(text.strip_prefix(' ').unwrap_or(text));
            }

            None => break,
        }
    }

    tracing::trace!(
        "extracted {} template line(s) from {}:{}",
        lines.len(),
        path.display(),
        line_number
    );

    Ok(unindent(&lines.join("\n")))
}

/// Strip the longest whitespace margin shared by every non-blank line.
///
/// The margin is found with a longest-common-prefix walk: starting from
/// the first non-blank line's indentation, shrink the candidate
/// whenever a later line's indentation is not a prefix-extension of it.
/// Mixed tab/space indentation that shares no prefix leaves the text
/// untouched.
pub fn unindent(text: &str) -> String {
    let mut margin: Option<&str> = None;

    for line in text.lines() {
        let trimmed = line.trim_start_matches([' ', '\t']);
        if trimmed.is_empty() {
            continue;
        }

        let indent = &line[..line.len() - trimmed.len()];

        margin = Some(match margin {
            None => indent,
            Some(current) => {
                if indent.starts_with(current) {
                    current
                } else if current.starts_with(indent) {
                    indent
                } else {
                    ""
                }
            }
        });
    }

    let margin = margin.unwrap_or("");
    if margin.is_empty() {
        return text.to_string();
    }

    let mut result = text
        .lines()
        .map(|line| line.strip_prefix(margin).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n");

    if text.ends_with('\n') {
        result.push('\n');
    }

    result
}
