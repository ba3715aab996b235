use std::fmt::Write as _;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;

use crate::error::{SyncError, SyncResult};

pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Pattern turning a remote modification instant into a filename token.
///
/// Accepts either a chrono strftime pattern (one with at least one `%`
/// directive such as `%Y` or `%-d`) or a PHP `date()` style pattern such as `Y-m-d_H-i-s`, which is translated to
/// strftime once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFormat {
    pattern: String,
}

impl TimestampFormat {
    pub fn parse(raw: &str) -> SyncResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SyncError::Config("timestamp format is empty".into()));
        }
        let pattern = if has_strftime_directive(raw) {
            raw.to_string()
        } else {
            php_to_strftime(raw)?
        };
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(SyncError::Config(format!(
                "invalid timestamp format `{raw}`"
            )));
        }
        Ok(Self { pattern })
    }

    /// The strftime form of the pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Format `at` into a token usable as a single path component.
    pub fn token(&self, at: &NaiveDateTime) -> SyncResult<String> {
        let mut out = String::new();
        write!(out, "{}", at.format(&self.pattern)).map_err(|_| {
            SyncError::Config(format!(
                "timestamp format `{}` cannot render a naive timestamp",
                self.pattern
            ))
        })?;
        if out.is_empty() || out == "." || out == ".." || out.contains(['/', '\\']) {
            return Err(SyncError::Config(format!(
                "timestamp format `{}` yields `{out}`, which is not a valid file name",
                self.pattern
            )));
        }
        Ok(out)
    }
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl FromStr for TimestampFormat {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// `%` followed by a directive letter, optionally behind one padding or
/// modifier flag. A bare `%` is a PHP literal.
fn has_strftime_directive(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        if b != b'%' {
            return false;
        }
        match bytes.get(i + 1) {
            Some(c) if c.is_ascii_alphabetic() => true,
            Some(b'-' | b'_' | b'0' | b'#' | b'.' | b':' | b'3' | b'6' | b'9') => {
                matches!(bytes.get(i + 2), Some(c) if c.is_ascii_alphanumeric())
            }
            _ => false,
        }
    })
}

fn php_to_strftime(raw: &str) -> SyncResult<String> {
    let mut out = String::with_capacity(raw.len() * 2);
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        let directive = match c {
            'Y' => "%Y",
            'y' => "%y",
            'm' => "%m",
            'n' => "%-m",
            'd' => "%d",
            'j' => "%-d",
            'H' => "%H",
            'G' => "%-H",
            'h' => "%I",
            'g' => "%-I",
            'i' => "%M",
            's' => "%S",
            'A' => "%p",
            'a' => "%P",
            'M' => "%b",
            'D' => "%a",
            'U' => "%s",
            '\\' => {
                if let Some(lit) = chars.next() {
                    push_literal(&mut out, lit);
                }
                continue;
            }
            c if c.is_ascii_alphabetic() => {
                return Err(SyncError::Config(format!(
                    "unsupported date character `{c}` in timestamp format `{raw}`"
                )));
            }
            c => {
                push_literal(&mut out, c);
                continue;
            }
        };
        out.push_str(directive);
    }
    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn instant() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 2, 8)
            .and_then(|d| d.and_hms_opt(13, 56, 0))
            .expect("valid date")
    }

    #[test]
    fn php_pattern_matches_strftime_default() {
        let php = TimestampFormat::parse("Y-m-d_H-i-s").unwrap();
        assert_eq!(php.pattern(), DEFAULT_TIME_FORMAT);
        assert_eq!(php.token(&instant()).unwrap(), "2017-02-08_13-56-00");
        assert_eq!(
            TimestampFormat::default().token(&instant()).unwrap(),
            "2017-02-08_13-56-00"
        );
    }

    #[test]
    fn php_escapes_and_literals() {
        let fmt = TimestampFormat::parse(r"\v\Y-Ymd 100%").unwrap();
        assert_eq!(fmt.token(&instant()).unwrap(), "vY-20170208 100%");
    }

    #[test]
    fn bare_percent_is_not_a_directive() {
        assert!(has_strftime_directive("%Y-%m-%d"));
        assert!(has_strftime_directive("%-d.%-m"));
        assert!(has_strftime_directive("%Y-%"));
        assert!(!has_strftime_directive("Ymd 100%"));
        assert!(!has_strftime_directive("Y-m-d % H"));

        let fmt = TimestampFormat::parse("Y% m").unwrap();
        assert_eq!(fmt.pattern(), "%Y%% %m");
        assert_eq!(fmt.token(&instant()).unwrap(), "2017% 02");
    }

    #[test]
    fn rejects_unknown_php_letters() {
        assert!(matches!(
            TimestampFormat::parse("Y-m-d_Q"),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn rejects_tokens_with_separators() {
        let fmt = TimestampFormat::parse("%Y/%m/%d").unwrap();
        assert!(fmt.token(&instant()).is_err());
    }

    #[test]
    fn rejects_broken_strftime() {
        assert!(TimestampFormat::parse("%Y-%").is_err());
        assert!(TimestampFormat::parse("   ").is_err());
    }
}
