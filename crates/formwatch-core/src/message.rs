//! Notification message templates.
//!
//! A template is plain text with `{placeholder}` references. Placeholders
//! resolve against the configured sheet column names (column `i` of the
//! row) plus the built-ins `{key}`, `{kind}` and `{submitted_at}`. Write
//! `{{` and `}}` for literal braces.
//!
//! Templates are validated once when parsed, so an unknown placeholder is a
//! startup error rather than a per-row delivery failure.

use crate::errors::FormwatchError;
use crate::model::Change;
use crate::timestamp::parse_submission_timestamp;
use std::collections::{HashMap, HashSet};

/// Default sheet layout of the form export
pub const DEFAULT_COLUMNS: &[&str] = &["timestamp", "name", "phone", "inquiry"];

/// Thank-you message sent to each new respondent
pub const DEFAULT_TEMPLATE: &str = "{name}님, 참여해주셔서 감사합니다!\n\
선택해주신 {inquiry} 문의에 대해 곧 다시 연락드리겠습니다.";

const BUILTINS: &[&str] = &["key", "kind", "submitted_at"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Column(usize),
    Key,
    Kind,
    SubmittedAt,
}

/// A parsed, validated message template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    segments: Vec<Segment>,
}

impl MessageTemplate {
    /// Parse `template` against the sheet's column names.
    ///
    /// # Errors
    ///
    /// - `InvalidColumnName` if a column name is empty, repeated or shadows
    ///   a built-in placeholder
    /// - `UnknownPlaceholder` if the template names something that is
    ///   neither a column nor a built-in
    /// - `UnbalancedBrace` for a lone `{` or `}`
    pub fn parse<S: AsRef<str>>(template: &str, columns: &[S]) -> Result<Self, FormwatchError> {
        let column_index = index_columns(columns)?;

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((offset, ch)) = chars.next() {
            match ch {
                '{' if chars.peek().map(|(_, c)| *c) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|(_, c)| *c) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(FormwatchError::UnbalancedBrace { offset }),
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(FormwatchError::UnbalancedBrace { offset }),
                            other => name.push(other),
                        }
                    }
                    if !closed {
                        return Err(FormwatchError::UnbalancedBrace { offset });
                    }

                    let name = name.trim();
                    let segment = match name {
                        "key" => Segment::Key,
                        "kind" => Segment::Kind,
                        "submitted_at" => Segment::SubmittedAt,
                        _ => match column_index.get(name) {
                            Some(index) => Segment::Column(*index),
                            None => {
                                return Err(FormwatchError::UnknownPlaceholder {
                                    name: name.to_string(),
                                })
                            }
                        },
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Render the message for one change. Missing cells render as "".
    pub fn render(&self, change: &Change) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Column(index) => out.push_str(change.row.cell(*index).unwrap_or("")),
                Segment::Key => out.push_str(change.key()),
                Segment::Kind => out.push_str(change.kind.as_str()),
                Segment::SubmittedAt => match parse_submission_timestamp(change.key()) {
                    Ok(at) => out.push_str(&at.format("%Y-%m-%d %H:%M").to_string()),
                    Err(_) => out.push_str(change.key()),
                },
            }
        }
        out
    }
}

fn index_columns<S: AsRef<str>>(columns: &[S]) -> Result<HashMap<&str, usize>, FormwatchError> {
    let mut seen = HashSet::new();
    let mut index = HashMap::with_capacity(columns.len());
    for (i, column) in columns.iter().enumerate() {
        let name = column.as_ref().trim();
        if name.is_empty() {
            return Err(FormwatchError::InvalidColumnName {
                name: column.as_ref().to_string(),
                reason: format!("column {} has an empty name", i),
            });
        }
        if BUILTINS.contains(&name) {
            return Err(FormwatchError::InvalidColumnName {
                name: name.to_string(),
                reason: "shadows a built-in placeholder".to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(FormwatchError::InvalidColumnName {
                name: name.to_string(),
                reason: "appears more than once".to_string(),
            });
        }
        index.insert(name, i);
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChangeKind, Row};

    #[test]
    fn test_default_template_parses_against_default_columns() {
        let template = MessageTemplate::parse(DEFAULT_TEMPLATE, DEFAULT_COLUMNS).unwrap();
        let change = Change::new(
            Row::from_iter(["t1", "Kim", "01012345678", "insurance"]),
            ChangeKind::New,
        );
        let text = template.render(&change);
        assert!(text.starts_with("Kim님"));
        assert!(text.contains("insurance 문의"));
    }

    #[test]
    fn test_shadowing_column_rejected() {
        let err = MessageTemplate::parse("hi", &["key", "name"]).unwrap_err();
        assert!(matches!(err, FormwatchError::InvalidColumnName { .. }));
    }
}
