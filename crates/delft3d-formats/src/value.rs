//! Format-preserving scalar fields
//!
//! Header fields of Delft3D time-series files are either quoted strings
//! padded with spaces to a fixed width (`'Uniform             '`) or bare
//! numbers (`20200331`), optionally followed by a unit clause whose leading
//! whitespace aligns it to a column (`   unit '[m3/s]'`). [`FormatValue`]
//! keeps the value together with everything needed to write it back exactly.

use crate::error::{FormatError, Result};
use crate::numfmt;

/// How a field is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    /// Bare numeric token
    Numeric,
    /// Single-quoted string padded to its width
    Quoted,
}

/// Width handling when a value is replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Width {
    /// Keep the width of the previous value (longer values still render in full)
    #[default]
    Preserve,
    /// Use the length of the new value
    Refit,
    /// Use an explicit width
    Exact(usize),
}

/// Typed view of a field value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Numeric field
    Number(f64),
    /// Quoted string field, without padding
    Text(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
struct Unit {
    name: String,
    /// Rendered width of the whole clause, including leading whitespace
    width: usize,
}

impl Unit {
    fn parse(clause: &str) -> Result<Self> {
        let trimmed = clause.trim();
        let name = trimmed
            .strip_prefix("unit '[")
            .and_then(|rest| rest.strip_suffix("]'"))
            .ok_or_else(|| malformed(format!("expected unit clause, found '{trimmed}'")))?;
        validate_unit_name(name)?;

        Ok(Self {
            name: name.to_string(),
            width: clause.trim_end().chars().count(),
        })
    }

    fn render(&self) -> String {
        let clause = format!("unit '[{}]'", self.name);
        format!("{clause:>width$}", width = self.width)
    }
}

/// A scalar or string field that renders back to its original layout
#[derive(Debug, Clone, PartialEq)]
pub struct FormatValue {
    text: String,
    number: Option<f64>,
    notation: Notation,
    width: usize,
    unit: Option<Unit>,
    /// Whitespace after the closing quote or unit clause
    trailing: String,
}

impl FormatValue {
    /// Parse a single token.
    ///
    /// A token wrapped in single quotes is a string whose interior length,
    /// trailing pad spaces included, is the preserved width. Anything else
    /// must be a number; its literal length (trailing spaces included) is the
    /// preserved width.
    pub fn parse(raw: &str) -> Result<Self> {
        if let Some(inner) = raw.strip_prefix('\'') {
            let inner = inner
                .strip_suffix('\'')
                .ok_or_else(|| malformed(format!("unterminated string {raw}")))?;
            if inner.contains('\'') {
                return Err(malformed(format!("stray quote in {raw}")));
            }
            return Ok(Self {
                text: inner.trim_end().to_string(),
                number: None,
                notation: Notation::Quoted,
                width: inner.chars().count(),
                unit: None,
                trailing: String::new(),
            });
        }

        let token = raw.trim_end();
        if token.is_empty() || token.contains(char::is_whitespace) {
            return Err(malformed(format!("expected a single token, found '{raw}'")));
        }
        let number = numfmt::parse_number(token).ok_or_else(|| FormatError::InvalidNumber {
            section: "header field".to_string(),
            token: token.to_string(),
        })?;

        Ok(Self {
            text: token.to_string(),
            number: Some(number),
            notation: Notation::Numeric,
            width: raw.chars().count(),
            unit: None,
            trailing: String::new(),
        })
    }

    /// Parse the value part of a header line, including an optional trailing
    /// ` unit '[...]'` clause. Whitespace after a quoted value is kept.
    pub fn parse_field(rest: &str) -> Result<Self> {
        if !rest.starts_with('\'') {
            return Self::parse(rest);
        }

        let close = rest[1..]
            .find('\'')
            .map(|pos| pos + 1)
            .ok_or_else(|| malformed(format!("unterminated string {rest}")))?;
        let mut value = Self::parse(&rest[..=close])?;

        let remainder = &rest[close + 1..];
        let clause = remainder.trim_end();
        if !clause.trim_start().is_empty() {
            value.unit = Some(Unit::parse(clause)?);
        }
        value.trailing = remainder[clause.len()..].to_string();
        Ok(value)
    }

    /// Build a quoted value from scratch
    pub fn quoted(text: impl Into<String>, width: usize) -> Result<Self> {
        let text = text.into();
        validate_quoted(&text)?;
        Ok(Self {
            width: width.max(text.chars().count()),
            text,
            number: None,
            notation: Notation::Quoted,
            unit: None,
            trailing: String::new(),
        })
    }

    /// Build a numeric value from scratch
    pub fn numeric(text: impl Into<String>) -> Result<Self> {
        let mut value = Self {
            text: String::new(),
            number: None,
            notation: Notation::Numeric,
            width: 0,
            unit: None,
            trailing: String::new(),
        };
        value.set_value(&text.into(), Width::Refit)?;
        Ok(value)
    }

    /// Typed value
    pub fn value(&self) -> FieldValue<'_> {
        match (self.notation, self.number) {
            (Notation::Numeric, Some(number)) => FieldValue::Number(number),
            _ => FieldValue::Text(&self.text),
        }
    }

    /// Value as written, without padding or quotes
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Numeric value, if the field is numeric or its text reads as a number
    pub fn as_f64(&self) -> Option<f64> {
        self.number.or_else(|| numfmt::parse_number(&self.text))
    }

    /// Notation kind
    pub fn notation(&self) -> Notation {
        self.notation
    }

    /// Preserved width of the value (interior width for quoted strings)
    pub fn width(&self) -> usize {
        self.width
    }

    /// Unit name, if the field carries a unit clause
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_ref().map(|unit| unit.name.as_str())
    }

    /// Replace the value, keeping the notation.
    ///
    /// Numeric fields only accept text that reads as a single number. The
    /// field is left unchanged when validation fails.
    pub fn set_value(&mut self, text: &str, width: Width) -> Result<()> {
        let (text, number) = match self.notation {
            Notation::Numeric => {
                let token = text.trim();
                if token.is_empty() || token.contains(char::is_whitespace) {
                    return Err(FormatError::InvalidNumber {
                        section: "header field".to_string(),
                        token: text.to_string(),
                    });
                }
                let number =
                    numfmt::parse_number(token).ok_or_else(|| FormatError::InvalidNumber {
                        section: "header field".to_string(),
                        token: token.to_string(),
                    })?;
                (token.to_string(), Some(number))
            }
            Notation::Quoted => {
                let text = text.trim_end();
                validate_quoted(text)?;
                (text.to_string(), None)
            }
        };

        self.width = match width {
            Width::Preserve => self.width,
            Width::Refit => text.chars().count(),
            Width::Exact(width) => width,
        };
        self.text = text;
        self.number = number;
        Ok(())
    }

    /// Replace the value with a number rendered in its shortest form
    pub fn set_number(&mut self, value: f64, width: Width) -> Result<()> {
        self.set_value(&format!("{value}"), width)
    }

    /// Replace the unit name, keeping the clause width
    pub fn set_unit(&mut self, name: &str) -> Result<()> {
        validate_unit_name(name)?;
        let unit = self
            .unit
            .as_mut()
            .ok_or_else(|| FormatError::MissingUnit(self.text.clone()))?;
        unit.name = name.to_string();
        Ok(())
    }

    /// Render the field exactly as it would appear in the file
    pub fn render(&self) -> String {
        let width = self.width;
        match self.notation {
            Notation::Quoted => {
                let mut rendered = format!("'{:<width$}'", self.text);
                if let Some(unit) = &self.unit {
                    rendered.push_str(&unit.render());
                }
                rendered.push_str(&self.trailing);
                rendered
            }
            Notation::Numeric => format!("{:<width$}", self.text),
        }
    }
}

fn validate_quoted(text: &str) -> Result<()> {
    if text.contains(['\'', '\n', '\r']) {
        return Err(malformed(format!("quoted value cannot hold '{text}'")));
    }
    Ok(())
}

fn validate_unit_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains([']', '\'', '\n']) {
        return Err(malformed(format!("invalid unit '{name}'")));
    }
    Ok(())
}

fn malformed(reason: String) -> FormatError {
    FormatError::MalformedHeader {
        section: "header field".to_string(),
        reason,
    }
}
