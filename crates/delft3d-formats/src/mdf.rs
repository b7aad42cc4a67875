//! Master definition file (`.mdf`)
//!
//! A flat list of `Name = value` lines. Values come in a few shapes:
//!
//! ```text
//! Ident  = #Delft3D-FLOW 3.59.01.57433#
//! MNKmax = 7
//!           245
//!           1
//! Runtxt = #river model#
//!          #second line#
//! Flmap  = 0.0000000e+00 1.0000000e+01 4.3200000e+03
//! Anglat = 2.2560000e+01
//! Sub1   = #    #
//! Tstart = [000.0]
//! ```
//!
//! Lines indented with whitespace continue the previous parameter. Numbers are
//! written back in `%.7e`, except for a handful of integer parameters. `Commnt`
//! entries carry no model input and are dropped.

use std::fmt::{self, Write as _};

use tracing::debug;

use crate::error::{FormatError, Result};
use crate::numfmt;

/// Parameters rendered as integers
const INTEGER_KEYS: [&str; 5] = ["MNKmax", "Ktemp", "Ivapop", "Irov", "Iter"];
/// Parameter whose value is always a list of text lines
const RUN_TEXT_KEY: &str = "Runtxt";
/// Comment parameter, dropped on parse
const COMMENT_KEY: &str = "Commnt";
/// Indent of numeric continuation lines
const NUMBER_INDENT: &str = "          ";
/// Indent of text continuation lines
const TEXT_INDENT: &str = "         ";

/// Value of one parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// Single number
    Scalar(f64),
    /// Numbers on one line
    Vector(Vec<f64>),
    /// Numbers one per line
    Matrix(Vec<f64>),
    /// `#`-delimited text
    QuotedString(String),
    /// `#`-delimited text spread over several lines
    StringList(Vec<String>),
    /// Bracketed literal kept as written
    Verbatim(String),
}

impl ParameterValue {
    /// Short name of the value kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Vector(_) => "vector",
            Self::Matrix(_) => "matrix",
            Self::QuotedString(_) => "string",
            Self::StringList(_) => "string list",
            Self::Verbatim(_) => "verbatim",
        }
    }

    /// Single number, if this is a scalar
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    /// Numbers of a scalar, vector or matrix
    pub fn as_numbers(&self) -> Option<&[f64]> {
        match self {
            Self::Scalar(value) => Some(std::slice::from_ref(value)),
            Self::Vector(values) | Self::Matrix(values) => Some(values),
            _ => None,
        }
    }

    /// Text of a quoted string or verbatim literal
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::QuotedString(text) | Self::Verbatim(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => write!(f, "{value}"),
            Self::Vector(values) | Self::Matrix(values) => {
                let joined: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", joined.join(", "))
            }
            Self::QuotedString(text) | Self::Verbatim(text) => f.write_str(text),
            Self::StringList(lines) => f.write_str(&lines.join("\n")),
        }
    }
}

/// New value handed to [`ParameterStore::set_parameter`] or
/// [`ParameterStore::add_parameter`]
///
/// The stored kind is decided by the store: the same input may become a
/// scalar for one parameter and a single-element column for another.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterInput {
    /// One number
    Number(f64),
    /// A sequence of numbers
    Numbers(Vec<f64>),
    /// A line of text
    Text(String),
    /// Several lines of text
    Lines(Vec<String>),
}

impl From<f64> for ParameterInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for ParameterInput {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<Vec<f64>> for ParameterInput {
    fn from(values: Vec<f64>) -> Self {
        Self::Numbers(values)
    }
}

impl From<&[f64]> for ParameterInput {
    fn from(values: &[f64]) -> Self {
        Self::Numbers(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for ParameterInput {
    fn from(values: [f64; N]) -> Self {
        Self::Numbers(values.to_vec())
    }
}

impl From<&str> for ParameterInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ParameterInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for ParameterInput {
    fn from(lines: Vec<String>) -> Self {
        Self::Lines(lines)
    }
}

impl From<Vec<&str>> for ParameterInput {
    fn from(lines: Vec<&str>) -> Self {
        Self::Lines(lines.into_iter().map(str::to_string).collect())
    }
}

/// Ordered parameters of an mdf file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterStore {
    entries: Vec<(String, ParameterValue)>,
}

impl ParameterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an mdf file
    pub fn parse(text: &str) -> Result<Self> {
        let mut store = Self::new();
        // Entry that continuation lines extend
        let mut current: Option<usize> = None;
        let mut in_comment = false;

        for (number, line) in text.lines().enumerate() {
            let number = number + 1;
            if line.trim().is_empty() {
                return Err(line_error(number, "blank line"));
            }

            if line.starts_with(char::is_whitespace) {
                if in_comment {
                    continue;
                }
                let index = current
                    .ok_or_else(|| line_error(number, "continuation line before any parameter"))?;
                let (name, value) = &mut store.entries[index];
                extend(name, value, line.trim()).map_err(|reason| line_error(number, &reason))?;
                continue;
            }

            let (name, raw) = line
                .split_once('=')
                .ok_or_else(|| line_error(number, "expected 'Name = value'"))?;
            let name = name.trim_end();
            validate_name(name)
                .map_err(|_| line_error(number, &format!("invalid parameter name '{name}'")))?;

            if name == COMMENT_KEY {
                in_comment = true;
                continue;
            }
            in_comment = false;

            if store.contains(name) {
                return Err(FormatError::DuplicateParameter(name.to_string()));
            }
            let value = classify(raw.trim_start()).map_err(|reason| FormatError::Unclassifiable {
                key: name.to_string(),
                reason,
            })?;
            store.entries.push((name.to_string(), value));
            current = Some(store.entries.len() - 1);
        }

        debug!("Parsed mdf file with {} parameters", store.len());
        Ok(store)
    }

    /// Render the mdf file
    pub fn export(&self) -> Result<String> {
        let mut output = String::new();
        for (name, value) in &self.entries {
            validate_value(name, value)?;
            let integer = INTEGER_KEYS.contains(&name.as_str());
            let number = |value: f64| render_number(name, value, integer);

            match value {
                ParameterValue::Scalar(value) => {
                    let _ = writeln!(output, "{name:<6} = {}", number(*value)?);
                }
                ParameterValue::Vector(values) => {
                    let _ = write!(output, "{name:<6} =");
                    for value in values {
                        let _ = write!(output, " {}", number(*value)?);
                    }
                    output.push('\n');
                }
                ParameterValue::Matrix(values) => {
                    for (index, value) in values.iter().enumerate() {
                        if index == 0 {
                            let _ = writeln!(output, "{name:<6} = {}", number(*value)?);
                        } else {
                            let _ = writeln!(output, "{NUMBER_INDENT}{}", number(*value)?);
                        }
                    }
                }
                ParameterValue::QuotedString(text) => {
                    let _ = writeln!(output, "{name:<6} = #{text}#");
                }
                ParameterValue::StringList(lines) => {
                    for (index, line) in lines.iter().enumerate() {
                        if index == 0 {
                            let _ = writeln!(output, "{name:<6} = #{line}#");
                        } else {
                            let _ = writeln!(output, "{TEXT_INDENT}#{line}#");
                        }
                    }
                }
                ParameterValue::Verbatim(text) => {
                    let _ = writeln!(output, "{name:<6} = {text}");
                }
            }
        }
        Ok(output)
    }

    /// Replace the value of an existing parameter.
    ///
    /// The input is coerced to the kind the parameter already has. A
    /// parameter that cannot take the input is left unchanged.
    pub fn set_parameter(&mut self, name: &str, input: impl Into<ParameterInput>) -> Result<()> {
        let input = input.into();
        let index = self
            .position(name)
            .ok_or_else(|| FormatError::UnknownParameter(name.to_string()))?;
        let value = coerce(name, &self.entries[index].1, input)?;
        validate_value(name, &value)?;
        self.entries[index].1 = value;
        Ok(())
    }

    /// Append a new parameter; its kind is inferred from the input
    pub fn add_parameter(&mut self, name: &str, input: impl Into<ParameterInput>) -> Result<()> {
        validate_name(name)?;
        if self.contains(name) {
            return Err(FormatError::DuplicateParameter(name.to_string()));
        }
        let value = infer(name, input.into());
        validate_value(name, &value)?;
        self.entries.push((name.to_string(), value));
        Ok(())
    }

    /// Remove a parameter, returning its value
    pub fn remove_parameter(&mut self, name: &str) -> Option<ParameterValue> {
        let index = self.position(name)?;
        Some(self.entries.remove(index).1)
    }

    /// Value of a parameter
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.position(name).map(|index| &self.entries[index].1)
    }

    /// Parameters in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Parameter names in file order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the store holds no parameters
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a parameter exists
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == name)
    }
}

impl crate::Delft3dFormat for ParameterStore {
    fn parse(text: &str) -> Result<Self> {
        Self::parse(text)
    }

    fn export(&self) -> Result<String> {
        self.export()
    }
}

/// Classify the value part of a `Name = value` line
fn classify(raw: &str) -> std::result::Result<ParameterValue, String> {
    if raw.contains('[') {
        return Ok(ParameterValue::Verbatim(raw.to_string()));
    }
    if raw.contains('#') {
        return Ok(ParameterValue::QuotedString(raw.trim_end().replace('#', "")));
    }

    let numbers = raw
        .split_whitespace()
        .map(|token| {
            numfmt::parse_number(token).ok_or_else(|| format!("'{token}' is not a number"))
        })
        .collect::<std::result::Result<Vec<f64>, String>>()?;
    match numbers.as_slice() {
        [] => Err("empty value".to_string()),
        [value] => Ok(ParameterValue::Scalar(*value)),
        _ => Ok(ParameterValue::Vector(numbers)),
    }
}

/// Apply a continuation line to the value it belongs to
fn extend(
    name: &str,
    value: &mut ParameterValue,
    content: &str,
) -> std::result::Result<(), String> {
    if content.contains('#') {
        let text = content.replace('#', "");
        match value {
            ParameterValue::StringList(lines) => lines.push(text),
            ParameterValue::QuotedString(first) => {
                let first = std::mem::take(first);
                *value = ParameterValue::StringList(vec![first, text]);
            }
            ParameterValue::Scalar(first) => {
                let integer = INTEGER_KEYS.contains(&name);
                let first = render_number(name, *first, integer).map_err(|err| err.to_string())?;
                *value = ParameterValue::StringList(vec![first, text]);
            }
            other => return Err(format!("text line cannot continue a {}", other.kind())),
        }
        return Ok(());
    }

    let number = numfmt::parse_number(content)
        .ok_or_else(|| format!("expected a single number, found '{content}'"))?;
    match value {
        ParameterValue::Matrix(values) => values.push(number),
        ParameterValue::Scalar(first) => {
            let first = *first;
            *value = ParameterValue::Matrix(vec![first, number]);
        }
        ParameterValue::Vector(values) => {
            let mut column = std::mem::take(values);
            column.push(number);
            *value = ParameterValue::Matrix(column);
        }
        other => return Err(format!("number line cannot continue a {}", other.kind())),
    }
    Ok(())
}

/// Convert an input to the kind of the current value
fn coerce(name: &str, current: &ParameterValue, input: ParameterInput) -> Result<ParameterValue> {
    let mismatch = |input: &ParameterInput| FormatError::Unclassifiable {
        key: name.to_string(),
        reason: format!("cannot store {input:?} in a {}", current.kind()),
    };

    let value = match (current, input) {
        (ParameterValue::Scalar(_), ParameterInput::Number(value)) => ParameterValue::Scalar(value),
        (ParameterValue::Scalar(_), ParameterInput::Text(text)) => {
            let trimmed = text.trim();
            let value = numfmt::parse_number(trimmed).ok_or_else(|| FormatError::InvalidNumber {
                section: name.to_string(),
                token: text.clone(),
            })?;
            ParameterValue::Scalar(value)
        }
        (ParameterValue::Vector(_), ParameterInput::Numbers(values)) => {
            ParameterValue::Vector(values)
        }
        (ParameterValue::Vector(_), ParameterInput::Number(value)) => {
            ParameterValue::Vector(vec![value])
        }
        (ParameterValue::Matrix(_), ParameterInput::Numbers(values)) => {
            ParameterValue::Matrix(values)
        }
        (ParameterValue::Matrix(_), ParameterInput::Number(value)) => {
            ParameterValue::Matrix(vec![value])
        }
        (_, ParameterInput::Text(text)) if name == RUN_TEXT_KEY => {
            ParameterValue::StringList(vec![text])
        }
        (ParameterValue::Verbatim(_), ParameterInput::Text(text)) if text.contains('[') => {
            ParameterValue::Verbatim(text)
        }
        (
            ParameterValue::QuotedString(_)
            | ParameterValue::StringList(_)
            | ParameterValue::Verbatim(_),
            ParameterInput::Text(text),
        ) => ParameterValue::QuotedString(text),
        (
            ParameterValue::QuotedString(_) | ParameterValue::StringList(_),
            ParameterInput::Lines(lines),
        ) => ParameterValue::StringList(lines),
        (ParameterValue::QuotedString(_), ParameterInput::Number(value)) => {
            ParameterValue::QuotedString(value.to_string())
        }
        (_, input) => return Err(mismatch(&input)),
    };
    Ok(value)
}

/// Kind of a new parameter
fn infer(name: &str, input: ParameterInput) -> ParameterValue {
    match input {
        ParameterInput::Number(value) => ParameterValue::Scalar(value),
        ParameterInput::Numbers(values) => ParameterValue::Vector(values),
        ParameterInput::Text(text) if name == RUN_TEXT_KEY => {
            ParameterValue::StringList(vec![text])
        }
        ParameterInput::Text(text) if text.contains('[') => ParameterValue::Verbatim(text),
        ParameterInput::Text(text) => ParameterValue::QuotedString(text),
        ParameterInput::Lines(lines) => ParameterValue::StringList(lines),
    }
}

/// Check that a value renders to text that parses back to the same kind
fn validate_value(name: &str, value: &ParameterValue) -> Result<()> {
    let fail = |reason: &str| {
        Err(FormatError::Unclassifiable {
            key: name.to_string(),
            reason: reason.to_string(),
        })
    };
    let plain_text = |text: &str| !text.contains(['#', '[', '\n', '\r']);

    match value {
        ParameterValue::Scalar(_) => Ok(()),
        ParameterValue::Vector(values) | ParameterValue::Matrix(values) if values.is_empty() => {
            fail("empty number sequence")
        }
        ParameterValue::Vector(_) | ParameterValue::Matrix(_) => Ok(()),
        ParameterValue::QuotedString(text) if !plain_text(text) => {
            fail("text cannot contain '#', '[' or line breaks")
        }
        ParameterValue::QuotedString(_) => Ok(()),
        ParameterValue::StringList(lines) if lines.is_empty() => fail("empty text list"),
        // Only the first line is classified on re-read, later lines may hold '['
        ParameterValue::StringList(lines)
            if !plain_text(&lines[0])
                || lines.iter().any(|line| line.contains(['#', '\n', '\r'])) =>
        {
            fail("text cannot contain '#' or line breaks, nor '[' on the first line")
        }
        ParameterValue::StringList(_) => Ok(()),
        ParameterValue::Verbatim(text) if !text.contains('[') || text.contains(['\n', '\r']) => {
            fail("bracketed value must contain '[' on a single line")
        }
        ParameterValue::Verbatim(_) => Ok(()),
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FormatError::Unclassifiable {
            key: name.to_string(),
            reason: "parameter names are letters, digits and underscores".to_string(),
        });
    }
    Ok(())
}

fn render_number(name: &str, value: f64, integer: bool) -> Result<String> {
    if integer {
        numfmt::int(value).ok_or_else(|| FormatError::InvalidNumber {
            section: name.to_string(),
            token: value.to_string(),
        })
    } else {
        Ok(numfmt::exp(value, 7))
    }
}

fn line_error(number: usize, reason: &str) -> FormatError {
    FormatError::Unclassifiable {
        key: format!("line {number}"),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_round_trip, test_round_trip};

    const SAMPLE: &str = "Ident  = #Delft3D-FLOW 3.59.01.57433#
MNKmax = 7
          245
          1
Anglat = 2.2560000e+01
Runtxt = #river model#
         #second line#
Flmap  = 0.0000000e+00 1.0000000e+01 4.3200000e+03
Thick  = 1.0000000e+02
Sub1   = #    #
Tstart = [000.0]
";

    #[test]
    fn test_parse_kinds() {
        let store = ParameterStore::parse(SAMPLE).expect("Test operation should succeed");
        assert_eq!(store.len(), 8);
        assert_eq!(
            store.get("Ident"),
            Some(&ParameterValue::QuotedString("Delft3D-FLOW 3.59.01.57433".to_string()))
        );
        assert_eq!(
            store.get("MNKmax"),
            Some(&ParameterValue::Matrix(vec![7.0, 245.0, 1.0]))
        );
        assert_eq!(store.get("Anglat"), Some(&ParameterValue::Scalar(22.56)));
        assert_eq!(
            store.get("Runtxt"),
            Some(&ParameterValue::StringList(vec![
                "river model".to_string(),
                "second line".to_string()
            ]))
        );
        assert_eq!(
            store.get("Flmap"),
            Some(&ParameterValue::Vector(vec![0.0, 10.0, 4320.0]))
        );
        assert_eq!(
            store.get("Sub1"),
            Some(&ParameterValue::QuotedString("    ".to_string()))
        );
        assert_eq!(
            store.get("Tstart"),
            Some(&ParameterValue::Verbatim("[000.0]".to_string()))
        );
    }

    #[test]
    fn test_round_trip_preserves_order() {
        assert_round_trip::<ParameterStore>(SAMPLE);
        let store = ParameterStore::parse(SAMPLE).expect("Test operation should succeed");
        let names: Vec<&str> = store.names().collect();
        assert_eq!(
            names,
            ["Ident", "MNKmax", "Anglat", "Runtxt", "Flmap", "Thick", "Sub1", "Tstart"]
        );
    }

    #[test]
    fn test_set_scalar_keeps_notation() {
        let text = "Ag     = 1.0000000e+01\n";
        let mut store = ParameterStore::parse(text).expect("Test operation should succeed");
        store
            .set_parameter("Ag", 10.0)
            .expect("Test operation should succeed");
        assert_eq!(
            store.export().expect("Test operation should succeed"),
            "Ag     = 1.0000000e+01\n"
        );

        store
            .set_parameter("Ag", "9.81")
            .expect("Test operation should succeed");
        assert_eq!(store.get("Ag"), Some(&ParameterValue::Scalar(9.81)));
    }

    #[test]
    fn test_set_integer_matrix() {
        let mut store = ParameterStore::parse(SAMPLE).expect("Test operation should succeed");
        store
            .set_parameter("MNKmax", [1.0, 2.0, 3.0])
            .expect("Test operation should succeed");
        let text = store.export().expect("Test operation should succeed");
        assert!(text.contains("MNKmax = 1\n          2\n          3\nAnglat"));
    }

    #[test]
    fn test_integer_keys_truncate() {
        let text = "Iter   = 2.9\nKtemp  = -1.5\n";
        let store = ParameterStore::parse(text).expect("Test operation should succeed");
        assert_eq!(
            store.export().expect("Test operation should succeed"),
            "Iter   = 2\nKtemp  = -1\n"
        );
    }

    #[test]
    fn test_comments_are_dropped() {
        let text = "Ident  = #x#\nCommnt = \n         #note#\nCommnt = 1\nDt     = 1.0000000e+00\n";
        let store = ParameterStore::parse(text).expect("Test operation should succeed");
        assert_eq!(store.names().collect::<Vec<_>>(), ["Ident", "Dt"]);
        assert_eq!(
            store.export().expect("Test operation should succeed"),
            "Ident  = #x#\nDt     = 1.0000000e+00\n"
        );
    }

    #[test]
    fn test_continuation_promotion() {
        let store = ParameterStore::parse("Thick  = 1 2\n          3\nFilsta = 1\n         #b#\n")
            .expect("Test operation should succeed");
        assert_eq!(
            store.get("Thick"),
            Some(&ParameterValue::Matrix(vec![1.0, 2.0, 3.0]))
        );
        assert_eq!(
            store.get("Filsta"),
            Some(&ParameterValue::StringList(vec![
                "1.0000000e+00".to_string(),
                "b".to_string()
            ]))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(ParameterStore::parse("Ident  = #x#\n\nDt     = 1\n").is_err());
        assert!(ParameterStore::parse("          1\n").is_err());
        assert!(ParameterStore::parse("no equals sign\n").is_err());
        assert!(ParameterStore::parse("Dt     = abc\n").is_err());
        assert!(ParameterStore::parse("Ident  = #x#\n          1\n").is_err());
        assert!(matches!(
            ParameterStore::parse("Dt     = 1\nDt     = 2\n"),
            Err(FormatError::DuplicateParameter(_))
        ));
    }

    #[test]
    fn test_set_parameter_coercion() {
        let mut store = ParameterStore::parse(SAMPLE).expect("Test operation should succeed");

        store
            .set_parameter("Runtxt", "one line")
            .expect("Test operation should succeed");
        assert_eq!(
            store.get("Runtxt"),
            Some(&ParameterValue::StringList(vec!["one line".to_string()]))
        );

        store
            .set_parameter("Flmap", 5.0)
            .expect("Test operation should succeed");
        assert_eq!(store.get("Flmap"), Some(&ParameterValue::Vector(vec![5.0])));

        store
            .set_parameter("Ident", 3.5)
            .expect("Test operation should succeed");
        assert_eq!(
            store.get("Ident"),
            Some(&ParameterValue::QuotedString("3.5".to_string()))
        );

        store
            .set_parameter("Tstart", "[001.0]")
            .expect("Test operation should succeed");
        assert_eq!(
            store.get("Tstart"),
            Some(&ParameterValue::Verbatim("[001.0]".to_string()))
        );
    }

    #[test]
    fn test_plain_text_becomes_quoted_string() {
        let text = "Tstart = [000.0]\nFilsta = #one#\n         #two#\nRuntxt = #old#\n";
        let mut store = ParameterStore::parse(text).expect("Test operation should succeed");
        assert!(matches!(store.get("Filsta"), Some(ParameterValue::StringList(_))));

        store
            .set_parameter("Tstart", "abc")
            .expect("Test operation should succeed");
        assert_eq!(
            store.get("Tstart"),
            Some(&ParameterValue::QuotedString("abc".to_string()))
        );

        store
            .set_parameter("Filsta", "one")
            .expect("Test operation should succeed");
        assert_eq!(
            store.get("Filsta"),
            Some(&ParameterValue::QuotedString("one".to_string()))
        );

        store
            .set_parameter("Runtxt", "new")
            .expect("Test operation should succeed");
        assert_eq!(
            store.get("Runtxt"),
            Some(&ParameterValue::StringList(vec!["new".to_string()]))
        );

        let exported = store.export().expect("Test operation should succeed");
        assert!(exported.starts_with("Tstart = #abc#\nFilsta = #one#\nRuntxt"));

        let reparsed = ParameterStore::parse(&exported).expect("Test operation should succeed");
        assert_eq!(reparsed.get("Tstart"), store.get("Tstart"));
        assert_eq!(reparsed.get("Filsta"), store.get("Filsta"));
    }

    #[test]
    fn test_failed_set_leaves_value() {
        let mut store = ParameterStore::parse(SAMPLE).expect("Test operation should succeed");
        assert!(store.set_parameter("Flmap", "abc").is_err());
        assert!(store.set_parameter("Anglat", "abc").is_err());
        assert!(store.set_parameter("Ident", "a#b").is_err());
        assert!(store.set_parameter("Flmap", Vec::<f64>::new()).is_err());
        assert!(matches!(
            store.set_parameter("Nope", 1.0),
            Err(FormatError::UnknownParameter(_))
        ));
        assert_eq!(
            store,
            ParameterStore::parse(SAMPLE).expect("Test operation should succeed")
        );
    }

    #[test]
    fn test_add_and_remove() {
        let mut store = ParameterStore::parse(SAMPLE).expect("Test operation should succeed");
        store
            .add_parameter("Filbnd", "river.bnd")
            .expect("Test operation should succeed");
        store
            .add_parameter("Trasol", "#bad#")
            .expect_err("Test operation should fail");
        assert!(matches!(
            store.add_parameter("Ident", "again"),
            Err(FormatError::DuplicateParameter(_))
        ));
        assert_eq!(store.names().last(), Some("Filbnd"));
        assert!(
            store
                .export()
                .expect("Test operation should succeed")
                .ends_with("Filbnd = #river.bnd#\n")
        );

        assert_eq!(
            store.remove_parameter("Anglat"),
            Some(ParameterValue::Scalar(22.56))
        );
        assert!(!store.contains("Anglat"));
        assert_eq!(store.remove_parameter("Anglat"), None);
        test_round_trip(&store).expect("Test operation should succeed");
    }
}
