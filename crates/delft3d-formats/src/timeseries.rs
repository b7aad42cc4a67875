//! Time-series files (`.bct`, `.bcc`, `.dis`)
//!
//! A file is a sequence of blocks, one per boundary section or discharge
//! point. Each block is a header followed by a table:
//!
//! ```text
//! table-name           'Boundary Section : 1'
//! contents             'Uniform             '
//! location             '(2,246)..(7,246)    '
//! time-function        'non-equidistant'
//! reference-time       20200331
//! time-unit            'minutes'
//! interpolation        'linear'
//! parameter            'time                '                 unit '[minutes]'
//! parameter            'total discharge (t)  end A'           unit '[m3/s]'
//! parameter            'total discharge (t)  end B'           unit '[m3/s]'
//! records-in-table     2
//!  0.0000000e+00 -5.2445400e+00 -5.2445400e+00
//!  1.0000000e+01 -5.5135700e+00 -5.5135700e+00
//! ```
//!
//! Header values keep their padding through [`FormatValue`]. The first
//! table column is the time in minutes relative to `reference-time`; the
//! other two are the data columns named by the second and third parameter.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::{debug, warn};

use crate::error::{FormatError, Result};
use crate::numfmt;
use crate::value::{FormatValue, Width};

/// Line that opens a block
const TABLE_NAME: &str = "table-name";
/// Header field holding the reference date
const REFERENCE_TIME: &str = "reference-time";
/// Header field closing the header
const RECORDS_IN_TABLE: &str = "records-in-table";
/// Header name of the column descriptions
const PARAMETER: &str = "parameter";
/// Column width of header names
const NAME_WIDTH: usize = 21;
/// Date format of `reference-time`
const DATE_FORMAT: &str = "%Y%m%d";
/// Columns per table row: relative time and two values
const COLUMNS: usize = 3;

/// Whether parameter edits change the label or the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterTarget {
    /// Change the quoted label
    #[default]
    Value,
    /// Change the unit clause
    Unit,
}

/// One change applied by [`TimeSeriesDocument::set_header`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderEdit {
    /// Replace a regular header field, `reference-time` or `records-in-table`
    Field {
        /// Header name
        name: String,
        /// New value, without quotes
        value: String,
    },
    /// Replace the label or unit of a parameter
    Parameter {
        /// Current label of the parameter
        label: String,
        /// New label or unit
        value: String,
    },
}

impl HeaderEdit {
    /// Edit of a header field
    pub fn field(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Field {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Edit of a parameter
    pub fn parameter(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Parameter {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Header of one block
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    fields: Vec<(String, FormatValue)>,
    /// Index into `fields` before which the parameter lines are written
    parameter_position: usize,
    parameters: Vec<FormatValue>,
    records_in_table: FormatValue,
}

impl Header {
    /// Value of a header field, `records-in-table` included
    pub fn get(&self, name: &str) -> Option<&FormatValue> {
        if name == RECORDS_IN_TABLE {
            return Some(&self.records_in_table);
        }
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Parameter by its trimmed label
    pub fn parameter(&self, label: &str) -> Option<&FormatValue> {
        self.parameters
            .iter()
            .find(|value| label_of(value) == label)
    }

    /// Parameters in header order
    pub fn parameters(&self) -> &[FormatValue] {
        &self.parameters
    }

    /// Regular header fields in file order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FormatValue)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Declared number of table rows
    pub fn records_in_table(&self) -> Option<usize> {
        self.records_in_table.as_str().parse().ok()
    }

    fn parse(lines: &[&str], block: usize) -> Result<(Self, usize)> {
        let section = format!("block {block} header");
        let mut fields: Vec<(String, FormatValue)> = Vec::new();
        let mut parameters = Vec::new();
        let mut parameter_position = None;

        for (offset, line) in lines.iter().enumerate() {
            let name = line
                .split_whitespace()
                .next()
                .filter(|_| !line.starts_with(char::is_whitespace))
                .ok_or_else(|| FormatError::MalformedHeader {
                    section: section.clone(),
                    reason: format!("expected 'name value', found '{line}'"),
                })?;
            let rest = line[name.len()..].trim_start();
            if rest.is_empty() {
                return Err(FormatError::MalformedHeader {
                    section: section.clone(),
                    reason: format!("'{name}' has no value"),
                });
            }
            let value = FormatValue::parse_field(rest)?;

            match name {
                RECORDS_IN_TABLE => {
                    if parameters.len() != COLUMNS {
                        return Err(FormatError::TokenCount {
                            section: format!("block {block} parameters"),
                            expected: COLUMNS,
                            actual: parameters.len(),
                        });
                    }
                    let header = Self {
                        parameter_position: parameter_position.unwrap_or(fields.len()),
                        fields,
                        parameters,
                        records_in_table: value,
                    };
                    return Ok((header, offset + 1));
                }
                PARAMETER => {
                    let label = label_of(&value);
                    if parameters.iter().any(|other| label_of(other) == label) {
                        return Err(FormatError::DuplicateParameter(label.to_string()));
                    }
                    parameter_position.get_or_insert(fields.len());
                    parameters.push(value);
                }
                _ => {
                    if fields.iter().any(|(key, _)| key == name) {
                        return Err(FormatError::MalformedHeader {
                            section: section.clone(),
                            reason: format!("duplicate field '{name}'"),
                        });
                    }
                    fields.push((name.to_string(), value));
                }
            }
        }

        Err(FormatError::MissingField {
            section: format!("block {block}"),
            field: RECORDS_IN_TABLE.to_string(),
        })
    }

    fn export(&self, output: &mut String) {
        for (index, (name, value)) in self.fields.iter().enumerate() {
            if index == self.parameter_position {
                self.export_parameters(output);
            }
            let _ = writeln!(output, "{name:<NAME_WIDTH$}{}", value.render());
        }
        if self.parameter_position >= self.fields.len() {
            self.export_parameters(output);
        }
        let _ = writeln!(
            output,
            "{RECORDS_IN_TABLE:<NAME_WIDTH$}{}",
            self.records_in_table.render()
        );
    }

    fn export_parameters(&self, output: &mut String) {
        for value in &self.parameters {
            let _ = writeln!(output, "{PARAMETER:<NAME_WIDTH$}{}", value.render());
        }
    }

    fn apply(&mut self, edit: &HeaderEdit, target: ParameterTarget) -> Result<()> {
        match edit {
            HeaderEdit::Field { name, value } => {
                let field = if name == RECORDS_IN_TABLE {
                    &mut self.records_in_table
                } else {
                    self.fields
                        .iter_mut()
                        .find(|(key, _)| key == name)
                        .map(|(_, field)| field)
                        .ok_or_else(|| FormatError::UnknownHeaderField(name.clone()))?
                };
                field.set_value(value, Width::Preserve)
            }
            HeaderEdit::Parameter { label, value } => {
                let missing = || FormatError::UnknownHeaderField(format!("{PARAMETER} '{label}'"));
                let index = self
                    .parameters
                    .iter()
                    .position(|parameter| label_of(parameter) == label)
                    .ok_or_else(missing)?;
                match target {
                    ParameterTarget::Unit => self.parameters[index].set_unit(value),
                    ParameterTarget::Value => {
                        let renamed = value.trim();
                        let clash = self
                            .parameters
                            .iter()
                            .enumerate()
                            .any(|(other, parameter)| {
                                other != index && label_of(parameter) == renamed
                            });
                        if clash {
                            return Err(FormatError::DuplicateParameter(renamed.to_string()));
                        }
                        self.parameters[index].set_value(value, Width::Preserve)
                    }
                }
            }
        }
    }
}

/// One row of a table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    /// Absolute time of the row
    pub time: NaiveDateTime,
    /// Time relative to the reference, in minutes
    pub minutes: f64,
    /// The two data values
    pub values: [f64; 2],
}

/// Rows of one block
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    reference: NaiveDateTime,
    rows: Vec<Record>,
}

impl TimeSeriesTable {
    /// Reference time the rows are relative to
    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    /// Rows in file order
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Absolute time of every row
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.rows.iter().map(|record| record.time).collect()
    }

    /// Column by index: 0 is the relative time, 1 and 2 the data columns
    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        match index {
            0 => Some(self.rows.iter().map(|record| record.minutes).collect()),
            1 | 2 => Some(self.rows.iter().map(|record| record.values[index - 1]).collect()),
            _ => None,
        }
    }

    fn parse(
        lines: &[&str],
        reference: NaiveDateTime,
        block: usize,
        first_line: usize,
    ) -> Result<Self> {
        let mut rows = Vec::with_capacity(lines.len());
        for (offset, line) in lines.iter().enumerate() {
            let section = format!("block {block} line {}", first_line + offset);
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != COLUMNS {
                return Err(FormatError::TokenCount {
                    section,
                    expected: COLUMNS,
                    actual: tokens.len(),
                });
            }
            let mut numbers = [0.0; COLUMNS];
            for (slot, token) in numbers.iter_mut().zip(&tokens) {
                *slot = numfmt::parse_number(token).ok_or_else(|| FormatError::InvalidNumber {
                    section: section.clone(),
                    token: (*token).to_string(),
                })?;
            }
            let time = offset_time(reference, numbers[0]).ok_or_else(|| FormatError::InvalidNumber {
                section,
                token: tokens[0].to_string(),
            })?;
            rows.push(Record {
                time,
                minutes: numbers[0],
                values: [numbers[1], numbers[2]],
            });
        }
        Ok(Self { reference, rows })
    }

    fn export(&self, output: &mut String) {
        for record in &self.rows {
            let _ = writeln!(
                output,
                " {} {} {}",
                numfmt::exp(record.minutes, 7),
                numfmt::exp(record.values[0], 7),
                numfmt::exp(record.values[1], 7)
            );
        }
    }
}

/// One header and table
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesBlock {
    header: Header,
    table: TimeSeriesTable,
}

impl TimeSeriesBlock {
    /// Header of the block
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Table of the block
    pub fn table(&self) -> &TimeSeriesTable {
        &self.table
    }

    /// Labels of the three columns
    pub fn column_names(&self) -> Vec<&str> {
        self.header.parameters.iter().map(label_of).collect()
    }

    /// Reference time of the table
    pub fn reference_time(&self) -> NaiveDateTime {
        self.table.reference
    }

    fn parse(lines: &[&str], block: usize, first_line: usize) -> Result<Self> {
        let (header, consumed) = Header::parse(lines, block)?;

        let raw = header
            .get(REFERENCE_TIME)
            .ok_or_else(|| FormatError::MissingField {
                section: format!("block {block}"),
                field: REFERENCE_TIME.to_string(),
            })?
            .as_str();
        let reference = NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map_err(|err| FormatError::MalformedHeader {
                section: format!("block {block} {REFERENCE_TIME}"),
                reason: format!("'{raw}' is not a {DATE_FORMAT} date: {err}"),
            })?
            .and_time(NaiveTime::default());

        let start = first_line + consumed;
        let table = TimeSeriesTable::parse(&lines[consumed..], reference, block, start)?;

        let declared = header.records_in_table();
        if declared != Some(table.len()) {
            return Err(FormatError::DimensionMismatch {
                section: format!("block {block} {RECORDS_IN_TABLE}"),
                expected: header.records_in_table.as_str().to_string(),
                actual: format!("{} rows", table.len()),
            });
        }

        Ok(Self { header, table })
    }
}

/// Parsed time-series file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeriesDocument {
    blocks: Vec<TimeSeriesBlock>,
}

impl TimeSeriesDocument {
    /// Parse a time-series file
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();
        let starts: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.starts_with(TABLE_NAME))
            .map(|(index, _)| index)
            .collect();

        let leading = starts.first().copied().unwrap_or(lines.len());
        if let Some(line) = lines[..leading].iter().find(|line| !line.trim().is_empty()) {
            return Err(FormatError::MalformedHeader {
                section: "file".to_string(),
                reason: format!("content before the first '{TABLE_NAME}': '{line}'"),
            });
        }
        if leading > 0 {
            return Err(FormatError::MalformedHeader {
                section: "file".to_string(),
                reason: format!("blank lines before the first '{TABLE_NAME}'"),
            });
        }

        let mut blocks = Vec::with_capacity(starts.len());
        for (block, &start) in starts.iter().enumerate() {
            let end = starts.get(block + 1).copied().unwrap_or(lines.len());
            blocks.push(TimeSeriesBlock::parse(&lines[start..end], block, start + 1)?);
        }

        debug!("Parsed time-series file with {} blocks", blocks.len());
        Ok(Self { blocks })
    }

    /// Render the file
    pub fn export(&self) -> String {
        let mut output = String::new();
        for block in &self.blocks {
            block.header.export(&mut output);
            block.table.export(&mut output);
        }
        output
    }

    /// Blocks in file order
    pub fn blocks(&self) -> &[TimeSeriesBlock] {
        &self.blocks
    }

    /// Block by index
    pub fn block(&self, index: usize) -> Option<&TimeSeriesBlock> {
        self.blocks.get(index)
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when the file has no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Edit header fields and parameters of one block.
    ///
    /// All edits are applied or none. `target` decides whether parameter
    /// edits change labels or units. Changing `reference-time` or
    /// `records-in-table` does not touch the table; a warning is logged.
    pub fn set_header(
        &mut self,
        block: usize,
        edits: &[HeaderEdit],
        target: ParameterTarget,
    ) -> Result<()> {
        let count = self.blocks.len();
        let entry = self
            .blocks
            .get_mut(block)
            .ok_or(FormatError::BlockOutOfRange {
                index: block,
                count,
            })?;

        let mut header = entry.header.clone();
        for edit in edits {
            header.apply(edit, target)?;
        }

        let touches_table = edits.iter().any(|edit| match edit {
            HeaderEdit::Field { name, .. } => name == REFERENCE_TIME || name == RECORDS_IN_TABLE,
            HeaderEdit::Parameter { .. } => false,
        });
        if touches_table {
            warn!(
                "'{}' or '{}' changed in block {}, the table was not updated",
                REFERENCE_TIME, RECORDS_IN_TABLE, block
            );
        }

        entry.header = header;
        Ok(())
    }

    /// Replace the table of one block.
    ///
    /// Both series must have the same strictly increasing timestamps.
    /// Relative times are recomputed against `reference`, and
    /// `reference-time` and `records-in-table` are updated.
    pub fn set_time_series(
        &mut self,
        block: usize,
        reference: NaiveDateTime,
        first: &[(NaiveDateTime, f64)],
        second: &[(NaiveDateTime, f64)],
    ) -> Result<()> {
        let count = self.blocks.len();
        let entry = self
            .blocks
            .get_mut(block)
            .ok_or(FormatError::BlockOutOfRange {
                index: block,
                count,
            })?;

        if first.len() != second.len() {
            return Err(FormatError::MisalignedSeries(format!(
                "{} values against {}",
                first.len(),
                second.len()
            )));
        }
        let mut rows = Vec::with_capacity(first.len());
        for (index, (&(time, a), &(other, b))) in first.iter().zip(second).enumerate() {
            if time != other {
                return Err(FormatError::MisalignedSeries(format!(
                    "row {index}: {time} against {other}"
                )));
            }
            if let Some(previous) = rows.last().map(|record: &Record| record.time) {
                if time <= previous {
                    return Err(FormatError::MisalignedSeries(format!(
                        "row {index}: {time} does not follow {previous}"
                    )));
                }
            }
            rows.push(Record {
                time,
                minutes: minutes_between(reference, time),
                values: [a, b],
            });
        }

        let mut header = entry.header.clone();
        header.apply(
            &HeaderEdit::field(RECORDS_IN_TABLE, rows.len().to_string()),
            ParameterTarget::Value,
        )?;
        header.apply(
            &HeaderEdit::field(REFERENCE_TIME, reference.format(DATE_FORMAT).to_string()),
            ParameterTarget::Value,
        )?;

        debug!("Replaced table of block {} with {} rows", block, rows.len());
        entry.header = header;
        entry.table = TimeSeriesTable { reference, rows };
        Ok(())
    }
}

impl crate::Delft3dFormat for TimeSeriesDocument {
    fn parse(text: &str) -> Result<Self> {
        Self::parse(text)
    }

    fn export(&self) -> Result<String> {
        Ok(self.export())
    }
}

/// Parameter label without padding
fn label_of(value: &FormatValue) -> &str {
    value.as_str().trim()
}

fn offset_time(reference: NaiveDateTime, minutes: f64) -> Option<NaiveDateTime> {
    let millis = (minutes * 60_000.0).round();
    if !millis.is_finite() {
        return None;
    }
    let delta = TimeDelta::try_milliseconds(millis as i64)?;
    reference.checked_add_signed(delta)
}

fn minutes_between(reference: NaiveDateTime, time: NaiveDateTime) -> f64 {
    let delta = time - reference;
    delta.num_milliseconds() as f64 / 60_000.0
}
