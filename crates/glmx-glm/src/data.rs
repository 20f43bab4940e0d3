//! Tabular data with missing values, and the design matrices built from it.

use crate::{GlmError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

/// Markers read as a missing cell in delimited text.
const NA_MARKERS: [&str; 3] = ["", "?", "NA"];

/// Named numeric columns of equal length; `None` marks a missing cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
}

impl Dataset {
    /// Empty dataset with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from `(name, values)` pairs.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Option<f64>>)>,
        S: Into<String>,
    {
        let mut data = Self::new();
        for (name, values) in columns {
            data.push_column(name, values)?;
        }
        Ok(data)
    }

    /// Append a column.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(GlmError::DuplicateColumn(name));
        }
        if !self.columns.is_empty() && values.len() != self.n_rows() {
            return Err(GlmError::DimensionMismatch {
                expected: self.n_rows(),
                got: values.len(),
            });
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| GlmError::UnknownColumn(name.to_string()))
    }

    /// Cells of a column.
    pub fn column(&self, name: &str) -> Result<&[Option<f64>]> {
        Ok(&self.columns[self.index_of(name)?])
    }

    /// Replace every present value of a column with `f(value)`.
    pub fn map_column<F: Fn(f64) -> f64>(&mut self, name: &str, f: F) -> Result<()> {
        let idx = self.index_of(name)?;
        for cell in self.columns[idx].iter_mut() {
            *cell = cell.map(&f);
        }
        Ok(())
    }

    fn retain_rows(&self, keep: &[bool]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|col| {
                col.iter()
                    .zip(keep)
                    .filter(|(_, keep)| **keep)
                    .map(|(v, _)| *v)
                    .collect()
            })
            .collect();
        Dataset {
            names: self.names.clone(),
            columns,
        }
    }

    /// Copy without any row that has a missing cell in any column.
    pub fn drop_missing(&self) -> Dataset {
        let keep: Vec<bool> = (0..self.n_rows())
            .map(|row| self.columns.iter().all(|col| col[row].is_some()))
            .collect();
        self.retain_rows(&keep)
    }

    /// Response vector and design matrix for `response ~ predictors`.
    ///
    /// Rows missing the response or any predictor are dropped; other
    /// columns are ignored. The design starts with an intercept column of
    /// ones named `intercept`.
    pub fn model_frame(&self, response: &str, predictors: &[&str], intercept: &str) -> Result<ModelFrame> {
        let y_col = self.column(response)?;
        let x_cols = predictors
            .iter()
            .map(|p| self.column(p))
            .collect::<Result<Vec<_>>>()?;

        let mut y = Vec::with_capacity(self.n_rows());
        let mut rows = Vec::with_capacity(self.n_rows());
        for row in 0..self.n_rows() {
            let Some(yv) = y_col[row] else { continue };
            let xs: Option<Vec<f64>> = x_cols.iter().map(|col| col[row]).collect();
            let Some(xs) = xs else { continue };

            let mut design_row = Vec::with_capacity(xs.len() + 1);
            design_row.push(1.0);
            design_row.extend(xs);
            rows.push(design_row);
            y.push(yv);
        }

        let mut names = vec![intercept.to_string()];
        names.extend(predictors.iter().map(|p| p.to_string()));

        Ok(ModelFrame {
            response: response.to_string(),
            y,
            design: Design::new(names, rows)?,
        })
    }

    /// Summary statistics of a column's present values.
    pub fn describe(&self, name: &str) -> Result<Summary> {
        let values: Vec<f64> = self.column(name)?.iter().flatten().copied().collect();
        Summary::from_values(&values).ok_or(GlmError::EmptyData)
    }

    /// Parse comma-separated text whose first line names the columns.
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut lines = data_lines(text);
        let (_, header) = lines.next().ok_or_else(|| GlmError::Csv {
            line: 1,
            message: "missing header".to_string(),
        })?;
        let names = split_fields(header);
        parse_rows(names, lines)
    }

    /// Parse comma-separated text without a header line.
    pub fn from_headerless_csv(text: &str, names: &[&str]) -> Result<Self> {
        parse_rows(names.iter().map(|n| n.to_string()).collect(), data_lines(text))
    }

    /// Parse a JSON array of flat records.
    ///
    /// Numbers and booleans are read as-is, `"Y"`/`"N"` as 1/0; any other
    /// value is missing. Columns appear in the order first seen.
    pub fn from_json_records(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let records = value
            .as_array()
            .ok_or_else(|| GlmError::InvalidRecords("expected a JSON array".to_string()))?;

        let mut names: Vec<String> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let object = record
                .as_object()
                .ok_or_else(|| GlmError::InvalidRecords(format!("record {} is not an object", i)))?;
            for key in object.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }

        let columns = names
            .iter()
            .map(|name| {
                records
                    .iter()
                    .map(|record| record.get(name).and_then(json_cell))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        Dataset::from_columns(names.into_iter().zip(columns))
    }

    /// Read a CSV file with a header line.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_csv(&read_text(path.as_ref())?)
    }

    /// Read a header-less CSV file.
    pub fn read_headerless_csv<P: AsRef<Path>>(path: P, names: &[&str]) -> Result<Self> {
        Self::from_headerless_csv(&read_text(path.as_ref())?, names)
    }

    /// Read a JSON records file.
    pub fn read_json_records<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_records(&read_text(path.as_ref())?)
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| GlmError::io(path, e))
}

fn json_cell(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) if s == "Y" => Some(1.0),
        Value::String(s) if s == "N" => Some(0.0),
        _ => None,
    }
}

/// Non-blank lines with their 1-based line numbers.
fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// Split one record on commas outside double quotes; `""` inside quotes is a
/// literal quote. Records never span lines.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field).trim().to_string()),
            c => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

fn parse_cell(field: &str) -> Option<f64> {
    if NA_MARKERS.contains(&field) {
        return None;
    }
    field.parse().ok()
}

fn parse_rows<'a>(names: Vec<String>, lines: impl Iterator<Item = (usize, &'a str)>) -> Result<Dataset> {
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); names.len()];
    for (line_no, line) in lines {
        let fields = split_fields(line);
        if fields.len() != names.len() {
            return Err(GlmError::Csv {
                line: line_no,
                message: format!("expected {} fields, found {}", names.len(), fields.len()),
            });
        }
        for (col, field) in columns.iter_mut().zip(fields) {
            col.push(parse_cell(&field));
        }
    }
    Dataset::from_columns(names.into_iter().zip(columns))
}

/// Row-major design matrix with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl Design {
    /// Build a design matrix, checking every row has one value per name.
    pub fn new(names: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| r.len() != names.len()) {
            return Err(GlmError::DimensionMismatch {
                expected: names.len(),
                got: bad.len(),
            });
        }
        Ok(Self { names, rows })
    }

    /// Column names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Rows.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of observations.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of parameters.
    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    /// Whether the first column is constant, i.e. the model has an intercept.
    pub fn has_intercept(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|r| r.first() == Some(&1.0))
    }
}

/// Response and design for one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFrame {
    /// Response column name.
    pub response: String,
    /// Response values.
    pub y: Vec<f64>,
    /// Design matrix.
    pub design: Design,
}

/// Count, moments and quartiles of a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); NaN for one value.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Summary {
    /// Summarise values; `None` if there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Some(Self {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[n - 1],
        })
    }
}

/// Linearly interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "count  {:>14.6}", self.count as f64)?;
        writeln!(f, "mean   {:>14.6}", self.mean)?;
        writeln!(f, "std    {:>14.6}", self.std)?;
        writeln!(f, "min    {:>14.6}", self.min)?;
        writeln!(f, "25%    {:>14.6}", self.q25)?;
        writeln!(f, "50%    {:>14.6}", self.median)?;
        writeln!(f, "75%    {:>14.6}", self.q75)?;
        write!(f, "max    {:>14.6}", self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_csv_with_header_and_text_column() {
        let text = "instant,dteday,cnt\n1,2011-01-01,985\n2,2011-01-02,801\n";
        let data = Dataset::from_csv(text).unwrap();
        assert_eq!(data.names(), ["instant", "dteday", "cnt"]);
        assert_eq!(data.n_rows(), 2);
        assert_eq!(data.column("cnt").unwrap(), [Some(985.0), Some(801.0)]);
        assert_eq!(data.column("dteday").unwrap(), [None, None]);
    }

    #[test]
    fn test_headerless_csv_with_question_marks() {
        let text = "63.0,1.0,?\r\n67.0,0.0,3.0\r\n\n";
        let data = Dataset::from_headerless_csv(text, &["age", "sex", "ca"]).unwrap();
        assert_eq!(data.n_rows(), 2);
        assert_eq!(data.column("ca").unwrap(), [None, Some(3.0)]);
        assert_eq!(data.drop_missing().n_rows(), 1);
    }

    #[test]
    fn test_quoted_fields_keep_commas() {
        let text = concat!(
            "id,\"label, long\",cnt\n",
            "1,\"Jan 1, 2011\",985\n",
            "2,\"say \"\"hi\"\"\",\"801\"\n",
        );
        let data = Dataset::from_csv(text).unwrap();
        assert_eq!(data.names(), ["id", "label, long", "cnt"]);
        assert_eq!(data.column("cnt").unwrap(), [Some(985.0), Some(801.0)]);
        assert_eq!(data.column("label, long").unwrap(), [None, None]);
        assert_eq!(
            split_fields(r#"a,"say ""hi""",b"#),
            ["a", r#"say "hi""#, "b"]
        );
    }

    #[test]
    fn test_ragged_csv_is_error() {
        let err = Dataset::from_headerless_csv("1,2\n3\n", &["a", "b"]).unwrap_err();
        assert!(matches!(err, GlmError::Csv { line: 2, .. }));
    }

    #[test]
    fn test_json_records() {
        let text = r#"[
            {"Age": 40, "ExerciseAngina": "N", "Sex": "M"},
            {"Age": 49, "ExerciseAngina": "Y", "Sex": "F"}
        ]"#;
        let data = Dataset::from_json_records(text).unwrap();
        assert_eq!(data.column("ExerciseAngina").unwrap(), [Some(0.0), Some(1.0)]);
        assert_eq!(data.column("Sex").unwrap(), [None, None]);
        assert_eq!(data.column("Age").unwrap(), [Some(40.0), Some(49.0)]);
    }

    #[test]
    fn test_model_frame_drops_only_used_missing() {
        let data = Dataset::from_columns([
            ("y", vec![Some(1.0), Some(2.0), None, Some(4.0)]),
            ("x", vec![Some(0.5), None, Some(1.0), Some(2.0)]),
            ("unused", vec![None, None, None, None]),
        ])
        .unwrap();

        let frame = data.model_frame("y", &["x"], "Intercept").unwrap();
        assert_eq!(frame.y, vec![1.0, 4.0]);
        assert_eq!(frame.design.names(), ["Intercept", "x"]);
        assert_eq!(frame.design.rows(), [vec![1.0, 0.5], vec![1.0, 2.0]]);
        assert!(frame.design.has_intercept());
    }

    #[test]
    fn test_unknown_column() {
        let data = Dataset::from_columns([("y", vec![Some(1.0)])]).unwrap();
        assert!(matches!(
            data.model_frame("y", &["nope"], "const"),
            Err(GlmError::UnknownColumn(c)) if c == "nope"
        ));
    }

    #[test]
    fn test_map_column_binarises() {
        let mut data = Dataset::from_columns([("target", vec![Some(0.0), Some(2.0), None])]).unwrap();
        data.map_column("target", |v| if v > 0.0 { 1.0 } else { 0.0 }).unwrap();
        assert_eq!(data.column("target").unwrap(), [Some(0.0), Some(1.0), None]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Dataset::from_columns([("a", vec![Some(1.0)]), ("b", vec![])]).unwrap_err();
        assert!(matches!(err, GlmError::DimensionMismatch { expected: 1, got: 0 }));
    }

    #[test]
    fn test_describe_matches_linear_quantiles() {
        let data = Dataset::from_columns([(
            "v",
            vec![Some(4.0), Some(1.0), None, Some(3.0), Some(2.0)],
        )])
        .unwrap();
        let s = data.describe("v").unwrap();
        assert_eq!(s.count, 4);
        assert_relative_eq!(s.mean, 2.5);
        assert_relative_eq!(s.std, (5.0f64 / 3.0).sqrt());
        assert_relative_eq!(s.q25, 1.75);
        assert_relative_eq!(s.median, 2.5);
        assert_relative_eq!(s.q75, 3.25);
        assert_eq!((s.min, s.max), (1.0, 4.0));
    }
}
