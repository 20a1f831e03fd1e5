use crate::error::{AppError, Result};
use std::fs;
use std::path::Path;

/// Row-oriented string table backing the CSV dataset
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Frame {
    /// Create an empty frame with the given header row
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; its width must match the header
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(AppError::SchemaMismatch(format!(
                "row {} has {} fields, header has {}",
                self.rows.len() + 1,
                row.len(),
                self.headers.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All cells of a column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Fail with a schema error naming every missing column
    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| self.column_index(name).is_none())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::SchemaMismatch(format!(
                "dataset is missing column(s): {}",
                missing.join(", ")
            )))
        }
    }

    /// Remove columns by name; absent names are ignored
    pub fn drop_columns(&mut self, names: &[&str]) {
        let keep: Vec<usize> = (0..self.headers.len())
            .filter(|&i| !names.contains(&self.headers[i].as_str()))
            .collect();

        self.headers = keep.iter().map(|&i| self.headers[i].clone()).collect();
        for row in &mut self.rows {
            let kept: Vec<String> = keep.iter().map(|&i| std::mem::take(&mut row[i])).collect();
            *row = kept;
        }
    }

    /// Parse CSV text; the first non-empty record is the header.
    ///
    /// A quoted field may span lines.
    pub fn parse(text: &str) -> Result<Self> {
        let mut records = Vec::new();
        let mut pending: Option<String> = None;

        for line in text.lines().map(|line| line.trim_end_matches('\r')) {
            let record = match pending.take() {
                Some(mut open) => {
                    open.push('\n');
                    open.push_str(line);
                    open
                }
                None if line.trim().is_empty() => continue,
                None => line.to_string(),
            };
            // An odd quote count leaves a quoted field open
            if record.matches('"').count() % 2 == 1 {
                pending = Some(record);
            } else {
                records.push(record);
            }
        }
        if let Some(open) = pending {
            records.push(open);
        }

        let mut records = records.into_iter();
        let header = records
            .next()
            .ok_or_else(|| AppError::SchemaMismatch("dataset has no header row".to_string()))?;

        let mut frame = Frame::new(split_record(&header)?);
        for record in records {
            frame.push_row(split_record(&record)?)?;
        }
        Ok(frame)
    }

    /// Render as CSV with a header row
    pub fn to_csv(&self) -> String {
        let mut csv_content = String::new();
        csv_content.push_str(&join_record(&self.headers));
        csv_content.push('\n');
        for row in &self.rows {
            csv_content.push_str(&join_record(row));
            csv_content.push('\n');
        }
        csv_content
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_csv())?;
        Ok(())
    }
}

fn join_record(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| escape_csv(field))
        .collect::<Vec<_>>()
        .join(",")
}

/// Escape CSV special characters
fn escape_csv(s: &str) -> String {
    if s.contains(|c: char| matches!(c, ',' | '"' | '\n')) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Split one CSV record, honouring double-quoted fields
fn split_record(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(AppError::SchemaMismatch(format!(
            "unterminated quoted field in record: {}",
            line
        )));
    }
    fields.push(field);
    Ok(fields)
}
