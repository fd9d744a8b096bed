//! CSV/TSV and KEEL/ARFF table reader.
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::data_handling::LabeledTable;

/// Parsed table plus the relation name declared in KEEL/ARFF headers.
#[derive(Debug)]
pub struct TableFile {
    pub relation: Option<String>,
    pub table: LabeledTable,
}

/// Configuration for reading labelled tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableReaderConfig {
    /// Column name holding the class value. Matched case-insensitively and
    /// stored under this exact name.
    pub label_column: String,
    /// Columns to drop entirely.
    pub ignore_columns: Vec<String>,
}

impl Default for TableReaderConfig {
    fn default() -> Self {
        Self {
            label_column: "Class".to_string(),
            ignore_columns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableFormat {
    Delimited(u8),
    Keel,
}

impl TableFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(TableFormat::Delimited(b',')),
            "tsv" | "txt" => Ok(TableFormat::Delimited(b'\t')),
            "dat" | "arff" => Ok(TableFormat::Keel),
            other => Err(anyhow!(
                "Unsupported table format '{}' for {}. Valid options are: csv, tsv, dat, arff",
                other,
                path.display()
            )),
        }
    }
}

/// One `@attribute` declaration.
#[derive(Debug, Clone, PartialEq)]
struct Attribute {
    name: String,
    /// Declared values of a nominal attribute, `None` for numeric ones.
    nominal: Option<Vec<String>>,
}

/// Read one table, choosing the format from the file extension.
pub fn read_table<P: AsRef<Path>>(path: P, config: &TableReaderConfig) -> Result<TableFile> {
    let path = path.as_ref();
    match TableFormat::from_path(path)? {
        TableFormat::Delimited(delimiter) => read_delimited(path, delimiter, config),
        TableFormat::Keel => read_keel(path, config),
    }
}

fn read_delimited(path: &Path, delimiter: u8, config: &TableReaderConfig) -> Result<TableFile> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open table: {}", path.display()))?;

    let headers = reader
        .headers()
        .context("Failed to read header row")?
        .clone();
    let attributes: Vec<Attribute> = headers
        .iter()
        .map(|name| Attribute {
            name: name.to_string(),
            nominal: None,
        })
        .collect();

    let records = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read rows of {}", path.display()))?;

    let table = build_table(&attributes, &records, config)
        .with_context(|| format!("Invalid table {}", path.display()))?;
    Ok(TableFile {
        relation: None,
        table,
    })
}

fn read_keel(path: &Path, config: &TableReaderConfig) -> Result<TableFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open table: {}", path.display()))?;

    let mut relation = None;
    let mut attributes = Vec::new();
    let mut data_start = None;
    for (line_idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("@relation") {
            relation = Some(unquote(trimmed["@relation".len()..].trim()).to_string());
        } else if lower.starts_with("@attribute") {
            let attribute = parse_attribute(&trimmed["@attribute".len()..])
                .with_context(|| format!("Invalid @attribute at line {}", line_idx + 1))?;
            attributes.push(attribute);
        } else if lower.starts_with("@data") {
            data_start = Some(line_idx + 1);
            break;
        }
    }

    let data_start = data_start.ok_or_else(|| anyhow!("Missing @data section in {}", path.display()))?;
    let body = text.lines().skip(data_start).collect::<Vec<_>>().join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .comment(Some(b'%'))
        .from_reader(body.as_bytes());
    let records = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read @data rows of {}", path.display()))?;

    let table = build_table(&attributes, &records, config)
        .with_context(|| format!("Invalid table {}", path.display()))?;
    Ok(TableFile { relation, table })
}

/// Parse the part after `@attribute`: a (possibly quoted) name followed by
/// `real [lo, hi]`, `integer [lo, hi]`, `numeric` or `{v1, v2, ...}`.
/// Range specifications are ignored.
fn parse_attribute(spec: &str) -> Result<Attribute> {
    let spec = spec.trim();
    let (name, rest) = match spec.chars().next() {
        Some(quote @ ('\'' | '"')) => {
            let end = spec[1..]
                .find(quote)
                .ok_or_else(|| anyhow!("Unterminated quoted name"))?;
            (&spec[1..=end], &spec[end + 2..])
        }
        Some(_) => spec.split_at(spec.find(|c: char| c.is_whitespace() || c == '{').unwrap_or(spec.len())),
        None => return Err(anyhow!("Empty attribute declaration")),
    };

    let rest = rest.trim();
    let nominal = match (rest.find('{'), rest.rfind('}')) {
        (Some(open), Some(close)) if open < close => Some(
            rest[open + 1..close]
                .split(',')
                .map(|v| unquote(v.trim()).to_string())
                .filter(|v| !v.is_empty())
                .collect(),
        ),
        _ => None,
    };

    Ok(Attribute {
        name: name.trim().to_string(),
        nominal,
    })
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '\'' || c == '"')
}

fn build_table(
    attributes: &[Attribute],
    records: &[StringRecord],
    config: &TableReaderConfig,
) -> Result<LabeledTable> {
    let label_idx = attributes
        .iter()
        .position(|a| a.name.eq_ignore_ascii_case(&config.label_column))
        .ok_or_else(|| anyhow!("Missing label column '{}'", config.label_column))?;

    let ignore: HashSet<String> = config
        .ignore_columns
        .iter()
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let feature_indices: Vec<usize> = (0..attributes.len())
        .filter(|&idx| idx != label_idx && !ignore.contains(&attributes[idx].name.to_ascii_lowercase()))
        .collect();
    if feature_indices.is_empty() {
        return Err(anyhow!("No feature columns detected"));
    }

    let mut features = Vec::with_capacity(records.len() * feature_indices.len());
    let mut labels = Vec::with_capacity(records.len());
    for (row_idx, record) in records.iter().enumerate() {
        if record.len() != attributes.len() {
            return Err(anyhow!(
                "Row {} has {} fields, expected {}",
                row_idx + 1,
                record.len(),
                attributes.len()
            ));
        }

        labels.push(unquote(&record[label_idx]).to_string());

        for &idx in &feature_indices {
            let attribute = &attributes[idx];
            let raw = unquote(&record[idx]);
            let value = match &attribute.nominal {
                Some(values) => values
                    .iter()
                    .position(|v| v == raw)
                    .map(|p| p as f64)
                    .ok_or_else(|| {
                        anyhow!(
                            "Value '{}' of nominal feature '{}' at row {} is not declared",
                            raw,
                            attribute.name,
                            row_idx + 1
                        )
                    })?,
                None => raw.parse::<f64>().with_context(|| {
                    format!("Invalid feature '{}' at row {}", attribute.name, row_idx + 1)
                })?,
            };
            features.push(value);
        }
    }

    let x = Array2::from_shape_vec((labels.len(), feature_indices.len()), features)
        .context("Failed to build feature matrix")?;
    let feature_names = feature_indices
        .iter()
        .map(|&idx| attributes[idx].name.clone())
        .collect();

    Ok(LabeledTable::new(feature_names, config.label_column.clone(), x, labels)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEEL: &str = "@relation glass1\n\
@attribute RI real [1.51115, 1.53393]\n\
@attribute Na real [10.73, 17.38]\n\
@attribute Kind {a, b}\n\
@attribute class {positive, negative}\n\
@inputs RI, Na, Kind\n\
@outputs class\n\
@data\n\
1.52101, 13.64, a, negative\n\
1.51761, 13.89, b, positive\n";

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_attribute_forms() {
        let a = parse_attribute(" RI real [1.5, 1.6]").unwrap();
        assert_eq!(a.name, "RI");
        assert!(a.nominal.is_none());

        let b = parse_attribute(" 'odd name' {x,y}").unwrap();
        assert_eq!(b.name, "odd name");
        assert_eq!(b.nominal.unwrap(), vec!["x".to_string(), "y".to_string()]);

        let c = parse_attribute(" Class{positive,negative}").unwrap();
        assert_eq!(c.name, "Class");
    }

    #[test]
    fn test_read_keel_renames_class_and_encodes_nominal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "glass1-5-1tra.dat", KEEL);
        let file = read_table(&path, &TableReaderConfig::default()).unwrap();

        assert_eq!(file.relation.as_deref(), Some("glass1"));
        let table = file.table;
        assert_eq!(table.label_column, "Class");
        assert_eq!(table.feature_names, vec!["RI", "Na", "Kind"]);
        assert_eq!(table.labels, vec!["negative", "positive"]);
        assert_eq!(table.x.row(1).to_vec(), vec![1.51761, 13.89, 1.0]);
    }

    #[test]
    fn test_read_csv_and_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write(dir.path(), "t.csv", "a,b,Class\n1,2,positive\n3,4,negative\n");
        let tsv_path = write(dir.path(), "t.tsv", "a\tb\tClass\n1\t2\tpositive\n3\t4\tnegative\n");

        let a = read_table(&csv_path, &TableReaderConfig::default()).unwrap().table;
        let b = read_table(&tsv_path, &TableReaderConfig::default()).unwrap().table;
        assert_eq!(a, b);
        assert_eq!(a.nrows(), 2);
    }

    #[test]
    fn test_bad_value_names_column_and_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "t.csv", "a,b,Class\n1,2,positive\n3,x,negative\n");
        let err = read_table(&path, &TableReaderConfig::default()).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("Invalid feature 'b' at row 2"), "{}", msg);
    }

    #[test]
    fn test_missing_label_and_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let no_label = write(dir.path(), "t.csv", "a,b\n1,2\n");
        assert!(read_table(&no_label, &TableReaderConfig::default()).is_err());
        let json = write(dir.path(), "t.json", "{}");
        assert!(read_table(&json, &TableReaderConfig::default()).is_err());
    }
}
