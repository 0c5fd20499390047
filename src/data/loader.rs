use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{DataError, Dataset, EmissionRecord, EmissionTables, Gas};
use crate::config::{DataSources, TableSource};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load all three gas tables. Any failure aborts the whole load so callers
/// never see a partial set.
pub fn load_all(sources: &DataSources) -> Result<EmissionTables, DataError> {
    let tables = EmissionTables {
        co2: load_table(&sources.co2, Gas::Co2)?,
        ch4: load_table(&sources.ch4, Gas::Ch4)?,
        n2o: load_table(&sources.n2o, Gas::N2o)?,
    };
    log::info!(
        "Loaded emissions: {} CO2 rows, {} CH4 rows, {} N2O rows",
        tables.co2.len(),
        tables.ch4.len(),
        tables.n2o.len()
    );
    Ok(tables)
}

/// Load one gas table and rename its columns to `country` / `year` / `value`.
pub fn load_table(source: &TableSource, gas: Gas) -> Result<Dataset, DataError> {
    read_records(source)
        .map(|records| Dataset::new(gas, records))
        .map_err(|e| {
            log::error!("Failed to load {gas} table: {e:#}");
            DataError::Unavailable {
                path: source.path.clone(),
                reason: format!("{e:#}"),
            }
        })
}

fn read_records(source: &TableSource) -> Result<Vec<EmissionRecord>> {
    let raw = read_raw_table(&source.path)?;
    let country_idx = raw.column_index(&source.country_column)?;
    let year_idx = raw.column_index(&source.year_column)?;
    let value_idx = raw.column_index(&source.value_column)?;

    raw.rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            [country_idx, year_idx, value_idx]
                .iter()
                .any(|&idx| row.get(idx).is_some_and(|c| !c.is_blank()))
        })
        .map(|(i, row)| {
            let row_no = i + 1;
            let cell = |idx: usize| row.get(idx).cloned().unwrap_or(CellValue::Null);
            Ok(EmissionRecord {
                country: cell(country_idx)
                    .as_country()
                    .with_context(|| format!("row {row_no}, column '{}'", source.country_column))?,
                year: cell(year_idx)
                    .as_year()
                    .with_context(|| format!("row {row_no}, column '{}'", source.year_column))?,
                value: cell(value_idx)
                    .as_value()
                    .with_context(|| format!("row {row_no}, column '{}'", source.value_column))?,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Raw tables – whatever the file held, before normalization
// ---------------------------------------------------------------------------

/// A single source cell, typed as loosely as the file format allows.
#[derive(Debug, Clone, PartialEq)]
enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn as_country(&self) -> Result<String> {
        match self {
            CellValue::Text(s) if !s.trim().is_empty() => Ok(s.clone()),
            CellValue::Integer(i) => Ok(i.to_string()),
            CellValue::Float(f) => Ok(f.to_string()),
            CellValue::Text(_) | CellValue::Null => bail!("empty country"),
            CellValue::Bool(b) => bail!("'{b}' is not a country name"),
        }
    }

    fn as_year(&self) -> Result<i64> {
        match self {
            CellValue::Integer(i) => Ok(*i),
            CellValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(*f as i64),
            CellValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .with_context(|| format!("'{s}' is not a year")),
            CellValue::Null => bail!("empty year"),
            other => bail!("{other:?} is not a year"),
        }
    }

    fn as_value(&self) -> Result<f64> {
        match self {
            CellValue::Float(f) => Ok(*f),
            CellValue::Integer(i) => Ok(*i as f64),
            CellValue::Null => Ok(f64::NAN),
            CellValue::Text(s) if s.trim().is_empty() => Ok(f64::NAN),
            CellValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .with_context(|| format!("'{s}' is not a number")),
            CellValue::Bool(b) => bail!("'{b}' is not a number"),
        }
    }
}

#[derive(Debug, Default)]
struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.trim() == name)
            .ok_or_else(|| anyhow!("missing column '{name}' (found: {})", self.columns.join(", ")))
    }
}

/// Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, header in row 1
/// * `.csv`     – header row
/// * `.json`    – `[{ "country": "Norway", "year": 2020, "CO2": 40.2 }, ...]`
/// * `.parquet` – flat scalar columns
fn read_raw_table(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_spreadsheet(path),
        "csv" => read_csv(path),
        "json" => read_json(path),
        "parquet" | "pq" => read_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet reader
// ---------------------------------------------------------------------------

fn read_spreadsheet(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).context("opening spreadsheet")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("spreadsheet has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let columns = rows
        .next()
        .context("worksheet is empty")?
        .iter()
        .map(|c| match c {
            Data::Empty => String::new(),
            other => other.to_string(),
        })
        .collect();

    let rows = rows
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();

    Ok(RawTable { columns, rows })
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::Empty => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable { columns, rows })
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented, the default `df.to_json(orient='records')` layout.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut table = RawTable::default();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {} is not a JSON object", i + 1))?;
        for key in obj.keys() {
            if !table.columns.contains(key) {
                table.columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    table.rows = objects
        .into_iter()
        .map(|obj| {
            table
                .columns
                .iter()
                .map(|col| obj.get(col).map(json_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(table)
}

fn json_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = RawTable {
        columns,
        rows: Vec::new(),
    };
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| arrow_cell(col, row))
                .collect::<Result<Vec<_>>>()?;
            table.rows.push(cells);
        }
    }

    Ok(table)
}

fn arrow_cell(col: &ArrayRef, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => CellValue::Text(
            array_value_to_string(col.as_ref(), row).context("formatting parquet value")?,
        ),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn source(path: PathBuf, country: &str, value: &str) -> TableSource {
        TableSource {
            path,
            country_column: country.to_string(),
            year_column: "year".to_string(),
            value_column: value.to_string(),
        }
    }

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn csv_columns_are_renamed_to_canonical_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "ch4.csv",
            "Name,year,gas\nNorway,2019,12.5\nChile,2019,30\nNorway,2020,\n",
        );

        let ds = load_table(&source(path, "Name", "gas"), Gas::Ch4).unwrap();

        assert_eq!(ds.gas, Gas::Ch4);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records[0].country, "Norway");
        assert_eq!(ds.records[0].year, 2019);
        assert_eq!(ds.records[0].value, 12.5);
        assert_eq!(ds.records[1].value, 30.0);
        assert!(ds.records[2].value.is_nan());
    }

    #[test]
    fn json_records_load_in_source_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "co2.json",
            r#"[
                {"country": "Norway", "year": 2020, "CO2": 40.2},
                {"country": "Bhutan", "year": 2020.0, "CO2": "1.5"},
                {"country": "Norway", "year": "2021", "CO2": 39}
            ]"#,
        );

        let ds = load_table(&source(path, "country", "CO2"), Gas::Co2).unwrap();

        let rows: Vec<_> = ds
            .records
            .iter()
            .map(|r| (r.country.as_str(), r.year, r.value))
            .collect();
        assert_eq!(
            rows,
            vec![("Norway", 2020, 40.2), ("Bhutan", 2020, 1.5), ("Norway", 2021, 39.0)]
        );
    }

    #[test]
    fn parquet_tables_are_supported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("n2o.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("Name", DataType::Utf8, false),
            Field::new("year", DataType::Int64, false),
            Field::new("gas", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Chile", "Chile"])),
                Arc::new(Int64Array::from(vec![2018, 2019])),
                Arc::new(Float64Array::from(vec![Some(3.25), None])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_table(&source(path, "Name", "gas"), Gas::N2o).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].country, "Chile");
        assert_eq!(ds.records[0].value, 3.25);
        assert_eq!(ds.records[1].year, 2019);
        assert!(ds.records[1].value.is_nan());
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CO2_simplified_by_name.xlsx");

        let err = load_table(&source(path.clone(), "country", "CO2"), Gas::Co2).unwrap_err();
        let DataError::Unavailable { path: reported, .. } = err;
        assert_eq!(reported, path);
    }

    #[test]
    fn corrupt_spreadsheet_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "CH4_simplified.xlsx", "this is not a zip archive");

        let result = load_table(&source(path, "Name", "gas"), Gas::Ch4);
        assert!(matches!(result, Err(DataError::Unavailable { .. })));
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "ch4.csv", "country,year,gas\nNorway,2019,1.0\n");

        let err = load_table(&source(path, "Name", "gas"), Gas::Ch4).unwrap_err();
        assert!(err.to_string().contains("missing column 'Name'"), "{err}");
    }

    #[test]
    fn bad_year_names_row_and_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "co2.csv", "country,year,CO2\nNorway,2020,1\nNorway,soon,2\n");

        let err = load_table(&source(path, "country", "CO2"), Gas::Co2).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("row 2, column 'year'"), "{msg}");
    }

    #[test]
    fn unknown_extension_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "co2.txt", "country,year,CO2\n");

        let err = load_table(&source(path, "country", "CO2"), Gas::Co2).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension: .txt"));
    }

    #[test]
    fn load_all_fails_if_any_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let co2 = write(&dir, "co2.csv", "country,year,CO2\nNorway,2020,40.2\n");
        let ch4 = write(&dir, "ch4.csv", "Name,year,gas\nNorway,2020,1\n");
        let sources = DataSources {
            co2: source(co2, "country", "CO2"),
            ch4: source(ch4, "Name", "gas"),
            n2o: source(dir.path().join("missing.csv"), "Name", "gas"),
        };

        assert!(load_all(&sources).is_err());
    }

    #[test]
    fn repeated_loads_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "co2.csv",
            "country,year,CO2\nNorway,2020,40.2\nChile,2020,80\nNorway,2019,\nNorway,2020,40.2\n",
        );
        let src = source(path, "country", "CO2");

        let first = load_table(&src, Gas::Co2).unwrap();
        let second = load_table(&src, Gas::Co2).unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.records.iter().zip(&second.records) {
            assert_eq!(a.country, b.country);
            assert_eq!(a.year, b.year);
            assert_eq!(a.value.to_bits(), b.value.to_bits());
        }
        assert!(first.records[2].value.is_nan());
    }

    #[test]
    fn blank_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "co2.csv",
            "country,year,CO2\nNorway,2020,40.2\n,,\n  , ,\nChile,2020,80\n",
        );

        let ds = load_table(&source(path, "country", "CO2"), Gas::Co2).unwrap();

        assert_eq!(ds.countries(), vec!["Norway", "Chile"]);
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn partly_blank_rows_are_still_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "co2.csv", "country,year,CO2\nNorway,2020,40.2\n,2021,3\n");

        let err = load_table(&source(path, "country", "CO2"), Gas::Co2).unwrap_err();
        assert!(err.to_string().contains("row 2, column 'country'"), "{err}");
    }

    #[test]
    fn xlsx_with_pandas_index_column_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CH4_simplified.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        // Header row: blank index header, then the named columns.
        for (col, name) in [(1, "Name"), (2, "year"), (3, "gas")] {
            sheet.write_string(0, col, name).unwrap();
        }
        let rows = [("Norway", 2020.0, 12.5), ("Chile", 2019.0, 30.0), ("Norway", 2021.0, 11.75)];
        for (i, (country, year, value)) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_number(r, 0, i as f64).unwrap();
            sheet.write_string(r, 1, *country).unwrap();
            sheet.write_number(r, 2, *year).unwrap();
            sheet.write_number(r, 3, *value).unwrap();
        }
        workbook.save(&path).unwrap();

        let ds = load_table(&source(path, "Name", "gas"), Gas::Ch4).unwrap();

        let loaded: Vec<_> = ds
            .records
            .iter()
            .map(|r| (r.country.as_str(), r.year, r.value))
            .collect();
        assert_eq!(
            loaded,
            vec![("Norway", 2020, 12.5), ("Chile", 2019, 30.0), ("Norway", 2021, 11.75)]
        );
    }
}
