//! Write a small, deterministic CO2 / CH4 / N2O dataset for trying the
//! dashboard without the real spreadsheets.
//!
//! Usage: `generate_sample [out_dir] [parquet|csv]` (defaults: `sample_data`, `parquet`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform in [-1, 1).
    fn jitter(&mut self) -> f64 {
        ((self.next_u64() >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
    }
}

/// (country, CO2 in 1990 [Mt], yearly trend, has CH4/N2O rows)
const COUNTRIES: &[(&str, f64, f64, bool)] = &[
    ("Norway", 35.0, 0.002, false),
    ("Chile", 32.0, 0.035, true),
    ("Bhutan", 0.4, 0.04, true),
    ("Germany", 1050.0, -0.012, true),
    ("Kenya", 6.0, 0.045, true),
    ("Brazil", 210.0, 0.025, true),
];

struct Table {
    file_stem: &'static str,
    country_column: &'static str,
    value_column: &'static str,
    countries: Vec<String>,
    years: Vec<i64>,
    values: Vec<f64>,
}

impl Table {
    fn new(file_stem: &'static str, country_column: &'static str, value_column: &'static str) -> Self {
        Table {
            file_stem,
            country_column,
            value_column,
            countries: Vec::new(),
            years: Vec::new(),
            values: Vec::new(),
        }
    }

    fn push(&mut self, country: &str, year: i64, value: f64) {
        self.countries.push(country.to_string());
        self.years.push(year);
        self.values.push((value * 1000.0).round() / 1000.0);
    }
}

fn build_tables() -> [Table; 3] {
    let mut rng = SimpleRng::new(42);
    let mut co2 = Table::new("CO2_simplified_by_name", "country", "CO2");
    let mut ch4 = Table::new("CH4_simplified", "Name", "gas");
    let mut n2o = Table::new("N2O_simplified", "Name", "gas");

    for &(country, base, trend, other_gases) in COUNTRIES {
        for year in 1990..=2022 {
            let t = (year - 1990) as f64;
            let level = base * (1.0 + trend).powf(t);
            co2.push(country, year, level * (1.0 + 0.03 * rng.jitter()));
            if other_gases {
                ch4.push(country, year, level * 0.12 * (1.0 + 0.05 * rng.jitter()));
                n2o.push(country, year, level * 0.04 * (1.0 + 0.05 * rng.jitter()));
            }
        }
    }
    [co2, ch4, n2o]
}

fn write_parquet(table: &Table, path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(table.country_column, DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new(table.value_column, DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(table.countries.clone())),
            Arc::new(Int64Array::from(table.years.clone())),
            Arc::new(Float64Array::from(table.values.clone())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating output file")?;
    writer.write_record([table.country_column, "year", table.value_column])?;
    for ((country, year), value) in table.countries.iter().zip(&table.years).zip(&table.values) {
        writer.write_record([country.clone(), year.to_string(), value.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "sample_data".to_string()));
    let format = args.next().unwrap_or_else(|| "parquet".to_string());
    if format != "parquet" && format != "csv" {
        bail!("unknown format '{format}', expected parquet or csv");
    }

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let tables = build_tables();
    let mut snippet = String::new();
    for (key, table) in ["co2", "ch4", "n2o"].iter().zip(&tables) {
        let path = out_dir.join(format!("{}.{format}", table.file_stem));
        match format.as_str() {
            "csv" => write_csv(table, &path)?,
            _ => write_parquet(table, &path)?,
        }
        println!("Wrote {} rows to {}", table.values.len(), path.display());
        snippet.push_str(&format!(
            "[data.{key}]\npath = {:?}\ncountry_column = {:?}\nvalue_column = {:?}\n\n",
            path.display().to_string(),
            table.country_column,
            table.value_column
        ));
    }

    println!("\nAdd to emissions-dashboard.toml:\n\n{snippet}");
    Ok(())
}
