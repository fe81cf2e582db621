use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Write a synthetic census income extract for trying out the dashboard.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output file; `.csv` or `.parquet`
    #[arg(default_value = "data_clean.csv")]
    output: PathBuf,

    /// Number of records
    #[arg(short, long, default_value_t = 2000)]
    rows: usize,

    /// Seed for the deterministic generator
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug, Serialize)]
struct Row {
    age: i64,
    workclass: &'static str,
    education: &'static str,
    sex: &'static str,
    race: &'static str,
    #[serde(rename = "hours.per.week")]
    hours_per_week: i64,
    income: &'static str,
}

/// (label, relative weight, income log-odds bonus)
const EDUCATION: [(&str, u32, f64); 8] = [
    ("HS-grad", 32, -0.6),
    ("Some-college", 22, -0.3),
    ("Bachelors", 16, 0.9),
    ("Masters", 5, 1.4),
    ("Assoc-voc", 4, 0.0),
    ("11th", 4, -1.5),
    ("Doctorate", 1, 1.9),
    ("Prof-school", 2, 2.0),
];

const WORKCLASS: [(&str, u32, f64); 6] = [
    ("Private", 70, 0.0),
    ("Self-emp-not-inc", 8, 0.1),
    ("Local-gov", 6, 0.1),
    ("State-gov", 4, 0.0),
    ("Self-emp-inc", 3, 0.9),
    ("?", 6, -0.8),
];

const RACE: [&str; 5] = ["White", "Black", "Asian-Pac-Islander", "Amer-Indian-Eskimo", "Other"];

fn weighted<'a>(rng: &mut StdRng, table: &[(&'a str, u32, f64)]) -> (&'a str, f64) {
    let total: u32 = table.iter().map(|(_, w, _)| w).sum();
    let mut pick = rng.gen_range(0..total);
    for &(label, weight, bonus) in table {
        if pick < weight {
            return (label, bonus);
        }
        pick -= weight;
    }
    let (label, _, bonus) = table[table.len() - 1];
    (label, bonus)
}

fn generate(rows: usize, seed: u64) -> Vec<Row> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..rows)
        .map(|_| {
            let age: i64 = rng.gen_range(17..=90);
            let (education, edu_bonus) = weighted(&mut rng, &EDUCATION);
            let (workclass, work_bonus) = weighted(&mut rng, &WORKCLASS);
            let sex = if rng.gen_bool(0.67) { "Male" } else { "Female" };
            let race = RACE.choose(&mut rng).copied().unwrap_or("Other");
            let hours_per_week: i64 = (rng.gen_range(20..=60) + rng.gen_range(-10..=10)).clamp(1, 99);

            let age_term = -((age - 48) as f64 / 12.0).powi(2) * 0.5;
            let hours_term = (hours_per_week - 40) as f64 / 15.0;
            let sex_term = if sex == "Male" { 0.6 } else { -0.4 };
            let log_odds = -1.3 + edu_bonus + work_bonus + age_term + hours_term + sex_term;
            let p = 1.0 / (1.0 + (-log_odds).exp());
            let income = if rng.gen_bool(p) { ">50K" } else { "<=50K" };

            Row {
                age,
                workclass,
                education,
                sex,
                race,
                hours_per_week,
                income,
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let strings = |f: fn(&Row) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let ints = |f: fn(&Row) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("age", DataType::Int64, false),
        Field::new("workclass", DataType::Utf8, false),
        Field::new("education", DataType::Utf8, false),
        Field::new("sex", DataType::Utf8, false),
        Field::new("race", DataType::Utf8, false),
        Field::new("hours.per.week", DataType::Int64, false),
        Field::new("income", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            ints(|r| r.age),
            strings(|r| r.workclass),
            strings(|r| r.education),
            strings(|r| r.sex),
            strings(|r| r.race),
            ints(|r| r.hours_per_week),
            strings(|r| r.income),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let rows = generate(args.rows, args.seed);

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&args.output, &rows)?,
        "parquet" | "pq" => write_parquet(&args.output, &rows)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!("Wrote {} census records to {}", rows.len(), args.output.display());
    Ok(())
}
