use std::io::Read;
use std::path::Path;

use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{
    AGE, CensusDataset, CensusRecord, Category, EDUCATION, HOURS_PER_WEEK, INCOME, SEX, WORKCLASS,
};
use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

/// How cell text is interpreted while loading.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Cell texts (after trimming) read as a missing categorical value.
    pub missing_markers: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            missing_markers: ["", "NA", "N/A", "null", "NULL", "None"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl LoadOptions {
    fn is_missing(&self, cell: &str) -> bool {
        self.missing_markers.iter().any(|m| m == cell)
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a census extract from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line (the usual `data_clean.csv`)
/// * `.json`    – `[{ "age": 35, "sex": "Male", ... }, ...]`
/// * `.parquet` – one column per field, numeric or string typed
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<CensusDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv_reader(std::fs::File::open(path)?, options),
        "json" => load_json_str(&std::fs::read_to_string(path)?, options),
        "parquet" | "pq" => load_parquet(path, options),
        other => Err(DataError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!(
        "Loaded {} records with columns {:?} from {}",
        dataset.len(),
        dataset.column_names(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Shared row validation
// ---------------------------------------------------------------------------

/// Positions of the interpreted fields inside a source header.
struct HeaderLayout {
    columns: Vec<String>,
    age: usize,
    sex: usize,
    education: usize,
    workclass: usize,
    hours_per_week: usize,
    income: usize,
}

impl HeaderLayout {
    fn new(columns: Vec<String>) -> Result<Self> {
        let find = |name: &str| {
            columns.iter().position(|c| c == name).ok_or_else(|| {
                DataError::format("header", format!("missing required column '{name}'"))
            })
        };
        Ok(HeaderLayout {
            age: find(AGE)?,
            sex: find(SEX)?,
            education: find(EDUCATION)?,
            workclass: find(WORKCLASS)?,
            hours_per_week: find(HOURS_PER_WEEK)?,
            income: find(INCOME)?,
            columns,
        })
    }

    fn is_interpreted(&self, idx: usize) -> bool {
        [
            self.age,
            self.sex,
            self.education,
            self.workclass,
            self.hours_per_week,
            self.income,
        ]
        .contains(&idx)
    }

    /// Turn one row of raw cells (`None` = null) into a record.
    fn build_record(
        &self,
        cells: &[Option<String>],
        location: &str,
        options: &LoadOptions,
    ) -> Result<CensusRecord> {
        let cell = |idx: usize| cells.get(idx).and_then(|c| c.as_deref()).map(str::trim);

        let category = |idx: usize| match cell(idx) {
            Some(text) if !options.is_missing(text) => Category::Value(text.to_string()),
            _ => Category::Missing,
        };

        let count = |idx: usize| -> Result<u32> {
            let column = &self.columns[idx];
            let text = cell(idx).unwrap_or("");
            parse_count(text).ok_or_else(|| {
                DataError::format(
                    location,
                    format!("column '{column}': '{text}' is not a non-negative integer"),
                )
            })
        };

        let passthrough = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.is_interpreted(*i))
            .map(|(i, name)| (name.clone(), category(i)))
            .collect();

        Ok(CensusRecord {
            age: count(self.age)?,
            sex: category(self.sex),
            education: category(self.education),
            workclass: category(self.workclass),
            hours_per_week: count(self.hours_per_week)?,
            income: category(self.income),
            passthrough,
        })
    }

    fn finish(self, records: Vec<CensusRecord>) -> Result<CensusDataset> {
        CensusDataset::new(self.columns, records)
    }
}

/// Integers, or integral floats as written by dataframe exports ("35.0").
fn parse_count(text: &str) -> Option<u32> {
    if let Ok(i) = text.parse::<u32>() {
        return Some(i);
    }
    let f = text.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, cells trimmed of surrounding
/// whitespace (the raw adult extract pads every value with a space).
pub fn load_csv_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<CensusDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let layout = HeaderLayout::new(headers)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(csv_error)?;
        let location = match row.position() {
            Some(pos) => format!("line {}", pos.line()),
            None => format!("record {}", records.len() + 1),
        };
        let cells: Vec<Option<String>> = row.iter().map(|c| Some(c.to_string())).collect();
        records.push(layout.build_record(&cells, &location, options)?);
    }

    layout.finish(records)
}

/// Ragged rows and invalid UTF-8 are format errors; only read failures stay I/O.
fn csv_error(err: csv::Error) -> DataError {
    if err.is_io_error() {
        return DataError::Io(err.into());
    }
    let location = match err.position() {
        Some(pos) => format!("line {}", pos.line()),
        None => "CSV input".to_string(),
    };
    DataError::format(location, err.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`).
/// The header is the sorted union of keys over all rows; a key absent from a
/// row reads as null.
pub fn load_json_str(text: &str, options: &LoadOptions) -> Result<CensusDataset> {
    let root: JsonValue = serde_json::from_str(text).map_err(|e| {
        DataError::format(format!("line {} column {}", e.line(), e.column()), e.to_string())
    })?;
    let rows = root
        .as_array()
        .ok_or_else(|| DataError::format("document", "expected top-level JSON array"))?;

    let mut objects = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| DataError::format(format!("row {i}"), "not a JSON object"))?;
        objects.push(obj);
    }

    let mut headers: Vec<String> = objects.iter().flat_map(|o| o.keys().cloned()).collect();
    headers.sort();
    headers.dedup();
    let layout = HeaderLayout::new(headers)?;

    let mut records = Vec::with_capacity(objects.len());
    for (i, obj) in objects.iter().enumerate() {
        let cells: Vec<Option<String>> = layout
            .columns
            .iter()
            .map(|col| obj.get(col).and_then(json_cell))
            .collect();
        records.push(layout.build_record(&cells, &format!("row {i}"), options)?);
    }

    layout.finish(records)
}

fn json_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field. Works with files written by
/// both Pandas (`df.to_parquet()`) and Polars (`df.write_parquet()`).
fn load_parquet(path: &Path, options: &LoadOptions) -> Result<CensusDataset> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DataError::format("parquet metadata", e.to_string()))?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let layout = HeaderLayout::new(headers)?;
    let reader = builder
        .build()
        .map_err(|e| DataError::format("parquet metadata", e.to_string()))?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| DataError::format(format!("row {}", records.len()), e.to_string()))?;
        for row in 0..batch.num_rows() {
            let location = format!("row {}", records.len());
            let mut cells = Vec::with_capacity(batch.num_columns());
            for col in batch.columns() {
                if col.is_null(row) {
                    cells.push(None);
                } else {
                    let text = array_value_to_string(col.as_ref(), row)
                        .map_err(|e| DataError::format(location.as_str(), e.to_string()))?;
                    cells.push(Some(text));
                }
            }
            records.push(layout.build_record(&cells, &location, options)?);
        }
    }

    layout.finish(records)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const SAMPLE: &str = "\
age,workclass,education,sex,hours.per.week,income,race
35, Private, Bachelors, Male,40,>50K,White
22,?,HS-grad,Female,20,<=50K,
";

    #[test]
    fn csv_rows_are_trimmed_and_typed() {
        let ds = load_csv_reader(SAMPLE.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records()[0];
        assert_eq!(first, &CensusRecord::new(35, "Male", "Bachelors", "Private", 40, ">50K")
            .with_passthrough("race", Category::from("White")));
        let second = &ds.records()[1];
        assert_eq!(second.workclass, Category::from("?"));
        assert_eq!(second.passthrough["race"], Category::Missing);
        assert_eq!(ds.column_names()[0], AGE);
    }

    #[test]
    fn csv_missing_header_field_is_format_error() {
        let text = "age,sex,education,workclass,income\n35,Male,Bachelors,Private,>50K\n";
        let err = load_csv_reader(text.as_bytes(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataError::Format { .. }));
        assert!(err.to_string().contains(HOURS_PER_WEEK));
    }

    #[test]
    fn csv_non_numeric_age_is_format_error() {
        let text = "age,sex,education,workclass,hours.per.week,income\nold,Male,Bachelors,Private,40,>50K\n";
        let err = load_csv_reader(text.as_bytes(), &LoadOptions::default()).unwrap_err();
        match err {
            DataError::Format { location, message } => {
                assert_eq!(location, "line 2");
                assert!(message.contains("'age'"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn csv_short_row_is_format_error_with_its_line() {
        let text = "age,sex,education,workclass,hours.per.week,income\n35,Male,Bachelors\n";
        let err = load_csv_reader(text.as_bytes(), &LoadOptions::default()).unwrap_err();
        match err {
            DataError::Format { location, .. } => assert_eq!(location, "line 2"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn csv_invalid_utf8_is_format_error() {
        let mut bytes = b"age,sex,education,workclass,hours.per.week,income\n35,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b",Bachelors,Private,40,>50K\n");
        let err = load_csv_reader(bytes.as_slice(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataError::Format { .. }));
    }

    #[test]
    fn csv_negative_hours_is_format_error() {
        let text = "age,sex,education,workclass,hours.per.week,income\n35,Male,Bachelors,Private,-4,>50K\n";
        let err = load_csv_reader(text.as_bytes(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataError::Format { .. }));
    }

    #[test]
    fn integral_floats_are_accepted_as_counts() {
        assert_eq!(parse_count("35"), Some(35));
        assert_eq!(parse_count("35.0"), Some(35));
        assert_eq!(parse_count("35.5"), None);
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("NaN"), None);
    }

    #[test]
    fn custom_missing_markers_apply_to_categories() {
        let options = LoadOptions {
            missing_markers: vec!["?".to_string()],
        };
        let ds = load_csv_reader(SAMPLE.as_bytes(), &options).unwrap();
        assert_eq!(ds.records()[1].workclass, Category::Missing);
        // An empty cell is an ordinary (empty) value once "" is not a marker.
        assert_eq!(ds.records()[1].passthrough["race"], Category::from(""));
    }

    #[test]
    fn json_records_with_nulls_and_absent_keys() {
        let text = r#"[
            {"age": 35, "sex": "Male", "education": "Bachelors", "workclass": "Private",
             "hours.per.week": 40, "income": ">50K", "race": "White"},
            {"age": 22.0, "sex": null, "education": "HS-grad", "workclass": "Private",
             "hours.per.week": 20, "income": "<=50K"}
        ]"#;
        let ds = load_json_str(text, &LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1].age, 22);
        assert_eq!(ds.records()[1].sex, Category::Missing);
        assert_eq!(ds.records()[1].passthrough["race"], Category::Missing);
    }

    #[test]
    fn json_must_be_an_array() {
        let err = load_json_str(r#"{"age": 1}"#, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataError::Format { .. }));
    }

    #[test]
    fn unparseable_json_is_format_error() {
        let err = load_json_str(r#"[{"age": 35, "sex": "Male""#, &LoadOptions::default()).unwrap_err();
        match err {
            DataError::Format { location, .. } => assert!(location.starts_with("line 1")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn corrupt_parquet_is_format_error() {
        let path = std::env::temp_dir().join(format!(
            "census-dashboard-corrupt-{}.parquet",
            std::process::id()
        ));
        std::fs::write(&path, b"age,sex\n35,Male\n").unwrap();
        let result = load_file(&path, &LoadOptions::default());
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(DataError::Format { .. })));
    }

    #[test]
    fn missing_file_stays_an_io_error() {
        let path = std::env::temp_dir().join("census-dashboard-no-such-file.csv");
        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataError::Io(_)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("census.xlsx"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataError::UnsupportedFormat(ext) if ext == "xlsx"));
    }

    #[test]
    fn parquet_file_round_trips_through_loader() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(AGE, DataType::Int64, false),
            Field::new(SEX, DataType::Utf8, true),
            Field::new(EDUCATION, DataType::Utf8, false),
            Field::new(WORKCLASS, DataType::Utf8, false),
            Field::new(HOURS_PER_WEEK, DataType::Int64, false),
            Field::new(INCOME, DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![35, 22])),
                Arc::new(StringArray::from(vec![Some("Male"), None])),
                Arc::new(StringArray::from(vec!["Bachelors", "HS-grad"])),
                Arc::new(StringArray::from(vec!["Private", "Private"])),
                Arc::new(Int64Array::from(vec![40, 20])),
                Arc::new(StringArray::from(vec![">50K", "<=50K"])),
            ],
        )
        .unwrap();

        let path = std::env::temp_dir().join(format!(
            "census-dashboard-loader-{}.parquet",
            std::process::id()
        ));
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path, &LoadOptions::default()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.records()[0],
            CensusRecord::new(35, "Male", "Bachelors", "Private", 40, ">50K")
        );
        assert_eq!(ds.records()[1].sex, Category::Missing);
    }
}
