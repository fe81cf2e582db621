use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy for the data layer
// ---------------------------------------------------------------------------

/// Everything that can go wrong between reading the source file and handing
/// chart-ready tables to the UI.
///
/// Missing categorical cells are *not* an error: they are bucketed into
/// [`Category::Missing`](crate::data::model::Category::Missing).
#[derive(Debug, Error)]
pub enum DataError {
    /// A configured column is absent from the dataset or has the wrong kind.
    #[error("schema mismatch on column '{column}': {reason}")]
    SchemaMismatch { column: String, reason: String },

    /// The source file is malformed: missing header field, bad numeric cell,
    /// ragged CSV row, unparseable JSON or a corrupt Parquet file.
    #[error("format error at {location}: {message}")]
    Format { location: String, message: String },

    /// A filter value (or column) outside the registry's known set.
    #[error("invalid selection: '{value}' is not an option for column '{column}'")]
    InvalidSelection { column: String, value: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Config parsing and report serialization; source files report `Format`.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DataError {
    pub(crate) fn format(location: impl Into<String>, message: impl Into<String>) -> Self {
        DataError::Format {
            location: location.into(),
            message: message.into(),
        }
    }

    pub(crate) fn schema(column: impl Into<String>, reason: impl Into<String>) -> Self {
        DataError::SchemaMismatch {
            column: column.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_selection(column: impl Into<String>, value: impl Into<String>) -> Self {
        DataError::InvalidSelection {
            column: column.into(),
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
