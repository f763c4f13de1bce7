use thiserror::Error;

/// Boxed lower-level cause (I/O, csv, arrow, parquet, serde_json).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything the pipeline can fail with.
///
/// Structural problems only: unparseable cells, all-missing rows and absent
/// comparison categories are handled in place and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    /// The source could not be opened or decoded at all.
    #[error("cannot read source `{origin}`")]
    SourceRead {
        origin: String,
        #[source]
        source: BoxError,
    },

    #[error("unsupported source format: .{0}")]
    UnsupportedFormat(String),

    /// No header row, or no usable feature column left after placeholder removal.
    #[error("schema error: {0}")]
    Schema(String),

    #[error("cannot merge datasets with different schemas: expected [{expected}], found [{found}]")]
    SchemaMismatch { expected: String, found: String },

    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("cannot write `{target}`")]
    Export {
        target: String,
        #[source]
        source: BoxError,
    },
}

impl Error {
    pub(crate) fn source_read(origin: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::SourceRead {
            origin: origin.into(),
            source: source.into(),
        }
    }

    pub(crate) fn export(target: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Export {
            target: target.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
