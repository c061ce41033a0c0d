/// Errors raised while reading an upstream report object.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unknown channel symbol '{symbol}'")]
    UnknownChannel { symbol: String },
    #[error("non-finite value in field {field}")]
    NonFinite { field: String },
    #[error("field {field} out of range: {value}")]
    OutOfRange { field: String, value: f64 },
    #[error("threshold ordering violated: warn={warn} block={block}")]
    ThresholdOrder { warn: f64, block: f64 },
    #[error("malformed report: {0}")]
    Parse(#[from] serde_json::Error),
}
