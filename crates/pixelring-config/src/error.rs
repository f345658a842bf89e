use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid expression for \"{key}\": {expr}")]
    InvalidExpression { key: String, expr: String },

    #[error("unknown variable \"{name}\" referenced while evaluating \"{key}\"")]
    UnknownVariable { key: String, name: String },

    #[error("expression evaluation failed for \"{key}\": {message}")]
    Eval { key: String, message: String },

    #[error("\"{key}\" must be a non-negative whole number, got {value}")]
    NotACount { key: String, value: f64 },

    #[error("\"{key}\" must be even, got {value}")]
    OddCount { key: String, value: usize },

    #[error("\"{key}\" must be positive, got {value}")]
    NotPositive { key: String, value: f64 },

    #[error("\"{key}\" must not be negative, got {value}")]
    Negative { key: String, value: f64 },

    #[error("spoke {index} angle {angle} is outside [0, 2π)")]
    SpokeAngleRange { index: usize, angle: f64 },

    #[error("spoke {index} angle {angle} is not greater than the previous spoke angle {previous}")]
    SpokeOrder {
        index: usize,
        angle: f64,
        previous: f64,
    },
}
