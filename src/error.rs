use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaxError {
    #[error("invalid `{parameter}`: {reason}")]
    Configuration {
        parameter: &'static str,
        reason: String,
    },

    #[error("shape mismatch: numerical state has {numerical} points, exact state has {exact}")]
    ShapeMismatch { numerical: usize, exact: usize },

    #[error("degenerate log-log fit: {0}")]
    DegenerateFit(String),

    #[error("output error")]
    Io(#[from] std::io::Error),

    #[error("csv output error")]
    Csv(#[from] csv::Error),
}

impl LaxError {
    pub(crate) fn config(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            parameter,
            reason: reason.into(),
        }
    }
}
