use thiserror::Error;

/// Errors returned by resampler construction and processing.
#[derive(Debug, Error)]
pub enum ResamplerError {
    #[error("invalid input: {len} values do not form whole I/Q pairs")]
    InvalidInput { len: usize },

    #[error("invalid rate: input {input_rate} Hz, output {output_rate} Hz (both must be positive)")]
    InvalidRate { input_rate: u32, output_rate: u32 },

    #[error("invalid tap count: need at least 3, got {0}")]
    InvalidTapCount(usize),

    #[error("invalid cutoff: {0} is outside (0, 0.5]")]
    InvalidCutoff(f64),

    #[error("invalid rolloff: {0} is outside (0, 1)")]
    InvalidRolloff(f32),

    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),

    #[error("backend construction failed: {0}")]
    Construction(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("config error: {0}")]
    Config(String),
}

impl ResamplerError {
    /// Reports whether the error was raised while building a resampler.
    ///
    /// Construction errors are fatal to that instance; nothing is retried.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            ResamplerError::InvalidRate { .. }
                | ResamplerError::InvalidTapCount(_)
                | ResamplerError::InvalidCutoff(_)
                | ResamplerError::InvalidRolloff(_)
                | ResamplerError::InvalidChunkSize(_)
                | ResamplerError::Construction(_)
        )
    }
}

impl From<rubato::ResamplerConstructionError> for ResamplerError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        ResamplerError::Construction(e.to_string())
    }
}

impl From<rubato::ResampleError> for ResamplerError {
    fn from(e: rubato::ResampleError) -> Self {
        ResamplerError::Backend(e.to_string())
    }
}

impl From<serde_yaml::Error> for ResamplerError {
    fn from(e: serde_yaml::Error) -> Self {
        ResamplerError::Config(e.to_string())
    }
}
