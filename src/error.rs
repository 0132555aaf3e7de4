use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("series id {id} exceeds the identity raster encoding limit")]
    IdentityOverflow { id: u32 },

    #[error("unknown fetch ticket {0}")]
    UnknownFetchTicket(u64),

    #[error("failed to fetch `{file}`: {reason}")]
    Fetch { file: String, reason: String },

    #[error("failed to parse `{file}`: {reason}")]
    Parse { file: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}
