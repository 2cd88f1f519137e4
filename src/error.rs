use actix_web::http::StatusCode;
use actix_web::ResponseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecurityHeadersError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid hash algorithm: {0}")]
    InvalidHashAlgorithm(String),

    #[error("Unrecognized value '{value}' for {header}")]
    InvalidEnumValue { header: &'static str, value: String },

    #[error("Header processing error: {0}")]
    InvalidHeader(String),

    #[error("Random source error: {0}")]
    RandomSource(String),

    #[error("Request security state is not available: {0}")]
    MissingRequestState(&'static str),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl SecurityHeadersError {
    #[inline]
    pub(crate) fn invalid_enum(header: &'static str, value: &str) -> Self {
        Self::InvalidEnumValue {
            header,
            value: value.to_string(),
        }
    }
}

impl ResponseError for SecurityHeadersError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_)
            | Self::InvalidHashAlgorithm(_)
            | Self::InvalidEnumValue { .. }
            | Self::ConfigError(_) => StatusCode::BAD_REQUEST,

            Self::InvalidHeader(_) | Self::RandomSource(_) | Self::MissingRequestState(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
