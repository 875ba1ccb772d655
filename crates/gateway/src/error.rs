use crate::session::SessionError;

/// Errors from the gateway client.
///
/// The `Display` output of every variant is the string shown to the
/// operator in the inline error banner.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response (DNS, TLS, refused, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx JSON response. `message` is taken from the body's
    /// `message` or `error` field when present.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Response was not JSON. Its raw text is the message.
    #[error("{body}")]
    NonJson { status: u16, body: String },

    /// 401 from the gateway. The session has already been cleared.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 2xx response whose envelope reported `success: false` or carried
    /// no data.
    #[error("{0}")]
    Unsuccessful(String),

    /// JSON body did not match the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The configured base URL cannot carry endpoint paths.
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),

    /// The session store could not be written.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl GatewayError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::NonJson { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(401),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}
