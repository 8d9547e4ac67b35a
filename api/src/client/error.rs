#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcClientError {
    /// The server could not be reached or the request timed out.
    #[error("connection failed: {0}")]
    Connection(String),
    /// The server answered with an error envelope.
    #[error("{code}: {message}")]
    Server {
        status: u16,
        code: String,
        message: String,
    },
    #[error("invalid response: {0}")]
    Decode(String),
}

impl RpcClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RpcClientError::Server { code, .. } if code == "UNAUTHORIZED")
    }
}

impl From<reqwest::Error> for RpcClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RpcClientError::Decode(err.to_string())
        } else {
            RpcClientError::Connection(err.to_string())
        }
    }
}
