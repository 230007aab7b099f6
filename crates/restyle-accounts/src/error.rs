use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("quota update for user {user} kept losing to concurrent writers")]
    Contention { user: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
