use thiserror::Error;

/// Failures talking to a collection, whether over HTTP or through the actor channel.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response from {collection} ({status}): {body}")]
    UnexpectedStatus {
        collection: &'static str,
        status: u16,
        body: String,
    },
    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: String },
    #[error("{collection} record already exists: {id}")]
    Conflict { collection: &'static str, id: String },
    #[error("{0} gateway is closed")]
    Closed(&'static str),
    #[error("{0} gateway dropped the request")]
    Dropped(&'static str),
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("Missing required user fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("User validation error: {0}")]
    ValidationError(String),
    #[error("User gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Invalid user: {0}")]
    InvalidUser(String),
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Order gateway error: {0}")]
    Gateway(#[from] GatewayError),
}
