use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeocodeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    /// The request did not complete (DNS, connect, timeout).
    #[error("Geocoding request failed: {0}")]
    Transport(String),

    /// The provider answered with a non-success status (bad key, quota).
    #[error("Geocoding rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Geocoding response malformed: {0}")]
    Decode(String),

    #[error("Geocoder configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GeocodeError::Decode(err.to_string())
        } else {
            GeocodeError::Transport(err.to_string())
        }
    }
}
