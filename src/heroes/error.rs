use thiserror::Error;

/// Failures talking to the hero API.
#[derive(Error, Debug)]
pub enum RemoteError {
  #[error("Received error from server: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("Received error from API with status code {status}")]
  Api { status: u16 },

  #[error("Authentication failed. Please check your credentials")]
  AuthenticationFailed,

  #[error("No data received from server")]
  NoData,

  #[error("An error occurred while parsing data: {0}")]
  Decode(String),

  #[error("Session token is missing")]
  SessionTokenMissing,

  #[error("Invalid URL provided: {0}")]
  BadUrl(String),

  #[error("Username and password are required")]
  MissingCredentials,
}

impl RemoteError {
  pub fn from_status(status: reqwest::StatusCode) -> Self {
    match status.as_u16() {
      401 => RemoteError::AuthenticationFailed,
      code => RemoteError::Api { status: code },
    }
  }
}

/// Errors surfaced by the read-through catalog.
#[derive(Error, Debug)]
pub enum CacheError {
  #[error("Hero with ID {hero_id} not found")]
  NotFound { hero_id: String },

  #[error(transparent)]
  Remote(#[from] RemoteError),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_from_status() {
    assert!(matches!(
      RemoteError::from_status(reqwest::StatusCode::UNAUTHORIZED),
      RemoteError::AuthenticationFailed
    ));
    assert!(matches!(
      RemoteError::from_status(reqwest::StatusCode::BAD_GATEWAY),
      RemoteError::Api { status: 502 }
    ));
  }

  #[test]
  fn test_messages() {
    let not_found = CacheError::NotFound {
      hero_id: "H1".to_string(),
    };
    assert_eq!(not_found.to_string(), "Hero with ID H1 not found");

    let remote = CacheError::from(RemoteError::Api { status: 500 });
    assert_eq!(
      remote.to_string(),
      "Received error from API with status code 500"
    );
  }
}
