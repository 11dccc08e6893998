use thiserror::Error;

/// Why an upstream call did not produce a usable body.
///
/// None of these are fatal: fetchers turn them into empty/default results and
/// the cache never stores them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
  #[error("upstream returned HTTP {status}: {message}")]
  Status { status: u16, message: String },

  #[error("request failed: {0}")]
  Transport(String),

  #[error("response body is not valid JSON: {0}")]
  Decode(String),

  #[error("response is missing `{0}`")]
  MissingField(String),

  #[error("graphql error: {0}")]
  Graphql(String),
}

impl UpstreamError {
  pub fn status(&self) -> Option<u16> {
    match self {
      UpstreamError::Status { status, .. } => Some(*status),
      _ => None,
    }
  }

  /// The upstream-provided message when there is one.
  pub fn upstream_message(&self) -> Option<&str> {
    match self {
      UpstreamError::Status { message, .. } | UpstreamError::Graphql(message) => Some(message),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  #[error("no GitHub username configured (set GITHUB_USERNAME or pass --username)")]
  MissingUsername,

  #[error("invalid value for {name}: {value}")]
  InvalidValue { name: &'static str, value: String },
}
