//! IMAP settings discovery.

use cio_oauth::Parameters;
use serde_json::Value;

use super::{ApiCall, ContextIo};
use crate::error::ClientError;
use crate::params::require_arg;

impl ContextIo {
    /// Look up known IMAP settings for an email address.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidArgument`] for an empty address, or the
    /// request error.
    pub fn discovery(&self, email: &str) -> Result<Value, ClientError> {
        require_arg(email, "email")?;
        let params = Parameters::new()
            .with("source_type", "imap")
            .with("email", email);
        self.json(ApiCall::get("discovery").params(params))
    }
}
