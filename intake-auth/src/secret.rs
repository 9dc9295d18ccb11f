//! The server-held intake signing secret.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use secrecy::{ExposeSecret, Secret, SecretString};

/// Signing secret shared by every instance that mints or verifies intake tokens.
///
/// Cloning shares the same allocation. `Debug` never prints the value.
#[derive(Clone)]
pub struct IntakeSecret(Arc<SecretString>);

impl IntakeSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::new(Secret::new(secret.into())))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret().as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl fmt::Debug for IntakeSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IntakeSecret([REDACTED])")
    }
}

impl FromStr for IntakeSecret {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for IntakeSecret {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for IntakeSecret {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let secret = IntakeSecret::new("s3cret");
        assert_eq!(format!("{secret:?}"), "IntakeSecret([REDACTED])");
        assert_eq!(secret.expose(), "s3cret");
    }

    #[test]
    fn test_empty_secret() {
        assert!(IntakeSecret::new("").is_empty());
        assert!(!"x".parse::<IntakeSecret>().unwrap().is_empty());
    }
}
