//! Resolution of the two process-wide secrets: the token signing secret and
//! the subject encryption key.
//!
//! Structured runtime configuration wins; environment variables are the
//! fallback so scripts and tests can run without a full server context.

use rand::{RngCore, rngs::OsRng};
use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigurationError;

pub const SIGNING_SECRET_ENV: &str = "JWT_SECRET";
pub const ENCRYPTION_KEY_ENV: &str = "ENCRYPTION_KEY";

/// Source of the auth secrets, injected at construction time.
pub trait SecretProvider: Send + Sync {
    fn signing_secret(&self) -> Result<SecretString, ConfigurationError>;
    fn encryption_key(&self) -> Result<SecretString, ConfigurationError>;
}

/// Secrets supplied by the runtime configuration layer (CLI flags, config
/// files). Either may be absent.
#[derive(Debug, Default)]
pub struct SecretsConfig {
    pub signing_secret: Option<SecretString>,
    pub encryption_key: Option<SecretString>,
}

/// Runtime configuration first, environment second.
#[derive(Debug, Default)]
pub struct LayeredSecrets {
    runtime: SecretsConfig,
}

impl LayeredSecrets {
    pub fn new(runtime: SecretsConfig) -> Self {
        Self { runtime }
    }

    /// Environment-only lookup (no runtime configuration available).
    pub fn from_env() -> Self {
        Self::default()
    }

    fn resolve(
        runtime: Option<&SecretString>,
        env_var: &'static str,
    ) -> Result<SecretString, ConfigurationError> {
        if let Some(value) = runtime.filter(|s| !s.expose_secret().is_empty()) {
            return Ok(SecretString::from(value.expose_secret().to_owned()));
        }

        match std::env::var(env_var) {
            Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
            _ => {
                tracing::error!(setting = env_var, "critical: auth secret is missing");
                Err(ConfigurationError::Missing(env_var))
            }
        }
    }
}

impl SecretProvider for LayeredSecrets {
    fn signing_secret(&self) -> Result<SecretString, ConfigurationError> {
        Self::resolve(self.runtime.signing_secret.as_ref(), SIGNING_SECRET_ENV)
    }

    fn encryption_key(&self) -> Result<SecretString, ConfigurationError> {
        Self::resolve(self.runtime.encryption_key.as_ref(), ENCRYPTION_KEY_ENV)
    }
}

/// Fixed secrets; the test double.
#[derive(Debug)]
pub struct StaticSecrets {
    signing_secret: SecretString,
    encryption_key: SecretString,
}

impl StaticSecrets {
    pub fn new(signing_secret: impl Into<String>, encryption_key: impl Into<String>) -> Self {
        Self {
            signing_secret: SecretString::from(signing_secret.into()),
            encryption_key: SecretString::from(encryption_key.into()),
        }
    }
}

impl SecretProvider for StaticSecrets {
    fn signing_secret(&self) -> Result<SecretString, ConfigurationError> {
        Ok(SecretString::from(self.signing_secret.expose_secret().to_owned()))
    }

    fn encryption_key(&self) -> Result<SecretString, ConfigurationError> {
        Ok(SecretString::from(self.encryption_key.expose_secret().to_owned()))
    }
}

/// Fresh signing secret: 64 random bytes, hex-encoded.
pub fn generate_signing_secret() -> SecretString {
    random_hex(64)
}

/// Fresh 256-bit encryption key, hex-encoded.
pub fn generate_encryption_key() -> SecretString {
    random_hex(32)
}

fn random_hex(len: usize) -> SecretString {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    SecretString::from(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn runtime_config_takes_precedence_over_env() {
        temp_env::with_vars([(SIGNING_SECRET_ENV, Some("from-env"))], || {
            let secrets = LayeredSecrets::new(SecretsConfig {
                signing_secret: Some(SecretString::from("from-runtime".to_string())),
                encryption_key: None,
            });
            assert_eq!(secrets.signing_secret().unwrap().expose_secret(), "from-runtime");
        });
    }

    #[test]
    fn falls_back_to_env() {
        temp_env::with_vars(
            [(SIGNING_SECRET_ENV, Some("from-env")), (ENCRYPTION_KEY_ENV, Some(KEY))],
            || {
                let secrets = LayeredSecrets::from_env();
                assert_eq!(secrets.signing_secret().unwrap().expose_secret(), "from-env");
                assert_eq!(secrets.encryption_key().unwrap().expose_secret(), KEY);
            },
        );
    }

    #[test]
    fn empty_runtime_value_falls_through_to_env() {
        temp_env::with_vars([(ENCRYPTION_KEY_ENV, Some(KEY))], || {
            let secrets = LayeredSecrets::new(SecretsConfig {
                signing_secret: None,
                encryption_key: Some(SecretString::from(String::new())),
            });
            assert_eq!(secrets.encryption_key().unwrap().expose_secret(), KEY);
        });
    }

    #[test]
    fn missing_secret_is_a_configuration_error() {
        temp_env::with_vars(
            [(SIGNING_SECRET_ENV, None::<&str>), (ENCRYPTION_KEY_ENV, Some(""))],
            || {
                let secrets = LayeredSecrets::from_env();
                assert_eq!(
                    secrets.signing_secret().unwrap_err(),
                    ConfigurationError::Missing(SIGNING_SECRET_ENV)
                );
                assert_eq!(
                    secrets.encryption_key().unwrap_err(),
                    ConfigurationError::Missing(ENCRYPTION_KEY_ENV)
                );
            },
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let secrets = StaticSecrets::new("super-secret-signing-value", KEY);
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("super-secret-signing-value"));
        assert!(!rendered.contains(KEY));
    }

    #[test]
    fn generated_secrets_are_usable_and_distinct() {
        let key = generate_encryption_key();
        assert_eq!(key.expose_secret().len(), 64);
        assert!(crate::cipher::IdentifierCipher::new(&key).is_ok());
        assert_ne!(key.expose_secret(), generate_encryption_key().expose_secret());

        let signing = generate_signing_secret();
        assert_eq!(signing.expose_secret().len(), 128);
        assert!(signing.expose_secret().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
