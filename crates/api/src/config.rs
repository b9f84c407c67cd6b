//! Runtime configuration of the `newsroom-api` binary (flags + environment).

use core::fmt;

use clap::{Args, Parser, Subcommand, ValueEnum};
use secrecy::SecretString;

use newsroom_auth::SecretsConfig;
use newsroom_observability::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "newsroom-api", version, about = "Newsroom authentication API")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Register an administrator account in the database.
    CreateAdmin(CreateAdminArgs),
    /// Print a fresh JWT_SECRET / ENCRYPTION_KEY pair.
    GenerateSecrets,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Clone, Args)]
pub struct Config {
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// PostgreSQL connection string. Without it users live in memory.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// 64 hex characters (256-bit key).
    #[arg(long, env = "ENCRYPTION_KEY", hide_env_values = true)]
    pub encryption_key: Option<String>,

    #[arg(long, env = "APP_ENV", value_enum, default_value_t = Environment::Development)]
    pub environment: Environment,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// JSON logs in production, compact lines during development.
    pub fn log_format(&self) -> LogFormat {
        match self.environment {
            Environment::Production => LogFormat::Json,
            Environment::Development => LogFormat::Compact,
        }
    }

    /// Secrets given on the command line or through the environment.
    pub fn secrets(&self) -> SecretsConfig {
        SecretsConfig {
            signing_secret: self.jwt_secret.clone().map(SecretString::from),
            encryption_key: self.encryption_key.clone().map(SecretString::from),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "[REDACTED]"))
            .field("environment", &self.environment)
            .finish()
    }
}

#[derive(Clone, Args)]
pub struct CreateAdminArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl fmt::Debug for CreateAdminArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateAdminArgs")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
