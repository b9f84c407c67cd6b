//! Service wiring: user store, token service, authenticator, session resolver.

use std::sync::Arc;

use anyhow::Context;

use newsroom_auth::{
    Authenticator, InMemoryUserStore, LayeredSecrets, PasswordHasher, SessionResolver,
    TokenService, UserStore,
};
use newsroom_infra::{Database, PoolConfig, PostgresUserStore};

use crate::config::Config;
use crate::cookies::CookieSettings;

pub type SharedUserStore = Arc<dyn UserStore>;

pub struct AppServices {
    pub authenticator: Authenticator<SharedUserStore>,
    pub sessions: SessionResolver<SharedUserStore>,
    pub tokens: Arc<TokenService>,
    pub cookies: CookieSettings,
}

impl AppServices {
    pub fn new(
        store: SharedUserStore,
        tokens: Arc<TokenService>,
        hasher: PasswordHasher,
        cookies: CookieSettings,
    ) -> Self {
        Self {
            authenticator: Authenticator::new(store.clone(), hasher),
            sessions: SessionResolver::new(tokens.clone(), store),
            tokens,
            cookies,
        }
    }
}

/// Everything `serve` needs. The database, when configured, must be closed
/// by the caller on shutdown.
pub struct Services {
    pub app: Arc<AppServices>,
    pub database: Option<Database>,
}

/// Resolve secrets and pick the user store from configuration.
///
/// Missing or unusable secrets abort start-up.
pub async fn build_services(config: &Config) -> anyhow::Result<Services> {
    let secrets = LayeredSecrets::new(config.secrets());
    let tokens = Arc::new(TokenService::new(&secrets).context("auth secrets are not configured")?);

    let (store, database): (SharedUserStore, Option<Database>) = match &config.database_url {
        Some(url) => {
            let database = connect_database(url).await?;
            let store: SharedUserStore = Arc::new(PostgresUserStore::new(&database));
            (store, Some(database))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using an empty in-memory user store");
            let store: SharedUserStore = Arc::new(InMemoryUserStore::new());
            (store, None)
        }
    };

    let app = AppServices::new(
        store,
        tokens,
        PasswordHasher::default(),
        CookieSettings::new(config.is_production()),
    );

    Ok(Services {
        app: Arc::new(app),
        database,
    })
}

pub async fn connect_database(url: &str) -> anyhow::Result<Database> {
    let database = Database::connect(url, PoolConfig::default())
        .await
        .context("failed to connect to PostgreSQL")?;
    database
        .ensure_schema()
        .await
        .context("failed to prepare the users table")?;
    Ok(database)
}
