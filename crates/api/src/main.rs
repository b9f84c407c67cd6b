use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use secrecy::ExposeSecret;

use newsroom_api::app::{build_app, services};
use newsroom_api::config::{Cli, Command, Config, CreateAdminArgs};
use newsroom_auth::{NewUser, PasswordHasher, Role, User};
use newsroom_infra::PostgresUserStore;

/// Operator-created accounts get a stricter floor than the login check.
const MIN_ADMIN_PASSWORD_CHARS: usize = 8;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    newsroom_observability::init(cli.config.log_format());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cli.config).await,
        Command::CreateAdmin(args) => create_admin(&cli.config, args).await,
        Command::GenerateSecrets => {
            generate_secrets();
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let services = services::build_services(&config).await?;
    let app = build_app(services.app.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        environment = ?config.environment,
        persistent = services.database.is_some(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(database) = services.database {
        database.close().await;
    }
    Ok(())
}

async fn create_admin(config: &Config, args: CreateAdminArgs) -> anyhow::Result<()> {
    let url = config
        .database_url
        .as_deref()
        .context("create-admin needs --database-url or DATABASE_URL")?;

    if args.password.chars().count() < MIN_ADMIN_PASSWORD_CHARS {
        anyhow::bail!("password must be at least {MIN_ADMIN_PASSWORD_CHARS} characters");
    }

    let database = services::connect_database(url).await?;
    let store = PostgresUserStore::new(&database);

    let user = User::register(
        NewUser {
            name: args.name,
            email: args.email,
            password: args.password,
            role: Role::Admin,
        },
        &PasswordHasher::default(),
    )?;

    let result = store.insert(&user).await;
    database.close().await;

    match result {
        Ok(()) => {
            tracing::info!(user_id = %user.id, email = %user.email, "administrator created");
            Ok(())
        }
        Err(newsroom_core::DomainError::Conflict(_)) => {
            anyhow::bail!("email already registered: {}", user.email)
        }
        Err(e) => Err(e).context("failed to create administrator"),
    }
}

fn generate_secrets() {
    let signing = newsroom_auth::generate_signing_secret();
    let key = newsroom_auth::generate_encryption_key();
    println!("JWT_SECRET=\"{}\"", signing.expose_secret());
    println!("ENCRYPTION_KEY=\"{}\"", key.expose_secret());
    eprintln!("Rotating either value signs every active session out.");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
