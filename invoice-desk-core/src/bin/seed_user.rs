use dotenv::dotenv;
use invoice_desk_core::auth::credentials::MIN_PASSWORD_LEN;
use invoice_desk_core::auth::{validate_credentials, PgUserDirectory};
use invoice_desk_core::db::{create_pool, run_migrations};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Creates (or resets) a dashboard account that can sign in with
/// credentials.
///
/// Reads `DATABASE_URL`, `SEED_USER_EMAIL`, `SEED_USER_PASSWORD` and an
/// optional `SEED_USER_NAME` from the environment.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(LevelFilter::INFO.into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let database_url = required("DATABASE_URL")?;
    let email = required("SEED_USER_EMAIL")?;
    let password = required("SEED_USER_PASSWORD")?;
    let name = std::env::var("SEED_USER_NAME").unwrap_or_else(|_| "User".to_string());

    // Reject accounts the sign-in form would never accept.
    let credentials = validate_credentials(&email, &password).ok_or_else(|| {
        anyhow::anyhow!(
            "SEED_USER_EMAIL must be an email address and SEED_USER_PASSWORD at least {} characters",
            MIN_PASSWORD_LEN
        )
    })?;

    let pool = create_pool(&database_url, 1).await?;
    run_migrations(&pool).await?;

    let hash = bcrypt::hash(&credentials.password, bcrypt::DEFAULT_COST)?;
    let user = PgUserDirectory::new(pool)
        .upsert(&name, &credentials.email, &hash)
        .await?;

    info!("Seeded user {} <{}>", user.id, user.email);
    Ok(())
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{} must be set", name))
}
