//! Create an ADMIN account directly in the account store.
//! Public signup only ever creates USER accounts, so operators bootstrap admins here.
//!
//! Usage: create-admin --email EMAIL --first-name NAME --last-name NAME
//!   The password is read from the ADMIN_PASSWORD environment variable.

use chrono::Utc;
use clap::Parser;
use uuid::Uuid;

use userauth_api::{
    config::Config,
    db::{self, AccountStore, PgAccountStore},
    models::account::{NewAccount, UserRole},
    services::password::hash_password,
};

#[derive(Parser)]
#[command(name = "create-admin", about = "Create an administrator account")]
struct Args {
    #[arg(long)]
    email: String,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    /// Optional phone number
    #[arg(long)]
    phone: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let password = std::env::var("ADMIN_PASSWORD")
        .map_err(|_| anyhow::anyhow!("ADMIN_PASSWORD environment variable not set"))?;
    if password.chars().count() < 6 {
        anyhow::bail!("ADMIN_PASSWORD must be at least 6 characters");
    }

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    let store = PgAccountStore::new(pool);

    let account = store
        .insert(&NewAccount {
            id: Uuid::new_v4(),
            email: args.email.trim().to_lowercase(),
            password_hash: hash_password(&password, config.bcrypt_cost)?,
            first_name: args.first_name,
            last_name: args.last_name,
            phone: args.phone,
            role: UserRole::Admin,
            created_at: Utc::now(),
        })
        .await?;

    tracing::info!("Created admin account {} ({})", account.id, account.email);
    Ok(())
}
