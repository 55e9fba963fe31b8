use std::sync::Arc;

use anyhow::bail;
use clap::Args;

use crate::auth::hash_password;
use crate::cli::OutputFormat;
use crate::config::{AdminSeed, AppConfig};
use crate::database::models::{PublicUser, User};
use crate::database::{Filter, Repository, Store};
use crate::types::{ObjectId, Role};
use crate::validation::escape;

#[derive(Args)]
pub struct CreateUserArgs {
    #[arg(long)]
    pub user_name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    #[arg(long, default_value = "user", help = "user or admin")]
    pub role: Role,
}

/// Store a user with the same normalisation the HTTP routes apply.
pub async fn store_user(
    store: Arc<dyn Store>,
    bcrypt_cost: u32,
    args: &CreateUserArgs,
) -> anyhow::Result<User> {
    let user = User {
        id: ObjectId::new(),
        user_name: escape(&args.user_name),
        email: args.email.trim().to_lowercase(),
        password: hash_password(&args.password, bcrypt_cost)?,
        role: args.role,
    };
    Ok(Repository::<User>::new(store).create(user).await?)
}

/// Create the configured admin unless a user with that name already exists.
/// Returns the stored user when one was created.
pub async fn seed_admin(
    store: Arc<dyn Store>,
    bcrypt_cost: u32,
    seed: &AdminSeed,
) -> anyhow::Result<Option<User>> {
    let users = Repository::<User>::new(store.clone());
    let user_name = escape(&seed.user_name);
    if users.find_one(&Filter::all().eq("user_name", user_name)).await?.is_some() {
        tracing::debug!("Admin '{}' already present", seed.user_name);
        return Ok(None);
    }

    let args = CreateUserArgs {
        user_name: seed.user_name.clone(),
        email: seed.email.clone(),
        password: seed.password.clone(),
        role: Role::Admin,
    };
    let admin = store_user(store, bcrypt_cost, &args).await?;
    tracing::info!("Seeded admin '{}'", admin.user_name);
    Ok(Some(admin))
}

pub async fn handle(config: AppConfig, args: CreateUserArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    if config.database.url.is_none() {
        bail!(
            "DATABASE_URL is not set; a user created in the in-memory store would be lost on exit. \
             Set ADMIN_USER_NAME, ADMIN_EMAIL and ADMIN_PASSWORD to seed an admin when serving without a database"
        );
    }

    let store = crate::cli::open_store(&config).await?;
    let created = PublicUser::from(store_user(store, config.security.bcrypt_cost, &args).await?);

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&created)?),
        OutputFormat::Text => println!(
            "Created {} '{}' <{}> with id {}",
            created.role.as_str(),
            created.user_name,
            created.email,
            created.id
        ),
    }

    Ok(())
}
