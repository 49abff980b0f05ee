//! Account administration from the command line.

use crate::auth::password::hash_password;
use crate::config::Config;
use crate::models::Role;
use crate::queries::user::{self, NewUser};

/// Create an ADMIN account, or promote the account if the email already
/// exists. Used to bootstrap a fresh deployment.
pub async fn create_admin(config: Config, name: String, email: String, password: String) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(&config.database.url, 1).await?;
    crate::db::run_migrations(&pool).await?;

    if let Some(existing) = user::get_user_by_email(&pool, &email).await? {
        user::set_role(&pool, existing.id, Role::Admin).await?;
        tracing::info!("{email} promoted to admin");
        return Ok(());
    }

    if password.len() < 8 {
        anyhow::bail!("password must be at least 8 characters");
    }

    let password_hash = hash_password(&password)?;
    user::insert_user(
        &pool,
        NewUser {
            name,
            email: email.clone(),
            password_hash,
            phone: None,
            address: None,
            role: Role::Admin,
        },
    )
    .await?;

    tracing::info!("admin account {email} created");

    Ok(())
}
