//! User account commands

use crate::config::Config;
use crate::db::Store;
use crate::domain::Role;
use crate::services::{NewUser, SeaOrmUserService, UserService};

pub async fn cmd_user_add(
    config: &Config,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<()> {
    let role: Role = role.parse().map_err(anyhow::Error::msg)?;
    let store = Store::new(&config.general.database_path).await?;
    let service = SeaOrmUserService::new(store, config.security.clone());

    let user = service
        .create(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: role.as_i32(),
        })
        .await?;

    println!("✓ Created user {} <{}> as {} (id {})", user.name, user.email, role, user.id);
    Ok(())
}

pub async fn cmd_user_list(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let users = store.user_repo().list().await?;

    if users.is_empty() {
        println!("No users registered.");
        println!();
        println!("Add one with: ppdb user add --name <name> --email <email> --password <password>");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");

    for user in users {
        let role = Role::try_from(user.role).map_or_else(|_| user.role.to_string(), |r| r.to_string());
        println!("{:>4}  {:<30} {:<25} {}", user.id, user.email, user.name, role);
    }

    Ok(())
}
