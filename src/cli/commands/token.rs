//! API token commands.

use console::style;

use crate::config::Settings;
use crate::models::Role;

pub async fn cmd_token_issue(
    settings: &Settings,
    user: &str,
    restaurant: Option<&str>,
    admin: bool,
) -> anyhow::Result<()> {
    let ctx = settings.create_db_context();
    ctx.init_schema().await?;

    let role = if admin { Role::Admin } else { Role::Member };
    let token = ctx.tokens().issue(user, restaurant, role).await?;

    eprintln!(
        "{} Issued {} token for {}{}",
        style("✓").green(),
        role.as_str(),
        user,
        restaurant
            .map(|r| format!(" (restaurant {})", r))
            .unwrap_or_default()
    );
    eprintln!(
        "  {}",
        style("Store it now; it cannot be shown again.").yellow()
    );
    println!("{}", token);
    Ok(())
}

pub async fn cmd_token_revoke(settings: &Settings, token: &str) -> anyhow::Result<()> {
    let ctx = settings.create_db_context();
    if ctx.tokens().revoke(token).await? {
        println!("{} Token revoked", style("✓").green());
    } else {
        println!("{} No such token", style("!").yellow());
    }
    Ok(())
}
