//! Invite code commands.

use console::style;

use crate::config::Settings;

pub async fn cmd_invite_create(
    settings: &Settings,
    restaurant: &str,
    created_by: &str,
) -> anyhow::Result<()> {
    let ctx = settings.create_db_context();
    ctx.init_schema().await?;

    let invite = ctx.invites().create(restaurant, created_by).await?;
    eprintln!("{} Invite created for {}", style("✓").green(), restaurant);
    println!("{}", invite.code);
    Ok(())
}

pub async fn cmd_invite_list(settings: &Settings, restaurant: &str) -> anyhow::Result<()> {
    let ctx = settings.create_db_context();
    let invites = ctx.invites().list_for_restaurant(restaurant).await?;

    if invites.is_empty() {
        println!("{} No invites for {}", style("!").yellow(), restaurant);
        return Ok(());
    }

    println!("{:<22} {:<8} {}", "CODE", "STATUS", "CREATED");
    for invite in invites {
        let status = if invite.used {
            style("used").dim()
        } else {
            style("open").green()
        };
        println!(
            "{:<22} {:<8} {}",
            invite.code,
            status,
            invite.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
