//! Session commands - login, logout, me

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::Password;

use super::{get_context, interactive};

pub fn login(token: Option<String>) -> Result<()> {
    let ctx = get_context("login")?;

    let token = match token {
        Some(t) => t,
        None if interactive() => Password::new().with_prompt("Access token").interact()?,
        None => bail!("No token given. Use 'bk login --token <TOKEN>'."),
    };

    ctx.session_service.login(&token)?;

    // Verify right away so a bad token is not left behind
    let profile = ctx.session_service.current_user()?;
    println!("{} Signed in as {}", "✓".green(), profile.full_name().bold());
    Ok(())
}

pub fn logout() -> Result<()> {
    let ctx = get_context("logout")?;
    ctx.session_service.logout()?;
    crate::output::info("Signed out.");
    Ok(())
}

pub fn me(json: bool) -> Result<()> {
    let ctx = get_context("me")?;
    let profile = ctx.session_service.current_user()?;

    if json {
        return crate::output::json(&profile);
    }

    println!("{}", profile.full_name().bold());
    println!("  Email: {}", profile.email);
    println!("  Role:  {}", if profile.is_admin() { "admin" } else { "user" });
    Ok(())
}
