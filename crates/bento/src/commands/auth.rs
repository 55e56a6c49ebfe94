use anyhow::{Context as _, Result};
use owo_colors::OwoColorize;

use super::{Context, flush_notices};

/// Prompt for a password without echoing it
pub fn prompt_password(confirm: bool) -> Result<String> {
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
    if confirm {
        let again = rpassword::prompt_password("Confirm password: ")
            .context("Failed to read password")?;
        if again != password {
            anyhow::bail!("Passwords do not match");
        }
    }
    Ok(password)
}

pub async fn register(ctx: &Context, email: &str) -> Result<()> {
    let password = prompt_password(true)?;
    let mut dash = ctx.connect().await?;

    let identity = dash.register(email, &password).await?;
    ctx.remember(&dash)?;
    flush_notices(&mut dash);

    println!("{} Registered and signed in as {}", "✓".green(), identity.email.bold());
    Ok(())
}

pub async fn login(ctx: &Context, email: &str) -> Result<()> {
    let password = prompt_password(false)?;
    let mut dash = ctx.connect().await?;

    let identity = dash.sign_in(email, &password).await?;
    ctx.remember(&dash)?;
    flush_notices(&mut dash);

    println!("{} Signed in as {}", "✓".green(), identity.email.bold());
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    if ctx.session.load()?.is_none() {
        println!("Not signed in");
        return Ok(());
    }

    // An expired session still leaves the file to clean up
    let result = match ctx.signed_in().await {
        Ok(mut dash) => dash.sign_out().await.map_err(anyhow::Error::from),
        Err(e) => Err(e),
    };
    ctx.session.clear()?;

    match result {
        Ok(()) => println!("{} Signed out", "✓".green()),
        Err(e) => println!("{} Signed out locally ({})", "✓".green(), e.to_string().dimmed()),
    }
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    let mut dash = ctx.signed_in().await?;
    if let Some(identity) = dash.session().current_identity() {
        println!("{}", identity.email);
        println!("{}", format!("owner {}", identity.owner_id).dimmed());
    }
    flush_notices(&mut dash);
    Ok(())
}
