use anyhow::{Result, bail};
use bento_core::{Calendar, JournalSave};
use owo_colors::OwoColorize;

use super::{Context, flush_notices, select_date_arg};

pub async fn show(ctx: &Context, date: Option<&str>) -> Result<()> {
    let mut dash = ctx.signed_in().await?;
    select_date_arg(&mut dash, date)?;

    let selected = dash.calendar().selected();
    println!("{}", Calendar::long_label(selected).bold());
    match dash.journal_content() {
        "" => println!("{}", "Nothing written yet".dimmed()),
        content => println!("{}", content),
    }
    flush_notices(&mut dash);
    Ok(())
}

/// Replace the entry for a day with `text`
pub async fn write(ctx: &Context, date: Option<&str>, text: &str) -> Result<()> {
    let mut dash = ctx.signed_in().await?;
    select_date_arg(&mut dash, date)?;

    dash.set_journal_draft(text);
    match dash.save_journal().await? {
        JournalSave::Created(entry) => println!("{} Journal entry for {} saved", "+".green(), entry.date),
        JournalSave::Updated(entry) => println!("{} Journal entry for {} updated", "~".yellow(), entry.date),
        JournalSave::Unchanged => bail!("Journal text is empty"),
    }
    flush_notices(&mut dash);
    Ok(())
}
