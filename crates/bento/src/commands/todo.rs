use anyhow::{Result, bail};
use bento_core::{DashboardView, TodoChange};
use owo_colors::OwoColorize;

use super::{Context, flush_notices, resolve_todo, select_date_arg};
use crate::render::{palette_for, render_todos};

pub async fn add(ctx: &Context, text: &str) -> Result<()> {
    let mut dash = ctx.signed_in().await?;

    match dash.add_todo(text).await? {
        TodoChange::Created(todo) => {
            println!("{} Added {} on {}", "+".green(), todo.text, todo.date);
        }
        TodoChange::Updated(_) | TodoChange::Unchanged => bail!("Task text is empty"),
    }
    flush_notices(&mut dash);
    Ok(())
}

pub async fn edit(ctx: &Context, date: Option<&str>, target: &str, text: &str) -> Result<()> {
    let mut dash = ctx.signed_in().await?;
    select_date_arg(&mut dash, date)?;

    let id = resolve_todo(&dash, target)?;
    dash.begin_edit(&id)?;
    match dash.add_todo(text).await? {
        TodoChange::Updated(todo) => println!("{} {}", "~".yellow(), todo.text),
        TodoChange::Created(_) | TodoChange::Unchanged => bail!("Task text is empty"),
    }
    flush_notices(&mut dash);
    Ok(())
}

pub async fn toggle(ctx: &Context, date: Option<&str>, target: &str) -> Result<()> {
    let mut dash = ctx.signed_in().await?;
    select_date_arg(&mut dash, date)?;

    let id = resolve_todo(&dash, target)?;
    let todo = dash.toggle_todo(&id).await?;
    let mark = if todo.completed { "[x]" } else { "[ ]" };
    println!("{} {}", mark, todo.text);
    flush_notices(&mut dash);
    Ok(())
}

pub async fn remove(ctx: &Context, date: Option<&str>, target: &str) -> Result<()> {
    let mut dash = ctx.signed_in().await?;
    select_date_arg(&mut dash, date)?;

    let id = resolve_todo(&dash, target)?;
    let text = dash.tasks().get(&id).map(|t| t.text.clone()).unwrap_or_default();
    dash.delete_todo(&id).await?;
    println!("{} {}", "-".red(), text);
    flush_notices(&mut dash);
    Ok(())
}

pub async fn list(ctx: &Context, date: Option<&str>) -> Result<()> {
    let mut dash = ctx.signed_in().await?;
    select_date_arg(&mut dash, date)?;

    let view = dash.view();
    if let DashboardView::SignedIn(snapshot) = &view {
        print!("{}", render_todos(snapshot, &palette_for(&view)));
    }
    flush_notices(&mut dash);
    Ok(())
}
