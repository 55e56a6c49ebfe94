use anyhow::Result;

use super::{Context, flush_notices, select_date_arg};
use crate::render::{Render, palette_for, render_calendar};
use bento_core::DashboardView;

/// Full dashboard for one day
pub async fn show(ctx: &Context, date: Option<&str>) -> Result<()> {
    let mut dash = ctx.signed_in().await?;
    select_date_arg(&mut dash, date)?;

    let view = dash.view();
    println!("{}", view.render(&palette_for(&view)));
    // Notices were part of the view
    dash.take_notices();
    Ok(())
}

/// Month grid around a day
pub async fn calendar(ctx: &Context, date: Option<&str>) -> Result<()> {
    let mut dash = ctx.signed_in().await?;
    select_date_arg(&mut dash, date)?;

    let view = dash.view();
    if let DashboardView::SignedIn(snapshot) = &view {
        print!("{}", render_calendar(snapshot, &palette_for(&view)));
        println!("* journal and tasks   j journal   t tasks");
    }
    flush_notices(&mut dash);
    Ok(())
}
