//! bento - Terminal front end for the bento planner
//!
//! Talks to bentod over its socket. The session token is kept in the
//! state directory so one-shot commands stay signed in between runs.

mod commands;
mod render;
mod session_file;

use anyhow::{Context as _, Result};
use bento_config::load_config_or_default;
use bento_core::DashboardOptions;
use bento_util::default_config_path;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::Context;
use session_file::SessionFile;

#[derive(Parser, Debug)]
#[command(name = "bento")]
#[command(about = "Tasks, calendar and journal in your terminal", long_about = None)]
struct Cli {
    /// Configuration file path (default: ~/.config/bento/config.toml)
    #[arg(short, long, env = "BENTO_CONFIG", default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Socket path override (or set BENTO_SOCKET env var)
    #[arg(short, long, env = "BENTO_SOCKET")]
    socket: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an account and sign in
    Register { email: String },

    /// Sign in to an existing account
    Login { email: String },

    /// Sign out and forget the saved session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Show calendar, tasks and journal for a day
    Show {
        /// Day to show (today, tomorrow, yesterday or YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Manage tasks
    Todo {
        /// Day whose task list numbers refer to (default: today)
        #[arg(short, long)]
        date: Option<String>,

        #[command(subcommand)]
        action: TodoCommand,
    },

    /// Read or write journal entries
    Journal {
        #[command(subcommand)]
        action: JournalCommand,
    },

    /// Show the month grid around a day
    Calendar {
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Interactive session (the default)
    Interactive,
}

#[derive(Subcommand, Debug)]
enum TodoCommand {
    /// Add a task
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Change a task's text
    Edit {
        /// Task number or id prefix
        id: String,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Mark a task done or not done
    Toggle { id: String },
    /// Delete a task
    Rm { id: String },
    /// List tasks for the day
    List,
}

#[derive(Subcommand, Debug)]
enum JournalCommand {
    /// Print the entry for a day
    Show {
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Save the entry for a day, replacing any previous text
    Write {
        #[arg(short, long)]
        date: Option<String>,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

fn build_context(cli: &Cli) -> Result<Context> {
    let config = load_config_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    let socket_path = cli
        .socket
        .clone()
        .unwrap_or_else(|| config.service.socket_path.clone());

    Ok(Context {
        socket_path,
        session: SessionFile::new(config.client.session_file.clone()),
        options: DashboardOptions::from(&config.client),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = build_context(&cli)?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Register { email } => commands::auth::register(&ctx, &email).await,
        Commands::Login { email } => commands::auth::login(&ctx, &email).await,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Whoami => commands::auth::whoami(&ctx).await,
        Commands::Show { date } => commands::show::show(&ctx, date.as_deref()).await,
        Commands::Calendar { date } => commands::show::calendar(&ctx, date.as_deref()).await,
        Commands::Todo { date, action } => {
            let date = date.as_deref();
            match action {
                TodoCommand::Add { text } => commands::todo::add(&ctx, &text.join(" ")).await,
                TodoCommand::Edit { id, text } => {
                    commands::todo::edit(&ctx, date, &id, &text.join(" ")).await
                }
                TodoCommand::Toggle { id } => commands::todo::toggle(&ctx, date, &id).await,
                TodoCommand::Rm { id } => commands::todo::remove(&ctx, date, &id).await,
                TodoCommand::List => commands::todo::list(&ctx, date).await,
            }
        }
        Commands::Journal { action } => match action {
            JournalCommand::Show { date } => commands::journal::show(&ctx, date.as_deref()).await,
            JournalCommand::Write { date, text } => {
                commands::journal::write(&ctx, date.as_deref(), &text.join(" ")).await
            }
        },
        Commands::Interactive => commands::interactive::run(&ctx).await,
    }
}
