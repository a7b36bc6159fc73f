//! `brisas`: command-line client for the Brisas del Orinoco II benefits
//! registry.
//!
//! # Usage
//!
//! ```text
//! brisas login jperez
//! brisas beneficiaries list --search rojas
//! brisas beneficiaries disable 12345678
//! brisas report family --street 3 --format csv --out ./reportes
//! brisas browse
//! ```

mod app;
mod commands;
mod config;
mod notify;
mod prompt;
mod render;
mod ui;

use std::{io, path::PathBuf, process::ExitCode, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use commands::{
  Ctx,
  accounts::AccountCommand,
  auth::{ProfileCommand, RecoverCommand},
  beneficiaries::BeneficiaryCommand,
  dependents::DependentCommand,
  reports::ReportCommand,
};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{Overrides, Settings};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "brisas", version, about = "Benefits registry client for Brisas del Orinoco II")]
struct Cli {
  /// Config file (base_url, session_path, timeout_secs).
  #[arg(short, long, value_name = "FILE", global = true)]
  config:  Option<PathBuf>,

  /// Base URL of the backend (default: http://localhost:3000).
  #[arg(long, env = "BRISAS_URL", global = true)]
  url:     Option<String>,

  /// Where the login session is kept.
  #[arg(long, value_name = "FILE", global = true)]
  session: Option<PathBuf>,

  /// Request timeout in seconds.
  #[arg(long, global = true)]
  timeout: Option<u64>,

  /// More log output on stderr (-v info, -vv debug).
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Log in and save the session.
  Login {
    username: Option<String>,
  },
  Logout,
  /// Show the logged-in account.
  Whoami,
  /// Recover a forgotten password or username.
  #[command(subcommand)]
  Recover(RecoverCommand),
  /// List the community's streets.
  Streets,
  #[command(subcommand, visible_alias = "b")]
  Beneficiaries(BeneficiaryCommand),
  #[command(subcommand, visible_alias = "d")]
  Dependents(DependentCommand),
  /// Manage user accounts (community leader only).
  #[command(subcommand)]
  Accounts(AccountCommand),
  /// Your own account.
  #[command(subcommand)]
  Profile(ProfileCommand),
  /// Change your password.
  Password,
  /// Generate and export reports.
  #[command(subcommand)]
  Report(ReportCommand),
  /// Interactive browser for the beneficiary lists.
  Browse,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(&cli);

  match run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("{}", notify::describe_any(&e));
      ExitCode::FAILURE
    }
  }
}

/// Logs go to stderr so they never mix with report output. The browser owns
/// the terminal, so it logs nothing unless `RUST_LOG` asks for it.
fn init_tracing(cli: &Cli) {
  let level = match (&cli.command, cli.verbose) {
    (Command::Browse, _) => LevelFilter::OFF,
    (_, 0) => LevelFilter::WARN,
    (_, 1) => LevelFilter::INFO,
    _ => LevelFilter::DEBUG,
  };
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(EnvFilter::builder().with_default_directive(level.into()).from_env_lossy())
    .init();
}

async fn run(cli: Cli) -> Result<()> {
  let overrides = Overrides {
    config:       cli.config,
    base_url:     cli.url,
    session_path: cli.session,
    timeout_secs: cli.timeout,
  };
  let ctx = Ctx::new(Settings::load(&overrides)?)?;

  match cli.command {
    Command::Login { username } => commands::auth::login(&ctx, username).await,
    Command::Logout => commands::auth::logout(&ctx),
    Command::Whoami => commands::auth::whoami(&ctx).await,
    Command::Recover(cmd) => commands::auth::recover(&ctx, cmd).await,
    Command::Streets => {
      let svc = ctx.service()?;
      render::streets(&svc.streets().await?)
    }
    Command::Beneficiaries(cmd) => commands::beneficiaries::run(&ctx, cmd).await,
    Command::Dependents(cmd) => commands::dependents::run(&ctx, cmd).await,
    Command::Accounts(cmd) => commands::accounts::run(&ctx, cmd).await,
    Command::Profile(cmd) => commands::auth::profile(&ctx, cmd).await,
    Command::Password => commands::auth::change_password(&ctx).await,
    Command::Report(cmd) => commands::reports::run(&ctx, cmd).await,
    Command::Browse => browse(&ctx),
  }
}

// ─── Browser ──────────────────────────────────────────────────────────────────

fn browse(ctx: &Ctx) -> Result<()> {
  let mut app = App::new(ctx.service()?);
  app.start();

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let result = run_event_loop(&mut terminal, &mut app);

  // Restore the terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  result
}

fn run_event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
  loop {
    app.drain();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key)
    {
      break;
    }
  }
  Ok(())
}
