//! Login, logout, recovery, and self-service profile commands.

use anyhow::{Result, bail};
use brisas_client::Session;
use brisas_core::{
  backend::{BenefitsBackend, LoginRequest, PasswordRecovery, UsernameRecovery},
  role::Role,
  validate::{AccountDraft, PasswordDraft},
};
use clap::Subcommand;
use tracing::info;

use super::Ctx;
use crate::{commands::accounts::AccountFields, prompt, render};

#[derive(Subcommand, Debug)]
pub enum RecoverCommand {
  /// Request a temporary password.
  Password {
    #[arg(long)]
    email:  String,
    #[arg(long)]
    cedula: String,
  },
  /// Look up a forgotten username.
  Username {
    #[arg(long)]
    cedula: String,
    #[arg(long)]
    name:   String,
  },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
  Show,
  /// Edit your own name, username or email.
  Edit {
    #[command(flatten)]
    fields: AccountFields,
  },
}

pub async fn login(ctx: &Ctx, username: Option<String>) -> Result<()> {
  let username = match username {
    Some(u) => u,
    None => prompt::line("Usuario")?,
  };
  let password = prompt::line("Contraseña")?;
  if username.trim().is_empty() || password.is_empty() {
    bail!("username and password are required");
  }

  let resp = ctx
    .anonymous()?
    .login(LoginRequest { username: username.trim().to_owned(), password })
    .await?;
  let session = Session::from(resp);
  ctx.sessions.save(&session)?;
  info!(username = session.account.username, "logged in");

  let role = Role::from_id(session.account.role_id).map_or("unknown role", Role::label);
  println!("Logged in as {} ({role}).", session.account.full_name);
  if session.actor().role() == Some(Role::StreetChief) && session.account.assigned_street_id.is_none() {
    println!("Warning: this account has no assigned street; listings will be refused.");
  }
  Ok(())
}

pub fn logout(ctx: &Ctx) -> Result<()> {
  ctx.sessions.clear()?;
  println!("Logged out.");
  Ok(())
}

pub async fn whoami(ctx: &Ctx) -> Result<()> {
  let svc = ctx.service()?;
  let streets = svc.streets().await?;
  render::account(svc.account(), &streets);
  Ok(())
}

pub async fn recover(ctx: &Ctx, cmd: RecoverCommand) -> Result<()> {
  let http = ctx.anonymous()?;
  match cmd {
    RecoverCommand::Password { email, cedula } => {
      let temp = http
        .recover_password(PasswordRecovery { email, national_id: cedula })
        .await?;
      println!("Temporary password: {}", temp.password);
      println!("Log in with it and change it with `brisas password`.");
    }
    RecoverCommand::Username { cedula, name } => {
      let found = http
        .recover_username(UsernameRecovery { national_id: cedula, full_name: name })
        .await?;
      println!("Username: {}", found.username);
    }
  }
  Ok(())
}

pub async fn profile(ctx: &Ctx, cmd: ProfileCommand) -> Result<()> {
  let svc = ctx.service()?;
  match cmd {
    ProfileCommand::Show => {
      let me = svc.account_by_id(svc.account().id).await?;
      render::account(&me, &svc.streets().await?);
    }
    ProfileCommand::Edit { fields } => {
      let current = svc.account_by_id(svc.account().id).await?;
      let mut draft = AccountDraft::from(&current);
      fields.apply(&mut draft);
      let updated = svc.update_profile(&draft).await?;

      // Keep the cached profile in step with the server.
      if let Some(mut session) = ctx.sessions.load()? {
        session.account = updated.clone();
        ctx.sessions.save(&session)?;
      }
      println!("Profile updated.");
      render::account(&updated, &svc.streets().await?);
    }
  }
  Ok(())
}

pub async fn change_password(ctx: &Ctx) -> Result<()> {
  let svc = ctx.service()?;
  let draft = PasswordDraft {
    current:     prompt::line("Contraseña actual")?,
    new:         prompt::line("Nueva contraseña")?,
    new_confirm: prompt::line("Confirmar contraseña")?,
  };
  svc.change_password(&draft).await?;
  println!("Password changed.");
  Ok(())
}
