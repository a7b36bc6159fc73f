use anyhow::Result;
use brisas_core::{account::AccountId, street::StreetId, validate::AccountDraft};
use clap::{Args, Subcommand};

use super::{Ctx, confirmed};
use crate::{prompt, render};

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
  List {
    #[arg(long)]
    json: bool,
  },
  Show {
    id: AccountId,
  },
  /// Create a street-chief account. The password is prompted for.
  Add {
    #[command(flatten)]
    fields: AccountFields,
    #[arg(long)]
    cedula: String,
  },
  Edit {
    id:     AccountId,
    #[command(flatten)]
    fields: AccountFields,
  },
  Delete {
    id:  AccountId,
    #[arg(short, long)]
    yes: bool,
  },
}

/// Account form fields; anything omitted keeps its current value.
#[derive(Args, Debug, Default)]
pub struct AccountFields {
  #[arg(long)]
  pub name:     Option<String>,
  #[arg(long)]
  pub username: Option<String>,
  #[arg(long)]
  pub email:    Option<String>,
  /// Assigned street id. Only a community leader can change it.
  #[arg(long)]
  pub street:   Option<StreetId>,
}

impl AccountFields {
  pub fn apply(self, draft: &mut AccountDraft) {
    if let Some(v) = self.name {
      draft.full_name = v;
    }
    if let Some(v) = self.username {
      draft.username = v;
    }
    if let Some(v) = self.email {
      draft.email = v;
    }
    if self.street.is_some() {
      draft.assigned_street_id = self.street;
    }
  }
}

pub async fn run(ctx: &Ctx, cmd: AccountCommand) -> Result<()> {
  let svc = ctx.service()?;
  match cmd {
    AccountCommand::List { json } => {
      let accounts = svc.accounts().await?;
      if json {
        render::json(&accounts)?;
      } else {
        render::accounts(&accounts)?;
      }
    }
    AccountCommand::Show { id } => {
      let account = svc.account_by_id(id).await?;
      render::account(&account, &svc.streets().await?);
    }
    AccountCommand::Add { fields, cedula } => {
      let mut draft = AccountDraft { national_id: cedula, ..AccountDraft::default() };
      fields.apply(&mut draft);
      draft.password = prompt::line("Contraseña")?;
      draft.password_confirm = prompt::line("Confirmar contraseña")?;
      let created = svc.register_account(&draft).await?;
      println!("Account created.");
      render::account(&created, &svc.streets().await?);
    }
    AccountCommand::Edit { id, fields } => {
      let current = svc.account_by_id(id).await?;
      let mut draft = AccountDraft::from(&current);
      fields.apply(&mut draft);
      let updated = svc.update_account(id, &draft).await?;
      println!("Account updated.");
      render::account(&updated, &svc.streets().await?);
    }
    AccountCommand::Delete { id, yes } => {
      let target = svc.account_by_id(id).await?;
      if confirmed(yes, &format!("Delete account {} ({})?", target.username, target.full_name))? {
        svc.delete_account(id).await?;
        println!("Account deleted.");
      }
    }
  }
  Ok(())
}
