use anyhow::Result;
use brisas_core::validate::DependentDraft;
use clap::{Args, Subcommand};

use super::{Ctx, confirmed, today};
use crate::render;

#[derive(Subcommand, Debug)]
pub enum DependentCommand {
  /// Family burden of one beneficiary.
  List {
    beneficiary: String,
    #[arg(long)]
    json:        bool,
  },
  Show {
    cedula: String,
  },
  Add {
    /// Cédula of the beneficiary this dependent belongs to.
    #[arg(long)]
    beneficiary: String,
    #[arg(long)]
    cedula:      String,
    #[command(flatten)]
    fields:      DependentFields,
  },
  /// Edit every field except the cédula and the household.
  Edit {
    cedula: String,
    #[command(flatten)]
    fields: DependentFields,
  },
  Delete {
    cedula: String,
    #[arg(short, long)]
    yes:    bool,
  },
}

#[derive(Args, Debug, Default)]
pub struct DependentFields {
  #[arg(long)]
  pub name:           Option<String>,
  #[arg(long)]
  pub profession:     Option<String>,
  /// YYYY-MM-DD
  #[arg(long)]
  pub birth_date:     Option<String>,
  #[arg(long)]
  pub education:      Option<String>,
  #[arg(long)]
  pub illness:        Option<String>,
  #[arg(long)]
  pub disability:     Option<String>,
  #[arg(long)]
  pub gender:         Option<String>,
  #[arg(long)]
  pub phone:          Option<String>,
  #[arg(long)]
  pub marital_status: Option<String>,
  /// Hijo, Hija, Esposo, Esposa, Padre, Madre, Hermano, Hermana or Otro.
  #[arg(long)]
  pub relationship:   Option<String>,
}

impl DependentFields {
  fn apply(self, d: &mut DependentDraft) {
    let set = |slot: &mut String, v: Option<String>| {
      if let Some(v) = v {
        *slot = v;
      }
    };
    set(&mut d.full_name, self.name);
    set(&mut d.profession, self.profession);
    set(&mut d.birth_date, self.birth_date);
    set(&mut d.education_level, self.education);
    set(&mut d.chronic_illness, self.illness);
    set(&mut d.disability, self.disability);
    set(&mut d.gender, self.gender);
    set(&mut d.phone, self.phone);
    set(&mut d.marital_status, self.marital_status);
    set(&mut d.relationship, self.relationship);
  }
}

pub async fn run(ctx: &Ctx, cmd: DependentCommand) -> Result<()> {
  let svc = ctx.service()?;
  match cmd {
    DependentCommand::List { beneficiary, json } => {
      let rows = svc.dependents_of(&beneficiary).await?;
      if json {
        render::json(&rows)?;
      } else {
        render::dependents(&beneficiary, &rows, today())?;
      }
    }
    DependentCommand::Show { cedula } => {
      let detail = svc.dependent(&cedula).await?;
      render::dependent(&detail.dependent, &detail.parent, today());
    }
    DependentCommand::Add { beneficiary, cedula, fields } => {
      let mut draft = DependentDraft { cedula, ..DependentDraft::for_beneficiary(beneficiary) };
      fields.apply(&mut draft);
      let created = svc.create_dependent(&draft, today()).await?;
      println!(
        "Registered {} as {} of {}.",
        created.dependent.full_name, created.dependent.relationship, created.parent.full_name
      );
    }
    DependentCommand::Edit { cedula, fields } => {
      let current = svc.dependent(&cedula).await?;
      let mut draft = DependentDraft::from(&current.dependent);
      fields.apply(&mut draft);
      let updated = svc.update_dependent(&cedula, &draft, today()).await?;
      render::dependent(&updated.dependent, &updated.parent, today());
    }
    DependentCommand::Delete { cedula, yes } => {
      let current = svc.dependent(&cedula).await?;
      let question = format!(
        "Delete dependent {} ({}) from {}'s household? This cannot be undone.",
        current.dependent.full_name, current.dependent.cedula, current.parent.full_name
      );
      if confirmed(yes, &question)? {
        svc.delete_dependent(&cedula).await?;
        let remaining = svc.dependents_of(&current.parent.cedula).await?;
        println!("Deleted. {} dependents remain.", remaining.len());
      }
    }
  }
  Ok(())
}
