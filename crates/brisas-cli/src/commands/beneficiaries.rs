use anyhow::Result;
use brisas_core::{
  status::{Status, StatusChange},
  street::StreetId,
  validate::BeneficiaryDraft,
};
use clap::{Args, Subcommand};

use super::{Ctx, Service, confirmed, today};
use crate::render;

#[derive(Subcommand, Debug)]
pub enum BeneficiaryCommand {
  /// List beneficiaries you can see. Active ones unless `--inactive`.
  List {
    #[arg(long)]
    inactive: bool,
    /// Case-insensitive match on cédula, name, phone or house number.
    #[arg(short, long)]
    search:   Option<String>,
    #[arg(long)]
    json:     bool,
  },
  /// A beneficiary and their family burden.
  Show {
    cedula: String,
  },
  Add {
    #[arg(long)]
    cedula:         String,
    #[command(flatten)]
    fields:         BeneficiaryFields,
    /// Offer to register dependents once the beneficiary exists.
    #[arg(long)]
    has_dependents: bool,
  },
  /// Edit every field except the cédula.
  Edit {
    cedula: String,
    #[command(flatten)]
    fields: BeneficiaryFields,
  },
  /// Move a beneficiary to the inactive list.
  Disable {
    cedula: String,
    #[arg(short, long)]
    yes:    bool,
  },
  /// Move a beneficiary back to the active list.
  Reactivate {
    cedula: String,
    #[arg(short, long)]
    yes:    bool,
  },
}

/// Beneficiary form fields; omitted ones keep their current value.
#[derive(Args, Debug, Default)]
pub struct BeneficiaryFields {
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
  /// Masculino or Femenino.
  #[arg(long)]
  pub gender:         Option<String>,
  #[arg(long)]
  pub phone:          Option<String>,
  #[arg(long)]
  pub house:          Option<String>,
  #[arg(long)]
  pub street:         Option<StreetId>,
  /// Soltero, Casado, Divorciado, Viudo or "Unión Libre".
  #[arg(long)]
  pub marital_status: Option<String>,
}

impl BeneficiaryFields {
  fn apply(self, d: &mut BeneficiaryDraft) {
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
    set(&mut d.house_number, self.house);
    set(&mut d.marital_status, self.marital_status);
    if self.street.is_some() {
      d.street_id = self.street;
    }
  }
}

pub async fn run(ctx: &Ctx, cmd: BeneficiaryCommand) -> Result<()> {
  let svc = ctx.service()?;
  match cmd {
    BeneficiaryCommand::List { inactive, search, json } => {
      let rows = if inactive {
        svc.inactive_beneficiaries(search.as_deref()).await?
      } else {
        svc.active_beneficiaries(search.as_deref()).await?
      };
      if json {
        return render::json(&rows);
      }
      let (title, hint) = if inactive {
        ("Beneficiarios inactivos", "Nobody has been disabled.")
      } else {
        ("Beneficiarios activos", "Register one with `brisas beneficiaries add`.")
      };
      let hint = if search.is_some() { "Try a different search." } else { hint };
      render::beneficiaries(title, &rows, &svc.streets().await?, hint)?;
    }
    BeneficiaryCommand::Show { cedula } => show(&svc, &cedula).await?,
    BeneficiaryCommand::Add { cedula, fields, has_dependents } => {
      let mut draft = BeneficiaryDraft { cedula, ..BeneficiaryDraft::default() };
      fields.apply(&mut draft);
      // A street chief can only register on their own street.
      if draft.street_id.is_none() {
        draft.street_id = svc.actor().assigned_street_id;
      }
      let reg = svc.register_beneficiary(&draft, has_dependents, today()).await?;
      println!("Registered {} ({}).", reg.beneficiary.full_name, reg.beneficiary.cedula);
      if let Some(follow_up) = reg.follow_up {
        println!(
          "Now add the dependents: brisas dependents add --beneficiary {} --cedula <cedula> ...",
          follow_up.beneficiary_cedula
        );
      }
    }
    BeneficiaryCommand::Edit { cedula, fields } => {
      let current = svc.beneficiary(&cedula).await?;
      let mut draft = BeneficiaryDraft::from(&current);
      fields.apply(&mut draft);
      let updated = svc.update_beneficiary(&cedula, &draft, today()).await?;
      println!("Updated {}.", updated.cedula);
      show(&svc, &cedula).await?;
    }
    BeneficiaryCommand::Disable { cedula, yes } => {
      change_status(&svc, &cedula, StatusChange::Disable, yes).await?
    }
    BeneficiaryCommand::Reactivate { cedula, yes } => {
      change_status(&svc, &cedula, StatusChange::Reactivate, yes).await?
    }
  }
  Ok(())
}

async fn show(svc: &Service, cedula: &str) -> Result<()> {
  let b = svc.beneficiary(cedula).await?;
  let dependents = svc.dependents_of(cedula).await?;
  render::beneficiary(&b, &dependents, &svc.streets().await?, today());
  Ok(())
}

async fn change_status(svc: &Service, cedula: &str, change: StatusChange, yes: bool) -> Result<()> {
  let current = svc.beneficiary(cedula).await?;
  if current.status == change.target() {
    println!("{} is already {}.", current.full_name, current.status.label().to_lowercase());
    return Ok(());
  }
  let question = format!("{} {} ({})?", capitalise(change.verb()), current.full_name, current.cedula);
  if !confirmed(yes, &question)? {
    return Ok(());
  }
  let outcome = svc.change_status(cedula, change).await?;
  let list = match outcome.beneficiary.status {
    Status::Active => "active",
    Status::Inactive => "inactive",
  };
  println!("{} moved to the {list} list.", outcome.beneficiary.full_name);
  Ok(())
}

fn capitalise(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(c) => c.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
