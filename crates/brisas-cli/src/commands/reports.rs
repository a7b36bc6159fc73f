use std::{
  fs::File,
  io::{self, BufWriter, Write},
  path::PathBuf,
};

use anyhow::{Context, Result};
use brisas_core::{age::AgeRange, report::ReportTarget, street::StreetId};
use brisas_export::{Exportable, Format, file_name};
use clap::{Args, Subcommand};

use super::{Ctx, Service, today};

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
  /// Family burden (carga familiar): every active household, or one
  /// beneficiary with `--cedula`.
  Family {
    #[arg(long, conflicts_with = "cedula")]
    street: Option<StreetId>,
    #[arg(long)]
    cedula: Option<String>,
    #[command(flatten)]
    output: OutputArgs,
  },
  /// Households per street (habitantes por calle).
  Street {
    #[arg(long)]
    street: Option<StreetId>,
    #[command(flatten)]
    output: OutputArgs,
  },
  /// Everyone whose age is within `--min..=--max` (rango de edad).
  Age {
    #[arg(long)]
    min:    u32,
    #[arg(long)]
    max:    u32,
    #[arg(long)]
    street: Option<StreetId>,
    #[command(flatten)]
    output: OutputArgs,
  },
  /// Sale roster (reporte de venta): one line per active household.
  Sale {
    #[arg(long)]
    street: Option<StreetId>,
    #[command(flatten)]
    output: OutputArgs,
  },
}

#[derive(Args, Debug)]
pub struct OutputArgs {
  /// text, csv, json, xlsx or pdf.
  #[arg(short, long, default_value = "text")]
  pub format: Format,
  /// File to write, or a directory to write a named file into. Defaults to
  /// stdout, or the current directory for xlsx and pdf.
  #[arg(short, long)]
  pub out:    Option<PathBuf>,
}

fn target(street: Option<StreetId>) -> ReportTarget {
  street.map_or(ReportTarget::Community, ReportTarget::Street)
}

pub async fn run(ctx: &Ctx, cmd: ReportCommand) -> Result<()> {
  let svc = ctx.service()?;
  match cmd {
    ReportCommand::Family { street, cedula, output } => {
      let report = match cedula {
        Some(cedula) => svc.family_burden_of(&cedula).await?,
        None => svc.family_burden_report(target(street)).await?,
      };
      emit(&svc, &report, &output).await
    }
    ReportCommand::Street { street, output } => {
      let report = svc.street_habitants_report(street).await?;
      emit(&svc, &report, &output).await
    }
    ReportCommand::Age { min, max, street, output } => {
      let range = AgeRange::new(min, max).map_err(brisas_core::Error::from)?;
      let report = svc.age_range_report(range, today(), target(street)).await?;
      emit(&svc, &report, &output).await
    }
    ReportCommand::Sale { street, output } => {
      let report = svc.sale_report(target(street)).await?;
      emit(&svc, &report, &output).await
    }
  }
}

async fn emit<R: Exportable>(svc: &Service, report: &R, output: &OutputArgs) -> Result<()> {
  let streets = svc.streets().await?;
  let out = match &output.out {
    Some(out) => out.clone(),
    None if output.format.is_binary() => PathBuf::from("."),
    None => {
      let mut stdout = io::stdout().lock();
      brisas_export::write(report, output.format, &streets, today(), &mut stdout)?;
      stdout.flush()?;
      return Ok(());
    }
  };

  let path = if out.is_dir() {
    out.join(file_name(report.kind(), report.subject(), output.format))
  } else {
    out
  };
  let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
  let mut writer = BufWriter::new(file);
  brisas_export::write(report, output.format, &streets, today(), &mut writer)?;
  writer.flush()?;
  eprintln!("Wrote {}", path.display());
  Ok(())
}
