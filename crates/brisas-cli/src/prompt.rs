//! Line prompts on stdin.

use std::io::{self, BufRead, Write};

use anyhow::Result;

/// Print `label` and read one line, without its trailing newline.
pub fn line(label: &str) -> Result<String> {
  let stdin = io::stdin();
  print!("{label}: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(line.trim_end_matches('\n').trim_end_matches('\r').to_string())
}

/// Ask a yes/no question; anything but `y`/`yes`/`s`/`si` is no.
pub fn confirm(question: &str) -> Result<bool> {
  let answer = line(&format!("{question} [y/N]"))?;
  Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
  matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn yes_answers() {
    for a in ["y", "YES", " s ", "Sí"] {
      assert!(is_yes(a), "{a}");
    }
    for a in ["", "n", "no", "maybe"] {
      assert!(!is_yes(a), "{a}");
    }
  }
}
