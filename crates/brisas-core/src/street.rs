//! Street (calle) reference data.

use serde::{Deserialize, Serialize};

pub type StreetId = i64;

/// An administrative subdivision of the community and the unit of access
/// restriction for street chiefs. Read-only from the client's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Street {
  #[serde(rename = "id_calle", alias = "id")]
  pub id:   StreetId,
  #[serde(rename = "nombre")]
  pub name: String,
}

/// Look up a street by id in a fetched street list.
pub fn find(streets: &[Street], id: StreetId) -> Option<&Street> {
  streets.iter().find(|s| s.id == id)
}
