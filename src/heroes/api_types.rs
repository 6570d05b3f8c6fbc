//! Serde types matching the hero API payloads.
//!
//! Every field is optional: the API omits fields freely and the store decides
//! what an absent value means (see the merge rules in `store`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeroRecord {
  pub id: Option<String>,
  pub name: Option<String>,
  #[serde(rename = "description")]
  pub info: Option<String>,
  pub photo: Option<String>,
  pub favorite: Option<bool>,
}

/// Reference to the owning hero embedded in child records.
///
/// The API nests a full hero object; only its id is relevant here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentRef {
  pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
  pub id: Option<String>,
  #[serde(rename = "dateShow")]
  pub date: Option<String>,
  #[serde(rename = "latitud")]
  pub latitude: Option<String>,
  #[serde(rename = "longitud")]
  pub longitude: Option<String>,
  pub hero: Option<ParentRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformationRecord {
  pub id: Option<String>,
  pub name: Option<String>,
  #[serde(rename = "description")]
  pub info: Option<String>,
  pub photo: Option<String>,
  pub hero: Option<ParentRef>,
}

impl LocationRecord {
  pub fn parent_id(&self) -> Option<&str> {
    self.hero.as_ref().and_then(|h| h.id.as_deref())
  }
}

impl TransformationRecord {
  pub fn parent_id(&self) -> Option<&str> {
    self.hero.as_ref().and_then(|h| h.id.as_deref())
  }
}
