//! Parent lookup for child records.

use crate::heroes::types::Hero;

/// Reference from a child row to its owning hero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroRef {
  pub id: String,
}

/// Anything that can list the persisted heroes with a given id.
pub trait OwnerLookup {
  fn heroes_with_id(&self, id: &str) -> Vec<Hero>;
}

/// Resolves the `hero.id` carried by a child record into an owner reference.
///
/// Pure lookup: exact string equality, no retries, and an unknown parent is a
/// normal `None` rather than an error.
pub struct RelationshipResolver<'a, L: OwnerLookup + ?Sized> {
  lookup: &'a L,
}

impl<'a, L: OwnerLookup + ?Sized> RelationshipResolver<'a, L> {
  pub fn new(lookup: &'a L) -> Self {
    Self { lookup }
  }

  pub fn resolve(&self, parent_id: Option<&str>) -> Option<HeroRef> {
    let id = parent_id?;
    self
      .lookup
      .heroes_with_id(id)
      .into_iter()
      .next()
      .map(|hero| HeroRef { id: hero.id })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Heroes(Vec<Hero>);

  impl OwnerLookup for Heroes {
    fn heroes_with_id(&self, id: &str) -> Vec<Hero> {
      self.0.iter().filter(|h| h.id == id).cloned().collect()
    }
  }

  fn hero(id: &str) -> Hero {
    Hero {
      id: id.to_string(),
      name: "Goku".to_string(),
      info: String::new(),
      photo: String::new(),
      favorite: false,
    }
  }

  #[test]
  fn test_resolve_known_parent() {
    let heroes = Heroes(vec![hero("H1"), hero("H2")]);
    let resolver = RelationshipResolver::new(&heroes);

    assert_eq!(
      resolver.resolve(Some("H2")),
      Some(HeroRef {
        id: "H2".to_string()
      })
    );
  }

  #[test]
  fn test_resolve_unknown_or_missing_parent() {
    let heroes = Heroes(vec![hero("H1")]);
    let resolver = RelationshipResolver::new(&heroes);

    assert_eq!(resolver.resolve(Some("H9")), None);
    assert_eq!(resolver.resolve(Some("h1")), None);
    assert_eq!(resolver.resolve(None), None);
  }
}
