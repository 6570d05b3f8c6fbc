/// A hero as committed to the local store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hero {
  pub id: String,
  pub name: String,
  pub info: String,
  pub photo: String,
  pub favorite: bool,
}

/// A place a hero has been seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
  pub id: String,
  pub date: String, // opaque, never parsed
  pub latitude: String,
  pub longitude: String,
  /// Owning hero id, `None` when the hero was unknown at insert time
  pub hero_id: Option<String>,
}

/// A hero transformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
  pub id: String,
  pub name: String,
  pub info: String,
  pub photo: String,
  pub hero_id: Option<String>,
}

/// A validated map coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
  pub latitude: f64,
  pub longitude: f64,
}

impl Location {
  /// Parse the stored strings into a coordinate.
  ///
  /// Non-numeric values and values outside [-90, 90] / [-180, 180] mean
  /// "no coordinate". Storage never rejects them.
  pub fn coordinate(&self) -> Option<Coordinate> {
    let latitude: f64 = self.latitude.trim().parse().ok()?;
    let longitude: f64 = self.longitude.trim().parse().ok()?;

    // "NaN" and "inf" parse as floats
    if !latitude.is_finite() || !longitude.is_finite() {
      return None;
    }
    if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
      return None;
    }

    Some(Coordinate {
      latitude,
      longitude,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn location(latitude: &str, longitude: &str) -> Location {
    Location {
      id: "loc".to_string(),
      date: "2024-01-01".to_string(),
      latitude: latitude.to_string(),
      longitude: longitude.to_string(),
      hero_id: None,
    }
  }

  #[test]
  fn test_coordinate_valid() {
    let coordinate = location("35.71", "139.81").coordinate().unwrap();
    assert_eq!(coordinate.latitude, 35.71);
    assert_eq!(coordinate.longitude, 139.81);

    assert!(location("-90", "180").coordinate().is_some());
  }

  #[test]
  fn test_coordinate_out_of_range() {
    assert!(location("90.1", "0").coordinate().is_none());
    assert!(location("0", "-180.5").coordinate().is_none());
  }

  #[test]
  fn test_coordinate_not_numeric() {
    assert!(location("north", "0").coordinate().is_none());
    assert!(location("", "").coordinate().is_none());
    assert!(location("NaN", "0").coordinate().is_none());
    assert!(location("0", "nan").coordinate().is_none());
    assert!(location("inf", "0").coordinate().is_none());
    assert!(location("0", "-infinity").coordinate().is_none());
  }
}
