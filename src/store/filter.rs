//! Hero query filters and their SQL translation.

use rusqlite::types::Value;

/// Predicate over the declared hero attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeroFilter {
  /// Exact, case-sensitive id match
  Id(String),
  /// Exact name match
  Name(String),
  /// Substring of the name; only ASCII letters match regardless of case
  NameContains(String),
  Favorite(bool),
  /// Every inner filter must hold
  All(Vec<HeroFilter>),
}

impl HeroFilter {
  pub fn id(id: impl Into<String>) -> Self {
    Self::Id(id.into())
  }

  /// Name to send to the remote search when this filter misses locally.
  pub fn remote_name(&self) -> &str {
    match self {
      Self::Name(name) | Self::NameContains(name) => name,
      Self::All(filters) => filters
        .iter()
        .map(HeroFilter::remote_name)
        .find(|name| !name.is_empty())
        .unwrap_or(""),
      Self::Id(_) | Self::Favorite(_) => "",
    }
  }

  /// Render a WHERE clause body, pushing bound values in placeholder order.
  pub(crate) fn to_sql(&self, params: &mut Vec<Value>) -> String {
    match self {
      Self::Id(id) => {
        params.push(Value::Text(id.clone()));
        "id = ?".to_string()
      }
      Self::Name(name) => {
        params.push(Value::Text(name.clone()));
        "name = ?".to_string()
      }
      Self::NameContains(fragment) => {
        params.push(Value::Text(escape_like(fragment)));
        r"name LIKE '%' || ? || '%' ESCAPE '\'".to_string()
      }
      Self::Favorite(favorite) => {
        params.push(Value::Integer(i64::from(*favorite)));
        "favorite = ?".to_string()
      }
      Self::All(filters) if filters.is_empty() => "1 = 1".to_string(),
      Self::All(filters) => filters
        .iter()
        .map(|f| format!("({})", f.to_sql(params)))
        .collect::<Vec<_>>()
        .join(" AND "),
    }
  }
}

fn escape_like(fragment: &str) -> String {
  let mut escaped = String::with_capacity(fragment.len());
  for c in fragment.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}
