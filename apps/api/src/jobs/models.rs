use serde::Serialize;
use serde_json::{Map, Value};

/// An upstream record with every field optional.
/// Built field-by-field from raw JSON so one badly-typed field never drops the whole feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawListing {
    pub id: String,
    pub position: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub url: Option<String>,
    pub apply_url: Option<String>,
    pub tags: Vec<String>,
}

impl RawListing {
    /// Returns `None` for non-objects and for objects without a usable `id`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = match obj.get("id")? {
            Value::Null => return None,
            Value::String(s) => s.clone(),
            other => other.to_string(), // numbers keep their JSON text: 1 -> "1"
        };

        Some(RawListing {
            id,
            position: str_field(obj, "position"),
            title: str_field(obj, "title"),
            description: str_field(obj, "description"),
            company: str_field(obj, "company"),
            url: str_field(obj, "url"),
            apply_url: str_field(obj, "apply_url"),
            tags: obj
                .get("tags")
                .and_then(Value::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// `position`, else `title`, trimmed. Empty strings fall through like missing ones.
    pub fn display_title(&self) -> String {
        non_empty(&self.position)
            .or_else(|| non_empty(&self.title))
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    pub fn company_name(&self) -> String {
        self.company.as_deref().unwrap_or_default().trim().to_string()
    }

    /// Apply link first, generic listing URL second.
    pub fn link(&self) -> Option<String> {
        non_empty(&self.apply_url)
            .or_else(|| non_empty(&self.url))
            .map(str::to_string)
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Canonical job returned by `GET /jobs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: Option<String>,
    pub location: &'static str,
    pub is_remote: bool,
    pub url: Option<String>,
    pub source: &'static str,
    pub score: u32,
    pub description: String,
    pub saved: bool,
    pub applied: bool,
}
