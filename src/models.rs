use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl Activity {
    /// Capacity minus roster size. Not clamped: an over-full roster yields a
    /// negative number.
    pub fn spots_left(&self) -> i64 {
        i64::from(self.max_participants) - self.participants.len() as i64
    }
}

/// The `GET /activities` payload: activities keyed by display name, in the
/// order the server sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityCatalog {
    entries: Vec<(String, Activity)>,
}

impl ActivityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an activity. A replaced entry keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, activity: Activity) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = activity,
            None => self.entries.push((name, activity)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, activity)| activity)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Activity> {
        self.entries
            .iter_mut()
            .find(|(existing, _)| existing == name)
            .map(|(_, activity)| activity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Activity)> {
        self.entries
            .iter()
            .map(|(name, activity)| (name.as_str(), activity))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Activity)> for ActivityCatalog {
    fn from_iter<T: IntoIterator<Item = (N, Activity)>>(iter: T) -> Self {
        let mut catalog = ActivityCatalog::new();
        for (name, activity) in iter {
            catalog.insert(name, activity);
        }
        catalog
    }
}

impl Serialize for ActivityCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, activity) in &self.entries {
            map.serialize_entry(name, activity)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ActivityCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = ActivityCatalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of activities keyed by name")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
                let mut catalog = ActivityCatalog::new();
                while let Some((name, activity)) = access.next_entry::<String, Activity>()? {
                    catalog.insert(name, activity);
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// JSON body of a signup or unregister response. Success carries `message`,
/// failure carries `detail`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReplyBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ReplyBody {
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }

    /// The detail text, when the server sent a plain string. Structured
    /// details (validation error lists) are not shown to the user.
    pub fn detail(&self) -> Option<&str> {
        match &self.detail {
            Some(serde_json::Value::String(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

/// Outcome of a mutation request that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    /// `None` when the body was not a JSON object.
    pub body: Option<ReplyBody>,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Avatar initials: the first two characters of the local part, uppercased,
/// or `"U"` when the local part is empty.
pub fn initials(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let initials: String = local.chars().take(2).collect::<String>().to_uppercase();
    if initials.is_empty() {
        "U".to_string()
    } else {
        initials
    }
}
