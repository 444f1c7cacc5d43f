use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A schemaless record: one JSON object, exactly as the server stores it.
/// Fields are looked up by name; absent fields read as empty, never panic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(pub Map<String, Value>);

impl Entity {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Server-assigned identifier, absent on records not yet persisted.
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn hidden(&self) -> bool {
        self.0.get("hide").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.0.insert(name.to_owned(), value);
    }

    /// The raw value of a field as text. Missing and null fields are empty.
    pub fn text(&self, name: &str) -> String {
        self.0.get(name).map(value_text).unwrap_or_default()
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// The six record collections the system manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Person,
    Company,
    Position,
    Appointment,
    Encounter,
    Email,
}

impl EntityKind {
    pub const ALL: [Self; 6] = [
        Self::Person,
        Self::Company,
        Self::Position,
        Self::Appointment,
        Self::Encounter,
        Self::Email,
    ];

    /// URL path segment of the collection, also used as its route key.
    pub fn path(self) -> &'static str {
        match self {
            Self::Person => "persons",
            Self::Company => "companies",
            Self::Position => "positions",
            Self::Appointment => "appointments",
            Self::Encounter => "encounters",
            Self::Email => "emails",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.path() == path)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Company => "Company",
            Self::Position => "Position",
            Self::Appointment => "Appointment",
            Self::Encounter => "Encounter",
            Self::Email => "Email",
        }
    }

    pub fn plural_label(self) -> &'static str {
        match self {
            Self::Person => "Persons",
            Self::Company => "Companies",
            Self::Position => "Positions",
            Self::Appointment => "Appointments",
            Self::Encounter => "Encounters",
            Self::Email => "Emails",
        }
    }
}

/// Resolves foreign ids stored in one column to display text taken from the
/// referenced collection.
#[derive(Debug, Clone, Default)]
pub struct EntityMap {
    pub display_field: &'static str,
    pub entities: HashMap<String, Entity>,
}

impl EntityMap {
    pub fn display(&self, id: &str) -> Option<String> {
        self.entities
            .get(id)
            .map(|entity| entity.text(self.display_field))
    }
}

/// Reference maps for one kind's columns, keyed by field name.
pub type EntityMaps = HashMap<&'static str, EntityMap>;
