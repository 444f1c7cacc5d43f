use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::entity::{Entity, EntityMap};
use crate::fields::FieldDef;

/// Longest link text shown in a cell before it is cut off.
pub const MAX_DISPLAY_URL: usize = 30;
/// Longest plain text shown in a cell before it is cut off.
pub const MAX_DISPLAY_TEXT: usize = 50;

/// What a table cell shows. The widget layer maps these onto concrete UI
/// elements without re-deciding any formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellDisplay {
    Empty,
    Text(String),
    Link { url: String, text: String },
    HideToggle { hidden: bool },
}

/// Cuts off at `max` characters, counting scalar values rather than bytes so
/// multi-byte text never splits mid-character.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_owned()
    } else {
        text.chars().take(max).collect()
    }
}

pub(crate) fn render_text(entity: &Entity, def: &FieldDef, _map: Option<&EntityMap>) -> CellDisplay {
    let text = entity.text(def.name);
    if text.is_empty() {
        CellDisplay::Empty
    } else {
        CellDisplay::Text(truncate(&text, MAX_DISPLAY_TEXT))
    }
}

/// Raw value with no truncation, also the fallback for unlisted field types.
pub(crate) fn render_raw(entity: &Entity, def: &FieldDef, _map: Option<&EntityMap>) -> CellDisplay {
    let text = entity.text(def.name);
    if text.is_empty() {
        CellDisplay::Empty
    } else {
        CellDisplay::Text(text)
    }
}

pub(crate) fn render_url(entity: &Entity, def: &FieldDef, _map: Option<&EntityMap>) -> CellDisplay {
    let value = entity.text(def.name);
    if value.is_empty() {
        return CellDisplay::Empty;
    }
    // The link text cuts the stored value, not the prefixed target.
    let text = truncate(&value, MAX_DISPLAY_URL);
    let url = if value.starts_with("http://") || value.starts_with("https://") {
        value
    } else {
        format!("http://{value}")
    };
    CellDisplay::Link { url, text }
}

pub(crate) fn render_date(entity: &Entity, def: &FieldDef, _map: Option<&EntityMap>) -> CellDisplay {
    format_timestamp(entity, def.name, "%a, %b %-d %Y")
}

pub(crate) fn render_date_time(
    entity: &Entity,
    def: &FieldDef,
    _map: Option<&EntityMap>,
) -> CellDisplay {
    format_timestamp(entity, def.name, "%a, %b %-d %Y, %-I:%M %P")
}

/// Timestamps are stored as RFC 3339 strings, date-only fields as
/// `YYYY-MM-DD`. Anything unparseable is shown as-is rather than dropped.
fn format_timestamp(entity: &Entity, name: &str, format: &str) -> CellDisplay {
    let raw = entity.text(name);
    if raw.is_empty() {
        return CellDisplay::Empty;
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(&raw) {
        return CellDisplay::Text(instant.format(format).to_string());
    }
    if let Ok(day) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return CellDisplay::Text(day.format("%a, %b %-d %Y").to_string());
    }
    CellDisplay::Text(raw)
}

pub(crate) fn render_entity_ref(
    entity: &Entity,
    def: &FieldDef,
    map: Option<&EntityMap>,
) -> CellDisplay {
    let id = entity.text(def.name);
    if id.is_empty() {
        return CellDisplay::Empty;
    }
    // A dangling reference renders blank, it never fails the row.
    match map.and_then(|map| map.display(&id)) {
        Some(text) if !text.is_empty() => CellDisplay::Text(text),
        _ => CellDisplay::Empty,
    }
}

pub(crate) fn render_email(entity: &Entity, def: &FieldDef, _map: Option<&EntityMap>) -> CellDisplay {
    match entity.field(def.name) {
        Some(Value::Array(list)) if !list.is_empty() => {
            let first = address_of(&list[0]);
            if first.is_empty() {
                return CellDisplay::Empty;
            }
            if list.len() > 1 {
                CellDisplay::Text(format!("{first}, ...{} more", list.len() - 1))
            } else {
                CellDisplay::Text(first)
            }
        }
        Some(value @ Value::Object(_)) => {
            let address = address_of(value);
            if address.is_empty() {
                CellDisplay::Empty
            } else {
                CellDisplay::Text(address)
            }
        }
        Some(Value::String(address)) if !address.is_empty() => CellDisplay::Text(address.clone()),
        _ => CellDisplay::Empty,
    }
}

pub(crate) fn render_hide_toggle(
    entity: &Entity,
    def: &FieldDef,
    _map: Option<&EntityMap>,
) -> CellDisplay {
    CellDisplay::HideToggle {
        hidden: entity
            .field(def.name)
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

pub(crate) fn address_of(value: &Value) -> String {
    value
        .get("address")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}
