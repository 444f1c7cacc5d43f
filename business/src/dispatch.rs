use serde_json::Value;

use crate::display::{self, CellDisplay};
use crate::entity::{Entity, EntityMap};
use crate::fields::{FieldDef, FieldType};

pub type RenderFn = fn(&Entity, &FieldDef, Option<&EntityMap>) -> CellDisplay;
pub type SortKeyFn = fn(&Entity, &FieldDef, Option<&EntityMap>) -> String;

/// Behavior of one field type. Supporting a new type means adding one row
/// to [`FIELD_BEHAVIORS`]; nothing else branches on the type.
pub struct FieldBehavior {
    pub field_type: FieldType,
    pub render: RenderFn,
    pub sort_key: SortKeyFn,
}

const fn behavior_row(field_type: FieldType, render: RenderFn, sort_key: SortKeyFn) -> FieldBehavior {
    FieldBehavior {
        field_type,
        render,
        sort_key,
    }
}

pub static FIELD_BEHAVIORS: &[FieldBehavior] = &[
    behavior_row(FieldType::Text, display::render_text, raw_key),
    behavior_row(FieldType::TextArea, display::render_text, raw_key),
    behavior_row(FieldType::Url, display::render_url, raw_key),
    behavior_row(FieldType::Date, display::render_date, raw_key),
    behavior_row(FieldType::DateTime, display::render_date_time, raw_key),
    behavior_row(FieldType::Select, display::render_raw, raw_key),
    behavior_row(FieldType::SelectEntity, display::render_entity_ref, entity_ref_key),
    behavior_row(FieldType::Email, display::render_email, email_key),
    behavior_row(FieldType::BooleanHidden, display::render_hide_toggle, raw_key),
];

pub fn behavior(field_type: FieldType) -> Option<&'static FieldBehavior> {
    FIELD_BEHAVIORS
        .iter()
        .find(|row| row.field_type == field_type)
}

/// Renders one cell; types without a table row fall back to the raw value.
pub fn render_cell(entity: &Entity, def: &FieldDef, map: Option<&EntityMap>) -> CellDisplay {
    match behavior(def.field_type) {
        Some(row) => (row.render)(entity, def, map),
        None => display::render_raw(entity, def, map),
    }
}

/// Extracts the comparison key for one cell, raw value when unlisted.
pub fn sort_key(entity: &Entity, def: &FieldDef, map: Option<&EntityMap>) -> String {
    match behavior(def.field_type) {
        Some(row) => (row.sort_key)(entity, def, map),
        None => raw_key(entity, def, map),
    }
}

fn raw_key(entity: &Entity, def: &FieldDef, _map: Option<&EntityMap>) -> String {
    entity.text(def.name)
}

fn entity_ref_key(entity: &Entity, def: &FieldDef, map: Option<&EntityMap>) -> String {
    let id = entity.text(def.name);
    if id.is_empty() {
        return String::new();
    }
    map.and_then(|map| map.display(&id)).unwrap_or_default()
}

fn email_key(entity: &Entity, def: &FieldDef, _map: Option<&EntityMap>) -> String {
    match entity.field(def.name) {
        Some(Value::Array(list)) => list.first().map(display::address_of).unwrap_or_default(),
        Some(value @ Value::Object(_)) => display::address_of(value),
        Some(Value::String(address)) => address.clone(),
        _ => String::new(),
    }
}
