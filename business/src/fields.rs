use crate::entity::EntityKind;

/// Rendering and sorting class of one field. The dispatch table in
/// [`crate::dispatch`] maps each variant to its behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    TextArea,
    Url,
    Date,
    DateTime,
    Select,
    SelectEntity,
    Email,
    BooleanHidden,
}

/// Column and form-input metadata for one entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    /// Relative column weight in the wide table layout.
    pub display_width: u8,
}

pub const NARROW: u8 = 1;
pub const NORMAL: u8 = 2;
pub const WIDE: u8 = 3;

const fn def(
    name: &'static str,
    label: &'static str,
    field_type: FieldType,
    display_width: u8,
) -> FieldDef {
    FieldDef {
        name,
        label,
        field_type,
        display_width,
    }
}

pub const PERSON_FIELDS: &[FieldDef] = &[
    def("name", "Name", FieldType::Text, NORMAL),
    def("email", "Email", FieldType::Text, NORMAL),
    def("phone", "Phone", FieldType::Text, NARROW),
    def("company", "Company", FieldType::SelectEntity, NORMAL),
    def("linkedIn", "LinkedIn", FieldType::Url, NORMAL),
    def("hide", "Hide", FieldType::BooleanHidden, NARROW),
];

pub const COMPANY_FIELDS: &[FieldDef] = &[
    def("name", "Name", FieldType::Text, NORMAL),
    def("url", "URL", FieldType::Url, NORMAL),
    def("address", "Address", FieldType::Text, NORMAL),
    def("city", "City", FieldType::Text, NARROW),
    def("phone", "Phone", FieldType::Text, NARROW),
];

pub const POSITION_FIELDS: &[FieldDef] = &[
    def("title", "Title", FieldType::Text, NORMAL),
    def("company", "Company", FieldType::SelectEntity, NORMAL),
    def("url", "URL", FieldType::Url, NORMAL),
    def("postedDate", "Posted", FieldType::Date, NARROW),
    def("hide", "Hide", FieldType::BooleanHidden, NARROW),
];

pub const APPOINTMENT_FIELDS: &[FieldDef] = &[
    def("when", "When", FieldType::DateTime, NORMAL),
    def("person", "Person", FieldType::SelectEntity, NORMAL),
    def("position", "Position", FieldType::SelectEntity, NORMAL),
    def("notes", "Notes", FieldType::TextArea, WIDE),
];

pub const ENCOUNTER_FIELDS: &[FieldDef] = &[
    def("when", "When", FieldType::DateTime, NORMAL),
    def("type", "Type", FieldType::Select, NARROW),
    def("person", "Person", FieldType::SelectEntity, NORMAL),
    def("position", "Position", FieldType::SelectEntity, NORMAL),
    def("details", "Details", FieldType::TextArea, WIDE),
    def("hide", "Hide", FieldType::BooleanHidden, NARROW),
];

pub const EMAIL_FIELDS: &[FieldDef] = &[
    def("from", "From", FieldType::Email, NORMAL),
    def("to", "To", FieldType::Email, NORMAL),
    def("cc", "Cc", FieldType::Email, NORMAL),
    def("bcc", "Bcc", FieldType::Email, NORMAL),
    def("date", "Date", FieldType::DateTime, NORMAL),
    def("subject", "Subject", FieldType::Text, WIDE),
    def("text", "Text", FieldType::TextArea, WIDE),
];

/// Email columns shown in the table; the long fields stay form-only.
const EMAIL_TABLE_FIELDS: &[FieldDef] = &[
    def("from", "From", FieldType::Email, NORMAL),
    def("to", "To", FieldType::Email, NORMAL),
    def("date", "Date", FieldType::DateTime, NORMAL),
    def("subject", "Subject", FieldType::Text, WIDE),
];

/// Every field of the kind, in form order.
pub fn field_defs(kind: EntityKind) -> &'static [FieldDef] {
    match kind {
        EntityKind::Person => PERSON_FIELDS,
        EntityKind::Company => COMPANY_FIELDS,
        EntityKind::Position => POSITION_FIELDS,
        EntityKind::Appointment => APPOINTMENT_FIELDS,
        EntityKind::Encounter => ENCOUNTER_FIELDS,
        EntityKind::Email => EMAIL_FIELDS,
    }
}

/// The subset of fields rendered as table columns.
pub fn table_field_defs(kind: EntityKind) -> &'static [FieldDef] {
    match kind {
        EntityKind::Email => EMAIL_TABLE_FIELDS,
        other => field_defs(other),
    }
}

/// Which collection a `SelectEntity` field points at, and which field of the
/// referenced record labels it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRef {
    pub field: &'static str,
    pub target: EntityKind,
    pub display_field: &'static str,
}

const fn entity_ref(
    field: &'static str,
    target: EntityKind,
    display_field: &'static str,
) -> EntityRef {
    EntityRef {
        field,
        target,
        display_field,
    }
}

pub fn entity_refs(kind: EntityKind) -> &'static [EntityRef] {
    const COMPANY_REFS: &[EntityRef] = &[entity_ref("company", EntityKind::Company, "name")];
    const PERSON_POSITION_REFS: &[EntityRef] = &[
        entity_ref("person", EntityKind::Person, "name"),
        entity_ref("position", EntityKind::Position, "title"),
    ];
    match kind {
        EntityKind::Person => COMPANY_REFS,
        EntityKind::Position => COMPANY_REFS,
        EntityKind::Appointment | EntityKind::Encounter => PERSON_POSITION_REFS,
        EntityKind::Company | EntityKind::Email => &[],
    }
}

/// Fixed choice lists for `Select` fields.
pub fn select_options(kind: EntityKind, field: &str) -> &'static [&'static str] {
    match (kind, field) {
        (EntityKind::Encounter, "type") => &["phone", "email", "linkedIn"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_table_omits_long_fields() {
        let columns: Vec<&str> = table_field_defs(EntityKind::Email)
            .iter()
            .map(|def| def.name)
            .collect();
        assert_eq!(columns, ["from", "to", "date", "subject"]);
    }

    #[test]
    fn table_columns_match_form_fields_elsewhere() {
        for kind in [EntityKind::Person, EntityKind::Company, EntityKind::Encounter] {
            assert_eq!(table_field_defs(kind), field_defs(kind));
        }
    }

    #[test]
    fn every_select_entity_field_has_a_reference() {
        for kind in EntityKind::ALL {
            for field in field_defs(kind) {
                if field.field_type == FieldType::SelectEntity {
                    assert!(
                        entity_refs(kind).iter().any(|r| r.field == field.name),
                        "no reference registered for {}.{}",
                        kind.path(),
                        field.name
                    );
                }
            }
        }
    }

    #[test]
    fn encounter_types_are_fixed() {
        assert_eq!(
            select_options(EntityKind::Encounter, "type"),
            ["phone", "email", "linkedIn"]
        );
        assert!(select_options(EntityKind::Person, "name").is_empty());
    }
}
