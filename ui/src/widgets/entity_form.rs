//! Modal create/edit form for one record, driven by the same field metadata
//! as the table. Emails open read-only since they only ever arrive through
//! ingestion.

use std::collections::HashMap;

use egui::{ComboBox, Ui, Window};
use liaison_business::store::OptionSets;
use liaison_business::{Entity, EntityKind, FieldDef, FieldType, fields};
use serde_json::Value;

/// What the form did this frame.
pub enum FormOutcome {
    /// The form is not on screen.
    Closed,
    /// Still editing.
    Open,
    /// Save was clicked; the collected record carries the original id when
    /// editing and none when creating.
    Save(Entity),
    Cancel,
}

pub struct EntityForm {
    kind: EntityKind,
    open: bool,
    is_new: bool,
    original: Entity,
    texts: HashMap<&'static str, String>,
    selections: HashMap<&'static str, String>,
    checks: HashMap<&'static str, bool>,
}

impl EntityForm {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            open: false,
            is_new: true,
            original: Entity::new(),
            texts: HashMap::new(),
            selections: HashMap::new(),
            checks: HashMap::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open_new(&mut self) {
        self.is_new = true;
        self.seed(&Entity::new());
    }

    pub fn open_edit(&mut self, entity: &Entity) {
        self.is_new = false;
        self.seed(entity);
    }

    fn seed(&mut self, entity: &Entity) {
        self.original = entity.clone();
        self.texts.clear();
        self.selections.clear();
        self.checks.clear();
        for def in fields::field_defs(self.kind) {
            match def.field_type {
                FieldType::Select | FieldType::SelectEntity => {
                    self.selections.insert(def.name, entity.text(def.name));
                }
                FieldType::BooleanHidden => {
                    let value = entity
                        .field(def.name)
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    self.checks.insert(def.name, value);
                }
                _ => {
                    self.texts
                        .insert(def.name, field_display_text(entity, def));
                }
            }
        }
        self.open = true;
    }

    pub fn show(&mut self, ui: &mut Ui, option_sets: &OptionSets) -> FormOutcome {
        if !self.open {
            return FormOutcome::Closed;
        }
        let mut outcome = FormOutcome::Open;
        let mut keep_open = true;
        let read_only = self.kind == EntityKind::Email;
        let title = if self.is_new {
            format!("New {}", self.kind.label())
        } else {
            format!("Edit {}", self.kind.label())
        };

        Window::new(title)
            .open(&mut keep_open)
            .collapsible(false)
            .resizable(false)
            .show(ui.ctx(), |ui| {
                egui::Grid::new("entity_form_grid")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        for def in fields::field_defs(self.kind) {
                            ui.label(def.label);
                            if read_only {
                                ui.label(self.texts.get(def.name).cloned().unwrap_or_default());
                            } else {
                                self.field_input(ui, def, option_sets);
                            }
                            ui.end_row();
                        }
                    });
                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if !read_only && ui.button("Save").clicked() {
                        outcome = FormOutcome::Save(self.collect());
                    }
                    let close_label = if read_only { "Close" } else { "Cancel" };
                    if ui.button(close_label).clicked() {
                        outcome = FormOutcome::Cancel;
                    }
                });
            });

        if !keep_open && matches!(outcome, FormOutcome::Open) {
            outcome = FormOutcome::Cancel;
        }
        if !matches!(outcome, FormOutcome::Open) {
            self.open = false;
        }
        outcome
    }

    fn field_input(&mut self, ui: &mut Ui, def: &FieldDef, option_sets: &OptionSets) {
        match def.field_type {
            FieldType::TextArea => {
                ui.text_edit_multiline(self.texts.entry(def.name).or_default());
            }
            FieldType::Select | FieldType::SelectEntity => {
                let selected = self.selections.entry(def.name).or_default();
                let options = option_sets.get(def.name);
                let selected_label = options
                    .and_then(|options| options.iter().find(|(value, _)| value == selected))
                    .map(|(_, label)| label.clone())
                    .unwrap_or_default();
                ComboBox::from_id_salt(def.name)
                    .selected_text(selected_label)
                    .show_ui(ui, |ui| {
                        ui.selectable_value(selected, String::new(), "(none)");
                        if let Some(options) = options {
                            for (value, label) in options {
                                ui.selectable_value(selected, value.clone(), label);
                            }
                        }
                    });
            }
            FieldType::BooleanHidden => {
                ui.checkbox(self.checks.entry(def.name).or_default(), "");
            }
            // Dates are edited as ISO text, like every other single line.
            _ => {
                ui.text_edit_singleline(self.texts.entry(def.name).or_default());
            }
        }
    }

    /// Builds the record to persist: the opened record with every edited
    /// field written back over it.
    fn collect(&self) -> Entity {
        let mut entity = self.original.clone();
        for def in fields::field_defs(self.kind) {
            match def.field_type {
                FieldType::Select | FieldType::SelectEntity => {
                    let value = self.selections.get(def.name).cloned().unwrap_or_default();
                    entity.set(def.name, Value::String(value));
                }
                FieldType::BooleanHidden => {
                    let value = self.checks.get(def.name).copied().unwrap_or(false);
                    entity.set(def.name, Value::Bool(value));
                }
                _ => {
                    let value = self.texts.get(def.name).cloned().unwrap_or_default();
                    entity.set(def.name, Value::String(value));
                }
            }
        }
        entity
    }
}

/// Single line rendition of a stored value. Address lists join to a comma
/// separated string; everything else reads as its raw text.
fn field_display_text(entity: &Entity, def: &FieldDef) -> String {
    match entity.field(def.name) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(address) => Some(address.clone()),
                Value::Object(fields) => fields
                    .get("address")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => entity.text(def.name),
    }
}

#[cfg(test)]
mod entity_form_tests {
    use egui_kittest::Harness;
    use kittest::Queryable;
    use serde_json::json;

    use super::*;

    fn entity(value: serde_json::Value) -> Entity {
        serde_json::from_value(value).unwrap()
    }

    #[derive(Default)]
    struct FormState {
        form: Option<EntityForm>,
        saved: Option<Entity>,
        cancelled: bool,
    }

    fn harness(state: FormState) -> Harness<'static, FormState> {
        Harness::new_ui_state(
            |ui, state: &mut FormState| {
                let Some(form) = state.form.as_mut() else {
                    return;
                };
                match form.show(ui, &OptionSets::new()) {
                    FormOutcome::Save(entity) => state.saved = Some(entity),
                    FormOutcome::Cancel => state.cancelled = true,
                    FormOutcome::Open | FormOutcome::Closed => {}
                }
            },
            state,
        )
    }

    #[test]
    fn new_form_shows_every_field_with_actions() {
        let mut form = EntityForm::new(EntityKind::Person);
        form.open_new();
        let mut state = FormState {
            form: Some(form),
            ..FormState::default()
        };
        let harness = harness(state);

        assert!(
            harness.query_by_label_contains("New Person").is_some(),
            "window title names the kind"
        );
        for label in ["Name", "Email", "Phone", "Company", "LinkedIn", "Hide"] {
            assert!(
                harness.query_by_label_contains(label).is_some(),
                "field '{label}' should be listed"
            );
        }
        assert!(harness.query_by_label("Save").is_some(), "Save exists");
        assert!(harness.query_by_label("Cancel").is_some(), "Cancel exists");
    }

    #[test]
    fn cancel_closes_without_saving() {
        let mut form = EntityForm::new(EntityKind::Company);
        form.open_new();
        let mut state = FormState {
            form: Some(form),
            ..FormState::default()
        };
        let mut harness = harness(state);
        harness.step();

        harness.get_by_label("Cancel").click();
        harness.step();

        let state = harness.state();
        assert!(state.cancelled, "cancel should be reported");
        assert!(state.saved.is_none(), "nothing should be saved");
        assert!(
            !state.form.as_ref().is_some_and(EntityForm::is_open),
            "form should close"
        );
    }

    #[test]
    fn save_returns_the_record_with_its_id() {
        let mut form = EntityForm::new(EntityKind::Company);
        form.open_edit(&entity(json!({
            "id": "c1",
            "name": "Acme",
            "city": "Berlin"
        })));
        let mut state = FormState {
            form: Some(form),
            ..FormState::default()
        };
        let mut harness = harness(state);
        harness.step();

        harness.get_by_label("Save").click();
        harness.step();

        let saved = harness.state().saved.as_ref().expect("saved record");
        assert_eq!(saved.id(), Some("c1"), "editing keeps the id");
        assert_eq!(saved.text("name"), "Acme");
        assert_eq!(saved.text("city"), "Berlin");
    }

    #[test]
    fn email_form_is_read_only() {
        let mut form = EntityForm::new(EntityKind::Email);
        form.open_edit(&entity(json!({
            "id": "m1",
            "from": [{ "name": "Ada", "address": "ada@example.com" }],
            "subject": "Hello"
        })));
        let mut state = FormState {
            form: Some(form),
            ..FormState::default()
        };
        let harness = harness(state);

        assert!(
            harness.query_by_label("Save").is_none(),
            "emails cannot be edited"
        );
        assert!(harness.query_by_label("Close").is_some(), "Close exists");
        assert!(
            harness.query_by_label_contains("ada@example.com").is_some(),
            "address lists flatten to text"
        );
    }
}
