//! One collection page: toolbar, error banner, the table and the modal form.

use egui::{Color32, ScrollArea, Ui};
use liaison_business::{EntityKind, EntityStore, FieldType, SortState, fields, sort_by};
use serde_json::Value;

use crate::api;
use crate::widgets::{EntityForm, FormOutcome, entity_table};

pub struct ListPage {
    kind: EntityKind,
    sort: SortState,
    show_hidden: bool,
    pub error: Option<String>,
    form: EntityForm,
}

impl ListPage {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            sort: SortState::default(),
            show_hidden: false,
            error: None,
            form: EntityForm::new(kind),
        }
    }

    /// A fetch replaces the collection wholesale, and any previous ordering
    /// goes with it.
    pub fn on_collection_replaced(&mut self) {
        self.sort = SortState::default();
    }

    pub fn show(&mut self, ui: &mut Ui, store: &mut EntityStore, base_url: &str) {
        ui.heading(self.kind.plural_label());
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if self.kind != EntityKind::Email
                && ui.button(format!("New {}", self.kind.label())).clicked()
            {
                self.form.open_new();
            }
            if self.has_hide_column() {
                ui.checkbox(&mut self.show_hidden, "Show hidden");
            }
        });
        if let Some(error) = &self.error {
            ui.colored_label(Color32::RED, format!("Request failed: {error}"));
        }
        ui.add_space(8.0);

        let defs = fields::table_field_defs(self.kind);
        let maps = store.entity_maps(self.kind);
        let response = ScrollArea::vertical()
            .show(ui, |ui| {
                entity_table(
                    ui,
                    self.kind.path(),
                    store.entities(self.kind),
                    defs,
                    &maps,
                    self.sort,
                    self.show_hidden,
                )
            })
            .inner;

        if let Some(column) = response.sort_clicked {
            let (ordered, next) =
                sort_by(store.entities(self.kind), column, defs, &maps, self.sort);
            self.sort = next;
            store.replace_all(self.kind, ordered);
        }
        if let Some((id, hidden)) = response.hide_toggled {
            if let Some(found) = store.get(self.kind, &id) {
                let mut updated = found.clone();
                updated.set("hide", Value::Bool(hidden));
                api::update_entity(base_url, self.kind, &updated, ui.ctx().clone());
                store.upsert(self.kind, updated);
            }
        }
        if let Some(entity) = response.row_clicked {
            self.form.open_edit(&entity);
        }

        match self.form.show(ui, &store.option_sets(self.kind)) {
            FormOutcome::Save(entity) => {
                if entity.id().is_some() {
                    api::update_entity(base_url, self.kind, &entity, ui.ctx().clone());
                    store.upsert(self.kind, entity);
                } else {
                    // The server assigns the id. The saved copy enters the
                    // store once its response is drained.
                    api::create_entity(base_url, self.kind, &entity, ui.ctx().clone());
                }
            }
            FormOutcome::Open | FormOutcome::Closed | FormOutcome::Cancel => {}
        }
    }

    fn has_hide_column(&self) -> bool {
        fields::field_defs(self.kind)
            .iter()
            .any(|def| def.field_type == FieldType::BooleanHidden)
    }
}
