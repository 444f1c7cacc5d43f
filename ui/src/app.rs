//! The application shell: a top navigation bar over one page per collection,
//! all sharing a single entity store.

use std::collections::HashMap;

use liaison_business::{Entity, EntityKind, EntityStore};

use crate::api;
use crate::pages::ListPage;

pub struct LiaisonApp {
    base_url: String,
    store: EntityStore,
    current: EntityKind,
    pages: HashMap<EntityKind, ListPage>,
    started: bool,
}

impl LiaisonApp {
    pub fn new(base_url: String) -> Self {
        let pages = EntityKind::ALL
            .into_iter()
            .map(|kind| (kind, ListPage::new(kind)))
            .collect();
        Self {
            base_url,
            store: EntityStore::new(),
            current: EntityKind::Person,
            pages,
            started: false,
        }
    }

    /// Moves finished api responses out of temp memory into the store and
    /// the owning page. Runs once per frame, before anything draws.
    fn drain_responses(&mut self, ctx: &egui::Context) {
        for kind in EntityKind::ALL {
            let list = ctx.memory_mut(|mem| {
                let id = api::list_response_id(kind);
                let value = mem.data.get_temp::<Vec<Entity>>(id);
                if value.is_some() {
                    mem.data.remove::<Vec<Entity>>(id);
                }
                value
            });
            if let Some(entities) = list {
                self.store.replace_all(kind, entities);
                if let Some(page) = self.pages.get_mut(&kind) {
                    page.on_collection_replaced();
                    page.error = None;
                }
            }

            let saved = ctx.memory_mut(|mem| {
                let id = api::saved_response_id(kind);
                let value = mem.data.get_temp::<Entity>(id);
                if value.is_some() {
                    mem.data.remove::<Entity>(id);
                }
                value
            });
            if let Some(entity) = saved {
                self.store.upsert(kind, entity);
            }

            let error = ctx.memory_mut(|mem| {
                let id = api::error_id(kind);
                let value = mem.data.get_temp::<String>(id);
                if value.is_some() {
                    mem.data.remove::<String>(id);
                }
                value
            });
            if let Some(message) = error {
                if let Some(page) = self.pages.get_mut(&kind) {
                    page.error = Some(message);
                }
            }
        }
    }
}

impl eframe::App for LiaisonApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.started {
            self.started = true;
            for kind in EntityKind::ALL {
                api::fetch_collection(&self.base_url, kind, ctx.clone());
            }
        }
        self.drain_responses(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for kind in EntityKind::ALL {
                    if ui
                        .selectable_label(self.current == kind, kind.plural_label())
                        .clicked()
                    {
                        self.current = kind;
                    }
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(page) = self.pages.get_mut(&self.current) {
                page.show(ui, &mut self.store, &self.base_url);
            }
        });
    }
}
