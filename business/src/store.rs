use std::collections::HashMap;

use crate::entity::{Entity, EntityKind, EntityMap, EntityMaps};
use crate::fields::{FieldType, entity_refs, field_defs, select_options};

/// Form choice lists keyed by field name; each option pairs the stored value
/// with its display label.
pub type OptionSets = HashMap<&'static str, Vec<(String, String)>>;

/// The client's canonical copy of every collection. Pages hold one shared
/// store and mutate it only through these methods, so every write is visible
/// at its call site.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    collections: HashMap<EntityKind, Vec<Entity>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self, kind: EntityKind) -> &[Entity] {
        self.collections
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Swaps in a whole collection, after a fetch or a sort.
    pub fn replace_all(&mut self, kind: EntityKind, entities: Vec<Entity>) {
        log::debug!("replacing {} with {} records", kind.path(), entities.len());
        self.collections.insert(kind, entities);
    }

    /// Replaces the record with the same id in place, or appends a new one.
    pub fn upsert(&mut self, kind: EntityKind, entity: Entity) {
        let collection = self.collections.entry(kind).or_default();
        let existing = entity
            .id()
            .and_then(|id| collection.iter().position(|row| row.id() == Some(id)));
        match existing {
            Some(index) => collection[index] = entity,
            None => collection.push(entity),
        }
    }

    pub fn remove(&mut self, kind: EntityKind, id: &str) {
        if let Some(collection) = self.collections.get_mut(&kind) {
            collection.retain(|row| row.id() != Some(id));
        }
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Entity> {
        self.entities(kind).iter().find(|row| row.id() == Some(id))
    }

    /// Builds the reference-resolution maps for one kind's entity columns
    /// from whatever referenced collections are currently loaded.
    pub fn entity_maps(&self, kind: EntityKind) -> EntityMaps {
        entity_refs(kind)
            .iter()
            .map(|reference| {
                let entities = self
                    .entities(reference.target)
                    .iter()
                    .filter_map(|row| row.id().map(|id| (id.to_owned(), row.clone())))
                    .collect();
                (
                    reference.field,
                    EntityMap {
                        display_field: reference.display_field,
                        entities,
                    },
                )
            })
            .collect()
    }

    /// Choice lists for the form's select inputs. Entity references list the
    /// loaded target collection ordered by display text.
    pub fn option_sets(&self, kind: EntityKind) -> OptionSets {
        let mut sets = OptionSets::new();
        for def in field_defs(kind) {
            match def.field_type {
                FieldType::Select => {
                    let options = select_options(kind, def.name)
                        .iter()
                        .map(|option| ((*option).to_owned(), (*option).to_owned()))
                        .collect();
                    sets.insert(def.name, options);
                }
                FieldType::SelectEntity => {
                    let Some(reference) = entity_refs(kind)
                        .iter()
                        .find(|reference| reference.field == def.name)
                    else {
                        continue;
                    };
                    let mut options: Vec<(String, String)> = self
                        .entities(reference.target)
                        .iter()
                        .filter_map(|row| {
                            row.id()
                                .map(|id| (id.to_owned(), row.text(reference.display_field)))
                        })
                        .collect();
                    options.sort_by(|a, b| a.1.cmp(&b.1));
                    sets.insert(def.name, options);
                }
                _ => {}
            }
        }
        sets
    }
}
