use std::cmp::Ordering;

use crate::dispatch;
use crate::entity::{Entity, EntityMaps};
use crate::fields::FieldDef;

/// Which column the current view is ordered by, and in which direction.
/// A freshly clicked column always starts descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<usize>,
    pub ascending: bool,
}

/// Orders the collection by the clicked column and returns the ordered view
/// together with the new sort state. The caller applies the result itself,
/// usually via [`crate::EntityStore::replace_all`].
pub fn sort_by(
    entities: &[Entity],
    column: usize,
    field_defs: &[FieldDef],
    entity_maps: &EntityMaps,
    prior: SortState,
) -> (Vec<Entity>, SortState) {
    let Some(def) = field_defs.get(column) else {
        return (entities.to_vec(), prior);
    };
    let ascending = match prior.column {
        Some(current) if current == column => !prior.ascending,
        _ => false,
    };
    let map = entity_maps.get(def.name);

    let mut keyed: Vec<(String, Entity)> = entities
        .iter()
        .map(|entity| {
            (
                dispatch::sort_key(entity, def, map).to_lowercase(),
                entity.clone(),
            )
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, ascending));

    let ordered = keyed.into_iter().map(|(_, entity)| entity).collect();
    (
        ordered,
        SortState {
            column: Some(column),
            ascending,
        },
    )
}

/// Records with no value group first in both directions.
fn compare_keys(a: &str, b: &str, ascending: bool) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => {
            if ascending {
                a.cmp(b)
            } else {
                b.cmp(a)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::entity::EntityMap;
    use crate::fields::{FieldType, NORMAL};

    fn entity(value: serde_json::Value) -> Entity {
        serde_json::from_value(value).unwrap()
    }

    fn name_column() -> Vec<FieldDef> {
        vec![FieldDef {
            name: "name",
            label: "Name",
            field_type: FieldType::Text,
            display_width: NORMAL,
        }]
    }

    fn names(entities: &[Entity]) -> Vec<String> {
        entities.iter().map(|e| e.text("name")).collect()
    }

    fn people(values: &[&str]) -> Vec<Entity> {
        values
            .iter()
            .map(|name| entity(json!({ "name": name })))
            .collect()
    }

    #[test]
    fn first_click_sorts_descending_second_flips() {
        let defs = name_column();
        let maps = EntityMaps::new();
        let rows = people(&["Bravo", "Alpha", "Charlie"]);

        let (rows, state) = sort_by(&rows, 0, &defs, &maps, SortState::default());
        assert_eq!(names(&rows), ["Charlie", "Bravo", "Alpha"]);
        assert_eq!(state.column, Some(0));
        assert!(!state.ascending);

        let (rows, state) = sort_by(&rows, 0, &defs, &maps, state);
        assert_eq!(names(&rows), ["Alpha", "Bravo", "Charlie"]);
        assert!(state.ascending);
    }

    #[test]
    fn switching_column_resets_to_descending() {
        let defs = vec![
            FieldDef {
                name: "name",
                label: "Name",
                field_type: FieldType::Text,
                display_width: NORMAL,
            },
            FieldDef {
                name: "city",
                label: "City",
                field_type: FieldType::Text,
                display_width: NORMAL,
            },
        ];
        let maps = EntityMaps::new();
        let rows = vec![
            entity(json!({ "name": "Alpha", "city": "Lisbon" })),
            entity(json!({ "name": "Bravo", "city": "Madrid" })),
        ];

        let ascending_on_name = SortState {
            column: Some(0),
            ascending: true,
        };
        let (rows, state) = sort_by(&rows, 1, &defs, &maps, ascending_on_name);
        assert_eq!(state.column, Some(1));
        assert!(!state.ascending);
        assert_eq!(names(&rows), ["Bravo", "Alpha"]);
    }

    #[test]
    fn empty_values_come_first_in_both_directions() {
        let defs = name_column();
        let maps = EntityMaps::new();
        let rows = vec![
            entity(json!({ "name": "Bravo" })),
            entity(json!({})),
            entity(json!({ "name": "Alpha" })),
        ];

        let (descending, state) = sort_by(&rows, 0, &defs, &maps, SortState::default());
        assert_eq!(names(&descending), ["", "Bravo", "Alpha"]);

        let (ascending, _) = sort_by(&descending, 0, &defs, &maps, state);
        assert_eq!(names(&ascending), ["", "Alpha", "Bravo"]);
    }

    #[test]
    fn comparison_ignores_case() {
        let defs = name_column();
        let maps = EntityMaps::new();
        let rows = people(&["alpha", "Bravo", "CHARLIE"]);

        let (rows, _) = sort_by(&rows, 0, &defs, &maps, SortState::default());
        assert_eq!(names(&rows), ["CHARLIE", "Bravo", "alpha"]);
    }

    #[test]
    fn entity_reference_columns_sort_by_display_text() {
        let defs = vec![FieldDef {
            name: "company",
            label: "Company",
            field_type: FieldType::SelectEntity,
            display_width: NORMAL,
        }];
        let mut entities = HashMap::new();
        entities.insert("c1".to_owned(), entity(json!({ "id": "c1", "name": "Zenith" })));
        entities.insert("c2".to_owned(), entity(json!({ "id": "c2", "name": "Acme" })));
        let mut maps = EntityMaps::new();
        maps.insert(
            "company",
            EntityMap {
                display_field: "name",
                entities,
            },
        );

        let rows = vec![
            entity(json!({ "id": "p1", "company": "c2" })),
            entity(json!({ "id": "p2", "company": "c1" })),
        ];
        let (rows, _) = sort_by(&rows, 0, &defs, &maps, SortState::default());
        let ids: Vec<_> = rows.iter().map(|e| e.text("id")).collect();
        // Zenith before Acme when descending.
        assert_eq!(ids, ["p2", "p1"]);
    }

    #[test]
    fn out_of_range_column_leaves_order_unchanged() {
        let defs = name_column();
        let maps = EntityMaps::new();
        let rows = people(&["Bravo", "Alpha"]);

        let (rows, state) = sort_by(&rows, 5, &defs, &maps, SortState::default());
        assert_eq!(names(&rows), ["Bravo", "Alpha"]);
        assert_eq!(state, SortState::default());
    }
}
