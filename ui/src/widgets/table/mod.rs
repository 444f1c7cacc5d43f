//! Metadata-driven table shared by every collection page.
//!
//! The table owns layout only. Cell content comes from the dispatch table in
//! the domain crate, and every interaction is reported back through
//! [`TableResponse`] so the page decides what a click means.

mod cells;

use egui::{Color32, Frame, Label, Margin, RichText, Sense, Stroke, Ui};
use liaison_business::{Entity, EntityMaps, FieldDef, SortState, dispatch};

use cells::{CellAction, show_cell};

/// Below this available width the table collapses to stacked label/value
/// rows without headers or sorting.
pub const COLLAPSE_BREAKPOINT: f32 = 768.0;

const TABLE_BORDER_COLOR: Color32 = Color32::from_gray(90);
const HEADER_BG_COLOR: Color32 = Color32::from_gray(45);
const STRIPE_BG_COLOR: Color32 = Color32::from_gray(35);

/// Interactions collected while drawing. The page applies them after the
/// whole table has been laid out.
#[derive(Default)]
pub struct TableResponse {
    /// Index into the column defs of a clicked header.
    pub sort_clicked: Option<usize>,
    pub row_clicked: Option<Entity>,
    /// Entity id whose hide checkbox changed, with the new value.
    pub hide_toggled: Option<(String, bool)>,
}

pub fn entity_table(
    ui: &mut Ui,
    grid_id: &str,
    entities: &[Entity],
    defs: &[FieldDef],
    maps: &EntityMaps,
    sort: SortState,
    show_hidden: bool,
) -> TableResponse {
    if ui.available_width() < COLLAPSE_BREAKPOINT {
        stacked_table(ui, entities, defs, maps, show_hidden)
    } else {
        wide_table(ui, grid_id, entities, defs, maps, sort, show_hidden)
    }
}

fn wide_table(
    ui: &mut Ui,
    grid_id: &str,
    entities: &[Entity],
    defs: &[FieldDef],
    maps: &EntityMaps,
    sort: SortState,
    show_hidden: bool,
) -> TableResponse {
    let mut response = TableResponse::default();
    let total_weight: f32 = defs.iter().map(|def| f32::from(def.display_width)).sum();
    let unit = (ui.available_width() - 16.0 * defs.len() as f32) / total_weight.max(1.0);

    Frame::NONE
        .stroke(Stroke::new(1.0, TABLE_BORDER_COLOR))
        .show(ui, |ui| {
            egui::Grid::new(grid_id)
                .num_columns(defs.len())
                .spacing([0.0, 0.0])
                .show(ui, |ui| {
                    for (index, def) in defs.iter().enumerate() {
                        header_cell(ui, unit * f32::from(def.display_width), |ui| {
                            let mut title = def.label.to_owned();
                            if sort.column == Some(index) {
                                title.push_str(if sort.ascending { " ▲" } else { " ▼" });
                            }
                            let label =
                                Label::new(RichText::new(title).strong()).sense(Sense::click());
                            if ui.add(label).clicked() {
                                response.sort_clicked = Some(index);
                            }
                        });
                    }
                    ui.end_row();

                    for (index, entity) in entities.iter().enumerate() {
                        if entity.hidden() && !show_hidden {
                            continue;
                        }
                        // Stripe parity follows the unfiltered position, so
                        // rows keep their shading when hidden neighbors
                        // toggle in and out of view.
                        let striped = index % 2 == 1;
                        for def in defs {
                            let cell = dispatch::render_cell(entity, def, maps.get(def.name));
                            data_cell(ui, striped, unit * f32::from(def.display_width), |ui| {
                                apply_action(show_cell(ui, cell), entity, &mut response);
                            });
                        }
                        ui.end_row();
                    }
                });
        });
    response
}

fn stacked_table(
    ui: &mut Ui,
    entities: &[Entity],
    defs: &[FieldDef],
    maps: &EntityMaps,
    show_hidden: bool,
) -> TableResponse {
    let mut response = TableResponse::default();
    for (index, entity) in entities.iter().enumerate() {
        if entity.hidden() && !show_hidden {
            continue;
        }
        let fill = if index % 2 == 1 {
            STRIPE_BG_COLOR
        } else {
            Color32::TRANSPARENT
        };
        Frame::NONE
            .fill(fill)
            .stroke(Stroke::new(1.0, TABLE_BORDER_COLOR))
            .inner_margin(Margin::symmetric(8, 6))
            .show(ui, |ui| {
                for def in defs {
                    let cell = dispatch::render_cell(entity, def, maps.get(def.name));
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(format!("{}:", def.label)).strong());
                        apply_action(show_cell(ui, cell), entity, &mut response);
                    });
                }
            });
        ui.add_space(4.0);
    }
    response
}

fn apply_action(action: CellAction, entity: &Entity, response: &mut TableResponse) {
    match action {
        CellAction::RowClicked => response.row_clicked = Some(entity.clone()),
        CellAction::HideToggled(value) => {
            if let Some(id) = entity.id() {
                response.hide_toggled = Some((id.to_owned(), value));
            }
        }
        CellAction::None => {}
    }
}

fn header_cell(ui: &mut Ui, width: f32, add_contents: impl FnOnce(&mut Ui)) {
    Frame::NONE
        .fill(HEADER_BG_COLOR)
        .inner_margin(Margin::symmetric(8, 8))
        .show(ui, |ui| {
            ui.set_min_width(width);
            add_contents(ui);
        });
}

fn data_cell(ui: &mut Ui, striped: bool, width: f32, add_contents: impl FnOnce(&mut Ui)) {
    let fill = if striped {
        STRIPE_BG_COLOR
    } else {
        Color32::TRANSPARENT
    };
    Frame::NONE
        .fill(fill)
        .inner_margin(Margin::symmetric(8, 6))
        .show(ui, |ui| {
            ui.set_min_width(width);
            add_contents(ui);
        });
}
