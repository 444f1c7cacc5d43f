use egui::{Label, Sense, Ui};
use liaison_business::CellDisplay;

/// What the user did to one cell this frame.
pub enum CellAction {
    None,
    RowClicked,
    /// The hide checkbox changed to this value.
    HideToggled(bool),
}

/// Draws one prepared cell and reports any interaction. Text cells double as
/// the row's click target; links open in the browser instead of selecting
/// the row.
pub fn show_cell(ui: &mut Ui, cell: CellDisplay) -> CellAction {
    match cell {
        CellDisplay::Empty => clickable_text(ui, String::new()),
        CellDisplay::Text(text) => clickable_text(ui, text),
        CellDisplay::Link { url, text } => {
            ui.hyperlink_to(text, url);
            CellAction::None
        }
        CellDisplay::HideToggle { hidden } => {
            let mut value = hidden;
            if ui.checkbox(&mut value, "").changed() {
                CellAction::HideToggled(value)
            } else {
                CellAction::None
            }
        }
    }
}

fn clickable_text(ui: &mut Ui, text: String) -> CellAction {
    let response = ui.add(Label::new(text).sense(Sense::click()));
    if response.clicked() {
        CellAction::RowClicked
    } else {
        CellAction::None
    }
}
