pub mod entity_form;
pub mod table;

pub use entity_form::{EntityForm, FormOutcome};
pub use table::{TableResponse, entity_table};
