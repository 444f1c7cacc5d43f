//! Domain core shared by the desktop client and the HTTP services: the
//! entity model, field metadata, the per-type render/sort dispatch table,
//! the sort engine and the client-side store.

pub mod dispatch;
pub mod display;
pub mod entity;
pub mod fields;
pub mod sort;
pub mod store;

pub use display::{CellDisplay, MAX_DISPLAY_TEXT, MAX_DISPLAY_URL};
pub use entity::{Entity, EntityKind, EntityMap, EntityMaps};
pub use fields::{EntityRef, FieldDef, FieldType};
pub use sort::{SortState, sort_by};
pub use store::EntityStore;
