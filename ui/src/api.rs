//! Backend calls over `ehttp`.
//!
//! Responses never touch app state from the fetch callback. Each callback
//! parks its payload in egui temp memory under a per-collection id and asks
//! for a repaint; the app drains those slots once per frame.

use egui::Id;
use liaison_business::{Entity, EntityKind};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

pub fn list_response_id(kind: EntityKind) -> Id {
    Id::new(("entity_list_response", kind.path()))
}

pub fn saved_response_id(kind: EntityKind) -> Id {
    Id::new(("entity_saved_response", kind.path()))
}

pub fn error_id(kind: EntityKind) -> Id {
    Id::new(("entity_api_error", kind.path()))
}

/// Loads one whole collection into the list-response slot.
pub fn fetch_collection(base_url: &str, kind: EntityKind, ctx: egui::Context) {
    let request = ehttp::Request::get(format!("{base_url}/{}", kind.path()));
    ehttp::fetch(request, move |result| {
        ctx.request_repaint();
        match result {
            Ok(response) if response.status == 200 => {
                match serde_json::from_slice::<Vec<Entity>>(&response.bytes) {
                    Ok(entities) => ctx.memory_mut(|mem| {
                        mem.data.insert_temp(list_response_id(kind), entities);
                    }),
                    Err(error) => {
                        record_error(&ctx, kind, format!("unreadable response: {error}"));
                    }
                }
            }
            Ok(response) => {
                record_error(&ctx, kind, format!("server returned {}", response.status));
            }
            Err(error) => record_error(&ctx, kind, error),
        }
    });
}

/// Persists a new record. The server assigns the id, so the saved copy comes
/// back through the saved-response slot before it enters the store.
pub fn create_entity(base_url: &str, kind: EntityKind, entity: &Entity, ctx: egui::Context) {
    let url = format!("{base_url}/{}", kind.path());
    send_entity(json_request("POST", url, entity), kind, ctx);
}

/// Persists changes to an existing record in place.
pub fn update_entity(base_url: &str, kind: EntityKind, entity: &Entity, ctx: egui::Context) {
    let Some(id) = entity.id() else {
        record_error(&ctx, kind, "cannot update a record without an id".to_owned());
        return;
    };
    let url = format!("{base_url}/{}/{id}", kind.path());
    send_entity(json_request("PUT", url, entity), kind, ctx);
}

fn json_request(method: &str, url: String, entity: &Entity) -> ehttp::Request {
    ehttp::Request {
        method: method.to_owned(),
        url,
        body: serde_json::to_vec(entity).unwrap_or_default(),
        headers: ehttp::Headers::new(&[("Content-Type", "application/json")]),
    }
}

fn send_entity(request: ehttp::Request, kind: EntityKind, ctx: egui::Context) {
    ehttp::fetch(request, move |result| {
        ctx.request_repaint();
        match result {
            Ok(response) if response.status == 200 || response.status == 201 => {
                match serde_json::from_slice::<Entity>(&response.bytes) {
                    Ok(saved) => ctx.memory_mut(|mem| {
                        mem.data.insert_temp(saved_response_id(kind), saved);
                    }),
                    Err(error) => {
                        record_error(&ctx, kind, format!("unreadable response: {error}"));
                    }
                }
            }
            Ok(response) => {
                record_error(&ctx, kind, format!("save failed with {}", response.status));
            }
            Err(error) => record_error(&ctx, kind, error),
        }
    });
}

fn record_error(ctx: &egui::Context, kind: EntityKind, message: String) {
    log::error!("api call for {} failed: {message}", kind.path());
    ctx.memory_mut(|mem| mem.data.insert_temp(error_id(kind), message));
}
