use std::cell::RefCell;
use std::rc::Rc;

use layer_engine::*;
use studio_types::{LayerKind, MaterialType, Position, Region, TargetPart};
use uuid::Uuid;

// ── Helper Functions ────────────────────────────────────────────────────

fn color(store: &mut LayerStore, name: &str, part: TargetPart, hex: &str) -> Uuid {
    store
        .create_layer(name, LayerKind::Color, part, hex, LayerOptions::default())
        .id
}

fn artwork(store: &mut LayerStore, name: &str, part: TargetPart, url: &str) -> Uuid {
    store
        .create_layer(name, LayerKind::Artwork, part, url, LayerOptions::default())
        .id
}

fn names(store: &LayerStore) -> Vec<String> {
    store.layers().iter().map(|l| l.name.clone()).collect()
}

fn orders(store: &LayerStore) -> Vec<usize> {
    store.layers().iter().map(|l| l.order).collect()
}

/// Store with layers A, B, C all targeting `all`.
fn abc() -> (LayerStore, Uuid, Uuid, Uuid) {
    let mut store = LayerStore::new();
    let a = color(&mut store, "A", TargetPart::All, "#ff0000");
    let b = color(&mut store, "B", TargetPart::All, "#00ff00");
    let c = color(&mut store, "C", TargetPart::All, "#0000ff");
    (store, a, b, c)
}

// ── Creation ────────────────────────────────────────────────────────────

#[test]
fn create_appends_and_activates() {
    let (store, _, _, c) = abc();
    assert_eq!(names(&store), vec!["A", "B", "C"]);
    assert_eq!(orders(&store), vec![0, 1, 2]);
    assert_eq!(store.active_layer_id(), Some(c));
    assert!(store.layers().iter().all(|l| l.is_visible));
}

#[test]
fn textured_layers_default_reflectiveness() {
    let mut store = LayerStore::new();
    let art = artwork(&mut store, "Art", TargetPart::Base, "a.png");
    let col = color(&mut store, "Col", TargetPart::Base, "#ffffff");
    assert_eq!(store.layer(art).unwrap().reflectiveness, Some(0.5));
    assert_eq!(store.layer(col).unwrap().reflectiveness, None);
}

#[test]
fn create_keeps_options() {
    let mut store = LayerStore::new();
    let layer = store.create_layer(
        "Oak",
        LayerKind::Material,
        TargetPart::Middle,
        "oak/diffuse.jpg",
        LayerOptions {
            scale: Some(0.8),
            material_id: Some("oak".into()),
            material_type: Some(MaterialType::Pbr),
            ..Default::default()
        },
    );
    assert_eq!(layer.scale, Some(0.8));
    assert_eq!(layer.pbr_material_id(), Some("oak"));
}

// ── Deletion ────────────────────────────────────────────────────────────

#[test]
fn delete_middle_resequences_and_keeps_active() {
    let (mut store, a, b, c) = abc();
    store.set_active_layer(Some(a)).unwrap();
    store.delete_layer(b).unwrap();

    assert_eq!(names(&store), vec!["A", "C"]);
    assert_eq!(orders(&store), vec![0, 1]);
    assert_eq!(store.active_layer_id(), Some(a));

    store.set_active_layer(Some(c)).unwrap();
    assert_eq!(store.active_layer_id(), Some(c));
}

#[test]
fn delete_active_falls_back_to_first() {
    let (mut store, a, b, _) = abc();
    store.set_active_layer(Some(b)).unwrap();
    store.delete_layer(b).unwrap();
    assert_eq!(store.active_layer_id(), Some(a));
}

#[test]
fn delete_last_layer_clears_active() {
    let mut store = LayerStore::new();
    let only = color(&mut store, "Only", TargetPart::Top, "#000000");
    store.delete_layer(only).unwrap();
    assert!(store.is_empty());
    assert_eq!(store.active_layer_id(), None);
}

#[test]
fn delete_unknown_returns_not_found() {
    let (mut store, _, _, _) = abc();
    let result = store.delete_layer(Uuid::new_v4());
    assert!(matches!(result, Err(LayerError::NotFound { .. })));
    assert_eq!(store.len(), 3);
}

// ── Updates ─────────────────────────────────────────────────────────────

#[test]
fn partial_update_preserves_unspecified_fields() {
    let mut store = LayerStore::new();
    let id = artwork(&mut store, "Art", TargetPart::Base, "a.png");
    store.update_scale(id, 0.6).unwrap();
    store.update_position(id, Position::new(1.0, 2.0, 0.0)).unwrap();

    let layer = store.layer(id).unwrap();
    assert_eq!(layer.scale, Some(0.6));
    assert_eq!(layer.position, Some(Position::new(1.0, 2.0, 0.0)));
    assert_eq!(layer.value, "a.png");

    store.rename_layer(id, "Renamed").unwrap();
    assert_eq!(store.layer(id).unwrap().name, "Renamed");
    assert_eq!(store.layer(id).unwrap().scale, Some(0.6));
}

#[test]
fn update_transform_sets_both() {
    let mut store = LayerStore::new();
    let id = artwork(&mut store, "Art", TargetPart::Base, "a.png");
    store
        .update_transform(id, Position::new(-1.0, 0.5, 0.0), 1.2)
        .unwrap();
    let layer = store.layer(id).unwrap();
    assert_eq!(layer.scale, Some(1.2));
    assert_eq!(layer.position_or_origin().x, -1.0);
}

#[test]
fn toggle_visibility_flips() {
    let (mut store, a, _, _) = abc();
    assert!(!store.toggle_visibility(a).unwrap());
    assert!(store.toggle_visibility(a).unwrap());
}

#[test]
fn set_active_rejects_unknown_id() {
    let (mut store, _, _, c) = abc();
    let result = store.set_active_layer(Some(Uuid::new_v4()));
    assert!(matches!(result, Err(LayerError::NotFound { .. })));
    assert_eq!(store.active_layer_id(), Some(c));

    store.set_active_layer(None).unwrap();
    assert!(store.active_layer().is_none());
}

// ── Ordering ────────────────────────────────────────────────────────────

#[test]
fn move_up_and_down_swap_neighbours() {
    let (mut store, a, _, c) = abc();
    assert!(store.move_layer_up(c).unwrap());
    assert_eq!(names(&store), vec!["A", "C", "B"]);
    assert!(store.move_layer_down(a).unwrap());
    assert_eq!(names(&store), vec!["C", "A", "B"]);
    assert_eq!(orders(&store), vec![0, 1, 2]);
}

#[test]
fn move_past_ends_is_rejected_without_notification() {
    let (mut store, a, _, c) = abc();
    let count = Rc::new(RefCell::new(0));
    {
        let count = count.clone();
        store.subscribe(move |_| *count.borrow_mut() += 1);
    }
    assert!(!store.move_layer_up(a).unwrap());
    assert!(!store.move_layer_down(c).unwrap());
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn reorder_clamps_position() {
    let (mut store, a, _, _) = abc();
    assert!(store.reorder_layer(a, 99).unwrap());
    assert_eq!(names(&store), vec!["B", "C", "A"]);
    assert!(!store.reorder_layer(a, 2).unwrap());
}

// ── Region queries ──────────────────────────────────────────────────────

#[test]
fn visible_layers_for_part_include_wildcard() {
    let mut store = LayerStore::new();
    color(&mut store, "Everything", TargetPart::All, "#111111");
    let top = color(&mut store, "Lid", TargetPart::Top, "#222222");
    color(&mut store, "Bottom", TargetPart::Base, "#333333");
    color(&mut store, "Lid 2", TargetPart::Top, "#444444");

    let for_top: Vec<_> = store
        .visible_layers_for_part(TargetPart::Top)
        .iter()
        .map(|l| l.name.clone())
        .collect();
    assert_eq!(for_top, vec!["Everything", "Lid", "Lid 2"]);

    store.toggle_visibility(top).unwrap();
    assert_eq!(store.visible_layers_for_part(TargetPart::Top).len(), 2);
}

#[test]
fn unknown_region_only_sees_wildcard_layers() {
    let mut store = LayerStore::new();
    color(&mut store, "Everything", TargetPart::All, "#111111");
    color(&mut store, "Lid", TargetPart::Top, "#222222");
    let hits = store.layers_for_region(Region::Unknown);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Everything");
}

// ── Product switching ───────────────────────────────────────────────────

#[test]
fn switch_to_same_product_is_noop() {
    let mut store = LayerStore::new();
    assert!(store.switch_to_product("p1"));
    color(&mut store, "A", TargetPart::All, "#ff0000");

    assert!(!store.switch_to_product("p1"));
    assert_eq!(store.len(), 1);
}

#[test]
fn switch_to_other_product_clears() {
    let mut store = LayerStore::new();
    store.switch_to_product("p1");
    color(&mut store, "A", TargetPart::All, "#ff0000");

    assert!(store.switch_to_product("p2"));
    assert!(store.is_empty());
    assert_eq!(store.active_layer_id(), None);
    assert_eq!(store.current_product(), Some("p2"));
}

#[test]
fn reset_for_product_switch_clears_even_for_same_id() {
    let mut store = LayerStore::new();
    store.switch_to_product("p1");
    color(&mut store, "A", TargetPart::All, "#ff0000");

    store.reset_for_product_switch("p1");
    assert!(store.is_empty());
    assert_eq!(store.current_product(), Some("p1"));
}

// ── Notification ────────────────────────────────────────────────────────

#[test]
fn every_mutation_notifies_with_new_state() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut store = LayerStore::new();
    {
        let seen = seen.clone();
        store.subscribe(move |state: &LayerState| seen.borrow_mut().push(state.layers.len()));
    }
    let a = color(&mut store, "A", TargetPart::All, "#ff0000");
    color(&mut store, "B", TargetPart::All, "#00ff00");
    store.toggle_visibility(a).unwrap();
    store.delete_layer(a).unwrap();
    store.clear_all();

    assert_eq!(*seen.borrow(), vec![1, 2, 2, 1, 0]);
}

#[test]
fn unsubscribe_stops_notifications() {
    let count = Rc::new(RefCell::new(0));
    let mut store = LayerStore::new();
    let sub = {
        let count = count.clone();
        store.subscribe(move |_| *count.borrow_mut() += 1)
    };
    color(&mut store, "A", TargetPart::All, "#ff0000");
    assert!(store.unsubscribe(sub));
    color(&mut store, "B", TargetPart::All, "#00ff00");
    assert_eq!(*count.borrow(), 1);
}

// ── Export / import ─────────────────────────────────────────────────────

#[test]
fn export_import_round_trip_keeps_ids_and_order() {
    let mut store = LayerStore::new();
    color(&mut store, "Red", TargetPart::Top, "#ff0000");
    let art = store.create_layer(
        "Pattern",
        LayerKind::Artwork,
        TargetPart::Base,
        "https://cdn/pattern.png",
        LayerOptions {
            position: Some(Position::new(0.5, -0.5, 0.0)),
            scale: Some(0.7),
            ..Default::default()
        },
    );
    store.set_active_layer(Some(art.id)).unwrap();

    let json = store.export_layers().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(value["exportedAt"].is_string());
    assert_eq!(value["layers"][1]["type"], "artwork");
    assert_eq!(value["layers"][1]["targetPart"], "base");
    assert_eq!(value["layers"][1]["isVisible"], true);

    let mut other = LayerStore::new();
    other.import_layers(&json).unwrap();
    assert_eq!(other.layers(), store.layers());
    assert_eq!(other.active_layer_id(), Some(art.id));
}

#[test]
fn import_without_layers_array_leaves_store_untouched() {
    let (mut store, _, _, _) = abc();
    let result = store.import_layers(r#"{"layers": "nope"}"#);
    assert!(matches!(result, Err(LayerError::Import { .. })));
    assert_eq!(store.len(), 3);

    assert!(store.import_layers("not json").is_err());
    assert_eq!(store.len(), 3);
}

#[test]
fn import_drops_dangling_active_id() {
    let json = format!(
        r#"{{"layers": [], "activeLayerId": "{}"}}"#,
        Uuid::new_v4()
    );
    let mut store = LayerStore::new();
    store.import_layers(&json).unwrap();
    assert_eq!(store.active_layer_id(), None);
}

#[test]
fn import_without_timestamps_stamps_layers() {
    let id = Uuid::new_v4();
    let json = format!(
        r##"{{
            "layers": [
                {{"id": "{id}", "name": "Lid", "type": "color", "targetPart": "top",
                  "value": "#ff0000", "isVisible": false, "order": 0}}
            ],
            "activeLayerId": null
        }}"##
    );
    let before = chrono::Utc::now();
    let mut store = LayerStore::new();
    store.import_layers(&json).unwrap();

    let layer = store.layer(id).unwrap();
    assert_eq!(layer.kind, LayerKind::Color);
    assert!(!layer.is_visible);
    assert!(layer.created_at >= before);
    assert_eq!(store.active_layer_id(), None);
}
