use std::collections::HashMap;

use approx::assert_relative_eq;
use compositor::*;
use layer_engine::{LayerOptions, LayerStore};
use product_state::ProductFamily;
use studio_types::{
    CustomizationSnapshot, LayerKind, Material, MaterialType, Region, Rgb, TargetPart, WrapMode,
};
use uuid::Uuid;

// ── Helper Functions ────────────────────────────────────────────────────

const JAR_MESHES: [&str; 3] = ["Jar_Top_001", "Jar_Body", "glass_base"];

fn grey() -> Material {
    Material {
        color: Rgb::new(0x80, 0x80, 0x80),
        roughness: 0.4,
        metalness: 0.2,
        ..Material::standard()
    }
}

/// Scene of `names` with a grey material each, plus the captured originals.
fn scene_of(names: &[&str]) -> (RetainedScene, HashMap<String, Material>) {
    let scene = RetainedScene::from_meshes(names.iter().map(|n| (n.to_string(), grey())));
    let originals = names.iter().map(|n| (n.to_string(), grey())).collect();
    (scene, originals)
}

struct Harness {
    compositor: Compositor,
    textures: TextureCache,
    loader: QueuedLoader,
    pbr: PbrLibrary,
    next_texture: u64,
}

impl Harness {
    fn new() -> Self {
        Self {
            compositor: Compositor::default(),
            textures: TextureCache::new(),
            loader: QueuedLoader::new(),
            pbr: PbrLibrary::new(),
            next_texture: 1,
        }
    }

    fn compose(
        &mut self,
        scene: &mut RetainedScene,
        store: &LayerStore,
        family: ProductFamily,
        customization: &CustomizationSnapshot,
        originals: &HashMap<String, Material>,
    ) -> CompositionReport {
        let input = CompositionInput {
            layers: store.layers(),
            family,
            customization,
            originals,
        };
        self.compositor
            .compose(scene, &input, &mut self.textures, &mut self.loader, &self.pbr)
    }

    /// Complete every queued load with a `width` x `height` image.
    fn land_all(&mut self, width: u32, height: u32) {
        for request in self.loader.drain() {
            let info = TextureInfo {
                id: self.next_texture,
                width,
                height,
            };
            self.next_texture += 1;
            self.textures
                .complete(&request.url, request.generation, info)
                .unwrap();
        }
    }

    fn fail_all(&mut self) {
        for request in self.loader.drain() {
            self.textures
                .fail(&request.url, request.generation, "404")
                .unwrap();
        }
    }
}

fn material<'s>(scene: &'s RetainedScene, name: &str) -> &'s Material {
    &scene.mesh_by_name(name).unwrap().material
}

fn add(
    store: &mut LayerStore,
    kind: LayerKind,
    part: TargetPart,
    value: &str,
    options: LayerOptions,
) -> Uuid {
    store
        .create_layer(format!("{kind:?}"), kind, part, value, options)
        .id
}

fn color(store: &mut LayerStore, part: TargetPart, hex: &str) -> Uuid {
    add(store, LayerKind::Color, part, hex, LayerOptions::default())
}

fn scaled(scale: f64) -> LayerOptions {
    LayerOptions {
        scale: Some(scale),
        ..Default::default()
    }
}

const OAK_SET: &str = r#"{
    "version": "1.0",
    "description": "test woods",
    "materials": [
        {
            "id": "oak",
            "name": "Oak",
            "category": "wood",
            "maps": {
                "diffuse": "oak/diffuse.jpg",
                "normal": "oak/normal.jpg",
                "displacement": "oak/height.jpg"
            },
            "properties": { "roughness": 0.8, "metallic": 0.0, "normalScale": 0.5 },
            "tiling": { "repeatU": 2.0, "repeatV": 3.0 },
            "targetParts": ["middle", "base"]
        }
    ]
}"#;

fn oak_layer(store: &mut LayerStore, id: &str, material_type: MaterialType) -> Uuid {
    add(
        store,
        LayerKind::Material,
        TargetPart::Middle,
        "oak/diffuse.jpg",
        LayerOptions {
            material_id: Some(id.to_string()),
            material_type: Some(material_type),
            ..Default::default()
        },
    )
}

// ── Baseline ────────────────────────────────────────────────────────────

#[test]
fn no_layers_restores_originals_with_family_tuning() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let store = LayerStore::new();

    let report = h.compose(
        &mut scene,
        &store,
        ProductFamily::Generic,
        &CustomizationSnapshot::default(),
        &originals,
    );

    assert_eq!(report.meshes.len(), 3);
    for name in JAR_MESHES {
        let m = material(&scene, name);
        assert_eq!(m.color, grey().color);
        assert_relative_eq!(m.roughness, 0.7);
        assert_relative_eq!(m.metalness, 0.05);
        assert!(m.map.is_none());
        assert!(!m.is_physical());
    }
    assert!(report.skipped.is_empty());
    assert!(!report.has_errors());
}

#[test]
fn deleting_every_layer_returns_to_baseline() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    let snap = CustomizationSnapshot::default();

    let baseline_scene = {
        let (mut fresh, _) = scene_of(&JAR_MESHES);
        h.compose(&mut fresh, &store, ProductFamily::Generic, &snap, &originals);
        fresh
    };

    let id = color(&mut store, TargetPart::All, "#ff0000");
    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    assert_eq!(material(&scene, "Jar_Body").color, Rgb::new(0xff, 0, 0));

    store.delete_layer(id).unwrap();
    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    for name in JAR_MESHES {
        assert_eq!(material(&scene, name), material(&baseline_scene, name));
    }
}

#[test]
fn missing_original_warns_and_uses_current() {
    let (mut scene, _) = scene_of(&["Jar_Body"]);
    let mut h = Harness::new();
    let store = LayerStore::new();

    let report = h.compose(
        &mut scene,
        &store,
        ProductFamily::Generic,
        &CustomizationSnapshot::default(),
        &HashMap::new(),
    );

    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("Jar_Body"));
    assert_eq!(material(&scene, "Jar_Body").color, grey().color);
}

// ── Colors ──────────────────────────────────────────────────────────────

#[test]
fn color_layer_only_touches_its_region() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    let id = color(&mut store, TargetPart::Top, "#00ff00");

    let report = h.compose(
        &mut scene,
        &store,
        ProductFamily::Generic,
        &CustomizationSnapshot::default(),
        &originals,
    );

    assert_eq!(material(&scene, "Jar_Top_001").color, Rgb::new(0, 0xff, 0));
    assert_eq!(material(&scene, "Jar_Body").color, grey().color);
    assert_eq!(material(&scene, "glass_base").color, grey().color);

    let top = report.outcome("Jar_Top_001").unwrap();
    assert_eq!(top.region, Region::Top);
    assert_eq!(top.applied, vec![id]);
    assert!(report.outcome("Jar_Body").unwrap().applied.is_empty());
}

#[test]
fn later_color_wins() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    color(&mut store, TargetPart::All, "#ff0000");
    let blue = color(&mut store, TargetPart::All, "#0000ff");

    let snap = CustomizationSnapshot::default();
    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    assert_eq!(material(&scene, "Jar_Body").color, Rgb::new(0, 0, 0xff));

    store.move_layer_up(blue).unwrap();
    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    assert_eq!(material(&scene, "Jar_Body").color, Rgb::new(0xff, 0, 0));
}

#[test]
fn hidden_layers_have_no_effect() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    let id = color(&mut store, TargetPart::All, "#ff0000");
    store.toggle_visibility(id).unwrap();

    h.compose(
        &mut scene,
        &store,
        ProductFamily::Generic,
        &CustomizationSnapshot::default(),
        &originals,
    );
    for name in JAR_MESHES {
        assert_eq!(material(&scene, name).color, grey().color);
    }
}

#[test]
fn unknown_meshes_only_take_all_layers() {
    let (mut scene, originals) = scene_of(&["Handle", "Jar_Body"]);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    color(&mut store, TargetPart::Middle, "#ff0000");
    let snap = CustomizationSnapshot::default();

    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    assert_eq!(material(&scene, "Handle").color, grey().color);

    color(&mut store, TargetPart::All, "#00ff00");
    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    assert_eq!(material(&scene, "Handle").color, Rgb::new(0, 0xff, 0));
}

#[test]
fn invalid_color_is_reported_not_raised() {
    let (mut scene, originals) = scene_of(&["Jar_Body"]);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    color(&mut store, TargetPart::Middle, "not-a-color");

    let report = h.compose(
        &mut scene,
        &store,
        ProductFamily::Generic,
        &CustomizationSnapshot::default(),
        &originals,
    );
    assert!(report.has_errors());
    assert_eq!(report.errors[0].0, "Jar_Body");
    assert_eq!(material(&scene, "Jar_Body").color, grey().color);
}

#[test]
fn recomposing_is_idempotent() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    color(&mut store, TargetPart::All, "#123456");
    add(
        &mut store,
        LayerKind::Artwork,
        TargetPart::Middle,
        "stripes.png",
        scaled(0.5),
    );
    let snap = CustomizationSnapshot::default();

    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    h.land_all(256, 256);
    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    let first: Vec<Material> = JAR_MESHES.iter().map(|n| material(&scene, n).clone()).collect();

    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    let second: Vec<Material> = JAR_MESHES.iter().map(|n| material(&scene, n).clone()).collect();
    assert_eq!(first, second);
}

// ── Artwork ─────────────────────────────────────────────────────────────

#[test]
fn artwork_waits_for_texture_then_binds() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    let id = add(
        &mut store,
        LayerKind::Artwork,
        TargetPart::Middle,
        "stripes.png",
        scaled(0.5),
    );
    let snap = CustomizationSnapshot::default();

    let report = h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    assert!(report.has_pending());
    assert_eq!(report.skipped[0].layer_id, id);
    assert_eq!(report.skipped[0].reason, SkipReason::TexturePending);
    assert!(material(&scene, "Jar_Body").map.is_none());
    assert_eq!(h.loader.pending().len(), 1);

    h.land_all(512, 256);
    let report = h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    assert!(report.skipped.is_empty());

    let map = material(&scene, "Jar_Body").map.clone().unwrap();
    assert_eq!(map.url, "stripes.png");
    assert_eq!(map.sampler.wrap_s, WrapMode::Repeat);
    assert_relative_eq!(map.transform.repeat[0], 2.0);
    assert_eq!(map.transform.center, [0.5, 0.5]);
    assert!(material(&scene, "Jar_Top_001").map.is_none());
}

#[test]
fn artwork_texture_failure_is_a_skip() {
    let (mut scene, originals) = scene_of(&["Jar_Body"]);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    add(
        &mut store,
        LayerKind::Artwork,
        TargetPart::Middle,
        "missing.png",
        LayerOptions::default(),
    );
    let snap = CustomizationSnapshot::default();

    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    h.fail_all();
    let report = h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);

    assert!(matches!(
        report.skipped[0].reason,
        SkipReason::TextureFailed { .. }
    ));
    assert!(material(&scene, "Jar_Body").map.is_none());
    assert!(h.loader.pending().is_empty());
}

#[test]
fn later_artwork_replaces_earlier() {
    let (mut scene, originals) = scene_of(&["Jar_Body"]);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    for url in ["first.png", "second.png"] {
        add(
            &mut store,
            LayerKind::Artwork,
            TargetPart::Middle,
            url,
            LayerOptions::default(),
        );
    }
    let snap = CustomizationSnapshot::default();

    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    h.land_all(64, 64);
    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    assert_eq!(
        material(&scene, "Jar_Body").map.as_ref().unwrap().url,
        "second.png"
    );
}

// ── Logos ───────────────────────────────────────────────────────────────

fn logo_store() -> (LayerStore, Uuid) {
    let mut store = LayerStore::new();
    let id = store
        .create_layer(
            "brand logo",
            LayerKind::Artwork,
            TargetPart::Middle,
            "brand.png",
            scaled(0.4),
        )
        .id;
    (store, id)
}

#[test]
fn logo_becomes_overlay_not_base_map() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let (store, id) = logo_store();
    let snap = CustomizationSnapshot::default();

    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    h.land_all(200, 100);
    let report = h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);

    assert_eq!(report.overlays_created.len(), 1);
    assert!(material(&scene, "Jar_Body").map.is_none());

    let overlay = scene.overlays().next().unwrap();
    assert_eq!(overlay.name, format!("Jar_Body_logo_{id}"));
    assert_eq!(overlay.overlay_of, scene.mesh_by_name("Jar_Body").map(|m| m.handle));
    assert_relative_eq!(overlay.position_offset[2], 0.001);

    let m = &overlay.material;
    assert!(m.transparent);
    assert!(m.double_sided);
    assert!(!m.depth_write);
    assert_relative_eq!(m.alpha_test, 0.1);
    let map = m.map.as_ref().unwrap();
    assert_eq!(map.sampler.wrap_s, WrapMode::ClampToEdge);
    // 2:1 image at scale 0.4 keeps its aspect.
    assert_relative_eq!(map.transform.repeat[0], 2.5);
    assert_relative_eq!(map.transform.repeat[1], 5.0);
}

#[test]
fn overlays_are_rebuilt_each_pass() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let (mut store, id) = logo_store();
    let snap = CustomizationSnapshot::default();

    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    h.land_all(100, 100);
    for _ in 0..3 {
        h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    }
    assert_eq!(scene.overlays().count(), 1);
    assert_eq!(scene.disposed_count(), 2);

    store.toggle_visibility(id).unwrap();
    let report = h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    assert_eq!(report.overlays_removed, 1);
    assert_eq!(scene.overlays().count(), 0);
    assert_eq!(scene.len(), 3);
}

#[test]
fn pending_logo_creates_no_overlay() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let (store, _) = logo_store();

    let report = h.compose(
        &mut scene,
        &store,
        ProductFamily::Generic,
        &CustomizationSnapshot::default(),
        &originals,
    );
    assert!(report.overlays_created.is_empty());
    assert_eq!(report.skipped[0].reason, SkipReason::TexturePending);
}

// ── Live preview ────────────────────────────────────────────────────────

fn picked(part: TargetPart, hex: &str) -> CustomizationSnapshot {
    CustomizationSnapshot {
        selected_color: hex.to_string(),
        has_color_changed: true,
        target_part: part,
        ..CustomizationSnapshot::default()
    }
}

#[test]
fn preview_color_paints_targeted_meshes_without_layers() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let store = LayerStore::new();

    let report = h.compose(
        &mut scene,
        &store,
        ProductFamily::Generic,
        &picked(TargetPart::Top, "#abcdef"),
        &originals,
    );
    assert_eq!(material(&scene, "Jar_Top_001").color, Rgb::new(0xab, 0xcd, 0xef));
    assert_eq!(material(&scene, "Jar_Body").color, grey().color);
    assert!(report.outcome("Jar_Top_001").unwrap().preview);
    assert!(!report.outcome("Jar_Body").unwrap().preview);
}

#[test]
fn preview_is_suppressed_by_layers() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    color(&mut store, TargetPart::Top, "#ff0000");

    h.compose(
        &mut scene,
        &store,
        ProductFamily::Generic,
        &picked(TargetPart::All, "#00ff00"),
        &originals,
    );
    assert_eq!(material(&scene, "Jar_Top_001").color, Rgb::new(0xff, 0, 0));
    assert_eq!(material(&scene, "Jar_Body").color, Rgb::new(0, 0xff, 0));
}

#[test]
fn unchanged_selection_does_not_paint() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let store = LayerStore::new();
    let snap = CustomizationSnapshot {
        has_color_changed: false,
        ..picked(TargetPart::All, "#00ff00")
    };

    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    for name in JAR_MESHES {
        assert_eq!(material(&scene, name).color, grey().color);
    }
}

#[test]
fn preview_artwork_uses_identity_transform() {
    let (mut scene, originals) = scene_of(&["Jar_Body"]);
    let mut h = Harness::new();
    let store = LayerStore::new();
    let snap = CustomizationSnapshot {
        selected_artwork: "preview.png".to_string(),
        ..CustomizationSnapshot::default()
    };

    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    h.land_all(64, 64);
    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);

    let map = material(&scene, "Jar_Body").map.clone().unwrap();
    assert_eq!(map.url, "preview.png");
    assert_eq!(map.transform.repeat, [1.0, 1.0]);
    assert_eq!(map.sampler.wrap_t, WrapMode::ClampToEdge);
}

#[test]
fn preview_stays_within_its_target_part() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let store = LayerStore::new();
    let snap = CustomizationSnapshot {
        selected_artwork: "preview.png".to_string(),
        ..picked(TargetPart::Middle, "#123456")
    };

    h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    h.land_all(32, 32);
    let report = h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);

    let body = material(&scene, "Jar_Body");
    assert_eq!(body.color, Rgb::new(0x12, 0x34, 0x56));
    assert!(body.map.is_some());
    let lid = material(&scene, "Jar_Top_001");
    assert_eq!(lid.color, grey().color);
    assert!(lid.map.is_none());
    assert!(!report.outcome("Jar_Top_001").unwrap().preview);
}

// ── Families ────────────────────────────────────────────────────────────

#[test]
fn pouch_meshes_are_physical_with_reflectiveness() {
    let (mut scene, originals) = scene_of(&["Pouch", "Plane001_1"]);
    let mut h = Harness::new();
    let store = LayerStore::new();
    let snap = CustomizationSnapshot {
        reflectiveness: 0.8,
        ..CustomizationSnapshot::default()
    };

    h.compose(&mut scene, &store, ProductFamily::Pouch, &snap, &originals);
    for name in ["Pouch", "Plane001_1"] {
        let m = material(&scene, name);
        assert!(m.is_physical());
        assert_eq!(m.color, grey().color);
        assert_relative_eq!(m.roughness, 0.28, epsilon = 1e-12);
        assert_relative_eq!(m.env_map_intensity, 1.2, epsilon = 1e-12);
        let physical = m.physical.unwrap();
        assert_relative_eq!(physical.clearcoat, 0.4, epsilon = 1e-12);
        assert_relative_eq!(physical.ior, 1.49, epsilon = 1e-12);
    }
}

#[test]
fn pouch_label_artwork_turns_white() {
    let (mut scene, originals) = scene_of(&["Pouch", "Plane001_1"]);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    add(
        &mut store,
        LayerKind::Artwork,
        TargetPart::Artwork,
        "label.png",
        LayerOptions::default(),
    );
    let snap = CustomizationSnapshot::default();

    h.compose(&mut scene, &store, ProductFamily::Pouch, &snap, &originals);
    h.land_all(128, 128);
    let report = h.compose(&mut scene, &store, ProductFamily::Pouch, &snap, &originals);

    let label = material(&scene, "Plane001_1");
    assert_eq!(label.color, Rgb::WHITE);
    assert_eq!(label.map.as_ref().unwrap().url, "label.png");
    assert_eq!(report.outcome("Plane001_1").unwrap().region, Region::Artwork);
    assert!(material(&scene, "Pouch").map.is_none());
}

#[test]
fn tinted_glass_base_is_translucent_until_printed() {
    let (mut scene, originals) = scene_of(&["Jar_Top_001", "glass_base", "mesh"]);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    let snap = CustomizationSnapshot::default();

    h.compose(&mut scene, &store, ProductFamily::BlackGlassJar, &snap, &originals);
    let bare = material(&scene, "glass_base");
    assert!(!bare.transparent);
    assert_relative_eq!(bare.roughness, 0.7);
    assert_relative_eq!(bare.metalness, 0.05);

    add(
        &mut store,
        LayerKind::Artwork,
        TargetPart::Base,
        "print.png",
        LayerOptions::default(),
    );
    h.compose(&mut scene, &store, ProductFamily::BlackGlassJar, &snap, &originals);
    let pending = material(&scene, "glass_base");
    assert!(pending.transparent);
    assert_relative_eq!(pending.opacity, 0.9);
    assert_relative_eq!(pending.roughness, 0.1);
    assert_relative_eq!(pending.metalness, 0.0);
    assert_relative_eq!(material(&scene, "Jar_Top_001").roughness, 0.7);
    // Classified as base by fallback, but not named as one.
    assert!(!material(&scene, "mesh").transparent);
    assert_relative_eq!(material(&scene, "mesh").roughness, 0.7);

    h.land_all(64, 64);
    h.compose(&mut scene, &store, ProductFamily::BlackGlassJar, &snap, &originals);

    let base = material(&scene, "glass_base");
    assert_relative_eq!(base.opacity, 1.0);
    assert_relative_eq!(base.roughness, 0.3);
    assert_eq!(base.color, Rgb::WHITE);
    assert!(base.map.is_some());
    let fallback = material(&scene, "mesh");
    assert!(fallback.map.is_some());
    assert_relative_eq!(fallback.roughness, 0.7);
}

// ── PBR materials ───────────────────────────────────────────────────────

#[test]
fn pbr_layer_applies_after_maps_load() {
    let (mut scene, originals) = scene_of(&["Jar_Body"]);
    let mut h = Harness::new();
    h.pbr.load_material_set(OAK_SET).unwrap();
    let mut store = LayerStore::new();
    let id = oak_layer(&mut store, "oak", MaterialType::Pbr);
    let snap = CustomizationSnapshot::default();

    let report = h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    assert_eq!(report.skipped[0].reason, SkipReason::MaterialPending);
    // Diffuse and normal; displacement is never requested.
    assert_eq!(h.loader.pending().len(), 2);

    h.land_all(1024, 1024);
    let report = h.compose(&mut scene, &store, ProductFamily::Generic, &snap, &originals);
    assert_eq!(report.outcome("Jar_Body").unwrap().applied, vec![id]);

    let m = material(&scene, "Jar_Body");
    assert_relative_eq!(m.roughness, 0.8);
    assert_relative_eq!(m.metalness, 0.0);
    assert_eq!(m.normal_scale, [0.5, 0.5]);
    let map = m.map.as_ref().unwrap();
    assert_eq!(map.transform.repeat, [2.0, 3.0]);
    assert_eq!(map.sampler.wrap_s, WrapMode::Repeat);
    assert!(m.roughness_map.is_none());
    assert_eq!(m.bindings().count(), 2);
}

#[test]
fn unknown_pbr_material_is_an_error() {
    let (mut scene, originals) = scene_of(&["Jar_Body"]);
    let mut h = Harness::new();
    let mut store = LayerStore::new();
    oak_layer(&mut store, "walnut", MaterialType::Pbr);

    let report = h.compose(
        &mut scene,
        &store,
        ProductFamily::Generic,
        &CustomizationSnapshot::default(),
        &originals,
    );
    assert!(report.has_errors());
    assert!(report.errors[0].1.contains("walnut"));
    assert_relative_eq!(material(&scene, "Jar_Body").roughness, 0.7);
}

#[test]
fn simple_material_layers_are_ignored() {
    let (mut scene, originals) = scene_of(&["Jar_Body"]);
    let mut h = Harness::new();
    h.pbr.load_material_set(OAK_SET).unwrap();
    let mut store = LayerStore::new();
    oak_layer(&mut store, "oak", MaterialType::Simple);

    let report = h.compose(
        &mut scene,
        &store,
        ProductFamily::Generic,
        &CustomizationSnapshot::default(),
        &originals,
    );
    assert_eq!(report.skipped[0].reason, SkipReason::NotPbr);
    assert!(h.loader.pending().is_empty());
}

// ── Texture bookkeeping ─────────────────────────────────────────────────

#[test]
fn referenced_urls_cover_layers_pbr_and_preview() {
    let mut pbr = PbrLibrary::new();
    pbr.load_material_set(OAK_SET).unwrap();
    let mut store = LayerStore::new();
    add(
        &mut store,
        LayerKind::Artwork,
        TargetPart::Middle,
        "art.png",
        LayerOptions::default(),
    );
    let hidden = add(
        &mut store,
        LayerKind::Artwork,
        TargetPart::Middle,
        "hidden.png",
        LayerOptions::default(),
    );
    store.toggle_visibility(hidden).unwrap();
    oak_layer(&mut store, "oak", MaterialType::Pbr);
    color(&mut store, TargetPart::All, "#ffffff");
    let snap = CustomizationSnapshot {
        selected_artwork: "preview.png".to_string(),
        ..CustomizationSnapshot::default()
    };

    let urls = referenced_urls(store.layers(), &snap, &pbr);
    let mut sorted: Vec<&str> = urls.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    assert_eq!(
        sorted,
        vec![
            "art.png",
            "hidden.png",
            "oak/diffuse.jpg",
            "oak/normal.jpg",
            "preview.png"
        ]
    );
}

#[test]
fn every_pass_records_scene_changes() {
    let (mut scene, originals) = scene_of(&JAR_MESHES);
    let mut h = Harness::new();
    let store = LayerStore::new();
    h.compose(
        &mut scene,
        &store,
        ProductFamily::Generic,
        &CustomizationSnapshot::default(),
        &originals,
    );

    let changes = scene.take_changes();
    assert_eq!(changes.len(), 3);
    assert!(changes
        .iter()
        .all(|c| matches!(c, SceneChange::MaterialAssigned { .. })));
    assert!(scene.take_changes().is_empty());
}
