use cgmath::{Vector2, Vector3, Vector4};
use desk_scene::{
    config::SceneConfig,
    data_structures::{material::Material, transform::Transform},
    render::{DrawCall, MeshKind},
    scene::{Scene, SceneBinder, TextureSource},
    shader::{MaterialField, Uniform, UniformValue},
};

use crate::common::test_utils::{Call, CallLog, RecordingRenderer, scratch_dir, write_rgb};

mod common;

const DESK_TEXTURES: [&str; 6] = [
    "textures/static3.jpg",
    "textures/blackxbox4.jpg",
    "textures/monster2.jpg",
    "textures/rusticwood.jpg",
    "textures/blackwall.jpg",
    "textures/stainless.jpg",
];

fn desk_binder(skip: &[&str]) -> (SceneBinder<RecordingRenderer>, CallLog) {
    let root = scratch_dir("desk");
    for file in DESK_TEXTURES.iter().filter(|f| !skip.contains(*f)) {
        write_rgb(&root.join(file), 4, 4);
    }
    let (renderer, log) = RecordingRenderer::new();
    let config = SceneConfig::default().with_asset_root(root);
    (SceneBinder::new(renderer, Scene::desk(), config), log)
}

#[test]
fn desk_scene_draws_ten_objects_in_order() {
    let (mut binder, log) = desk_binder(&[]);
    binder.prepare_scene();
    binder.render_scene();

    assert_eq!(
        log.draws(),
        vec![
            MeshKind::Plane,
            MeshKind::Plane,
            MeshKind::Box,
            MeshKind::Box,
            MeshKind::Box,
            MeshKind::Box,
            MeshKind::TaperedCylinder,
            MeshKind::Prism,
            MeshKind::Prism,
            MeshKind::Cylinder,
        ]
    );

    let snapshots = log.snapshots();
    let expected_models = [
        Transform::new([20.0, 0.0, 10.0], [0.0, 0.0, 0.0], [0.0, 0.0, -10.0]),
        Transform::new([20.0, 0.0, 8.0], [90.0, 0.0, 0.0], [0.0, 8.0, -10.0]),
        Transform::new([9.0, 4.0, 1.0], [0.0, 0.0, 0.0], [0.0, 4.5, -9.0]),
        Transform::new([2.0, 1.0, 1.0], [0.0, 0.0, 0.0], [4.0, 0.5, -7.0]),
        Transform::new([2.0, 5.0, 1.0], [180.0, 0.0, 0.0], [-7.0, 0.5, -8.0]),
        Transform::new([10.0, 5.0, 1.0], [0.0, 0.0, 0.0], [0.0, 4.5, -9.0]),
        Transform::new([0.7, 2.0, 0.2], [-10.0, 0.0, 0.0], [0.0, 0.0, -9.0]),
        Transform::new([6.0, 0.8, 0.3], [0.0, 130.0, 0.0], [0.1, 0.4, -9.5]),
        Transform::new([6.0, 0.8, 0.3], [0.0, -130.0, 0.0], [-0.1, 0.4, -9.5]),
        Transform::new([0.5, 1.8, 0.5], [-1.0, 90.0, 0.0], [-4.7, 0.0, -6.0]),
    ];
    for (snapshot, transform) in snapshots.iter().zip(expected_models.iter()) {
        assert_eq!(snapshot.model, transform.to_matrix());
    }

    // slots follow the texture load order: static, xbox, monster, rusticwood, wall, stainless
    let samplers: Vec<_> = snapshots.iter().map(|s| (s.use_texture, s.sampler)).collect();
    assert_eq!(
        samplers,
        vec![
            (Some(true), Some(3)),
            (Some(true), Some(4)),
            (Some(true), Some(0)),
            (Some(true), Some(5)),
            (Some(true), Some(1)),
            (Some(false), Some(1)),
            (Some(true), Some(4)),
            (Some(true), Some(4)),
            (Some(true), Some(4)),
            (Some(true), Some(2)),
        ]
    );
    assert_eq!(snapshots[5].object_color, Some(Vector4::new(0.0, 0.0, 0.0, 1.0)));

    let shininess: Vec<_> = snapshots.iter().map(|s| s.shininess).collect();
    assert_eq!(
        shininess,
        vec![
            Some(0.5),  // clay
            Some(0.5),  // cement
            Some(0.5),  // cement carries over
            Some(0.5),
            Some(0.5),
            Some(0.5),
            Some(0.5),
            Some(0.5),
            Some(0.5),
            Some(90.0), // glass
        ]
    );
    assert_eq!(snapshots[0].ambient_color, Some(Vector3::new(0.2, 0.2, 0.3)));
    assert_eq!(snapshots[1].ambient_color, Some(Vector3::new(0.2, 0.2, 0.2)));
    assert!(snapshots.iter().all(|s| s.uv_scale == Some(Vector2::new(1.0, 1.0))));
}

#[test]
fn prepare_pushes_state_before_loading_meshes() {
    let (mut binder, log) = desk_binder(&[]);
    binder.prepare_scene();

    let calls = log.calls();
    assert_eq!(calls[0], Call::Uniform(Uniform::UseLighting, UniformValue::Bool(true)));
    // two lights, seven fields each
    let light_writes = calls[1..15]
        .iter()
        .filter(|call| matches!(call, Call::Uniform(Uniform::Light(_, _), _)))
        .count();
    assert_eq!(light_writes, 14);

    let binds: Vec<_> = calls
        .iter()
        .filter_map(|call| match call {
            Call::BindTexture { slot, handle } => Some((*slot, *handle)),
            _ => None,
        })
        .collect();
    assert_eq!(binds, (0..6).map(|i| (i, i as u32)).collect::<Vec<_>>());

    let uv = calls
        .iter()
        .position(|call| *call == Call::Uniform(Uniform::UvScale, UniformValue::Vec2(Vector2::new(1.0, 1.0))))
        .unwrap();
    let first_bind = calls
        .iter()
        .position(|call| matches!(call, Call::BindTexture { .. }))
        .unwrap();
    let first_mesh = calls
        .iter()
        .position(|call| matches!(call, Call::LoadMesh(_)))
        .unwrap();
    assert!(first_bind < uv && uv < first_mesh);

    let meshes: Vec<_> = calls
        .iter()
        .filter_map(|call| match call {
            Call::LoadMesh(kind) => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(meshes, MeshKind::ALL.to_vec());
    assert_eq!(binder.textures().len(), 6);
    assert_eq!(binder.materials().len(), 3);
    assert_eq!(binder.lights().len(), 2);
}

#[test]
fn missing_texture_samples_slot_minus_one() {
    let (mut binder, log) = desk_binder(&["textures/stainless.jpg"]);
    binder.prepare_scene();
    assert_eq!(binder.textures().len(), 5);
    log.clear();

    binder.render_scene();

    let snapshots = log.snapshots();
    assert_eq!(snapshots.len(), 10);
    // the mini PC is the stainless object
    assert_eq!(snapshots[3].use_texture, Some(true));
    assert_eq!(snapshots[3].sampler, Some(-1));
}

#[test]
fn unknown_material_writes_nothing() {
    let (mut binder, log) = desk_binder(&[]);
    binder.prepare_scene();
    log.clear();

    assert!(!binder.set_material("marble"));
    assert!(log.calls().is_empty());

    assert!(binder.set_material("glass"));
    let uniforms = log.uniforms();
    assert_eq!(uniforms.len(), 5);
    assert_eq!(
        uniforms[0],
        (
            Uniform::Material(MaterialField::AmbientColor),
            UniformValue::Vec3(Vector3::new(0.4, 0.4, 0.4))
        )
    );
    assert_eq!(
        uniforms[4],
        (Uniform::Material(MaterialField::Shininess), UniformValue::Float(90.0))
    );
}

#[test]
fn color_override_sticks_until_the_next_texture() {
    let root = scratch_dir("sticky");
    write_rgb(&root.join("wood.png"), 2, 2);
    let scene = Scene {
        textures: vec![TextureSource::new("wood.png", "wood")],
        meshes: vec![MeshKind::Box],
        draws: vec![
            DrawCall::new("painted", MeshKind::Box, Transform::default()).colored([1.0, 0.0, 0.0, 1.0]),
            DrawCall::new("inherits", MeshKind::Box, Transform::default()),
            DrawCall::new("textured", MeshKind::Box, Transform::default()).textured("wood"),
        ],
        ..Scene::default()
    };
    let (renderer, log) = RecordingRenderer::new();
    let mut binder = SceneBinder::new(renderer, scene, SceneConfig::default().with_asset_root(root));
    binder.prepare_scene();
    log.clear();
    binder.render_scene();

    let snapshots = log.snapshots();
    assert_eq!(snapshots[0].use_texture, Some(false));
    assert_eq!(snapshots[1].use_texture, Some(false));
    assert_eq!(snapshots[1].object_color, Some(Vector4::new(1.0, 0.0, 0.0, 1.0)));
    assert_eq!(snapshots[2].use_texture, Some(true));
    assert_eq!(snapshots[2].sampler, Some(0));
}

#[test]
fn render_before_prepare_draws_nothing() {
    let (mut binder, log) = desk_binder(&[]);
    binder.render_scene();
    assert!(log.calls().is_empty());
    assert!(!binder.is_prepared());
}

#[test]
fn second_prepare_is_ignored() {
    let (mut binder, log) = desk_binder(&[]);
    binder.prepare_scene();
    let after_first = log.calls().len();

    binder.prepare_scene();

    assert_eq!(log.calls().len(), after_first);
    assert_eq!(binder.textures().len(), 6);
    assert!(binder.is_prepared());
}

#[test]
fn rendering_twice_repeats_the_same_draws() {
    let (mut binder, log) = desk_binder(&[]);
    binder.prepare_scene();
    log.clear();

    binder.render_scene();
    let first = log.calls();
    log.clear();
    binder.render_scene();

    assert_eq!(log.calls(), first);
}

#[test]
fn release_frees_each_texture_once() {
    let (mut binder, log) = desk_binder(&[]);
    binder.prepare_scene();

    binder.release();
    binder.release();
    drop(binder);

    let mut destroyed = log.destroyed();
    destroyed.sort();
    assert_eq!(destroyed, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn dropping_the_binder_frees_its_textures() {
    let (mut binder, log) = desk_binder(&[]);
    binder.prepare_scene();
    drop(binder);

    assert_eq!(log.destroyed().len(), 6);
}

#[test]
fn extra_materials_do_not_shadow_earlier_ones() {
    let mut scene = Scene::desk();
    scene
        .materials
        .push(Material::new("clay", [1.0; 3], 1.0, [1.0; 3], [1.0; 3], 7.0));
    let root = scratch_dir("shadow");
    for file in DESK_TEXTURES {
        write_rgb(&root.join(file), 2, 2);
    }
    let (renderer, log) = RecordingRenderer::new();
    let mut binder = SceneBinder::new(renderer, scene, SceneConfig::default().with_asset_root(root));
    binder.prepare_scene();
    log.clear();
    binder.render_scene();

    assert_eq!(log.snapshots()[0].shininess, Some(0.5));
}
