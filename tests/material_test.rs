//! Material cascade from shapes, parts and assemblies onto geometry state

mod common;

use cadscene::ShapeType;
use cadscene::database::CadDatabase;
use cadscene::material::Material;
use common::*;
use glam::Vec4;

#[test]
fn test_assembly_material_reaches_geometry() {
    let mut db = CadDatabase::new();
    let top = db.add_assembly(None, "top").unwrap();
    db.set_material(top, diffuse(1.0, 0.0, 0.0)).unwrap();
    add_triangle_part(&mut db, Some(top), "bolt");

    let (result, root) = translate(db);
    result.unwrap();

    let state = lod_geometry(&root, "bolt", 0).state;
    assert_eq!(state.material, Some(diffuse(1.0, 0.0, 0.0)));
    assert!(state.lighting);
    assert!(!state.transparency);
}

#[test]
fn test_innermost_assembly_wins() {
    let mut db = CadDatabase::new();
    let outer = db.add_assembly(None, "outer").unwrap();
    db.set_material(outer, diffuse(1.0, 0.0, 0.0)).unwrap();
    let inner = db.add_assembly(Some(outer), "inner").unwrap();
    db.set_material(inner, diffuse(0.0, 1.0, 0.0)).unwrap();
    add_triangle_part(&mut db, Some(inner), "deep");
    add_triangle_part(&mut db, Some(outer), "shallow");

    let (result, root) = translate(db);
    result.unwrap();

    assert_eq!(lod_geometry(&root, "deep", 0).state.material, Some(diffuse(0.0, 1.0, 0.0)));
    // Once `inner` is closed its material no longer applies
    assert_eq!(lod_geometry(&root, "shallow", 0).state.material, Some(diffuse(1.0, 0.0, 0.0)));
}

#[test]
fn test_empty_inner_material_falls_through() {
    let mut db = CadDatabase::new();
    let outer = db.add_assembly(None, "outer").unwrap();
    db.set_material(outer, diffuse(1.0, 0.0, 0.0)).unwrap();
    let inner = db.add_assembly(Some(outer), "inner").unwrap();
    db.set_material(inner, Material::new()).unwrap();
    add_triangle_part(&mut db, Some(inner), "bolt");

    let (result, root) = translate(db);
    result.unwrap();

    assert_eq!(lod_geometry(&root, "bolt", 0).state.material, Some(diffuse(1.0, 0.0, 0.0)));
}

#[test]
fn test_part_beats_assembly_and_shape_beats_part() {
    let mut db = CadDatabase::new();
    let top = db.add_assembly(None, "top").unwrap();
    db.set_material(top, diffuse(1.0, 0.0, 0.0)).unwrap();

    let part = add_triangle_part(&mut db, Some(top), "painted");
    db.set_material(part, diffuse(0.0, 1.0, 0.0)).unwrap();

    let shaped = add_triangle_part(&mut db, Some(top), "shaped");
    db.set_material(shaped, diffuse(0.0, 1.0, 0.0)).unwrap();
    db.set_shape_material(shaped, 0, 0, diffuse(0.0, 0.0, 1.0)).unwrap();

    let (result, root) = translate(db);
    result.unwrap();

    assert_eq!(lod_geometry(&root, "painted", 0).state.material, Some(diffuse(0.0, 1.0, 0.0)));
    assert_eq!(lod_geometry(&root, "shaped", 0).state.material, Some(diffuse(0.0, 0.0, 1.0)));
}

#[test]
fn test_no_material_anywhere() {
    let mut db = CadDatabase::new();
    let top = db.add_assembly(None, "top").unwrap();
    add_triangle_part(&mut db, Some(top), "bare");

    let (result, root) = translate(db);
    result.unwrap();

    let state = lod_geometry(&root, "bare", 0).state;
    assert_eq!(state.material, None);
    assert!(!state.lighting);
    assert!(!state.transparency);
}

#[test]
fn test_translucent_diffuse_enables_transparency() {
    let mut db = CadDatabase::new();
    let glass = Material::new()
        .with_diffuse(Vec4::new(0.6, 0.8, 1.0, 0.3))
        .with_shininess(90.0);
    let part = add_part(&mut db, None, "window", ShapeType::PolygonSet, vec![triangle()]);
    db.set_material(part, glass).unwrap();

    let (result, root) = translate(db);
    result.unwrap();

    let state = lod_geometry(&root, "window", 0).state;
    assert!(state.transparency);
    assert!(state.lighting);
    assert_eq!(state.material.unwrap().shininess, Some(90.0));
}

#[test]
fn test_instance_material_is_ignored() {
    let mut db = CadDatabase::new();
    let top = db.add_assembly(None, "top").unwrap();
    let bolt = add_triangle_part(&mut db, Some(top), "bolt");
    let copy = db.add_instance(Some(top), "copy", Some(bolt)).unwrap();
    db.set_material(copy, diffuse(1.0, 1.0, 0.0)).unwrap();

    let (result, root) = translate(db);
    result.unwrap();

    // The copy shares the original's geometry, material included
    let copy = root.find("copy").unwrap();
    let geode = copy.child(0).unwrap().child(0).unwrap();
    assert_eq!(geode.read().geometries()[0].state.material, None);
}
