//! Shape geometry: primitive mapping, set concatenation and attribute bindings

mod common;

use cadscene::database::CadDatabase;
use cadscene::scene::{Binding, PrimitiveKind};
use cadscene::{Error, ShapeSet, ShapeType};
use common::*;
use glam::{Vec2, Vec3};

fn three_strips(normals: usize, colors: usize, tex_coords: usize) -> CadDatabase {
    // Attributes go on the first set; arrays are concatenated across sets
    let first = strip(3)
        .with_normals(vec![Vec3::Z; normals])
        .with_colors(vec![Vec3::ONE; colors])
        .with_tex_coords(vec![Vec2::ZERO; tex_coords]);

    let mut db = CadDatabase::new();
    add_part(&mut db, None, "strips", ShapeType::TriStripSet, vec![first, strip(3), strip(3)]);
    db
}

#[test]
fn test_sets_are_concatenated() {
    let (result, root) = translate(three_strips(0, 0, 0));
    result.unwrap();

    let geometry = lod_geometry(&root, "strips", 0);
    assert_eq!(geometry.primitive, PrimitiveKind::TriangleStrips);
    assert_eq!(geometry.vertices.len(), 9);
    assert_eq!(geometry.primitive_lengths, vec![3, 3, 3]);
    assert_eq!(geometry.num_primitives(), 3);
    assert!(geometry.normals.is_none());
}

#[test]
fn test_binding_by_count() {
    let (result, root) = translate(three_strips(9, 3, 1));
    result.unwrap();

    let geometry = lod_geometry(&root, "strips", 0);
    assert_eq!(geometry.normals.unwrap().binding, Binding::PerVertex);
    assert_eq!(geometry.colors.unwrap().binding, Binding::PerPrimitive);
    assert_eq!(geometry.tex_coords.unwrap().binding, Binding::Overall);
}

#[test]
fn test_inconsistent_normal_count() {
    let (result, _) = translate(three_strips(5, 0, 0));
    let err = result.unwrap_err();
    match err {
        Error::InconsistentAttribute {
            attribute,
            count,
            vertices,
            primitives,
            ..
        } => {
            assert_eq!(attribute, "normals");
            assert_eq!((count, vertices, primitives), (5, 9, 3));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_primitive_kinds() {
    let mut db = CadDatabase::new();
    add_part(&mut db, None, "poly", ShapeType::PolygonSet, vec![triangle()]);
    add_part(&mut db, None, "lines", ShapeType::LineStripSet, vec![strip(2)]);
    add_part(&mut db, None, "points", ShapeType::PointSet, vec![strip(5)]);

    let (result, root) = translate(db);
    result.unwrap();

    assert_eq!(lod_geometry(&root, "poly", 0).primitive, PrimitiveKind::Polygons);
    assert_eq!(lod_geometry(&root, "lines", 0).primitive, PrimitiveKind::LineStrips);
    assert_eq!(lod_geometry(&root, "points", 0).primitive, PrimitiveKind::Points);
}

#[test]
fn test_triangle_fans_are_unsupported() {
    let mut db = CadDatabase::new();
    add_part(&mut db, None, "fan", ShapeType::TriFanSet, vec![triangle()]);

    let (result, root) = translate(db);
    let err = result.unwrap_err();
    assert!(matches!(err, Error::UnsupportedShape { .. }));
    assert_eq!(
        err.to_string(),
        "[E3001] Unknown shape type 'tri_fan' for entity = fan, LOD = 0, shape = 0"
    );
    // The failed part is not attached
    assert_eq!(root.num_children(), 0);
}

#[test]
fn test_unknown_shape_type() {
    let mut db = CadDatabase::new();
    add_part(&mut db, None, "odd", ShapeType::Unknown(42), vec![triangle()]);

    let (result, _) = translate(db);
    match result {
        Err(Error::UnsupportedShape { shape_type, .. }) => assert_eq!(shape_type, "unknown(42)"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_zero_vertex_set_is_rejected() {
    let mut db = CadDatabase::new();
    add_part(
        &mut db,
        None,
        "hollow",
        ShapeType::PolygonSet,
        vec![triangle(), ShapeSet::default()],
    );

    let (result, root) = translate(db);
    let err = result.unwrap_err();
    assert!(!err.to_string().is_empty());
    match err {
        Error::EmptyGeometrySet { entity, lod, shape, set } => {
            assert_eq!(entity, "hollow");
            assert_eq!((lod, shape, set), (0, 0, 1));
        }
        other => panic!("unexpected error: {other}"),
    }

    // Neither the part nor any geometry made it under the root
    assert!(root.find("hollow").is_none());
    assert_eq!(root.stats().geometries, 0);
}

#[test]
fn test_shape_without_sets_is_rejected() {
    let mut db = CadDatabase::new();
    add_part(&mut db, None, "blank", ShapeType::PolygonSet, vec![]);

    let (result, _) = translate(db);
    assert!(matches!(result, Err(Error::EmptyShape { .. })));
}
