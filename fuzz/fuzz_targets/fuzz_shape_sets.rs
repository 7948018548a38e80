#![no_main]

use cadscene::database::CadDatabase;
use cadscene::traverser::{ShapeSet, ShapeType};
use glam::{Vec2, Vec3};
use libfuzzer_sys::arbitrary::{Arbitrary, Result, Unstructured};
use libfuzzer_sys::fuzz_target;

#[derive(Debug)]
struct FuzzSet {
    vertices: usize,
    normals: usize,
    colors: usize,
    tex_coords: usize,
}

#[derive(Debug)]
struct FuzzShape {
    shape_type: u8,
    sets: Vec<FuzzSet>,
}

impl<'a> Arbitrary<'a> for FuzzShape {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        let shape_type = u.int_in_range(0..=5)?;
        let set_count = u.int_in_range(0..=16)?;
        let mut sets = Vec::with_capacity(set_count);
        for _ in 0..set_count {
            sets.push(FuzzSet {
                vertices: u.int_in_range(0..=32)?,
                normals: u.int_in_range(0..=32)?,
                colors: u.int_in_range(0..=32)?,
                tex_coords: u.int_in_range(0..=32)?,
            });
        }
        Ok(FuzzShape { shape_type, sets })
    }
}

fuzz_target!(|shape: FuzzShape| {
    // Any mix of array lengths either translates or fails with an error
    let shape_type = match shape.shape_type {
        0 => ShapeType::TriStripSet,
        1 => ShapeType::PolygonSet,
        2 => ShapeType::LineStripSet,
        3 => ShapeType::PointSet,
        4 => ShapeType::TriFanSet,
        n => ShapeType::Unknown(n as u32),
    };

    let mut db = CadDatabase::new();
    let Ok(part) = db.add_part(None, "fuzz") else { return };
    let Ok(lod) = db.add_lod(part) else { return };
    let Ok(index) = db.add_shape(part, lod, shape_type) else { return };
    for set in &shape.sets {
        let data = ShapeSet::new(vec![Vec3::ZERO; set.vertices])
            .with_normals(vec![Vec3::Z; set.normals])
            .with_colors(vec![Vec3::ONE; set.colors])
            .with_tex_coords(vec![Vec2::ZERO; set.tex_coords]);
        let _ = db.add_shape_set(part, lod, index, data);
    }

    let mut translator = cadscene::Translator::new(db, cadscene::TranslatorConfig::default());
    if translator.init().is_ok() {
        let root = cadscene::NodeRef::group("root");
        if translator.translate("", &root).is_ok() {
            let stats = root.stats();
            let expected: usize = shape.sets.iter().map(|s| s.vertices).sum();
            assert_eq!(stats.vertices, expected);
        }
    }
});
