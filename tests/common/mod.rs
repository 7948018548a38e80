//! Shared fixtures for the translation tests
//!
//! Builds small databases, runs them through a [`Translator`], and digs
//! geometries back out of the resulting scene.

#![allow(dead_code)]

use std::path::Path;

use cadscene::database::{CadDatabase, EntityId};
use cadscene::material::Material;
use cadscene::scene::{Geometry, NodeRef};
use cadscene::traverser::{
    EntityAccessor, EntityType, Message, ShapeSet, ShapeType, TraversalHandler, Traverser,
};
use cadscene::{Result, Translator, TranslatorConfig};
use glam::{Mat4, Vec3};

/// Route `tracing` output to the test harness; set `RUST_LOG` to see it
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One triangle in the XY plane
pub fn triangle() -> ShapeSet {
    ShapeSet::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
}

/// A strip with `n` vertices along X
pub fn strip(n: usize) -> ShapeSet {
    ShapeSet::new((0..n).map(|i| Vec3::new(i as f32, (i % 2) as f32, 0.0)).collect())
}

/// Add a part with one LOD holding one shape made of `sets`
pub fn add_part(
    db: &mut CadDatabase,
    parent: Option<EntityId>,
    name: &str,
    shape_type: ShapeType,
    sets: Vec<ShapeSet>,
) -> EntityId {
    let part = db.add_part(parent, name).unwrap();
    let lod = db.add_lod(part).unwrap();
    let shape = db.add_shape(part, lod, shape_type).unwrap();
    for set in sets {
        db.add_shape_set(part, lod, shape, set).unwrap();
    }
    part
}

/// Add a part whose single shape is one triangle
pub fn add_triangle_part(db: &mut CadDatabase, parent: Option<EntityId>, name: &str) -> EntityId {
    add_part(db, parent, name, ShapeType::PolygonSet, vec![triangle()])
}

/// Translate an in-memory database below a fresh root
pub fn translate(db: CadDatabase) -> (Result<()>, NodeRef) {
    translate_with(db, TranslatorConfig::default())
}

/// Translate an in-memory database with a custom configuration
pub fn translate_with(db: CadDatabase, config: TranslatorConfig) -> (Result<()>, NodeRef) {
    init_tracing();
    let mut translator = Translator::new(db, config);
    translator.init().unwrap();
    let root = NodeRef::group("root");
    let result = translator.translate("", &root);
    (result, root)
}

/// The first geometry of the given LOD of a part
pub fn lod_geometry(root: &NodeRef, part: &str, lod: usize) -> Geometry {
    let name = format!("part={},lod={}", part, lod);
    let group = root
        .find(&name)
        .unwrap_or_else(|| panic!("no node named {name}"));
    let geode = group.child(0).expect("LOD group has no geode");
    let geode = geode.read();
    geode.geometries()[0].clone()
}

/// A uniform material with the given diffuse color
pub fn diffuse(r: f32, g: f32, b: f32) -> Material {
    Material::new().with_diffuse(glam::Vec4::new(r, g, b, 1.0))
}

/// A traverser that replays a fixed message script over a database
///
/// Lets tests feed the builder sequences a well-behaved traverser would
/// never produce.
pub struct ScriptedTraverser {
    pub db: CadDatabase,
    pub script: Vec<Message<EntityId>>,
}

impl EntityAccessor for ScriptedTraverser {
    type Handle = EntityId;

    fn entity_type(&self, entity: EntityId) -> Result<EntityType> {
        self.db.entity_type(entity)
    }

    fn name(&self, entity: EntityId) -> Result<String> {
        self.db.name(entity)
    }

    fn transform(&self, entity: EntityId) -> Option<Mat4> {
        self.db.transform(entity)
    }

    fn material(&self, entity: EntityId) -> Option<Material> {
        self.db.material(entity)
    }

    fn shape_material(&self, part: EntityId, lod: usize, shape: usize) -> Option<Material> {
        self.db.shape_material(part, lod, shape)
    }

    fn num_lods(&self, part: EntityId) -> Result<usize> {
        self.db.num_lods(part)
    }

    fn num_shapes(&self, part: EntityId, lod: usize) -> Result<usize> {
        self.db.num_shapes(part, lod)
    }

    fn shape_type(&self, part: EntityId, lod: usize, shape: usize) -> Result<ShapeType> {
        self.db.shape_type(part, lod, shape)
    }

    fn num_shape_sets(&self, part: EntityId, lod: usize, shape: usize) -> Result<usize> {
        self.db.num_shape_sets(part, lod, shape)
    }

    fn shape_set(&self, part: EntityId, lod: usize, shape: usize, set: usize) -> Result<ShapeSet> {
        self.db.shape_set(part, lod, shape, set)
    }

    fn original(&self, instance: EntityId) -> Option<EntityId> {
        self.db.original(instance)
    }
}

impl Traverser for ScriptedTraverser {
    fn traverse(&mut self, _path: &Path, handler: &mut dyn TraversalHandler<Self>) -> Result<()> {
        for message in self.script.clone() {
            handler.notify(message, self)?;
        }
        Ok(())
    }
}
