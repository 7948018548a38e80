//! In-memory CAD database
//!
//! [`CadDatabase`] is a small product-structure store that implements
//! [`Traverser`]. It can be filled through its builder methods or loaded
//! from an XML document (see [`parser`]).
//!
//! # Examples
//!
//! ```
//! use cadscene::database::CadDatabase;
//! use cadscene::traverser::{ShapeSet, ShapeType};
//! use glam::Vec3;
//!
//! # fn main() -> cadscene::Result<()> {
//! let mut db = CadDatabase::new();
//! let top = db.add_assembly(None, "top")?;
//! let bolt = db.add_part(Some(top), "bolt")?;
//! let lod = db.add_lod(bolt)?;
//! let shape = db.add_shape(bolt, lod, ShapeType::PolygonSet)?;
//! db.add_shape_set(bolt, lod, shape, ShapeSet::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y]))?;
//! db.add_instance(Some(top), "bolt copy", Some(bolt))?;
//! assert_eq!(db.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod parser;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use glam::Mat4;

use crate::error::{Error, Result};
use crate::material::Material;
use crate::traverser::{
    EntityAccessor, EntityType, Message, ShapeSet, ShapeType, TraversalHandler, Traverser,
};

pub use parser::parse_database_xml;

/// Handle of an entity in a [`CadDatabase`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

impl EntityId {
    /// Position of the entity in creation order
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Shape {
    shape_type: ShapeType,
    material: Option<Material>,
    sets: Vec<ShapeSet>,
}

#[derive(Debug, Clone, PartialEq)]
enum EntityData {
    Assembly { children: Vec<EntityId> },
    Part { lods: Vec<Vec<Shape>> },
    Instance { original: Option<EntityId> },
    Other,
}

#[derive(Debug, Clone, PartialEq)]
struct Entity {
    name: String,
    transform: Option<Mat4>,
    material: Option<Material>,
    data: EntityData,
}

/// An arena of assemblies, parts and instances
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CadDatabase {
    entities: Vec<Entity>,
    roots: Vec<EntityId>,
}

impl CadDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a database from an XML document on disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Load a database from an XML document
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut xml = String::new();
        reader.read_to_string(&mut xml)?;
        parse_database_xml(&xml)
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when the database holds no entity
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Top-level entities, in walk order
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    /// Children of an assembly; empty for other entities
    pub fn children(&self, entity: EntityId) -> Result<&[EntityId]> {
        match &self.entity(entity)?.data {
            EntityData::Assembly { children } => Ok(children),
            _ => Ok(&[]),
        }
    }

    /// Remove every entity
    pub fn clear(&mut self) {
        self.entities.clear();
        self.roots.clear();
    }

    /// Add an assembly below `parent`, or as a root
    pub fn add_assembly(&mut self, parent: Option<EntityId>, name: impl Into<String>) -> Result<EntityId> {
        self.insert(parent, name.into(), EntityData::Assembly { children: Vec::new() })
    }

    /// Add a part with no LODs below `parent`, or as a root
    pub fn add_part(&mut self, parent: Option<EntityId>, name: impl Into<String>) -> Result<EntityId> {
        self.insert(parent, name.into(), EntityData::Part { lods: Vec::new() })
    }

    /// Add an instance of `original` below `parent`, or as a root
    pub fn add_instance(
        &mut self,
        parent: Option<EntityId>,
        name: impl Into<String>,
        original: Option<EntityId>,
    ) -> Result<EntityId> {
        if let Some(original) = original {
            self.entity(original)?;
        }
        self.insert(parent, name.into(), EntityData::Instance { original })
    }

    /// Add an entity of no kind the translator handles
    pub fn add_other(&mut self, parent: Option<EntityId>, name: impl Into<String>) -> Result<EntityId> {
        self.insert(parent, name.into(), EntityData::Other)
    }

    /// Point an instance at a different original
    pub fn set_original(&mut self, instance: EntityId, original: Option<EntityId>) -> Result<()> {
        if let Some(original) = original {
            self.entity(original)?;
        }
        match &mut self.entity_mut(instance)?.data {
            EntityData::Instance { original: slot } => {
                *slot = original;
                Ok(())
            }
            _ => Err(Error::InvalidEntity(format!("{:?} is not an instance", instance))),
        }
    }

    /// Set an entity's local transformation
    pub fn set_transform(&mut self, entity: EntityId, matrix: Mat4) -> Result<()> {
        self.entity_mut(entity)?.transform = Some(matrix);
        Ok(())
    }

    /// Set an entity's own material
    pub fn set_material(&mut self, entity: EntityId, material: Material) -> Result<()> {
        self.entity_mut(entity)?.material = Some(material);
        Ok(())
    }

    /// Append an empty LOD to a part, returning its index
    pub fn add_lod(&mut self, part: EntityId) -> Result<usize> {
        let lods = self.lods_mut(part)?;
        lods.push(Vec::new());
        Ok(lods.len() - 1)
    }

    /// Append a shape to a LOD, returning its index
    pub fn add_shape(&mut self, part: EntityId, lod: usize, shape_type: ShapeType) -> Result<usize> {
        let shapes = self
            .lods_mut(part)?
            .get_mut(lod)
            .ok_or_else(|| Error::InvalidEntity(format!("{:?} has no LOD {}", part, lod)))?;
        shapes.push(Shape {
            shape_type,
            material: None,
            sets: Vec::new(),
        });
        Ok(shapes.len() - 1)
    }

    /// Set the material of one shape
    pub fn set_shape_material(&mut self, part: EntityId, lod: usize, shape: usize, material: Material) -> Result<()> {
        self.shape_mut(part, lod, shape)?.material = Some(material);
        Ok(())
    }

    /// Append a geometry set to a shape, returning its index
    pub fn add_shape_set(&mut self, part: EntityId, lod: usize, shape: usize, set: ShapeSet) -> Result<usize> {
        let sets = &mut self.shape_mut(part, lod, shape)?.sets;
        sets.push(set);
        Ok(sets.len() - 1)
    }

    fn insert(&mut self, parent: Option<EntityId>, name: String, data: EntityData) -> Result<EntityId> {
        let id = EntityId(self.entities.len());

        match parent {
            Some(parent) => match &mut self.entity_mut(parent)?.data {
                EntityData::Assembly { children } => children.push(id),
                _ => {
                    return Err(Error::InvalidEntity(format!(
                        "{:?} is not an assembly and cannot have children",
                        parent
                    )));
                }
            },
            None => self.roots.push(id),
        }

        self.entities.push(Entity {
            name,
            transform: None,
            material: None,
            data,
        });
        Ok(id)
    }

    fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.entities
            .get(id.0)
            .ok_or_else(|| Error::InvalidEntity(format!("{:?} does not exist", id)))
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.entities
            .get_mut(id.0)
            .ok_or_else(|| Error::InvalidEntity(format!("{:?} does not exist", id)))
    }

    fn lods(&self, part: EntityId) -> Result<&[Vec<Shape>]> {
        match &self.entity(part)?.data {
            EntityData::Part { lods } => Ok(lods),
            _ => Err(Error::InvalidEntity(format!("{:?} is not a part", part))),
        }
    }

    fn lods_mut(&mut self, part: EntityId) -> Result<&mut Vec<Vec<Shape>>> {
        match &mut self.entity_mut(part)?.data {
            EntityData::Part { lods } => Ok(lods),
            _ => Err(Error::InvalidEntity(format!("{:?} is not a part", part))),
        }
    }

    fn shape(&self, part: EntityId, lod: usize, shape: usize) -> Result<&Shape> {
        self.lods(part)?
            .get(lod)
            .and_then(|shapes| shapes.get(shape))
            .ok_or_else(|| Error::InvalidEntity(format!("{:?} has no shape {} in LOD {}", part, shape, lod)))
    }

    fn shape_mut(&mut self, part: EntityId, lod: usize, shape: usize) -> Result<&mut Shape> {
        self.lods_mut(part)?
            .get_mut(lod)
            .and_then(|shapes| shapes.get_mut(shape))
            .ok_or_else(|| Error::InvalidEntity(format!("{:?} has no shape {} in LOD {}", part, shape, lod)))
    }

    fn walk(&self, entity: EntityId, handler: &mut dyn TraversalHandler<Self>) -> Result<()> {
        handler.notify(Message::Entity(entity), self)?;

        if let EntityData::Assembly { children } = &self.entity(entity)?.data {
            handler.notify(Message::LevelPush, self)?;
            for &child in children {
                self.walk(child, handler)?;
            }
            handler.notify(Message::LevelPop, self)?;
        }

        Ok(())
    }
}

impl EntityAccessor for CadDatabase {
    type Handle = EntityId;

    fn entity_type(&self, entity: EntityId) -> Result<EntityType> {
        Ok(match self.entity(entity)?.data {
            EntityData::Assembly { .. } => EntityType::Assembly,
            EntityData::Part { .. } => EntityType::Part,
            EntityData::Instance { .. } => EntityType::Instance,
            EntityData::Other => EntityType::Other,
        })
    }

    fn name(&self, entity: EntityId) -> Result<String> {
        Ok(self.entity(entity)?.name.clone())
    }

    fn transform(&self, entity: EntityId) -> Option<Mat4> {
        self.entity(entity).ok()?.transform
    }

    fn material(&self, entity: EntityId) -> Option<Material> {
        self.entity(entity).ok()?.material
    }

    fn shape_material(&self, part: EntityId, lod: usize, shape: usize) -> Option<Material> {
        self.shape(part, lod, shape).ok()?.material
    }

    fn num_lods(&self, part: EntityId) -> Result<usize> {
        Ok(self.lods(part)?.len())
    }

    fn num_shapes(&self, part: EntityId, lod: usize) -> Result<usize> {
        self.lods(part)?
            .get(lod)
            .map(Vec::len)
            .ok_or_else(|| Error::InvalidEntity(format!("{:?} has no LOD {}", part, lod)))
    }

    fn shape_type(&self, part: EntityId, lod: usize, shape: usize) -> Result<ShapeType> {
        Ok(self.shape(part, lod, shape)?.shape_type)
    }

    fn num_shape_sets(&self, part: EntityId, lod: usize, shape: usize) -> Result<usize> {
        Ok(self.shape(part, lod, shape)?.sets.len())
    }

    fn shape_set(&self, part: EntityId, lod: usize, shape: usize, set: usize) -> Result<ShapeSet> {
        self.shape(part, lod, shape)?
            .sets
            .get(set)
            .cloned()
            .ok_or_else(|| Error::InvalidEntity(format!("{:?} has no set {} in shape {}", part, set, shape)))
    }

    fn original(&self, instance: EntityId) -> Option<EntityId> {
        match self.entity(instance).ok()?.data {
            EntityData::Instance { original } => original,
            _ => None,
        }
    }
}

impl Traverser for CadDatabase {
    /// Walk the database depth first
    ///
    /// A non-empty `path` is loaded first and replaces the current contents.
    /// An empty path walks what is already in memory.
    fn traverse(&mut self, path: &Path, handler: &mut dyn TraversalHandler<Self>) -> Result<()> {
        handler.notify(Message::ImportStart, self)?;
        if !path.as_os_str().is_empty() {
            *self = CadDatabase::from_file(path)?;
        }
        handler.notify(Message::ImportFinish, self)?;

        handler.notify(Message::TraversalStart, self)?;
        for &root in &self.roots {
            self.walk(root, handler)?;
        }
        handler.notify(Message::TraversalFinish, self)
    }
}
