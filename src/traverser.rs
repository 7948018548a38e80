//! Interface to the CAD database
//!
//! The database is owned by an external reader. This module defines the two
//! seams the translator talks through:
//!
//! - [`EntityAccessor`]: read-only queries on entity handles
//! - [`Traverser`]: a depth-first walk that reports each step to a
//!   [`TraversalHandler`]

use std::fmt::Debug;
use std::hash::Hash;
use std::path::Path;

use glam::{Mat4, Vec2, Vec3};

use crate::error::Result;
use crate::material::Material;

/// Entity kinds the translator distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    /// Groups child assemblies, parts and instances
    Assembly,
    /// Leaf entity owning shape geometry
    Part,
    /// Reference to a previously defined assembly or part
    Instance,
    /// Anything else the database reports
    Other,
}

/// Primitive type of a shape, as stored in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    /// Triangle strip set
    TriStripSet,
    /// Polygon set
    PolygonSet,
    /// Line strip set
    LineStripSet,
    /// Point set
    PointSet,
    /// Triangle fan set
    TriFanSet,
    /// Unrecognized database type id
    Unknown(u32),
}

impl ShapeType {
    /// Short name used in documents and messages
    pub fn name(&self) -> String {
        match self {
            ShapeType::TriStripSet => "tri_strip".to_string(),
            ShapeType::PolygonSet => "polygon".to_string(),
            ShapeType::LineStripSet => "line_strip".to_string(),
            ShapeType::PointSet => "point_set".to_string(),
            ShapeType::TriFanSet => "tri_fan".to_string(),
            ShapeType::Unknown(id) => format!("unknown({})", id),
        }
    }

    /// Parse a short name as produced by [`ShapeType::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tri_strip" => Some(ShapeType::TriStripSet),
            "polygon" => Some(ShapeType::PolygonSet),
            "line_strip" => Some(ShapeType::LineStripSet),
            "point_set" => Some(ShapeType::PointSet),
            "tri_fan" => Some(ShapeType::TriFanSet),
            _ => None,
        }
    }
}

/// Validity bit for the vertex array of a [`ShapeSet`]
pub const SHAPE_ARRAY_VERTICES: u32 = 1 << 0;
/// Validity bit for the normal array of a [`ShapeSet`]
pub const SHAPE_ARRAY_NORMALS: u32 = 1 << 1;
/// Validity bit for the color array of a [`ShapeSet`]
pub const SHAPE_ARRAY_COLORS: u32 = 1 << 2;
/// Validity bit for the texture coordinate array of a [`ShapeSet`]
pub const SHAPE_ARRAY_TEXTURE: u32 = 1 << 3;

/// The raw arrays of one geometry set
///
/// An empty array means the database has no data for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeSet {
    /// Vertex positions
    pub vertices: Vec<Vec3>,
    /// Normals
    pub normals: Vec<Vec3>,
    /// RGB colors
    pub colors: Vec<Vec3>,
    /// Texture coordinates
    pub tex_coords: Vec<Vec2>,
}

impl ShapeSet {
    /// Create a set from its vertices
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self {
            vertices,
            ..Default::default()
        }
    }

    /// Set the normals
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = normals;
        self
    }

    /// Set the colors
    pub fn with_colors(mut self, colors: Vec<Vec3>) -> Self {
        self.colors = colors;
        self
    }

    /// Set the texture coordinates
    pub fn with_tex_coords(mut self, tex_coords: Vec<Vec2>) -> Self {
        self.tex_coords = tex_coords;
        self
    }

    /// Bitmask of the non-empty arrays (`SHAPE_ARRAY_*`)
    pub fn valid(&self) -> u32 {
        let mut valid = 0;
        if !self.vertices.is_empty() {
            valid |= SHAPE_ARRAY_VERTICES;
        }
        if !self.normals.is_empty() {
            valid |= SHAPE_ARRAY_NORMALS;
        }
        if !self.colors.is_empty() {
            valid |= SHAPE_ARRAY_COLORS;
        }
        if !self.tex_coords.is_empty() {
            valid |= SHAPE_ARRAY_TEXTURE;
        }
        valid
    }
}

/// Read-only queries on database entities
///
/// LOD, shape and set indices are zero based.
pub trait EntityAccessor {
    /// Opaque entity handle; only compared, hashed and passed back
    type Handle: Copy + Eq + Hash + Debug;

    /// The entity's kind
    fn entity_type(&self, entity: Self::Handle) -> Result<EntityType>;

    /// The entity's name, empty if it has none
    fn name(&self, entity: Self::Handle) -> Result<String>;

    /// The entity's local transformation, if it has one
    fn transform(&self, entity: Self::Handle) -> Option<Mat4>;

    /// The entity's own material, if it has one
    fn material(&self, entity: Self::Handle) -> Option<Material>;

    /// The material of one shape of a part, if it has one
    fn shape_material(&self, part: Self::Handle, lod: usize, shape: usize) -> Option<Material>;

    /// Number of LODs of a part
    fn num_lods(&self, part: Self::Handle) -> Result<usize>;

    /// Number of shapes in one LOD of a part
    fn num_shapes(&self, part: Self::Handle, lod: usize) -> Result<usize>;

    /// Primitive type of one shape
    fn shape_type(&self, part: Self::Handle, lod: usize, shape: usize) -> Result<ShapeType>;

    /// Number of geometry sets of one shape
    fn num_shape_sets(&self, part: Self::Handle, lod: usize, shape: usize) -> Result<usize>;

    /// The arrays of one geometry set
    fn shape_set(&self, part: Self::Handle, lod: usize, shape: usize, set: usize) -> Result<ShapeSet>;

    /// The assembly or part an instance refers to
    fn original(&self, instance: Self::Handle) -> Option<Self::Handle>;
}

/// One step of a traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message<H> {
    /// The database is about to be read
    ImportStart,
    /// The database has been read
    ImportFinish,
    /// The walk is about to begin
    TraversalStart,
    /// The walk has ended
    TraversalFinish,
    /// The walk descended one level
    LevelPush,
    /// The walk ascended one level
    LevelPop,
    /// The walk reached an entity
    Entity(H),
}

/// Receiver of traversal messages
///
/// Returning an error aborts the traversal; the traverser hands the error
/// back unchanged.
pub trait TraversalHandler<A: EntityAccessor + ?Sized> {
    /// Handle one message; `accessor` answers queries about the entity
    fn notify(&mut self, message: Message<A::Handle>, accessor: &A) -> Result<()>;
}

/// A database reader that can walk its product structure
pub trait Traverser: EntityAccessor {
    /// Prepare the traverser; called once before the first traversal
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Read the database at `path` and walk it depth first
    ///
    /// The walk must report every descent with [`Message::LevelPush`] and
    /// match it with exactly one [`Message::LevelPop`].
    fn traverse(&mut self, path: &Path, handler: &mut dyn TraversalHandler<Self>) -> Result<()>;
}
