//! Geometry construction for parts
//!
//! Each LOD of a part becomes a group holding one geode. Each shape of the
//! LOD becomes one [`Geometry`] in that geode, built from all of the shape's
//! geometry sets concatenated into one vertex buffer.

use std::fmt::Debug;
use std::hash::Hash;

use glam::{Vec2, Vec3, Vec4};

use super::binding::infer_binding;
use super::{GroupFrame, SceneBuilder};
use crate::error::{Error, Result};
use crate::material;
use crate::scene::{Attribute, Geometry, GeometryState, NodeRef, PrimitiveKind};
use crate::traverser::{EntityAccessor, ShapeSet, ShapeType};

/// Map a database shape type onto a scene primitive
///
/// Triangle fans have no counterpart and map to `None`, like unknown types.
pub fn primitive_kind(shape_type: ShapeType) -> Option<PrimitiveKind> {
    match shape_type {
        ShapeType::TriStripSet => Some(PrimitiveKind::TriangleStrips),
        ShapeType::PolygonSet => Some(PrimitiveKind::Polygons),
        ShapeType::LineStripSet => Some(PrimitiveKind::LineStrips),
        ShapeType::PointSet => Some(PrimitiveKind::Points),
        ShapeType::TriFanSet | ShapeType::Unknown(_) => None,
    }
}

/// Where a shape sits, for error messages
#[derive(Debug, Clone)]
struct ShapeLocation<'a> {
    entity: &'a str,
    lod: usize,
    shape: usize,
}

/// The arrays of every geometry set of one shape, concatenated
///
/// `primitive_lengths[i]` is the number of vertices set `i` contributed.
#[derive(Debug, Clone, Default)]
pub struct ShapeAttributeSet {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    colors: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    primitive_lengths: Vec<usize>,
}

impl ShapeAttributeSet {
    /// Create an empty aggregate for `num_sets` sets
    pub fn with_capacity(num_sets: usize) -> Self {
        Self {
            primitive_lengths: Vec::with_capacity(num_sets),
            ..Default::default()
        }
    }

    /// Append one geometry set
    pub fn append(&mut self, set: ShapeSet) {
        self.primitive_lengths.push(set.vertices.len());
        self.vertices.extend(set.vertices);
        self.normals.extend(set.normals);
        self.colors.extend(set.colors);
        self.tex_coords.extend(set.tex_coords);
    }

    /// Total number of vertices
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of primitives (one per appended set)
    pub fn num_primitives(&self) -> usize {
        self.primitive_lengths.len()
    }

    fn into_geometry(self, primitive: PrimitiveKind, state: GeometryState, at: &ShapeLocation<'_>) -> Result<Geometry> {
        let vertices = self.vertices.len();
        let primitives = self.primitive_lengths.len();

        let normals = bind("normals", self.normals, vertices, primitives, at)?;
        let colors = bind(
            "colors",
            self.colors.into_iter().map(|c| c.extend(1.0)).collect::<Vec<Vec4>>(),
            vertices,
            primitives,
            at,
        )?;
        let tex_coords = bind("texture coordinates", self.tex_coords, vertices, primitives, at)?;

        Ok(Geometry {
            primitive,
            vertices: self.vertices,
            primitive_lengths: self.primitive_lengths,
            normals,
            colors,
            tex_coords,
            state,
        })
    }
}

fn bind<T>(
    attribute: &'static str,
    values: Vec<T>,
    vertices: usize,
    primitives: usize,
    at: &ShapeLocation<'_>,
) -> Result<Option<Attribute<T>>> {
    if values.is_empty() {
        return Ok(None);
    }

    match infer_binding(values.len(), vertices, primitives) {
        Some(binding) => Ok(Some(Attribute::new(binding, values))),
        None => Err(Error::InconsistentAttribute {
            attribute,
            count: values.len(),
            vertices,
            primitives,
            entity: at.entity.to_string(),
            lod: at.lod,
            shape: at.shape,
        }),
    }
}

impl<H> SceneBuilder<H>
where
    H: Copy + Eq + Hash + Debug,
{
    /// Add one child per LOD to the part's node
    pub(super) fn add_lods<A>(&mut self, accessor: &A, entity: H, part: &GroupFrame) -> Result<()>
    where
        A: EntityAccessor<Handle = H> + ?Sized,
    {
        let part_name = part.node().name();
        let num_lods = accessor.num_lods(entity)?;
        if num_lods == 0 {
            tracing::warn!("Part '{}' has no LODs", part_name);
        }

        for lod in 0..num_lods {
            let lod_node = self.build_lod(accessor, entity, lod, part, &part_name)?;
            part.node().add_child(lod_node);
        }

        Ok(())
    }

    fn build_lod<A>(&mut self, accessor: &A, entity: H, lod: usize, part: &GroupFrame, part_name: &str) -> Result<NodeRef>
    where
        A: EntityAccessor<Handle = H> + ?Sized,
    {
        let num_shapes = accessor.num_shapes(entity, lod)?;
        let name = format!("part={},lod={}", part_name, lod);

        self.budget.allocate()?;
        let group = NodeRef::group(name.as_str());
        self.budget.allocate()?;
        let geode = NodeRef::geode(name.as_str());

        for shape in 0..num_shapes {
            let at = ShapeLocation {
                entity: part_name,
                lod,
                shape,
            };
            let geometry = self.build_shape(accessor, entity, part, &at)?;
            geode.add_geometry(geometry);
        }

        group.add_child(geode);
        Ok(group)
    }

    fn build_shape<A>(&self, accessor: &A, entity: H, part: &GroupFrame, at: &ShapeLocation<'_>) -> Result<Geometry>
    where
        A: EntityAccessor<Handle = H> + ?Sized,
    {
        let (lod, shape) = (at.lod, at.shape);

        let shape_type = accessor.shape_type(entity, lod, shape)?;
        let primitive = primitive_kind(shape_type).ok_or_else(|| Error::UnsupportedShape {
            entity: at.entity.to_string(),
            shape_type: shape_type.name(),
            lod,
            shape,
        })?;

        let num_sets = accessor.num_shape_sets(entity, lod, shape)?;
        if num_sets == 0 {
            return Err(Error::EmptyShape {
                entity: at.entity.to_string(),
                lod,
                shape,
            });
        }

        let mut attributes = ShapeAttributeSet::with_capacity(num_sets);
        for set in 0..num_sets {
            let data = accessor.shape_set(entity, lod, shape, set)?;
            if data.vertices.is_empty() {
                return Err(Error::EmptyGeometrySet {
                    entity: at.entity.to_string(),
                    lod,
                    shape,
                    set,
                });
            }
            attributes.append(data);
        }

        let mut state = GeometryState::new();
        let shape_material = accessor.shape_material(entity, lod, shape);
        let assemblies = self.stack.iter().map(GroupFrame::material);
        if let Some(found) = material::resolve(shape_material.as_ref(), part.material(), assemblies) {
            state.apply_material(found);
        }

        attributes.into_geometry(primitive, state, at)
    }
}
