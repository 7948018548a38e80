//! Output scene graph
//!
//! The translator produces a directed acyclic graph of nodes reachable from a
//! caller-supplied root. Nodes are shared through [`NodeRef`] handles, so an
//! instance can reuse the children of its original without copying them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::material::Material;

/// How an attribute array maps onto the vertices of a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// One value per vertex
    PerVertex,
    /// One value per primitive (strip, polygon, ...)
    PerPrimitive,
    /// A single value shared by the whole geometry
    Overall,
}

/// Primitive type of a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Triangle strips
    TriangleStrips,
    /// Independent polygons
    Polygons,
    /// Line strips
    LineStrips,
    /// Points
    Points,
}

/// An attribute array together with its binding
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute<T> {
    /// How `values` maps onto the vertices
    pub binding: Binding,
    /// The attribute values
    pub values: Vec<T>,
}

impl<T> Attribute<T> {
    /// Create a bound attribute
    pub fn new(binding: Binding, values: Vec<T>) -> Self {
        Self { binding, values }
    }
}

/// Rendering state attached to one geometry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryState {
    /// Front and back material
    pub material: Option<Material>,
    /// Lighting enabled
    pub lighting: bool,
    /// Alpha blending enabled
    pub transparency: bool,
}

impl GeometryState {
    /// Create a state with no material, lighting off
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the valid channels of `material`
    ///
    /// Returns false (and leaves the state untouched) for an empty material.
    /// A diffuse alpha below one enables transparency; any applied channel
    /// enables lighting.
    pub fn apply_material(&mut self, material: &Material) -> bool {
        if material.is_empty() {
            return false;
        }

        if material.is_transparent() {
            self.transparency = true;
        }

        self.material = Some(*material);
        self.lighting = true;
        true
    }
}

/// A drawable: one vertex buffer split into primitives
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Primitive type
    pub primitive: PrimitiveKind,
    /// Combined vertex buffer of all primitives
    pub vertices: Vec<Vec3>,
    /// Number of vertices of each primitive, in order; sums to `vertices.len()`
    pub primitive_lengths: Vec<usize>,
    /// Optional normals
    pub normals: Option<Attribute<Vec3>>,
    /// Optional RGBA colors
    pub colors: Option<Attribute<Vec4>>,
    /// Optional 2D texture coordinates
    pub tex_coords: Option<Attribute<Vec2>>,
    /// Material and render modes
    pub state: GeometryState,
}

impl Geometry {
    /// Number of primitives
    pub fn num_primitives(&self) -> usize {
        self.primitive_lengths.len()
    }
}

/// What a node is, beyond its name and children
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Plain grouping node
    Group,
    /// Group with a local coordinate system
    Transform(Mat4),
    /// Leaf holding geometries
    Geode(Vec<Geometry>),
}

/// A scene graph node
#[derive(Debug, Clone)]
pub struct Node {
    /// Node name
    pub name: String,
    /// Node type and payload
    pub kind: NodeKind,
    children: Vec<NodeRef>,
}

impl Node {
    /// Create a childless node
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            children: Vec::new(),
        }
    }

    /// Child handles, in insertion order
    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    /// The transformation matrix, for transform nodes
    pub fn matrix(&self) -> Option<Mat4> {
        match self.kind {
            NodeKind::Transform(m) => Some(m),
            _ => None,
        }
    }

    /// The geometries, for geodes
    pub fn geometries(&self) -> &[Geometry] {
        match &self.kind {
            NodeKind::Geode(g) => g,
            _ => &[],
        }
    }
}

/// Shared handle to a scene node
///
/// Cloning the handle shares the node. Use [`NodeRef::ptr_eq`] for identity.
#[derive(Clone)]
pub struct NodeRef(Arc<RwLock<Node>>);

impl NodeRef {
    /// Wrap a node
    pub fn new(node: Node) -> Self {
        Self(Arc::new(RwLock::new(node)))
    }

    /// Create an empty group node
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(Node::new(name, NodeKind::Group))
    }

    /// Create an empty transform node
    pub fn transform(name: impl Into<String>, matrix: Mat4) -> Self {
        Self::new(Node::new(name, NodeKind::Transform(matrix)))
    }

    /// Create an empty geode
    pub fn geode(name: impl Into<String>) -> Self {
        Self::new(Node::new(name, NodeKind::Geode(Vec::new())))
    }

    /// True when both handles point at the same node
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Lock the node for reading
    pub fn read(&self) -> RwLockReadGuard<'_, Node> {
        self.0.read()
    }

    /// Lock the node for writing
    pub fn write(&self) -> RwLockWriteGuard<'_, Node> {
        self.0.write()
    }

    /// The node's name
    pub fn name(&self) -> String {
        self.read().name.clone()
    }

    /// Rename the node
    pub fn set_name(&self, name: impl Into<String>) {
        self.write().name = name.into();
    }

    /// Append a child
    pub fn add_child(&self, child: NodeRef) {
        self.write().children.push(child);
    }

    /// Snapshot of the child handles
    pub fn children(&self) -> Vec<NodeRef> {
        self.read().children.clone()
    }

    /// Number of children
    pub fn num_children(&self) -> usize {
        self.read().children.len()
    }

    /// The i'th child
    pub fn child(&self, index: usize) -> Option<NodeRef> {
        self.read().children.get(index).cloned()
    }

    /// Add a geometry to a geode; returns false for other node kinds
    pub fn add_geometry(&self, geometry: Geometry) -> bool {
        match &mut self.write().kind {
            NodeKind::Geode(geometries) => {
                geometries.push(geometry);
                true
            }
            _ => false,
        }
    }

    /// True when `other` is this node or hangs anywhere below it
    ///
    /// Each shared node is expanded once.
    pub fn reaches(&self, other: &NodeRef) -> bool {
        let mut seen = HashSet::new();
        let mut todo = vec![self.clone()];
        while let Some(node) = todo.pop() {
            if node.ptr_eq(other) {
                return true;
            }
            if seen.insert(Arc::as_ptr(&node.0)) {
                todo.extend(node.children());
            }
        }
        false
    }

    /// Depth-first, pre-order walk
    ///
    /// Shared nodes are visited once per path that reaches them. No lock is
    /// held while `f` runs.
    pub fn visit<F>(&self, f: &mut F)
    where
        F: FnMut(&NodeRef, usize),
    {
        self.visit_at(0, f);
    }

    fn visit_at<F>(&self, depth: usize, f: &mut F)
    where
        F: FnMut(&NodeRef, usize),
    {
        f(self, depth);
        for child in self.children() {
            child.visit_at(depth + 1, f);
        }
    }

    /// First node (pre-order) with the given name
    pub fn find(&self, name: &str) -> Option<NodeRef> {
        let mut found = None;
        self.visit(&mut |node, _| {
            if found.is_none() && node.read().name == name {
                found = Some(node.clone());
            }
        });
        found
    }

    /// Count what hangs below this node
    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats::default();
        self.visit(&mut |node, _| {
            let node = node.read();
            match &node.kind {
                NodeKind::Group => stats.groups += 1,
                NodeKind::Transform(_) => stats.transforms += 1,
                NodeKind::Geode(geometries) => {
                    stats.geodes += 1;
                    stats.geometries += geometries.len();
                    stats.vertices += geometries.iter().map(|g| g.vertices.len()).sum::<usize>();
                }
            }
        });
        stats
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.read();
        let kind = match node.kind {
            NodeKind::Group => "Group",
            NodeKind::Transform(_) => "Transform",
            NodeKind::Geode(_) => "Geode",
        };
        f.debug_struct("NodeRef")
            .field("name", &node.name)
            .field("kind", &kind)
            .field("children", &node.children.len())
            .finish()
    }
}

/// Node and geometry counts of a (sub)graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    /// Plain groups
    pub groups: usize,
    /// Transform nodes
    pub transforms: usize,
    /// Geodes
    pub geodes: usize,
    /// Geometries across all geodes
    pub geometries: usize,
    /// Vertices across all geometries
    pub vertices: usize,
}
