//! Scene construction from traversal messages
//!
//! [`SceneBuilder`] receives the messages of one traversal and grows the
//! scene below a caller-supplied root. It keeps a stack of open groups: the
//! root at the bottom, then one frame per assembly the walk is inside of.
//!
//! Assemblies and parts are recorded by entity handle as they are built so
//! that later instances can share their children. An instance that refers to
//! an entity the walk has not reached yet is parked and resolved once the
//! walk has ended.

pub mod binding;
pub mod geometry;

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use glam::Mat4;

use crate::error::{Error, Result};
use crate::material::Material;
use crate::scene::NodeRef;
use crate::translator::TranslatorConfig;
use crate::traverser::{EntityAccessor, EntityType, Message, TraversalHandler};

pub use binding::infer_binding;
pub use geometry::{ShapeAttributeSet, primitive_kind};

/// Log at info level when verbose, debug level otherwise
macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

pub(crate) use progress;

/// An open group on the builder's stack
#[derive(Debug, Clone)]
pub struct GroupFrame {
    node: NodeRef,
    material: Material,
}

impl GroupFrame {
    /// Create a frame for `node` with the entity's own material
    pub fn new(node: NodeRef, material: Material) -> Self {
        Self { node, material }
    }

    /// The group's scene node
    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    /// The entity's own material, possibly empty
    pub fn material(&self) -> &Material {
        &self.material
    }
}

/// Counts node allocations against an optional limit
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NodeBudget {
    limit: Option<usize>,
    used: usize,
}

impl NodeBudget {
    fn new(limit: Option<usize>) -> Self {
        Self { limit, used: 0 }
    }

    /// Account for one more node
    pub(crate) fn allocate(&mut self) -> Result<()> {
        if let Some(limit) = self.limit {
            if self.used >= limit {
                return Err(Error::NodeLimit(limit));
            }
        }
        self.used += 1;
        Ok(())
    }
}

/// Replaces names the scene cannot hold
///
/// Names containing a line break become `<prefix><N>`, with `N` counting up
/// from zero.
#[derive(Debug, Clone)]
pub struct NameSanitizer {
    prefix: String,
    count: usize,
}

impl NameSanitizer {
    /// Create a sanitizer using `prefix` for placeholder names
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            count: 0,
        }
    }

    /// Return `name`, or a placeholder when it contains `\n` or `\r`
    pub fn sanitize(&mut self, name: String) -> String {
        if !name.contains(['\n', '\r']) {
            return name;
        }

        let replacement = format!("{}{}", self.prefix, self.count);
        self.count += 1;
        tracing::warn!("Name {:?} replaced with '{}'", name, replacement);
        replacement
    }
}

#[derive(Debug, Clone)]
struct PendingInstance<H> {
    node: NodeRef,
    original: H,
}

/// Builds a scene from the messages of one traversal
///
/// Call [`SceneBuilder::begin_translation`] with the root, feed the
/// messages through [`TraversalHandler::notify`] (or the `on_*` methods),
/// then call [`SceneBuilder::finish`].
#[derive(Debug)]
pub struct SceneBuilder<H> {
    config: TranslatorConfig,
    stack: Vec<GroupFrame>,
    groups: HashMap<H, NodeRef>,
    pending: Vec<PendingInstance<H>>,
    names: NameSanitizer,
    budget: NodeBudget,
}

impl<H> SceneBuilder<H>
where
    H: Copy + Eq + Hash + Debug,
{
    /// Create an idle builder
    pub fn new(config: TranslatorConfig) -> Self {
        let names = NameSanitizer::new(config.placeholder_prefix.clone());
        let budget = NodeBudget::new(config.max_nodes);
        Self {
            config,
            stack: Vec::new(),
            groups: HashMap::new(),
            pending: Vec::new(),
            names,
            budget,
        }
    }

    /// Start a translation below `root`
    ///
    /// Discards whatever a previous translation left behind.
    pub fn begin_translation(&mut self, root: NodeRef) {
        self.stack.clear();
        self.groups.clear();
        self.pending.clear();
        self.names = NameSanitizer::new(self.config.placeholder_prefix.clone());
        self.budget = NodeBudget::new(self.config.max_nodes);
        self.stack.push(GroupFrame::new(root, Material::new()));
    }

    /// Number of open groups, the root included
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The innermost open group
    pub fn current(&self) -> Option<&GroupFrame> {
        self.stack.last()
    }

    /// Open a group for an assembly and make it current
    pub fn on_assembly_start<A>(&mut self, accessor: &A, entity: H) -> Result<()>
    where
        A: EntityAccessor<Handle = H> + ?Sized,
    {
        let parent = self.current_node()?;
        let frame = self.create_group(accessor, entity)?;
        let node = frame.node().clone();

        parent.add_child(node.clone());
        self.groups.insert(entity, node.clone());
        self.stack.push(frame);

        progress!(self.config.verbose, "assembly: {}", node.name());
        Ok(())
    }

    /// Build a part with all its LODs and add it to the current group
    pub fn on_part<A>(&mut self, accessor: &A, entity: H) -> Result<()>
    where
        A: EntityAccessor<Handle = H> + ?Sized,
    {
        let parent = self.current_node()?;
        let frame = self.create_group(accessor, entity)?;
        self.add_lods(accessor, entity, &frame)?;

        let node = frame.node().clone();
        parent.add_child(node.clone());
        self.groups.insert(entity, node.clone());

        progress!(self.config.verbose, "part: {}", node.name());
        Ok(())
    }

    /// Add an instance to the current group, sharing its original's children
    ///
    /// The instance keeps its own name and transform. When the original has
    /// not been built yet the instance is parked until [`SceneBuilder::finish`],
    /// unless deferred resolution is turned off.
    pub fn on_instance<A>(&mut self, accessor: &A, entity: H) -> Result<()>
    where
        A: EntityAccessor<Handle = H> + ?Sized,
    {
        let parent = self.current_node()?;
        let frame = self.create_group(accessor, entity)?;
        let node = frame.node().clone();
        let name = node.name();

        let original = accessor
            .original(entity)
            .ok_or_else(|| Error::MissingOriginal(name.clone()))?;

        match self.groups.get(&original) {
            Some(target) => {
                if self.stack.iter().any(|f| f.node().ptr_eq(target)) {
                    return Err(Error::CyclicInstance {
                        instance: name,
                        original: target.name(),
                    });
                }
                share_children(target, &node);
            }
            None if self.config.deferred_instances => {
                tracing::debug!("Deferring instance '{}' of {:?}", name, original);
                self.pending.push(PendingInstance {
                    node: node.clone(),
                    original,
                });
            }
            None => {
                return Err(Error::UnresolvedInstance {
                    instance: name,
                    original: format!("{:?}", original),
                });
            }
        }

        parent.add_child(node);
        progress!(self.config.verbose, "instance: {}", name);
        Ok(())
    }

    /// Close the current group
    ///
    /// The root is never popped.
    pub fn end_current_group(&mut self) -> Result<()> {
        if self.stack.len() < 2 {
            return Err(Error::StackUnderflow);
        }
        self.stack.pop();
        progress!(self.config.verbose, "Done with assembly.");
        Ok(())
    }

    /// Resolve parked instances and check that every group was closed
    ///
    /// An instance that its original already reaches is `CyclicInstance`.
    pub fn finish(&mut self) -> Result<()> {
        for pending in self.pending.drain(..) {
            let name = pending.node.name();
            let target = self
                .groups
                .get(&pending.original)
                .ok_or_else(|| Error::UnresolvedInstance {
                    instance: name.clone(),
                    original: format!("{:?}", pending.original),
                })?;
            if target.reaches(&pending.node) {
                return Err(Error::CyclicInstance {
                    instance: name,
                    original: target.name(),
                });
            }
            share_children(target, &pending.node);
            tracing::debug!("Resolved deferred instance '{}'", name);
        }

        match self.stack.len() {
            1 => Ok(()),
            0 => Err(Error::NotInitialized),
            n => Err(Error::UnbalancedTraversal(n - 1)),
        }
    }

    fn current_node(&self) -> Result<NodeRef> {
        self.stack
            .last()
            .map(|f| f.node().clone())
            .ok_or(Error::NotInitialized)
    }

    fn create_group<A>(&mut self, accessor: &A, entity: H) -> Result<GroupFrame>
    where
        A: EntityAccessor<Handle = H> + ?Sized,
    {
        self.budget.allocate()?;

        let name = self.names.sanitize(accessor.name(entity)?);
        let matrix = accessor.transform(entity).unwrap_or(Mat4::IDENTITY);
        let material = accessor.material(entity).unwrap_or_default();

        Ok(GroupFrame::new(NodeRef::transform(name, matrix), material))
    }
}

/// Append every child of `original` to `instance`
fn share_children(original: &NodeRef, instance: &NodeRef) {
    for child in original.children() {
        instance.add_child(child);
    }
}

impl<A> TraversalHandler<A> for SceneBuilder<A::Handle>
where
    A: EntityAccessor + ?Sized,
{
    fn notify(&mut self, message: Message<A::Handle>, accessor: &A) -> Result<()> {
        let verbose = self.config.verbose;
        match message {
            Message::ImportStart => progress!(verbose, "Importing..."),
            Message::ImportFinish => progress!(verbose, "Done importing."),
            Message::TraversalStart => progress!(verbose, "Starting the traversal..."),
            Message::TraversalFinish => progress!(verbose, "Done traversing."),
            Message::LevelPush => {}
            Message::LevelPop => return self.end_current_group(),
            Message::Entity(entity) => {
                return match accessor.entity_type(entity)? {
                    EntityType::Assembly => self.on_assembly_start(accessor, entity),
                    EntityType::Part => self.on_part(accessor, entity),
                    EntityType::Instance => self.on_instance(accessor, entity),
                    EntityType::Other => {
                        tracing::debug!("Skipping entity {:?}", entity);
                        Ok(())
                    }
                };
            }
        }
        Ok(())
    }
}
