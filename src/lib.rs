//! # cadscene
//!
//! Translate hierarchical CAD product-structure databases into renderable
//! scene graphs.
//!
//! A CAD database describes a product as a tree of assemblies, parts and
//! instances. Parts own geometry at several levels of detail; instances
//! reuse an assembly or part elsewhere in the tree. The translator walks
//! such a database through the [`Traverser`] seam and grows a scene graph of
//! shared [`NodeRef`] handles below a root the caller supplies.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Group stack that mirrors the assembly hierarchy
//! - Normal, color and texture-coordinate binding inferred from array lengths
//! - Shape, part and assembly material cascade
//! - Instances share their original's children, even when the original is
//!   defined later in the walk
//! - An in-memory reference database with an XML loader
//!
//! ## Example
//!
//! ```
//! use cadscene::database::CadDatabase;
//! use cadscene::traverser::{ShapeSet, ShapeType};
//! use cadscene::{NodeRef, Translator, TranslatorConfig};
//! use glam::Vec3;
//!
//! # fn main() -> cadscene::Result<()> {
//! let mut db = CadDatabase::new();
//! let top = db.add_assembly(None, "top")?;
//! let plate = db.add_part(Some(top), "plate")?;
//! let lod = db.add_lod(plate)?;
//! let shape = db.add_shape(plate, lod, ShapeType::TriStripSet)?;
//! db.add_shape_set(
//!     plate,
//!     lod,
//!     shape,
//!     ShapeSet::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)]),
//! )?;
//!
//! let mut translator = Translator::new(db, TranslatorConfig::default());
//! translator.init()?;
//!
//! let root = NodeRef::group("root");
//! // An empty path walks the in-memory database
//! translator.translate("", &root)?;
//!
//! assert!(root.find("part=plate,lod=0").is_some());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod database;
pub mod error;
pub mod material;
pub mod scene;
pub mod translator;
pub mod traverser;

pub use builder::SceneBuilder;
pub use database::{CadDatabase, EntityId};
pub use error::{Error, Result};
pub use material::Material;
pub use scene::{Binding, Geometry, GeometryState, Node, NodeKind, NodeRef, PrimitiveKind};
pub use translator::{Translator, TranslatorConfig};
pub use traverser::{EntityAccessor, EntityType, Message, ShapeSet, ShapeType, TraversalHandler, Traverser};
