//! Error types for CAD-to-scene translation
//!
//! Every error carries a code for categorization and enough context to find
//! the offending entity in the source database.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and traversal errors
//! - **E2xxx**: Database document errors
//! - **E3xxx**: Scene construction errors
//! - **E4xxx**: Usage and contract errors
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error reading a database
//! - `E2001`: XML parsing error
//! - `E2003`: Invalid XML structure
//! - `E2004`: Invalid database contents
//! - `E3001`: Unsupported shape type
//! - `E3002`: Attribute array length matches no binding
//! - `E3006`: Instance could not be resolved
//! - `E3008`: Group stack underflow

use std::io;
use thiserror::Error;

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while translating a CAD database
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading the database
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - File not found
    /// - Insufficient permissions
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// XML parsing error
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - Malformed XML syntax
    /// - Unclosed tags
    #[error("[E2001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    ///
    /// **Error Code**: E2002
    #[error("[E2002] XML attribute error: {0}")]
    XmlAttr(String),

    /// Invalid XML structure
    ///
    /// **Error Code**: E2003
    ///
    /// **Common Causes**:
    /// - Missing required attributes
    /// - Elements nested in the wrong place
    #[error("[E2003] Invalid XML structure: {0}")]
    InvalidXml(String),

    /// The database contents are inconsistent
    ///
    /// **Error Code**: E2004
    ///
    /// **Common Causes**:
    /// - An instance references an unknown part or assembly key
    /// - Duplicate keys
    #[error("[E2004] Invalid database: {0}")]
    InvalidDatabase(String),

    /// Parse error for numeric values
    ///
    /// **Error Code**: E2005
    #[error("[E2005] Parse error: {0}")]
    ParseError(String),

    /// The shape's primitive type has no scene-graph counterpart
    ///
    /// **Error Code**: E3001
    #[error(
        "[E3001] Unknown shape type '{shape_type}' for entity = {entity}, LOD = {lod}, shape = {shape}"
    )]
    UnsupportedShape {
        /// Name of the owning part
        entity: String,
        /// The shape type reported by the database
        shape_type: String,
        /// LOD index
        lod: usize,
        /// Shape index within the LOD
        shape: usize,
    },

    /// An attribute array length matches neither the vertex count, the
    /// primitive count, nor a single shared value
    ///
    /// **Error Code**: E3002
    ///
    /// **Common Causes**:
    /// - Corrupt source database
    /// - Unsupported attribute indexing scheme
    #[error(
        "[E3002] Inconsistent {attribute} count {count} for entity = {entity}, LOD = {lod}, shape = {shape} \
         ({vertices} vertices in {primitives} primitives)"
    )]
    InconsistentAttribute {
        /// Which attribute ("normals", "colors", "texture coordinates")
        attribute: &'static str,
        /// Number of attribute values
        count: usize,
        /// Total vertex count of the shape
        vertices: usize,
        /// Number of primitives of the shape
        primitives: usize,
        /// Name of the owning part
        entity: String,
        /// LOD index
        lod: usize,
        /// Shape index within the LOD
        shape: usize,
    },

    /// A geometry set contributed no vertices
    ///
    /// **Error Code**: E3003
    #[error("[E3003] Empty vertex set for entity = {entity}, LOD = {lod}, shape = {shape}, set = {set}")]
    EmptyGeometrySet {
        /// Name of the owning part
        entity: String,
        /// LOD index
        lod: usize,
        /// Shape index within the LOD
        shape: usize,
        /// Geometry set index within the shape
        set: usize,
    },

    /// A shape has no geometry sets at all
    ///
    /// **Error Code**: E3004
    #[error("[E3004] Shape has no geometry sets: entity = {entity}, LOD = {lod}, shape = {shape}")]
    EmptyShape {
        /// Name of the owning part
        entity: String,
        /// LOD index
        lod: usize,
        /// Shape index within the LOD
        shape: usize,
    },

    /// The database could not name the original of an instance
    ///
    /// **Error Code**: E3005
    #[error("[E3005] Instance '{0}' has no original entity")]
    MissingOriginal(String),

    /// An instance's original was never built during the traversal
    ///
    /// **Error Code**: E3006
    ///
    /// **Common Causes**:
    /// - Instance of an entity type that produces no node
    /// - Forward reference with deferred resolution disabled
    #[error("[E3006] Unresolved instance '{instance}' of original {original}")]
    UnresolvedInstance {
        /// Name of the instance
        instance: String,
        /// Debug representation of the original's handle
        original: String,
    },

    /// An instance appears inside the subtree of its own original
    ///
    /// **Error Code**: E3007
    #[error("[E3007] Instance '{instance}' is nested inside its original '{original}'")]
    CyclicInstance {
        /// Name of the instance
        instance: String,
        /// Name of the original's node
        original: String,
    },

    /// A level pop arrived while only the root group was on the stack
    ///
    /// **Error Code**: E3008
    ///
    /// **Common Causes**:
    /// - Traverser emitted more pops than pushes
    #[error("[E3008] Group stack underflow: level pop with only the root group on the stack")]
    StackUnderflow,

    /// The traversal finished with groups still open
    ///
    /// **Error Code**: E3009
    #[error("[E3009] Unbalanced traversal: {0} group(s) still open after traversal")]
    UnbalancedTraversal(usize),

    /// The configured node budget was exhausted
    ///
    /// **Error Code**: E3010
    #[error("[E3010] Node limit of {0} exceeded")]
    NodeLimit(usize),

    /// `translate` was called before `init`
    ///
    /// **Error Code**: E4001
    #[error("[E4001] Translator not initialized")]
    NotInitialized,

    /// The accessor was queried with a handle it cannot answer for
    ///
    /// **Error Code**: E4002
    #[error("[E4002] Invalid entity: {0}")]
    InvalidEntity(String),
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::ParseError(format!("Failed to parse integer: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(format!("Attribute parsing failed: {}", err))
    }
}

impl Error {
    /// Create an InvalidXml error with element context
    ///
    /// # Arguments
    /// * `element` - The XML element name where the error occurred
    /// * `message` - Description of the error
    pub fn invalid_xml_element(element: &str, message: &str) -> Self {
        Error::InvalidXml(format!("Element '<{}>': {}", element, message))
    }

    /// Create an InvalidXml error for a missing required attribute
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Error::InvalidXml(format!(
            "Element '<{}>' is missing required attribute '{}'",
            element, attribute
        ))
    }

    /// Create a ParseError with context about what was being parsed
    ///
    /// # Arguments
    /// * `field_name` - The name of the field being parsed (e.g., "vertices")
    /// * `value` - The value that failed to parse
    /// * `expected_type` - The expected type (e.g., "floating-point number")
    pub fn parse_error_with_context(field_name: &str, value: &str, expected_type: &str) -> Self {
        Error::ParseError(format!(
            "Failed to parse '{}': expected {}, got '{}'",
            field_name, expected_type, value
        ))
    }

    /// True for errors raised while building the scene (E3xxx)
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedShape { .. }
                | Error::InconsistentAttribute { .. }
                | Error::EmptyGeometrySet { .. }
                | Error::EmptyShape { .. }
                | Error::MissingOriginal(_)
                | Error::UnresolvedInstance { .. }
                | Error::CyclicInstance { .. }
                | Error::StackUnderflow
                | Error::UnbalancedTraversal(_)
                | Error::NodeLimit(_)
        )
    }
}
