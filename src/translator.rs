//! Translator facade
//!
//! Ties a [`Traverser`] to a [`SceneBuilder`]: one call to
//! [`Translator::translate`] reads a database and appends its product
//! structure below a caller-supplied root.

use std::path::Path;

use crate::builder::{SceneBuilder, progress};
use crate::error::{Error, Result};
use crate::scene::NodeRef;
use crate::traverser::Traverser;

/// Prefix of the names given to entities whose name cannot be used
pub const DEFAULT_PLACEHOLDER_PREFIX: &str = "Replaced_name_";

/// Translation options
///
/// # Examples
///
/// ```
/// use cadscene::TranslatorConfig;
///
/// let config = TranslatorConfig::new()
///     .with_verbose(true)
///     .with_max_nodes(10_000);
/// assert!(config.deferred_instances);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorConfig {
    /// Log progress at info level instead of debug level
    pub verbose: bool,
    /// Upper bound on the nodes one translation may create
    ///
    /// `None` means unlimited. Exceeding the bound fails the translation
    /// with [`Error::NodeLimit`].
    pub max_nodes: Option<usize>,
    /// Resolve instances whose original appears later in the walk
    ///
    /// When false such instances fail immediately with
    /// [`Error::UnresolvedInstance`].
    pub deferred_instances: bool,
    /// Prefix for replacement names
    pub placeholder_prefix: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            max_nodes: None,
            deferred_instances: true,
            placeholder_prefix: DEFAULT_PLACEHOLDER_PREFIX.to_string(),
        }
    }
}

impl TranslatorConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbose progress logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Limit the number of nodes a translation may create
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    /// Enable or disable deferred instance resolution
    pub fn with_deferred_instances(mut self, deferred: bool) -> Self {
        self.deferred_instances = deferred;
        self
    }

    /// Set the prefix for replacement names
    pub fn with_placeholder_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.placeholder_prefix = prefix.into();
        self
    }
}

/// Translates CAD databases into scene graphs
///
/// The translator owns its traverser. Call [`Translator::init`] once, then
/// [`Translator::translate`] as often as needed. Translations are
/// independent: no entity-to-node mapping survives from one to the next.
///
/// On failure the scene below the root is left as far as it got; the error
/// is returned and its message is kept for [`Translator::last_error`].
#[derive(Debug)]
pub struct Translator<T: Traverser> {
    traverser: T,
    config: TranslatorConfig,
    initialized: bool,
    last_error: Option<String>,
}

impl<T: Traverser> Translator<T> {
    /// Create a translator around `traverser`
    pub fn new(traverser: T, config: TranslatorConfig) -> Self {
        Self {
            traverser,
            config,
            initialized: false,
            last_error: None,
        }
    }

    /// Initialize the traverser
    pub fn init(&mut self) -> Result<()> {
        let result = self.traverser.init();
        self.initialized = result.is_ok();
        self.record(result)
    }

    /// True once [`Translator::init`] has succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Read the database at `path` and append its scene below `root`
    pub fn translate(&mut self, path: impl AsRef<Path>, root: &NodeRef) -> Result<()> {
        let result = self.run(path.as_ref(), root);
        self.record(result)
    }

    fn run(&mut self, path: &Path, root: &NodeRef) -> Result<()> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }

        progress!(self.config.verbose, "Translating '{}'", path.display());

        let mut builder = SceneBuilder::<T::Handle>::new(self.config.clone());
        builder.begin_translation(root.clone());
        self.traverser.traverse(path, &mut builder)?;
        builder.finish()
    }

    fn record(&mut self, result: Result<()>) -> Result<()> {
        match &result {
            Ok(()) => self.last_error = None,
            Err(e) => {
                tracing::error!("{}", e);
                self.last_error = Some(e.to_string());
            }
        }
        result
    }

    /// Message of the most recent failure, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Switch verbose progress logging
    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    /// The active configuration
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// The traverser
    pub fn traverser(&self) -> &T {
        &self.traverser
    }

    /// The traverser, mutably
    pub fn traverser_mut(&mut self) -> &mut T {
        &mut self.traverser
    }

    /// Take the traverser back
    pub fn into_traverser(self) -> T {
        self.traverser
    }
}
