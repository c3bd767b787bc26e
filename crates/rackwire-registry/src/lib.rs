//! Plugin and model registry for rackwire modules.
//!
//! Modules are addressed by a `(plugin slug, model slug)` pair, the same pair
//! a saved patch records for every module. The registry resolves that pair to
//! a factory and to descriptive metadata for listings.
//!
//! # Features
//!
//! - **Model Discovery**: List plugins and their models with metadata
//! - **Factory Pattern**: Create modules by slug at runtime
//! - **Tag System**: Models tagged by role (oscillator, sequencer, ...)
//! - **Layout Info**: Port counts and param descriptors for listings
//!
//! # Example
//!
//! ```rust
//! use rackwire_registry::{ModelTag, Registry, FUNDAMENTAL};
//!
//! let registry = Registry::new();
//!
//! for (plugin, model) in registry.models() {
//!     println!("{}/{}: {}", plugin.slug, model.slug, model.description);
//! }
//!
//! let osc = registry.create(FUNDAMENTAL, "SineOsc").unwrap();
//! assert_eq!(osc.layout().outputs, 2);
//!
//! for (_, model) in registry.models_with_tag(ModelTag::Utility) {
//!     println!("utility: {}", model.name);
//! }
//! ```

use rackwire_core::{Module, ModuleLayout};
use rackwire_modules::{Attenuverter, Constant, Mixer, SineOsc, StepSequencer, Thru};

/// Slug of the plugin holding the built-in modules.
pub const FUNDAMENTAL: &str = "Fundamental";

/// Errors from resolving a plugin or model slug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No plugin is registered under this slug.
    #[error("plugin not found: {0}")]
    PluginNotFound(String),

    /// The plugin exists but has no model under this slug.
    #[error("model not found: {plugin}/{model}")]
    ModelNotFound {
        /// Plugin slug.
        plugin: String,
        /// Model slug.
        model: String,
    },
}

/// Role of a model, for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTag {
    /// Sound and LFO sources
    Oscillator,
    /// Clocked pattern generators
    Sequencer,
    /// Summing and level control
    Mixer,
    /// Scaling, offsetting and polarity
    Attenuator,
    /// Fixed voltages, buffers and other plumbing
    Utility,
}

impl ModelTag {
    /// Returns a human-readable name for the tag.
    pub const fn name(&self) -> &'static str {
        match self {
            ModelTag::Oscillator => "Oscillator",
            ModelTag::Sequencer => "Sequencer",
            ModelTag::Mixer => "Mixer",
            ModelTag::Attenuator => "Attenuator",
            ModelTag::Utility => "Utility",
        }
    }
}

/// Factory function type for creating modules.
pub type ModuleFactory = fn() -> Box<dyn Module>;

/// Describes a model in the registry.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    /// Identifier stored in patches, unique within its plugin.
    pub slug: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Brief description.
    pub description: &'static str,
    /// Roles for filtering.
    pub tags: &'static [ModelTag],
}

/// Describes a plugin: a named group of models.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    /// Identifier stored in patches.
    pub slug: &'static str,
    /// Human-readable name.
    pub name: &'static str,
}

struct ModelEntry {
    descriptor: ModelDescriptor,
    factory: ModuleFactory,
}

struct PluginEntry {
    descriptor: PluginDescriptor,
    models: Vec<ModelEntry>,
}

/// Registry of every plugin and model the process can instantiate.
///
/// [`Registry::new`] registers the built-in [`FUNDAMENTAL`] plugin.
/// Lookups are by exact, case-sensitive slug.
pub struct Registry {
    plugins: Vec<PluginEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry holding the built-in plugin.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_fundamental();
        registry
    }

    /// Create a registry with no plugins.
    pub fn empty() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    fn register_fundamental(&mut self) {
        let models: [(ModelDescriptor, ModuleFactory); 6] = [
            (
                ModelDescriptor {
                    slug: "Constant",
                    name: "Constant",
                    description: "Fixed voltage source",
                    tags: &[ModelTag::Utility],
                },
                || Box::new(Constant::new()),
            ),
            (
                ModelDescriptor {
                    slug: "Thru",
                    name: "Thru",
                    description: "Unity buffer",
                    tags: &[ModelTag::Utility],
                },
                || Box::new(Thru::new()),
            ),
            (
                ModelDescriptor {
                    slug: "Attenuverter",
                    name: "Attenuverter",
                    description: "Scale, invert and offset a signal",
                    tags: &[ModelTag::Attenuator, ModelTag::Utility],
                },
                || Box::new(Attenuverter::new()),
            ),
            (
                ModelDescriptor {
                    slug: "Mixer",
                    name: "Mixer",
                    description: "Four-channel mixer with master level",
                    tags: &[ModelTag::Mixer],
                },
                || Box::new(Mixer::new()),
            ),
            (
                ModelDescriptor {
                    slug: "SineOsc",
                    name: "Sine Oscillator",
                    description: "1 V/oct sine and square oscillator",
                    tags: &[ModelTag::Oscillator],
                },
                || Box::new(SineOsc::new()),
            ),
            (
                ModelDescriptor {
                    slug: "StepSequencer",
                    name: "Step Sequencer",
                    description: "Eight-step CV and gate sequencer",
                    tags: &[ModelTag::Sequencer],
                },
                || Box::new(StepSequencer::new()),
            ),
        ];
        self.plugins.push(PluginEntry {
            descriptor: PluginDescriptor {
                slug: FUNDAMENTAL,
                name: "Fundamental",
            },
            models: models
                .into_iter()
                .map(|(descriptor, factory)| ModelEntry {
                    descriptor,
                    factory,
                })
                .collect(),
        });
    }

    /// Register a plugin. Re-registering a slug keeps the existing models and
    /// replaces the descriptor.
    pub fn register_plugin(&mut self, descriptor: PluginDescriptor) {
        if let Some(entry) = self
            .plugins
            .iter_mut()
            .find(|p| p.descriptor.slug == descriptor.slug)
        {
            entry.descriptor = descriptor;
        } else {
            self.plugins.push(PluginEntry {
                descriptor,
                models: Vec::new(),
            });
        }
    }

    /// Register a model under an existing plugin. A model with the same slug
    /// is replaced.
    pub fn register_model(
        &mut self,
        plugin: &str,
        descriptor: ModelDescriptor,
        factory: ModuleFactory,
    ) -> Result<(), RegistryError> {
        let entry = self.plugin_entry_mut(plugin)?;
        let model = ModelEntry {
            descriptor,
            factory,
        };
        match entry
            .models
            .iter_mut()
            .find(|m| m.descriptor.slug == model.descriptor.slug)
        {
            Some(existing) => *existing = model,
            None => entry.models.push(model),
        }
        Ok(())
    }

    /// All plugins in registration order.
    pub fn plugins(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.plugins.iter().map(|p| &p.descriptor)
    }

    /// Every model of every plugin, paired with its plugin.
    pub fn models(&self) -> impl Iterator<Item = (&PluginDescriptor, &ModelDescriptor)> {
        self.plugins.iter().flat_map(|p| {
            p.models
                .iter()
                .map(move |m| (&p.descriptor, &m.descriptor))
        })
    }

    /// Models of one plugin.
    pub fn plugin_models(
        &self,
        plugin: &str,
    ) -> Result<impl Iterator<Item = &ModelDescriptor>, RegistryError> {
        Ok(self
            .plugin_entry(plugin)?
            .models
            .iter()
            .map(|m| &m.descriptor))
    }

    /// Models carrying a tag.
    pub fn models_with_tag(
        &self,
        tag: ModelTag,
    ) -> Vec<(&PluginDescriptor, &ModelDescriptor)> {
        self.models()
            .filter(|(_, m)| m.tags.contains(&tag))
            .collect()
    }

    /// Get a model's descriptor.
    pub fn get(&self, plugin: &str, model: &str) -> Result<&ModelDescriptor, RegistryError> {
        self.model_entry(plugin, model).map(|m| &m.descriptor)
    }

    /// Create a fresh module instance.
    ///
    /// The module's `on_create` hook is not called here; callers that add
    /// the module to a rack call it.
    pub fn create(&self, plugin: &str, model: &str) -> Result<Box<dyn Module>, RegistryError> {
        self.model_entry(plugin, model).map(|m| (m.factory)())
    }

    /// Port and param layout of a model.
    pub fn layout(&self, plugin: &str, model: &str) -> Result<ModuleLayout, RegistryError> {
        self.create(plugin, model).map(|m| m.layout())
    }

    /// Find a param index by name (case-insensitive).
    pub fn param_index_by_name(&self, plugin: &str, model: &str, name: &str) -> Option<usize> {
        let layout = self.layout(plugin, model).ok()?;
        layout
            .params
            .iter()
            .position(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Total number of models.
    pub fn len(&self) -> usize {
        self.plugins.iter().map(|p| p.models.len()).sum()
    }

    /// True when no model is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn plugin_entry(&self, plugin: &str) -> Result<&PluginEntry, RegistryError> {
        self.plugins
            .iter()
            .find(|p| p.descriptor.slug == plugin)
            .ok_or_else(|| RegistryError::PluginNotFound(plugin.to_string()))
    }

    fn plugin_entry_mut(&mut self, plugin: &str) -> Result<&mut PluginEntry, RegistryError> {
        self.plugins
            .iter_mut()
            .find(|p| p.descriptor.slug == plugin)
            .ok_or_else(|| RegistryError::PluginNotFound(plugin.to_string()))
    }

    fn model_entry(&self, plugin: &str, model: &str) -> Result<&ModelEntry, RegistryError> {
        self.plugin_entry(plugin)?
            .models
            .iter()
            .find(|m| m.descriptor.slug == model)
            .ok_or_else(|| RegistryError::ModelNotFound {
                plugin: plugin.to_string(),
                model: model.to_string(),
            })
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("plugins", &self.plugins().map(|p| p.slug).collect::<Vec<_>>())
            .field("models", &self.len())
            .finish()
    }
}
