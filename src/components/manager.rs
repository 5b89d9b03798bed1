//! Component Manager: the keyword/type-name to factory registry.
//!
//! Component types register themselves here instead of being listed in a
//! central match. Authors create prototypes through builder keywords; stored
//! prototypes are rebuilt through their persistence type name. System types
//! register only a database loader so authors can never create them.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::components::errors::ComponentError;
use crate::components::kinds;
use crate::components::proto::{ComponentDefinition, ComponentPrototype, ProtoHeader};

pub type DefinitionFactory = Arc<dyn Fn() -> Box<dyn ComponentDefinition> + Send + Sync>;

#[derive(Clone)]
struct BuilderLoader {
    type_name: &'static str,
    is_default: bool,
    factory: DefinitionFactory,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TypeHelp {
    pub type_name: String,
    pub short_help: String,
    pub long_help: String,
}

#[derive(Clone, Default)]
pub struct ComponentManager {
    builder_loaders: BTreeMap<String, BuilderLoader>,
    database_loaders: BTreeMap<String, DefinitionFactory>,
    type_help: BTreeMap<String, TypeHelp>,
}

impl ComponentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager with every built-in component type registered.
    pub fn with_builtin_types() -> Self {
        let mut manager = Self::new();
        kinds::register_builtin_types(&mut manager);
        debug!(
            "component manager ready: {} builder keywords, {} persisted types",
            manager.builder_loaders.len(),
            manager.database_loaders.len()
        );
        manager
    }

    /// Register an author-facing keyword. Non-default keywords are aliases hidden from type lists.
    pub fn add_builder_loader<F>(&mut self, keyword: &str, is_default: bool, factory: F)
    where
        F: Fn() -> Box<dyn ComponentDefinition> + Send + Sync + 'static,
    {
        let type_name = factory().type_name();
        self.builder_loaders.insert(
            keyword.to_lowercase(),
            BuilderLoader {
                type_name,
                is_default,
                factory: Arc::new(factory),
            },
        );
    }

    /// Register the loader used to rebuild stored prototypes of `type_name`.
    pub fn add_database_loader<F>(&mut self, type_name: &str, factory: F)
    where
        F: Fn() -> Box<dyn ComponentDefinition> + Send + Sync + 'static,
    {
        self.database_loaders
            .insert(type_name.to_lowercase(), Arc::new(factory));
    }

    pub fn add_type_help_info(&mut self, type_name: &str, short_help: &str, long_help: &str) {
        self.type_help.insert(
            type_name.to_lowercase(),
            TypeHelp {
                type_name: type_name.to_string(),
                short_help: short_help.to_string(),
                long_help: long_help.to_string(),
            },
        );
    }

    /// Build a fresh draft for an author from a builder keyword.
    pub fn new_prototype(
        &self,
        keyword: &str,
        id: u64,
        builder: &str,
        name: &str,
    ) -> Result<ComponentPrototype, ComponentError> {
        let loader = self
            .builder_loaders
            .get(&keyword.to_lowercase())
            .ok_or_else(|| ComponentError::UnknownComponentType(keyword.to_string()))?;
        let definition = (loader.factory)();
        if definition.prevent_manual_load() {
            return Err(ComponentError::UnknownComponentType(keyword.to_string()));
        }
        Ok(ComponentPrototype::new(
            ProtoHeader::new_draft(id, builder, name),
            definition,
        ))
    }

    /// Rebuild a stored prototype from its header, type name and `<Definition>` XML.
    pub fn load_prototype(
        &self,
        header: ProtoHeader,
        type_name: &str,
        definition_xml: &str,
    ) -> Result<ComponentPrototype, ComponentError> {
        let factory = self
            .database_loaders
            .get(&type_name.to_lowercase())
            .ok_or_else(|| ComponentError::UnknownComponentType(type_name.to_string()))?;
        let mut prototype = ComponentPrototype::new(header, factory());
        prototype.load_from_xml(definition_xml)?;
        prototype.mark_saved();
        Ok(prototype)
    }

    /// Default builder keywords with the type each creates, sorted by keyword.
    pub fn keywords(&self) -> Vec<(&str, &'static str)> {
        self.builder_loaders
            .iter()
            .filter(|(_, loader)| loader.is_default)
            .map(|(keyword, loader)| (keyword.as_str(), loader.type_name))
            .collect()
    }

    /// Every keyword, aliases included.
    pub fn all_keywords(&self) -> Vec<&str> {
        self.builder_loaders.keys().map(String::as_str).collect()
    }

    pub fn is_persisted_type(&self, type_name: &str) -> bool {
        self.database_loaders.contains_key(&type_name.to_lowercase())
    }

    /// Help for a type, looked up by type name or by any builder keyword.
    pub fn type_help(&self, name: &str) -> Option<&TypeHelp> {
        let key = name.to_lowercase();
        self.type_help.get(&key).or_else(|| {
            let loader = self.builder_loaders.get(&key)?;
            self.type_help.get(&loader.type_name.to_lowercase())
        })
    }

    pub fn all_type_help(&self) -> impl Iterator<Item = &TypeHelp> {
        self.type_help.values()
    }
}
