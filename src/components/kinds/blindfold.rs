use std::any::Any;
use std::sync::Arc;

use crate::components::command::{BuildContext, CommandOutcome};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, StatelessInstance};
use crate::components::kinds::wearable::Wearable;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::ItemId;
use crate::components::xml::XmlElement;

/// Blocks the sight of whoever wears it. Has no settings of its own; the item
/// also needs a wearable component to be put on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blindfold;

impl Blindfold {
    pub const TYPE_NAME: &'static str = "Blindfold";
}

impl ComponentDefinition for Blindfold {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, _definition: &XmlElement) -> Result<(), ComponentError> {
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
    }

    fn building_command(
        &mut self,
        _verb: &str,
        _ctx: &BuildContext<'_>,
        _input: &mut StringStack,
    ) -> Option<CommandOutcome> {
        None
    }

    fn help_lines(&self) -> Vec<String> {
        Vec::new()
    }

    fn describe(&self, _ctx: &BuildContext<'_>) -> String {
        "This item is a blindfold. It must also be wearable to be of any use.\n".to_string()
    }

    fn companion_types(&self) -> &'static [&'static str] {
        &[Wearable::TYPE_NAME]
    }

    fn clone_box(&self) -> Box<dyn ComponentDefinition> {
        Box::new(self.clone())
    }

    fn create_instance(
        &self,
        prototype: Arc<ComponentPrototype>,
        parent: ItemId,
        temporary: bool,
    ) -> Box<dyn ComponentInstance> {
        StatelessInstance::boxed(prototype, parent, temporary)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn register(manager: &mut ComponentManager) {
    manager.add_builder_loader("blindfold", true, || Box::new(Blindfold));
    manager.add_database_loader(Blindfold::TYPE_NAME, || Box::new(Blindfold));
    manager.add_type_help_info(
        Blindfold::TYPE_NAME,
        "Blocks the sight of its wearer; pair with a wearable component",
        "This component type has no building options.",
    );
}
