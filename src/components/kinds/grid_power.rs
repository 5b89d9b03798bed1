use std::any::Any;
use std::sync::Arc;

use crate::components::command::{BuildContext, CommandOutcome};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, StatelessInstance};
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::{ConnectorGender, ConnectorType, ItemId};
use crate::components::xml::XmlElement;

/// Wall socket feeding machines from the local electrical grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridPowerSupply;

impl GridPowerSupply {
    pub const TYPE_NAME: &'static str = "GridPowerSupply";
    pub const CONNECTION_TYPE: &'static str = "Grid Power";
}

impl ComponentDefinition for GridPowerSupply {
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
        format!(
            "This item supplies power from the grid through a {} socket.\n",
            ConnectorType::new(ConnectorGender::Female, Self::CONNECTION_TYPE)
        )
    }

    fn connectors(&self) -> Vec<ConnectorType> {
        vec![ConnectorType::new(ConnectorGender::Female, Self::CONNECTION_TYPE)]
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
    manager.add_builder_loader("gridpowersupply", true, || Box::new(GridPowerSupply));
    manager.add_builder_loader("gridpower", false, || Box::new(GridPowerSupply));
    manager.add_database_loader(GridPowerSupply::TYPE_NAME, || Box::new(GridPowerSupply));
    manager.add_type_help_info(
        GridPowerSupply::TYPE_NAME,
        "A socket that supplies power from the electrical grid",
        "This component type has no building options.",
    );
}
