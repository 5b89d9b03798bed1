use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::catalog::CatalogKind;
use crate::components::command::{
    parse_reference, BuildContext, CommandOutcome, CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, InstanceCore};
use crate::components::kinds::connectable::{connector_element, load_connector, parse_connector};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::{
    CatalogId, Connectable, ConnectorGender, ConnectorType, ItemId,
};
use crate::components::xml::XmlElement;

/// Breathing apparatus fed from a gas tank through its connector.
#[derive(Debug, Clone, PartialEq)]
pub struct Rebreather {
    /// The gas the wearer actually breathes.
    pub filter_gas: Option<CatalogId>,
    pub connector: ConnectorType,
}

impl Default for Rebreather {
    fn default() -> Self {
        Self {
            filter_gas: None,
            connector: ConnectorType::new(ConnectorGender::Male, "Gas Line"),
        }
    }
}

impl Rebreather {
    pub const TYPE_NAME: &'static str = "Rebreather";

    pub fn command_table() -> &'static CommandTable<Rebreather> {
        static TABLE: OnceLock<CommandTable<Rebreather>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(&["gas"], "gas <gas> - sets the gas supplied to the wearer", Self::cmd_gas)
                .verb(
                    &["connector", "connection"],
                    "connector <gender> <type> - sets the tank connector",
                    Self::cmd_connector,
                )
        })
    }

    fn cmd_gas(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let gas = parse_reference(ctx, input, CatalogKind::Gas)?;
        self.filter_gas = Some(gas.id);
        Ok(CommandOutcome::Changed(format!(
            "This rebreather now supplies {} (#{}).",
            gas.name, gas.id
        )))
    }

    fn cmd_connector(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.connector = parse_connector(input)?;
        Ok(CommandOutcome::Changed(format!(
            "This rebreather now connects with a {} connector.",
            self.connector
        )))
    }
}

impl ComponentDefinition for Rebreather {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.filter_gas = definition.child_value("FilterGas")?;
        if let Some(connection) = definition.child("Connection") {
            self.connector = load_connector(connection)?;
        }
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
            .with_optional("FilterGas", self.filter_gas)
            .with_child(connector_element(&self.connector))
    }

    fn building_command(
        &mut self,
        verb: &str,
        ctx: &BuildContext<'_>,
        input: &mut StringStack,
    ) -> Option<CommandOutcome> {
        Self::command_table().dispatch(self, verb, ctx, input)
    }

    fn help_lines(&self) -> Vec<String> {
        Self::command_table().help_lines()
    }

    fn describe(&self, ctx: &BuildContext<'_>) -> String {
        format!(
            "This item is a rebreather.\nGas: {}\nConnector: {}\n",
            ctx.catalog.describe(CatalogKind::Gas, self.filter_gas),
            self.connector
        )
    }

    fn why_cannot_submit(&self) -> Option<String> {
        if self.filter_gas.is_none() {
            return Some("You must first set a gas for this rebreather.".to_string());
        }
        None
    }

    fn connectors(&self) -> Vec<ConnectorType> {
        vec![self.connector.clone()]
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
        Box::new(RebreatherInstance {
            core: InstanceCore::new(prototype, parent, temporary),
            tank: None,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct RebreatherInstance {
    core: InstanceCore,
    tank: Option<ItemId>,
}

impl RebreatherInstance {
    pub fn tank(&self) -> Option<ItemId> {
        self.tank
    }

    pub fn connect_tank(&mut self, tank: ItemId, fitting: &dyn Connectable) -> Result<(), String> {
        if self.tank.is_some() {
            return Err("A tank is already connected.".to_string());
        }
        if !self.core.prototype.can_connect_to(fitting) {
            return Err("That tank will not fit this rebreather.".to_string());
        }
        self.tank = Some(tank);
        Ok(())
    }

    pub fn disconnect_tank(&mut self) -> Option<ItemId> {
        self.tank.take()
    }
}

impl ComponentInstance for RebreatherInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        self.core.state_element().with_optional("Tank", self.tank)
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.tank = state.child_value("Tank")?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub fn register(manager: &mut ComponentManager) {
    manager.add_builder_loader("rebreather", true, || Box::new(Rebreather::default()));
    manager.add_database_loader(Rebreather::TYPE_NAME, || Box::new(Rebreather::default()));
    manager.add_type_help_info(
        Rebreather::TYPE_NAME,
        "Supplies breathable gas from a connected tank",
        &long_help(Rebreather::command_table()),
    );
}
