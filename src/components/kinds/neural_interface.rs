use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::bases::ImplantBase;
use crate::components::command::{
    parse_number, BuildContext, CommandOutcome, CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{load_item_ids, save_item_ids, ComponentInstance, InstanceCore};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::ItemId;
use crate::components::xml::XmlElement;

/// Brain implant that other implants link to for control.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralInterface {
    pub implant: ImplantBase,
    pub maximum_connections: u32,
}

impl Default for NeuralInterface {
    fn default() -> Self {
        Self {
            implant: ImplantBase::default(),
            maximum_connections: 1,
        }
    }
}

impl NeuralInterface {
    pub const TYPE_NAME: &'static str = "NeuralInterface";

    pub fn command_table() -> &'static CommandTable<NeuralInterface> {
        static TABLE: OnceLock<CommandTable<NeuralInterface>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["connections", "links"],
                    "connections <number> - sets how many implants can link at once",
                    Self::cmd_connections,
                )
                .overlay(ImplantBase::command_table(), |leaf| &mut leaf.implant)
        })
    }

    fn cmd_connections(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.maximum_connections = parse_number(input, "the number of connections", 1, 20)?;
        Ok(CommandOutcome::Changed(format!(
            "This interface now supports {} linked implant{}.",
            self.maximum_connections,
            if self.maximum_connections == 1 { "" } else { "s" }
        )))
    }
}

impl ComponentDefinition for NeuralInterface {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.implant.load(definition)?;
        self.maximum_connections =
            definition.child_or("MaximumConnections", self.maximum_connections)?;
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
            .with_child(self.implant.save())
            .with_value("MaximumConnections", self.maximum_connections)
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
            "This item is a neural interface.\nMaximum Connections: {}\n{}",
            self.maximum_connections,
            self.implant.describe(ctx)
        )
    }

    fn why_cannot_submit(&self) -> Option<String> {
        self.implant.why_cannot_submit()
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
        Box::new(NeuralInterfaceInstance {
            core: InstanceCore::new(prototype, parent, temporary),
            linked: Vec::new(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct NeuralInterfaceInstance {
    core: InstanceCore,
    linked: Vec<ItemId>,
}

impl NeuralInterfaceInstance {
    pub fn linked(&self) -> &[ItemId] {
        &self.linked
    }

    pub fn link(&mut self, implant: ItemId) -> Result<(), String> {
        let limit = self
            .core
            .config::<NeuralInterface>()
            .map(|interface| interface.maximum_connections)
            .unwrap_or(0);
        if self.linked.contains(&implant) {
            return Err("That implant is already linked.".to_string());
        }
        if self.linked.len() >= limit as usize {
            return Err("The interface cannot take any more links.".to_string());
        }
        self.linked.push(implant);
        Ok(())
    }

    pub fn unlink(&mut self, implant: ItemId) -> bool {
        let before = self.linked.len();
        self.linked.retain(|item| *item != implant);
        before != self.linked.len()
    }
}

impl ComponentInstance for NeuralInterfaceInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        save_item_ids(self.core.state_element(), &self.linked)
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.linked = load_item_ids(state)?;
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
    manager.add_builder_loader("neuralinterface", true, || Box::new(NeuralInterface::default()));
    manager.add_builder_loader("nim", false, || Box::new(NeuralInterface::default()));
    manager.add_database_loader(NeuralInterface::TYPE_NAME, || {
        Box::new(NeuralInterface::default())
    });
    manager.add_type_help_info(
        NeuralInterface::TYPE_NAME,
        "A brain implant that other implants link to",
        &long_help(NeuralInterface::command_table()),
    );
}
