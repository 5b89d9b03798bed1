use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::command::{
    parse_number, parse_text, BuildContext, CommandOutcome, CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, InstanceCore};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::ItemId;
use crate::components::xml::XmlElement;

/// Furniture that characters can sit on.
#[derive(Debug, Clone, PartialEq)]
pub struct Chair {
    pub maximum_occupants: u32,
    /// Shown after the sitter's name, e.g. `sitting on a wooden bench`.
    pub sitting_description: String,
}

impl Default for Chair {
    fn default() -> Self {
        Self {
            maximum_occupants: 1,
            sitting_description: "sitting on".to_string(),
        }
    }
}

impl Chair {
    pub const TYPE_NAME: &'static str = "Chair";

    pub fn command_table() -> &'static CommandTable<Chair> {
        static TABLE: OnceLock<CommandTable<Chair>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["occupants", "capacity"],
                    "occupants <number> - sets how many can sit at once",
                    Self::cmd_occupants,
                )
                .verb(
                    &["sitting"],
                    "sitting <text> - sets the positional text used for sitters",
                    Self::cmd_sitting,
                )
        })
    }

    fn cmd_occupants(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.maximum_occupants = parse_number(input, "the number of occupants", 1, 50)?;
        Ok(CommandOutcome::Changed(format!(
            "This chair now seats {}.",
            self.maximum_occupants
        )))
    }

    fn cmd_sitting(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.sitting_description = parse_text(input, "the sitting text")?;
        Ok(CommandOutcome::Changed(format!(
            "People using this chair will now be described as {} it.",
            self.sitting_description
        )))
    }
}

impl ComponentDefinition for Chair {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.maximum_occupants = definition.child_or("MaximumOccupants", self.maximum_occupants)?;
        if let Some(text) = definition.child_text("SittingDescription") {
            self.sitting_description = text.to_string();
        }
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
            .with_value("MaximumOccupants", self.maximum_occupants)
            .with_value("SittingDescription", &self.sitting_description)
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

    fn describe(&self, _ctx: &BuildContext<'_>) -> String {
        format!(
            "This item is a chair seating {}.\nSitters are described as {} it.\n",
            self.maximum_occupants, self.sitting_description
        )
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
        Box::new(ChairInstance {
            core: InstanceCore::new(prototype, parent, temporary),
            occupants: Vec::new(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct ChairInstance {
    core: InstanceCore,
    occupants: Vec<u64>,
}

impl ChairInstance {
    pub fn occupants(&self) -> &[u64] {
        &self.occupants
    }

    pub fn sit(&mut self, character: u64) -> Result<(), String> {
        let capacity = self
            .core
            .config::<Chair>()
            .map(|chair| chair.maximum_occupants)
            .unwrap_or(0);
        if self.occupants.contains(&character) {
            return Err("You are already sitting there.".to_string());
        }
        if self.occupants.len() >= capacity as usize {
            return Err("There is no room left to sit there.".to_string());
        }
        self.occupants.push(character);
        Ok(())
    }

    pub fn stand(&mut self, character: u64) {
        self.occupants.retain(|occupant| *occupant != character);
    }
}

impl ComponentInstance for ChairInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    // Occupancy is positional state of the sitters, so nothing is persisted here.

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub fn register(manager: &mut ComponentManager) {
    manager.add_builder_loader("chair", true, || Box::new(Chair::default()));
    manager.add_builder_loader("seat", false, || Box::new(Chair::default()));
    manager.add_database_loader(Chair::TYPE_NAME, || Box::new(Chair::default()));
    manager.add_type_help_info(
        Chair::TYPE_NAME,
        "Furniture that characters can sit on",
        &long_help(Chair::command_table()),
    );
}
