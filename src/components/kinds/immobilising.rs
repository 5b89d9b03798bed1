use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::bases::WearableBase;
use crate::components::command::{
    parse_difficulty, yes_no, BuildContext, CommandOutcome, CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, StatelessInstance};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::{Difficulty, ItemId};
use crate::components::xml::XmlElement;

/// Restraints such as shackles and splints: worn, and hard to get out of.
#[derive(Debug, Clone, PartialEq)]
pub struct Immobilising {
    pub wearable: WearableBase,
    pub escape_difficulty: Difficulty,
    pub prevents_movement: bool,
}

impl Default for Immobilising {
    fn default() -> Self {
        Self {
            wearable: WearableBase::default(),
            escape_difficulty: Difficulty::Hard,
            prevents_movement: true,
        }
    }
}

impl Immobilising {
    pub const TYPE_NAME: &'static str = "Immobilising";

    pub fn command_table() -> &'static CommandTable<Immobilising> {
        static TABLE: OnceLock<CommandTable<Immobilising>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["escape", "difficulty"],
                    "escape <difficulty> - sets how hard it is to slip free",
                    Self::cmd_escape,
                )
                .verb(
                    &["movement", "move"],
                    "movement - toggles whether the wearer is prevented from moving",
                    Self::cmd_movement,
                )
                .overlay(WearableBase::command_table(), |leaf| &mut leaf.wearable)
        })
    }

    fn cmd_escape(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.escape_difficulty = parse_difficulty(input, "escaping")?;
        Ok(CommandOutcome::Changed(format!(
            "Escaping from this item is now {}.",
            self.escape_difficulty
        )))
    }

    fn cmd_movement(&mut self, _ctx: &BuildContext<'_>, _input: &mut StringStack) -> CommandResult {
        self.prevents_movement = !self.prevents_movement;
        Ok(CommandOutcome::Changed(format!(
            "This item {} prevents its wearer from moving.",
            if self.prevents_movement { "now" } else { "no longer" }
        )))
    }
}

impl ComponentDefinition for Immobilising {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.wearable.load(definition)?;
        if let Some(difficulty) = definition.child_text("EscapeDifficulty") {
            self.escape_difficulty = difficulty
                .parse()
                .map_err(ComponentError::MalformedDefinition)?;
        }
        self.prevents_movement = definition.child_or("PreventsMovement", self.prevents_movement)?;
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
            .with_child(self.wearable.save())
            .with_value("EscapeDifficulty", self.escape_difficulty)
            .with_value("PreventsMovement", self.prevents_movement)
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
            "This item immobilises whoever wears it.\nEscape Difficulty: {}\nPrevents Movement: {}\n{}",
            self.escape_difficulty,
            yes_no(self.prevents_movement),
            self.wearable.describe(ctx)
        )
    }

    fn why_cannot_submit(&self) -> Option<String> {
        self.wearable.why_cannot_submit()
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
    manager.add_builder_loader("immobilising", true, || Box::new(Immobilising::default()));
    manager.add_builder_loader("immobilizing", false, || Box::new(Immobilising::default()));
    manager.add_builder_loader("restraint", false, || Box::new(Immobilising::default()));
    manager.add_database_loader(Immobilising::TYPE_NAME, || Box::new(Immobilising::default()));
    manager.add_type_help_info(
        Immobilising::TYPE_NAME,
        "A worn item that restrains its wearer",
        &long_help(Immobilising::command_table()),
    );
}
