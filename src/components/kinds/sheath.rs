use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::command::{
    parse_difficulty, parse_size, yes_no, BuildContext, CommandOutcome, CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, InstanceCore};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::{Difficulty, ItemId, SizeCategory};
use crate::components::xml::XmlElement;

/// Holds a single weapon (or gun, when designed for one) ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheath {
    pub maximum_size: SizeCategory,
    pub stealth_draw_difficulty: Difficulty,
    pub designed_for_guns: bool,
}

impl Default for Sheath {
    fn default() -> Self {
        Self {
            maximum_size: SizeCategory::Small,
            stealth_draw_difficulty: Difficulty::Normal,
            designed_for_guns: false,
        }
    }
}

impl Sheath {
    pub const TYPE_NAME: &'static str = "Sheath";

    pub fn command_table() -> &'static CommandTable<Sheath> {
        static TABLE: OnceLock<CommandTable<Sheath>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(&["size"], "size <size> - sets the largest item it can hold", Self::cmd_size)
                .verb(
                    &["difficulty", "stealth"],
                    "difficulty <difficulty> - sets the difficulty of a stealthy draw",
                    Self::cmd_difficulty,
                )
                .verb(
                    &["guns", "gun", "holster"],
                    "guns - toggles whether this is a holster for guns",
                    Self::cmd_guns,
                )
        })
    }

    fn cmd_size(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.maximum_size = parse_size(input, "the largest sheathable item")?;
        Ok(CommandOutcome::Changed(format!(
            "This sheath now holds items of size {} or smaller.",
            self.maximum_size
        )))
    }

    fn cmd_difficulty(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.stealth_draw_difficulty = parse_difficulty(input, "drawing stealthily")?;
        Ok(CommandOutcome::Changed(format!(
            "Drawing stealthily from this sheath is now {}.",
            self.stealth_draw_difficulty
        )))
    }

    fn cmd_guns(&mut self, _ctx: &BuildContext<'_>, _input: &mut StringStack) -> CommandResult {
        self.designed_for_guns = !self.designed_for_guns;
        Ok(CommandOutcome::Changed(if self.designed_for_guns {
            "This sheath is now a holster designed for guns.".to_string()
        } else {
            "This sheath is now designed for melee weapons.".to_string()
        }))
    }
}

impl ComponentDefinition for Sheath {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        if let Some(size) = definition.child_text("MaximumSize") {
            self.maximum_size = size.parse().map_err(ComponentError::MalformedDefinition)?;
        }
        if let Some(difficulty) = definition.child_text("StealthDrawDifficulty") {
            self.stealth_draw_difficulty = difficulty
                .parse()
                .map_err(ComponentError::MalformedDefinition)?;
        }
        self.designed_for_guns = definition.child_or("DesignedForGuns", self.designed_for_guns)?;
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
            .with_value("MaximumSize", self.maximum_size)
            .with_value("StealthDrawDifficulty", self.stealth_draw_difficulty)
            .with_value("DesignedForGuns", self.designed_for_guns)
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
            "This item is a {} for items of size {} or smaller.\nStealth Draw Difficulty: {}\nDesigned For Guns: {}\n",
            if self.designed_for_guns { "holster" } else { "sheath" },
            self.maximum_size,
            self.stealth_draw_difficulty,
            yes_no(self.designed_for_guns)
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
        Box::new(SheathInstance {
            core: InstanceCore::new(prototype, parent, temporary),
            content: None,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct SheathInstance {
    core: InstanceCore,
    content: Option<ItemId>,
}

impl SheathInstance {
    pub fn content(&self) -> Option<ItemId> {
        self.content
    }

    /// Put a weapon in the sheath. `is_gun` must match what the sheath was designed for.
    pub fn sheathe(&mut self, item: ItemId, size: SizeCategory, is_gun: bool) -> Result<(), String> {
        let Some(sheath) = self.core.config::<Sheath>() else {
            return Err("That is not a sheath.".to_string());
        };
        if self.content.is_some() {
            return Err("There is already something in there.".to_string());
        }
        if size > sheath.maximum_size {
            return Err("That is too big to fit.".to_string());
        }
        if is_gun != sheath.designed_for_guns {
            return Err(if sheath.designed_for_guns {
                "That holster is only designed for guns.".to_string()
            } else {
                "That sheath is not designed for guns.".to_string()
            });
        }
        self.content = Some(item);
        Ok(())
    }

    pub fn draw(&mut self) -> Option<ItemId> {
        self.content.take()
    }
}

impl ComponentInstance for SheathInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        self.core
            .state_element()
            .with_optional("Content", self.content)
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.content = state.child_value("Content")?;
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
    manager.add_builder_loader("sheath", true, || Box::new(Sheath::default()));
    manager.add_builder_loader("holster", false, || {
        Box::new(Sheath {
            designed_for_guns: true,
            ..Sheath::default()
        })
    });
    manager.add_database_loader(Sheath::TYPE_NAME, || Box::new(Sheath::default()));
    manager.add_type_help_info(
        Sheath::TYPE_NAME,
        "Holds a weapon ready to be drawn",
        &long_help(Sheath::command_table()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holster_keyword_starts_designed_for_guns() {
        let mut manager = ComponentManager::new();
        register(&mut manager);
        let holster = manager.new_prototype("holster", 1, "tester", "Hip Holster").unwrap();
        assert!(holster.definition_as::<Sheath>().unwrap().designed_for_guns);
        assert_eq!(holster.type_name(), Sheath::TYPE_NAME);
        assert_eq!(manager.keywords(), vec![("sheath", Sheath::TYPE_NAME)]);
    }
}
