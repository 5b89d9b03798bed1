use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::bases::AmmunitionBase;
use crate::components::command::{BuildContext, CommandOutcome, CommandTable};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, InstanceCore};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::ItemId;
use crate::components::xml::XmlElement;

/// Loose shot for muzzle-loading weapons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MusketBall {
    pub ammunition: AmmunitionBase,
}

impl MusketBall {
    pub const TYPE_NAME: &'static str = "MusketBall";

    pub fn command_table() -> &'static CommandTable<MusketBall> {
        static TABLE: OnceLock<CommandTable<MusketBall>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new().overlay(AmmunitionBase::command_table(), |leaf| &mut leaf.ammunition)
        })
    }
}

impl ComponentDefinition for MusketBall {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.ammunition.load(definition)
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition").with_child(self.ammunition.save())
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
        format!("This item is a musket ball.\n{}", self.ammunition.describe(ctx))
    }

    fn why_cannot_submit(&self) -> Option<String> {
        self.ammunition.why_cannot_submit()
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
        Box::new(AmmunitionInstance::new(prototype, parent, temporary))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Stack of identical rounds; shared by every ammunition type.
#[derive(Debug, Clone)]
pub struct AmmunitionInstance {
    core: InstanceCore,
    quantity: u32,
}

impl AmmunitionInstance {
    pub fn new(prototype: Arc<ComponentPrototype>, parent: ItemId, temporary: bool) -> Self {
        Self {
            core: InstanceCore::new(prototype, parent, temporary),
            quantity: 1,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn add(&mut self, rounds: u32) {
        self.quantity = self.quantity.saturating_add(rounds);
    }

    /// Take `rounds` off the stack. The stack never drops below zero.
    pub fn take(&mut self, rounds: u32) -> Result<u32, String> {
        if rounds > self.quantity {
            return Err(format!("There are only {} rounds left.", self.quantity));
        }
        self.quantity -= rounds;
        Ok(self.quantity)
    }
}

impl ComponentInstance for AmmunitionInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        self.core.state_element().with_value("Quantity", self.quantity)
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.quantity = state.child_or("Quantity", 1)?;
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
    manager.add_builder_loader("musketball", true, || Box::new(MusketBall::default()));
    manager.add_builder_loader("ball", false, || Box::new(MusketBall::default()));
    manager.add_database_loader(MusketBall::TYPE_NAME, || Box::new(MusketBall::default()));
    manager.add_type_help_info(
        MusketBall::TYPE_NAME,
        "Loose shot loaded into muskets",
        &long_help(MusketBall::command_table()),
    );
}
