use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::bases::PoweredMachineBase;
use crate::components::command::{
    parse_text, BuildContext, CommandOutcome, CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, InstanceCore};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::ItemId;
use crate::components::xml::XmlElement;

/// Decorative machine: draws power and emotes, nothing more.
#[derive(Debug, Clone, PartialEq)]
pub struct PoweredProp {
    pub machine: PoweredMachineBase,
    /// Added to the item description while it is switched on.
    pub powered_description: String,
}

impl Default for PoweredProp {
    fn default() -> Self {
        Self {
            machine: PoweredMachineBase::default(),
            powered_description: "It is switched on.".to_string(),
        }
    }
}

impl PoweredProp {
    pub const TYPE_NAME: &'static str = "PoweredProp";

    pub fn command_table() -> &'static CommandTable<PoweredProp> {
        static TABLE: OnceLock<CommandTable<PoweredProp>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["powered", "ondesc"],
                    "powered <text> - sets the description added while switched on",
                    Self::cmd_powered,
                )
                .overlay(PoweredMachineBase::command_table(), |leaf| &mut leaf.machine)
        })
    }

    fn cmd_powered(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.powered_description = parse_text(input, "the powered description")?;
        Ok(CommandOutcome::Changed(format!(
            "While switched on, this item will now show: {}",
            self.powered_description
        )))
    }
}

impl ComponentDefinition for PoweredProp {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.machine.load(definition)?;
        if let Some(text) = definition.child_text("PoweredDescription") {
            self.powered_description = text.to_string();
        }
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
            .with_child(self.machine.save())
            .with_value("PoweredDescription", &self.powered_description)
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
            "This item is a powered prop.\nPowered Description: {}\n{}",
            self.powered_description,
            self.machine.describe(ctx)
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
        Box::new(PoweredPropInstance {
            core: InstanceCore::new(prototype, parent, temporary),
            switched_on: false,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct PoweredPropInstance {
    core: InstanceCore,
    switched_on: bool,
}

impl PoweredPropInstance {
    pub fn is_switched_on(&self) -> bool {
        self.switched_on
    }

    /// Flip the switch and return the emote for the new state.
    pub fn toggle(&mut self) -> String {
        self.switched_on = !self.switched_on;
        match self.core.config::<PoweredProp>() {
            Some(prop) if self.switched_on => prop.machine.power_on_emote.clone(),
            Some(prop) => prop.machine.power_off_emote.clone(),
            None => String::new(),
        }
    }

    /// Watts drawn right now.
    pub fn power_draw(&self) -> f64 {
        match self.core.config::<PoweredProp>() {
            Some(prop) if self.switched_on => prop.machine.wattage,
            _ => 0.0,
        }
    }
}

impl ComponentInstance for PoweredPropInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        self.core.state_element().with_value("SwitchedOn", self.switched_on)
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.switched_on = state.child_or("SwitchedOn", false)?;
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
    manager.add_builder_loader("poweredprop", true, || Box::new(PoweredProp::default()));
    manager.add_database_loader(PoweredProp::TYPE_NAME, || Box::new(PoweredProp::default()));
    manager.add_type_help_info(
        PoweredProp::TYPE_NAME,
        "A machine that uses power purely for show",
        &long_help(PoweredProp::command_table()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::proto::ProtoHeader;
    use crate::components::types::RevisionStatus;

    #[test]
    fn power_is_drawn_only_while_switched_on() {
        let mut header = ProtoHeader::new_draft(5, "tester", "Lava Lamp");
        header.status = RevisionStatus::Current;
        let proto = Arc::new(ComponentPrototype::new(header, Box::new(PoweredProp::default())));
        let mut instance = proto.create_new(2, false).unwrap();
        let prop = instance
            .as_any_mut()
            .downcast_mut::<PoweredPropInstance>()
            .unwrap();

        assert_eq!(prop.power_draw(), 0.0);
        assert!(prop.toggle().contains("powers up"));
        assert_eq!(prop.power_draw(), 100.0);

        let state = prop.save_state();
        assert_eq!(state.child_text("SwitchedOn"), Some("true"));
    }
}
