use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::bases::ImplantBase;
use crate::components::catalog::CatalogKind;
use crate::components::command::{
    parse_reference, BuildContext, CommandOutcome, CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, InstanceCore};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::{CatalogId, ItemId};
use crate::components::xml::XmlElement;

/// An artificial organ that takes over the function of a natural one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImplantOrgan {
    pub implant: ImplantBase,
    pub target_organ: Option<CatalogId>,
}

impl ImplantOrgan {
    pub const TYPE_NAME: &'static str = "ImplantOrgan";

    pub fn command_table() -> &'static CommandTable<ImplantOrgan> {
        static TABLE: OnceLock<CommandTable<ImplantOrgan>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["organ"],
                    "organ <bodypart> - sets the organ this implant replaces",
                    Self::cmd_organ,
                )
                .overlay(ImplantBase::command_table(), |leaf| &mut leaf.implant)
        })
    }

    fn cmd_organ(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        if self.implant.target_body.is_none() {
            return Err("You must set a target body before a target organ.".to_string());
        }
        let organ = parse_reference(ctx, input, CatalogKind::Bodypart)?;
        self.target_organ = Some(organ.id);
        Ok(CommandOutcome::Changed(format!(
            "This implant now functions as the {} organ (#{}).",
            organ.name, organ.id
        )))
    }
}

impl ComponentDefinition for ImplantOrgan {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.implant.load(definition)?;
        self.target_organ = definition.child_value("TargetOrgan")?;
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
            .with_child(self.implant.save())
            .with_optional("TargetOrgan", self.target_organ)
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
            "This item is an implanted organ.\nTarget Organ: {}\n{}",
            ctx.catalog.describe(CatalogKind::Bodypart, self.target_organ),
            self.implant.describe(ctx)
        )
    }

    fn why_cannot_submit(&self) -> Option<String> {
        self.implant.why_cannot_submit().or_else(|| {
            self.target_organ
                .is_none()
                .then(|| "It must have a target organ.".to_string())
        })
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
        Box::new(ImplantInstance::new(prototype, parent, temporary))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Installation and power state of an implant.
#[derive(Debug, Clone)]
pub struct ImplantInstance {
    core: InstanceCore,
    /// Character the implant is installed in, if any.
    installed_in: Option<u64>,
    powered: bool,
}

impl ImplantInstance {
    pub fn new(prototype: Arc<ComponentPrototype>, parent: ItemId, temporary: bool) -> Self {
        Self {
            core: InstanceCore::new(prototype, parent, temporary),
            installed_in: None,
            powered: false,
        }
    }

    pub fn installed_in(&self) -> Option<u64> {
        self.installed_in
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn install(&mut self, character: u64) -> Result<(), String> {
        if self.installed_in.is_some() {
            return Err("That implant is already installed in someone.".to_string());
        }
        self.installed_in = Some(character);
        Ok(())
    }

    pub fn remove(&mut self) -> Option<u64> {
        self.powered = false;
        self.installed_in.take()
    }

    /// Implants can only draw power while installed.
    pub fn set_powered(&mut self, powered: bool) -> bool {
        self.powered = powered && self.installed_in.is_some();
        self.powered
    }
}

impl ComponentInstance for ImplantInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        self.core
            .state_element()
            .with_optional("InstalledIn", self.installed_in)
            .with_value("Powered", self.powered)
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.installed_in = state.child_value("InstalledIn")?;
        self.powered = state.child_or("Powered", false)?;
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
    manager.add_builder_loader("implantorgan", true, || Box::new(ImplantOrgan::default()));
    manager.add_builder_loader("organ", false, || Box::new(ImplantOrgan::default()));
    manager.add_database_loader(ImplantOrgan::TYPE_NAME, || Box::new(ImplantOrgan::default()));
    manager.add_type_help_info(
        ImplantOrgan::TYPE_NAME,
        "An implant that replaces a natural organ",
        &long_help(ImplantOrgan::command_table()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::catalog::InMemoryCatalog;
    use crate::components::units::MetricUnits;

    #[test]
    fn organ_requires_a_body_first() {
        let catalog = InMemoryCatalog::new()
            .with(CatalogKind::BodyProto, 1, "Humanoid")
            .with(CatalogKind::Bodypart, 9, "heart")
            .with(CatalogKind::Bodypart, 10, "chest");
        let ctx = BuildContext::new("tester", &catalog, &MetricUnits);
        let mut organ = ImplantOrgan::default();

        let outcome = organ
            .building_command("organ", &ctx, &mut StringStack::new("heart"))
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::Rejected(_)));

        for (verb, arg) in [("body", "humanoid"), ("bodypart", "chest"), ("organ", "heart")] {
            let outcome = organ
                .building_command(verb, &ctx, &mut StringStack::new(arg))
                .unwrap();
            assert!(outcome.is_changed(), "{} {}", verb, arg);
        }
        assert_eq!(organ.target_organ, Some(9));
        assert!(organ.why_cannot_submit().is_none());
    }
}
