use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::catalog::CatalogKind;
use crate::components::command::{
    parse_reference, yes_no, BuildContext, CommandOutcome, CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, StatelessInstance};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::{CatalogId, ItemId};
use crate::components::xml::XmlElement;

/// Protective armour. The armour type decides what it stops; this component
/// only binds the item to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Armour {
    pub armour_type: Option<CatalogId>,
    /// Whether wearing it applies the armour type's movement and skill penalties.
    pub apply_armour_penalties: bool,
}

impl Default for Armour {
    fn default() -> Self {
        Self {
            armour_type: None,
            apply_armour_penalties: true,
        }
    }
}

impl Armour {
    pub const TYPE_NAME: &'static str = "Armour";

    pub fn command_table() -> &'static CommandTable<Armour> {
        static TABLE: OnceLock<CommandTable<Armour>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["type", "armour", "armor"],
                    "type <armour type> - sets the armour type this item uses",
                    Self::cmd_type,
                )
                .verb(
                    &["penalties", "penalty"],
                    "penalties - toggles whether the armour type's penalties apply",
                    Self::cmd_penalties,
                )
        })
    }

    fn cmd_type(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let entry = parse_reference(ctx, input, CatalogKind::ArmourType)?;
        self.armour_type = Some(entry.id);
        Ok(CommandOutcome::Changed(format!(
            "This armour now uses the {} armour type (#{}).",
            entry.name, entry.id
        )))
    }

    fn cmd_penalties(&mut self, _ctx: &BuildContext<'_>, _input: &mut StringStack) -> CommandResult {
        self.apply_armour_penalties = !self.apply_armour_penalties;
        Ok(CommandOutcome::Changed(format!(
            "This armour will {} apply the penalties of its armour type.",
            if self.apply_armour_penalties { "now" } else { "no longer" }
        )))
    }
}

impl ComponentDefinition for Armour {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.armour_type = definition.child_value("ArmourType")?;
        self.apply_armour_penalties =
            definition.child_or("ApplyArmourPenalties", self.apply_armour_penalties)?;
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
            .with_optional("ArmourType", self.armour_type)
            .with_value("ApplyArmourPenalties", self.apply_armour_penalties)
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
            "This item is armour.\nArmour Type: {}\nApplies Penalties: {}\n",
            ctx.catalog.describe(CatalogKind::ArmourType, self.armour_type),
            yes_no(self.apply_armour_penalties)
        )
    }

    fn why_cannot_submit(&self) -> Option<String> {
        if self.armour_type.is_none() {
            return Some("You must first give this armour an armour type.".to_string());
        }
        None
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
    manager.add_builder_loader("armour", true, || Box::new(Armour::default()));
    manager.add_builder_loader("armor", false, || Box::new(Armour::default()));
    manager.add_database_loader(Armour::TYPE_NAME, || Box::new(Armour::default()));
    manager.add_type_help_info(
        Armour::TYPE_NAME,
        "Makes an item protect whoever wears it",
        &long_help(Armour::command_table()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::catalog::InMemoryCatalog;
    use crate::components::units::MetricUnits;

    #[test]
    fn unknown_armour_type_is_rejected_without_change() {
        let catalog = InMemoryCatalog::new().with(CatalogKind::ArmourType, 3, "Boiled Leather");
        let ctx = BuildContext::new("tester", &catalog, &MetricUnits);
        let mut armour = Armour::default();

        let outcome = armour
            .building_command("type", &ctx, &mut StringStack::new("chainmail"))
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::Rejected(_)));
        assert_eq!(armour.armour_type, None);

        let outcome = armour
            .building_command("type", &ctx, &mut StringStack::new("boiled"))
            .unwrap();
        assert!(outcome.is_changed());
        assert_eq!(armour.armour_type, Some(3));
        assert!(armour.why_cannot_submit().is_none());
    }
}
