use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::bases::AmmunitionBase;
use crate::components::catalog::CatalogKind;
use crate::components::command::{
    parse_amount, parse_reference, BuildContext, CommandOutcome, CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::ComponentInstance;
use crate::components::kinds::long_help;
use crate::components::kinds::musket_ball::AmmunitionInstance;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::{CatalogId, ItemId};
use crate::components::units::UnitKind;
use crate::components::xml::XmlElement;

/// A paper cartridge: a measured powder charge wrapped around a ball.
#[derive(Debug, Clone, PartialEq)]
pub struct MusketCartridge {
    pub ammunition: AmmunitionBase,
    /// Item prototype of the ball left behind when the cartridge is torn open.
    pub bullet_proto: Option<CatalogId>,
    /// Powder charge in grams.
    pub powder_mass: f64,
}

impl Default for MusketCartridge {
    fn default() -> Self {
        Self {
            ammunition: AmmunitionBase::default(),
            bullet_proto: None,
            powder_mass: 6.0,
        }
    }
}

impl MusketCartridge {
    pub const TYPE_NAME: &'static str = "MusketCartridge";

    pub fn command_table() -> &'static CommandTable<MusketCartridge> {
        static TABLE: OnceLock<CommandTable<MusketCartridge>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["bullet", "ball"],
                    "bullet <item proto> - sets the ball prototype inside the cartridge",
                    Self::cmd_bullet,
                )
                .verb(
                    &["powder", "charge"],
                    "powder <mass> - sets the powder charge",
                    Self::cmd_powder,
                )
                .overlay(AmmunitionBase::command_table(), |leaf| &mut leaf.ammunition)
        })
    }

    fn cmd_bullet(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let entry = parse_reference(ctx, input, CatalogKind::ItemProto)?;
        self.bullet_proto = Some(entry.id);
        Ok(CommandOutcome::Changed(format!(
            "This cartridge now contains item prototype {} (#{}) as its ball.",
            entry.name, entry.id
        )))
    }

    fn cmd_powder(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let grams = parse_amount(ctx, input, UnitKind::Mass, "the powder charge")?;
        if grams <= 0.0 {
            return Err("A cartridge needs some powder.".to_string());
        }
        self.powder_mass = grams;
        Ok(CommandOutcome::Changed(format!(
            "This cartridge now holds {} of powder.",
            ctx.units.describe(self.powder_mass, UnitKind::Mass)
        )))
    }
}

impl ComponentDefinition for MusketCartridge {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.ammunition.load(definition)?;
        self.bullet_proto = definition.child_value("BulletProto")?;
        self.powder_mass = definition.child_or("PowderMass", self.powder_mass)?;
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
            .with_child(self.ammunition.save())
            .with_optional("BulletProto", self.bullet_proto)
            .with_value("PowderMass", self.powder_mass)
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
            "This item is a musket cartridge.\nBullet: {}\nPowder: {}\n{}",
            ctx.catalog.describe(CatalogKind::ItemProto, self.bullet_proto),
            ctx.units.describe(self.powder_mass, UnitKind::Mass),
            self.ammunition.describe(ctx)
        )
    }

    fn why_cannot_submit(&self) -> Option<String> {
        if self.bullet_proto.is_none() {
            return Some("You must first set a bullet prototype for this cartridge.".to_string());
        }
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

pub fn register(manager: &mut ComponentManager) {
    manager.add_builder_loader("musketcartridge", true, || Box::new(MusketCartridge::default()));
    manager.add_builder_loader("cartridge", false, || Box::new(MusketCartridge::default()));
    manager.add_database_loader(MusketCartridge::TYPE_NAME, || {
        Box::new(MusketCartridge::default())
    });
    manager.add_type_help_info(
        MusketCartridge::TYPE_NAME,
        "A powder charge and ball wrapped for quick loading",
        &long_help(MusketCartridge::command_table()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::catalog::InMemoryCatalog;
    use crate::components::units::MetricUnits;

    #[test]
    fn leaf_verbs_and_family_verbs_both_dispatch() {
        let catalog = InMemoryCatalog::new()
            .with(CatalogKind::ItemProto, 40, "lead ball")
            .with(CatalogKind::AmmunitionType, 2, "Musket Ball");
        let ctx = BuildContext::new("tester", &catalog, &MetricUnits);
        let mut cartridge = MusketCartridge::default();

        let outcome = cartridge
            .building_command("powder", &ctx, &mut StringStack::new("8g"))
            .unwrap();
        assert!(outcome.is_changed());
        assert_eq!(cartridge.powder_mass, 8.0);

        cartridge
            .building_command("type", &ctx, &mut StringStack::new("2"))
            .unwrap();
        assert_eq!(cartridge.ammunition.ammunition_type, Some(2));
        assert!(cartridge.why_cannot_submit().unwrap().contains("bullet"));

        cartridge
            .building_command("bullet", &ctx, &mut StringStack::new("40"))
            .unwrap();
        assert!(cartridge.why_cannot_submit().is_none());
        assert!(cartridge.help_lines().iter().any(|line| line.starts_with("grade")));
    }
}
