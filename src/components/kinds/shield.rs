use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::catalog::CatalogKind;
use crate::components::command::{
    parse_reference, BuildContext, CommandOutcome, CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, StatelessInstance};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::{CatalogId, ItemId};
use crate::components::xml::XmlElement;

/// A shield blocks with its shield type and bashes with a melee weapon type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shield {
    pub shield_type: Option<CatalogId>,
    pub melee_weapon_type: Option<CatalogId>,
}

impl Shield {
    pub const TYPE_NAME: &'static str = "Shield";

    pub fn command_table() -> &'static CommandTable<Shield> {
        static TABLE: OnceLock<CommandTable<Shield>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["shield", "type"],
                    "shield <shield type> - sets the shield type used for blocking",
                    Self::cmd_shield,
                )
                .verb(
                    &["weapon", "melee"],
                    "weapon <weapon type> - sets the weapon type used when bashing",
                    Self::cmd_weapon,
                )
        })
    }

    fn cmd_shield(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let entry = parse_reference(ctx, input, CatalogKind::ShieldType)?;
        self.shield_type = Some(entry.id);
        Ok(CommandOutcome::Changed(format!(
            "This shield now uses the {} shield type (#{}).",
            entry.name, entry.id
        )))
    }

    fn cmd_weapon(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let entry = parse_reference(ctx, input, CatalogKind::WeaponType)?;
        self.melee_weapon_type = Some(entry.id);
        Ok(CommandOutcome::Changed(format!(
            "This shield now attacks as the {} weapon type (#{}).",
            entry.name, entry.id
        )))
    }
}

impl ComponentDefinition for Shield {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.shield_type = definition.child_value("ShieldType")?;
        self.melee_weapon_type = definition.child_value("MeleeWeaponType")?;
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
            .with_optional("ShieldType", self.shield_type)
            .with_optional("MeleeWeaponType", self.melee_weapon_type)
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
            "This item is a shield.\nShield Type: {}\nMelee Weapon Type: {}\n",
            ctx.catalog.describe(CatalogKind::ShieldType, self.shield_type),
            ctx.catalog
                .describe(CatalogKind::WeaponType, self.melee_weapon_type)
        )
    }

    fn why_cannot_submit(&self) -> Option<String> {
        if self.shield_type.is_none() {
            return Some("You must first give this shield a shield type.".to_string());
        }
        if self.melee_weapon_type.is_none() {
            return Some("You must first give this shield a melee weapon type.".to_string());
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
    manager.add_builder_loader("shield", true, || Box::new(Shield::default()));
    manager.add_database_loader(Shield::TYPE_NAME, || Box::new(Shield::default()));
    manager.add_type_help_info(
        Shield::TYPE_NAME,
        "Lets an item block attacks and bash with it",
        &long_help(Shield::command_table()),
    );
}
