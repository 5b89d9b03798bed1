use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::command::{
    parse_amount, yes_no, BuildContext, CommandOutcome, CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, InstanceCore};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::{CatalogId, ItemId};
use crate::components::units::UnitKind;
use crate::components::xml::XmlElement;

#[derive(Debug, Clone, PartialEq)]
pub struct Syringe {
    /// Capacity in litres.
    pub liquid_capacity: f64,
    pub transparent: bool,
}

impl Default for Syringe {
    fn default() -> Self {
        Self {
            liquid_capacity: 0.01,
            transparent: true,
        }
    }
}

impl Syringe {
    pub const TYPE_NAME: &'static str = "Syringe";

    pub fn command_table() -> &'static CommandTable<Syringe> {
        static TABLE: OnceLock<CommandTable<Syringe>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["capacity", "volume"],
                    "capacity <volume> - sets how much liquid the syringe holds",
                    Self::cmd_capacity,
                )
                .verb(
                    &["transparent", "clear"],
                    "transparent - toggles whether the contents can be seen",
                    Self::cmd_transparent,
                )
        })
    }

    fn cmd_capacity(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let capacity = parse_amount(ctx, input, UnitKind::Volume, "the capacity")?;
        if capacity <= 0.0 {
            return Err("A syringe must be able to hold some liquid.".to_string());
        }
        self.liquid_capacity = capacity;
        Ok(CommandOutcome::Changed(format!(
            "This syringe now holds {}.",
            ctx.units.describe(self.liquid_capacity, UnitKind::Volume)
        )))
    }

    fn cmd_transparent(&mut self, _ctx: &BuildContext<'_>, _input: &mut StringStack) -> CommandResult {
        self.transparent = !self.transparent;
        Ok(CommandOutcome::Changed(format!(
            "This syringe is now {}.",
            if self.transparent { "transparent" } else { "opaque" }
        )))
    }
}

impl ComponentDefinition for Syringe {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.liquid_capacity = definition.child_or("LiquidCapacity", self.liquid_capacity)?;
        self.transparent = definition.child_or("Transparent", self.transparent)?;
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
            .with_value("LiquidCapacity", self.liquid_capacity)
            .with_value("Transparent", self.transparent)
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
            "This item is a syringe holding up to {}.\nTransparent: {}\n",
            ctx.units.describe(self.liquid_capacity, UnitKind::Volume),
            yes_no(self.transparent)
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
        Box::new(SyringeInstance {
            core: InstanceCore::new(prototype, parent, temporary),
            contents: None,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Liquid held in a syringe: catalog liquid and volume in litres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidMixture {
    pub liquid: CatalogId,
    pub volume: f64,
}

#[derive(Debug, Clone)]
pub struct SyringeInstance {
    core: InstanceCore,
    contents: Option<LiquidMixture>,
}

impl SyringeInstance {
    pub fn contents(&self) -> Option<LiquidMixture> {
        self.contents
    }

    /// Draw up liquid, returning the volume actually taken.
    pub fn fill(&mut self, liquid: CatalogId, volume: f64) -> Result<f64, String> {
        let capacity = self
            .core
            .config::<Syringe>()
            .map(|syringe| syringe.liquid_capacity)
            .unwrap_or(0.0);
        let current = match self.contents {
            Some(mixture) if mixture.liquid != liquid => {
                return Err("The syringe already holds a different liquid.".to_string())
            }
            Some(mixture) => mixture.volume,
            None => 0.0,
        };
        let taken = volume.min(capacity - current).max(0.0);
        if taken <= 0.0 {
            return Err("The syringe is already full.".to_string());
        }
        self.contents = Some(LiquidMixture {
            liquid,
            volume: current + taken,
        });
        Ok(taken)
    }

    /// Inject everything, leaving the syringe empty.
    pub fn inject(&mut self) -> Option<LiquidMixture> {
        self.contents.take()
    }
}

impl ComponentInstance for SyringeInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        let mut state = self.core.state_element();
        if let Some(mixture) = self.contents {
            state.push(
                XmlElement::new("Liquid")
                    .with_attr("id", mixture.liquid)
                    .with_attr("volume", mixture.volume),
            );
        }
        state
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.contents = match state.child("Liquid") {
            None => None,
            Some(liquid) => Some(LiquidMixture {
                liquid: liquid.attr_value("id")?.unwrap_or_default(),
                volume: liquid.attr_value("volume")?.unwrap_or_default(),
            }),
        };
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
    manager.add_builder_loader("syringe", true, || Box::new(Syringe::default()));
    manager.add_database_loader(Syringe::TYPE_NAME, || Box::new(Syringe::default()));
    manager.add_type_help_info(
        Syringe::TYPE_NAME,
        "Draws up and injects small amounts of liquid",
        &long_help(Syringe::command_table()),
    );
}
