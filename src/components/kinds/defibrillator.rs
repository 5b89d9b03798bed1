use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::command::{
    parse_amount, parse_text, BuildContext, CommandOutcome, CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, InstanceCore};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::ItemId;
use crate::components::units::UnitKind;
use crate::components::xml::XmlElement;

#[derive(Debug, Clone, PartialEq)]
pub struct Defibrillator {
    /// Energy drawn from the power source per shock, in watts.
    pub wattage_per_shock: f64,
    pub shock_emote: String,
}

impl Default for Defibrillator {
    fn default() -> Self {
        Self {
            wattage_per_shock: 20_000.0,
            shock_emote: "@ press|presses $2 to $1's chest and deliver|delivers a shock.".to_string(),
        }
    }
}

impl Defibrillator {
    pub const TYPE_NAME: &'static str = "Defibrillator";

    pub fn command_table() -> &'static CommandTable<Defibrillator> {
        static TABLE: OnceLock<CommandTable<Defibrillator>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["watts", "wattage", "power"],
                    "watts <amount> - sets the power drawn for each shock",
                    Self::cmd_watts,
                )
                .verb(&["emote"], "emote <emote> - sets the emote used when shocking", Self::cmd_emote)
        })
    }

    fn cmd_watts(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let watts = parse_amount(ctx, input, UnitKind::Power, "the power per shock")?;
        if watts <= 0.0 {
            return Err("A defibrillator must draw some power for each shock.".to_string());
        }
        self.wattage_per_shock = watts;
        Ok(CommandOutcome::Changed(format!(
            "This defibrillator now draws {} watts per shock ({}).",
            self.wattage_per_shock,
            ctx.units.describe(self.wattage_per_shock, UnitKind::Power)
        )))
    }

    fn cmd_emote(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.shock_emote = parse_text(input, "the shock emote")?;
        Ok(CommandOutcome::Changed(format!(
            "The shock emote is now: {}",
            self.shock_emote
        )))
    }
}

impl ComponentDefinition for Defibrillator {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.wattage_per_shock = definition.child_or("WattagePerShock", self.wattage_per_shock)?;
        if let Some(emote) = definition.child_text("ShockEmote") {
            self.shock_emote = emote.to_string();
        }
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
            .with_value("WattagePerShock", self.wattage_per_shock)
            .with_value("ShockEmote", &self.shock_emote)
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
            "This item is a defibrillator.\nPower Per Shock: {}\nShock Emote: {}\n",
            ctx.units.describe(self.wattage_per_shock, UnitKind::Power),
            self.shock_emote
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
        Box::new(DefibrillatorInstance {
            core: InstanceCore::new(prototype, parent, temporary),
            shocks_delivered: 0,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct DefibrillatorInstance {
    core: InstanceCore,
    shocks_delivered: u32,
}

impl DefibrillatorInstance {
    pub fn shocks_delivered(&self) -> u32 {
        self.shocks_delivered
    }

    /// Deliver a shock if `available_watts` covers the configured draw.
    pub fn shock(&mut self, available_watts: f64) -> Result<(), String> {
        let Some(config) = self.core.config::<Defibrillator>() else {
            return Err("That is not a defibrillator.".to_string());
        };
        if available_watts < config.wattage_per_shock {
            return Err("The defibrillator does not have enough power.".to_string());
        }
        self.shocks_delivered += 1;
        Ok(())
    }
}

impl ComponentInstance for DefibrillatorInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        self.core
            .state_element()
            .with_value("ShocksDelivered", self.shocks_delivered)
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.shocks_delivered = state.child_or("ShocksDelivered", 0)?;
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
    manager.add_builder_loader("defibrillator", true, || Box::new(Defibrillator::default()));
    manager.add_builder_loader("defib", false, || Box::new(Defibrillator::default()));
    manager.add_database_loader(Defibrillator::TYPE_NAME, || Box::new(Defibrillator::default()));
    manager.add_type_help_info(
        Defibrillator::TYPE_NAME,
        "Restarts stopped hearts using electrical power",
        &long_help(Defibrillator::command_table()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::catalog::InMemoryCatalog;
    use crate::components::units::MetricUnits;

    #[test]
    fn zero_watts_is_rejected() {
        let catalog = InMemoryCatalog::new();
        let ctx = BuildContext::new("tester", &catalog, &MetricUnits);
        let mut defib = Defibrillator::default();
        let outcome = defib
            .building_command("watts", &ctx, &mut StringStack::new("0"))
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::Rejected(_)));
        assert_eq!(defib.wattage_per_shock, 20_000.0);

        let outcome = defib
            .building_command("watts", &ctx, &mut StringStack::new("2.5kW"))
            .unwrap();
        assert!(outcome.is_changed());
        assert_eq!(defib.wattage_per_shock, 2500.0);
    }
}
