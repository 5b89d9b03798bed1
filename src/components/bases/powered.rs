use std::sync::OnceLock;

use crate::components::catalog::CatalogKind;
use crate::components::command::{
    parse_amount, parse_optional_reference, parse_text, BuildContext, CommandOutcome, CommandResult,
    CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::types::CatalogId;
use crate::components::units::UnitKind;
use crate::components::xml::XmlElement;

/// Wattage, power-state emotes and prog hooks shared by powered machines.
#[derive(Debug, Clone, PartialEq)]
pub struct PoweredMachineBase {
    pub wattage: f64,
    pub power_on_emote: String,
    pub power_off_emote: String,
    pub on_power_on_prog: Option<CatalogId>,
    pub on_power_off_prog: Option<CatalogId>,
    /// Fired every heartbeat while powered.
    pub on_tick_prog: Option<CatalogId>,
}

impl Default for PoweredMachineBase {
    fn default() -> Self {
        Self {
            wattage: 100.0,
            power_on_emote: "@ hum|hums softly as it powers up.".to_string(),
            power_off_emote: "@ fall|falls silent as it powers down.".to_string(),
            on_power_on_prog: None,
            on_power_off_prog: None,
            on_tick_prog: None,
        }
    }
}

#[derive(Clone, Copy)]
enum ProgHook {
    PowerOn,
    PowerOff,
    Tick,
}

impl PoweredMachineBase {
    pub const ELEMENT: &'static str = "PoweredMachine";

    pub fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        let Some(element) = definition.child(Self::ELEMENT) else {
            return Ok(());
        };
        self.wattage = element.child_or("Wattage", self.wattage)?;
        if let Some(emote) = element.child_text("PowerOnEmote") {
            self.power_on_emote = emote.to_string();
        }
        if let Some(emote) = element.child_text("PowerOffEmote") {
            self.power_off_emote = emote.to_string();
        }
        self.on_power_on_prog = element.child_value("OnPowerOnProg")?;
        self.on_power_off_prog = element.child_value("OnPowerOffProg")?;
        self.on_tick_prog = element.child_value("OnTickProg")?;
        Ok(())
    }

    pub fn save(&self) -> XmlElement {
        XmlElement::new(Self::ELEMENT)
            .with_value("Wattage", self.wattage)
            .with_value("PowerOnEmote", &self.power_on_emote)
            .with_value("PowerOffEmote", &self.power_off_emote)
            .with_optional("OnPowerOnProg", self.on_power_on_prog)
            .with_optional("OnPowerOffProg", self.on_power_off_prog)
            .with_optional("OnTickProg", self.on_tick_prog)
    }

    pub fn command_table() -> &'static CommandTable<PoweredMachineBase> {
        static TABLE: OnceLock<CommandTable<PoweredMachineBase>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["wattage", "watts"],
                    "wattage <amount> - sets the power drawn while switched on",
                    Self::cmd_wattage,
                )
                .verb(&["onemote"], "onemote <emote> - sets the power on emote", Self::cmd_on_emote)
                .verb(&["offemote"], "offemote <emote> - sets the power off emote", Self::cmd_off_emote)
                .verb(
                    &["onprog"],
                    "onprog <prog>|none - sets a prog fired when powered on",
                    |base, ctx, input| base.set_prog(ProgHook::PowerOn, ctx, input),
                )
                .verb(
                    &["offprog"],
                    "offprog <prog>|none - sets a prog fired when powered off",
                    |base, ctx, input| base.set_prog(ProgHook::PowerOff, ctx, input),
                )
                .verb(
                    &["tickprog"],
                    "tickprog <prog>|none - sets a prog fired every tick while powered",
                    |base, ctx, input| base.set_prog(ProgHook::Tick, ctx, input),
                )
        })
    }

    fn cmd_wattage(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.wattage = parse_amount(ctx, input, UnitKind::Power, "the wattage")?;
        Ok(CommandOutcome::Changed(format!(
            "This machine now draws {} when switched on.",
            ctx.units.describe(self.wattage, UnitKind::Power)
        )))
    }

    fn cmd_on_emote(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.power_on_emote = parse_text(input, "the power on emote")?;
        Ok(CommandOutcome::Changed(format!(
            "The power on emote is now: {}",
            self.power_on_emote
        )))
    }

    fn cmd_off_emote(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.power_off_emote = parse_text(input, "the power off emote")?;
        Ok(CommandOutcome::Changed(format!(
            "The power off emote is now: {}",
            self.power_off_emote
        )))
    }

    fn set_prog(&mut self, hook: ProgHook, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let prog = parse_optional_reference(ctx, input, CatalogKind::Prog)?;
        let (slot, event) = match hook {
            ProgHook::PowerOn => (&mut self.on_power_on_prog, "powered on"),
            ProgHook::PowerOff => (&mut self.on_power_off_prog, "powered off"),
            ProgHook::Tick => (&mut self.on_tick_prog, "ticking while powered"),
        };
        *slot = prog.as_ref().map(|entry| entry.id);
        Ok(CommandOutcome::Changed(match prog {
            Some(entry) => format!("The prog {} (#{}) now fires when {}.", entry.name, entry.id, event),
            None => format!("No prog now fires when {}.", event),
        }))
    }

    pub fn describe(&self, ctx: &BuildContext<'_>) -> String {
        format!(
            "Wattage: {}\nPower On Emote: {}\nPower Off Emote: {}\nOn Power On Prog: {}\nOn Power Off Prog: {}\nOn Tick Prog: {}\n",
            ctx.units.describe(self.wattage, UnitKind::Power),
            self.power_on_emote,
            self.power_off_emote,
            ctx.catalog.describe(CatalogKind::Prog, self.on_power_on_prog),
            ctx.catalog.describe(CatalogKind::Prog, self.on_power_off_prog),
            ctx.catalog.describe(CatalogKind::Prog, self.on_tick_prog)
        )
    }
}
