use std::sync::OnceLock;

use crate::components::catalog::CatalogKind;
use crate::components::command::{
    parse_amount, parse_difficulty, parse_reference, yes_no, BuildContext, CommandOutcome,
    CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::types::{CatalogId, Difficulty};
use crate::components::units::UnitKind;
use crate::components::xml::XmlElement;

/// Installation target and power draw shared by implants.
#[derive(Debug, Clone, PartialEq)]
pub struct ImplantBase {
    pub target_body: Option<CatalogId>,
    pub target_bodypart: Option<CatalogId>,
    /// Watts drawn while powered.
    pub power_draw: f64,
    pub installation_difficulty: Difficulty,
    /// External implants sit on the surface of the bodypart rather than inside it.
    pub external: bool,
}

impl Default for ImplantBase {
    fn default() -> Self {
        Self {
            target_body: None,
            target_bodypart: None,
            power_draw: 0.0,
            installation_difficulty: Difficulty::Hard,
            external: false,
        }
    }
}

impl ImplantBase {
    pub const ELEMENT: &'static str = "Implant";

    pub fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        let Some(element) = definition.child(Self::ELEMENT) else {
            return Ok(());
        };
        self.target_body = element.child_value("TargetBody")?;
        self.target_bodypart = element.child_value("TargetBodypart")?;
        self.power_draw = element.child_or("PowerDraw", self.power_draw)?;
        if let Some(text) = element.child_text("InstallDifficulty") {
            self.installation_difficulty = text
                .parse()
                .map_err(ComponentError::MalformedDefinition)?;
        }
        self.external = element.attr_value("External")?.unwrap_or(self.external);
        Ok(())
    }

    pub fn save(&self) -> XmlElement {
        XmlElement::new(Self::ELEMENT)
            .with_attr("External", self.external)
            .with_optional("TargetBody", self.target_body)
            .with_optional("TargetBodypart", self.target_bodypart)
            .with_value("PowerDraw", self.power_draw)
            .with_value("InstallDifficulty", self.installation_difficulty)
    }

    pub fn command_table() -> &'static CommandTable<ImplantBase> {
        static TABLE: OnceLock<CommandTable<ImplantBase>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(&["body"], "body <body> - sets the body this implant is designed for", Self::cmd_body)
                .verb(
                    &["bodypart", "part"],
                    "bodypart <part> - sets the bodypart this implant is installed in",
                    Self::cmd_bodypart,
                )
                .verb(
                    &["power", "draw"],
                    "power <amount> - sets the power drawn while operating",
                    Self::cmd_power,
                )
                .verb(
                    &["difficulty", "install"],
                    "difficulty <difficulty> - sets the installation difficulty",
                    Self::cmd_difficulty,
                )
                .verb(&["external"], "external - toggles surface installation", Self::cmd_external)
        })
    }

    fn cmd_body(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let body = parse_reference(ctx, input, CatalogKind::BodyProto)?;
        self.target_body = Some(body.id);
        Ok(CommandOutcome::Changed(format!(
            "This implant is now designed for the {} body (#{}).",
            body.name, body.id
        )))
    }

    fn cmd_bodypart(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        if self.target_body.is_none() {
            return Err("You must set a target body before a target bodypart.".to_string());
        }
        let part = parse_reference(ctx, input, CatalogKind::Bodypart)?;
        self.target_bodypart = Some(part.id);
        Ok(CommandOutcome::Changed(format!(
            "This implant is now installed in the {} (#{}).",
            part.name, part.id
        )))
    }

    fn cmd_power(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.power_draw = parse_amount(ctx, input, UnitKind::Power, "the power draw")?;
        Ok(CommandOutcome::Changed(format!(
            "This implant now draws {} while operating.",
            ctx.units.describe(self.power_draw, UnitKind::Power)
        )))
    }

    fn cmd_difficulty(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.installation_difficulty = parse_difficulty(input, "installation")?;
        Ok(CommandOutcome::Changed(format!(
            "Installing this implant is now {}.",
            self.installation_difficulty
        )))
    }

    fn cmd_external(&mut self, _ctx: &BuildContext<'_>, _input: &mut StringStack) -> CommandResult {
        self.external = !self.external;
        Ok(CommandOutcome::Changed(format!(
            "This implant is now {}.",
            if self.external { "external" } else { "internal" }
        )))
    }

    pub fn describe(&self, ctx: &BuildContext<'_>) -> String {
        format!(
            "Target Body: {}\nTarget Bodypart: {}\nPower Draw: {}\nInstall Difficulty: {}\nExternal: {}\n",
            ctx.catalog.describe(CatalogKind::BodyProto, self.target_body),
            ctx.catalog.describe(CatalogKind::Bodypart, self.target_bodypart),
            ctx.units.describe(self.power_draw, UnitKind::Power),
            self.installation_difficulty,
            yes_no(self.external)
        )
    }

    pub fn why_cannot_submit(&self) -> Option<String> {
        if self.target_body.is_none() {
            return Some("It must have a target body.".to_string());
        }
        if self.target_bodypart.is_none() {
            return Some("It must have a target bodypart.".to_string());
        }
        None
    }
}
