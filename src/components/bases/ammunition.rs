use std::sync::OnceLock;

use crate::components::catalog::CatalogKind;
use crate::components::command::{
    parse_optional_reference, parse_reference, parse_text, BuildContext, CommandOutcome,
    CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::types::CatalogId;
use crate::components::xml::XmlElement;

/// Ammunition grade classification and firing behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct AmmunitionBase {
    /// Which weapons accept this ammunition, e.g. `Musket` or `Pistol`.
    pub grade: String,
    pub ammunition_type: Option<CatalogId>,
    /// Item prototype loaded in place of this one when it is fired.
    pub fired_proto: Option<CatalogId>,
}

impl Default for AmmunitionBase {
    fn default() -> Self {
        Self {
            grade: "Musket".to_string(),
            ammunition_type: None,
            fired_proto: None,
        }
    }
}

impl AmmunitionBase {
    pub const ELEMENT: &'static str = "Ammunition";

    pub fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        let Some(element) = definition.child(Self::ELEMENT) else {
            return Ok(());
        };
        if let Some(grade) = element.child_text("Grade") {
            self.grade = grade.to_string();
        }
        self.ammunition_type = element.child_value("AmmunitionType")?;
        self.fired_proto = element.child_value("FiredProto")?;
        Ok(())
    }

    pub fn save(&self) -> XmlElement {
        XmlElement::new(Self::ELEMENT)
            .with_value("Grade", &self.grade)
            .with_optional("AmmunitionType", self.ammunition_type)
            .with_optional("FiredProto", self.fired_proto)
    }

    pub fn command_table() -> &'static CommandTable<AmmunitionBase> {
        static TABLE: OnceLock<CommandTable<AmmunitionBase>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(&["grade"], "grade <text> - sets the ammunition grade", Self::cmd_grade)
                .verb(
                    &["type", "ammotype"],
                    "type <ammo type> - sets the ammunition type",
                    Self::cmd_type,
                )
                .verb(
                    &["fired", "fire"],
                    "fired <item proto>|none - sets the prototype loaded when this is fired",
                    Self::cmd_fired,
                )
        })
    }

    fn cmd_grade(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let grade = parse_text(input, "the ammunition grade")?;
        self.grade = grade;
        Ok(CommandOutcome::Changed(format!(
            "This ammunition is now of the {} grade.",
            self.grade
        )))
    }

    fn cmd_type(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let entry = parse_reference(ctx, input, CatalogKind::AmmunitionType)?;
        self.ammunition_type = Some(entry.id);
        Ok(CommandOutcome::Changed(format!(
            "This ammunition is now of type {} (#{}).",
            entry.name, entry.id
        )))
    }

    fn cmd_fired(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        match parse_optional_reference(ctx, input, CatalogKind::ItemProto)? {
            Some(proto) => {
                self.fired_proto = Some(proto.id);
                Ok(CommandOutcome::Changed(format!(
                    "When fired, this ammunition will load item prototype {} (#{}).",
                    proto.name, proto.id
                )))
            }
            None => {
                self.fired_proto = None;
                Ok(CommandOutcome::Changed(
                    "This ammunition no longer loads another prototype when fired.".to_string(),
                ))
            }
        }
    }

    pub fn describe(&self, ctx: &BuildContext<'_>) -> String {
        format!(
            "Grade: {}\nAmmunition Type: {}\nLoads On Fire: {}\n",
            self.grade,
            ctx.catalog
                .describe(CatalogKind::AmmunitionType, self.ammunition_type),
            ctx.catalog.describe(CatalogKind::ItemProto, self.fired_proto)
        )
    }

    pub fn why_cannot_submit(&self) -> Option<String> {
        if self.ammunition_type.is_none() {
            return Some("It must have an ammunition type.".to_string());
        }
        None
    }
}
