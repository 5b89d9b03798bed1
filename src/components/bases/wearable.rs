use std::sync::OnceLock;

use crate::components::catalog::CatalogKind;
use crate::components::command::{
    parse_optional_reference, parse_text, yes_no, BuildContext, CommandOutcome, CommandResult,
    CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::types::CatalogId;
use crate::components::xml::XmlElement;

/// Body-profile targeting and worn presentation shared by wearable items.
#[derive(Debug, Clone, PartialEq)]
pub struct WearableBase {
    /// Named wear profiles (e.g. `Eyes`, `Waist`) this item can be worn on.
    pub profiles: Vec<String>,
    pub bulky: bool,
    pub displays_when_worn: bool,
    /// Prog deciding whether a given wearer may put the item on.
    pub can_wear_prog: Option<CatalogId>,
}

impl Default for WearableBase {
    fn default() -> Self {
        Self {
            profiles: Vec::new(),
            bulky: false,
            displays_when_worn: true,
            can_wear_prog: None,
        }
    }
}

impl WearableBase {
    pub const ELEMENT: &'static str = "Wearable";

    pub fn with_profile(mut self, profile: &str) -> Self {
        self.profiles.push(profile.to_string());
        self
    }

    pub fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        let Some(element) = definition.child(Self::ELEMENT) else {
            return Ok(());
        };
        self.bulky = element.attr_value("Bulky")?.unwrap_or(self.bulky);
        self.displays_when_worn = element
            .attr_value("Displays")?
            .unwrap_or(self.displays_when_worn);
        self.can_wear_prog = element.child_value("CanWearProg")?;
        self.profiles = element
            .children_named("Profile")
            .map(|profile| profile.text.clone())
            .collect();
        Ok(())
    }

    pub fn save(&self) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT)
            .with_attr("Bulky", self.bulky)
            .with_attr("Displays", self.displays_when_worn)
            .with_optional("CanWearProg", self.can_wear_prog);
        for profile in &self.profiles {
            element.push(XmlElement::leaf("Profile", profile));
        }
        element
    }

    pub fn command_table() -> &'static CommandTable<WearableBase> {
        static TABLE: OnceLock<CommandTable<WearableBase>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["profile", "wear"],
                    "profile <name> - toggles a wear profile this item can be worn on",
                    Self::cmd_profile,
                )
                .verb(&["bulky"], "bulky - toggles whether this item is bulky when worn", Self::cmd_bulky)
                .verb(
                    &["displays", "visible"],
                    "displays - toggles whether this item shows when worn",
                    Self::cmd_displays,
                )
                .verb(
                    &["canwear", "wearprog"],
                    "canwear <prog>|none - sets a prog deciding who may wear this",
                    Self::cmd_can_wear,
                )
        })
    }

    fn cmd_profile(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let profile = parse_text(input, "the wear profile")?;
        if let Some(index) = self
            .profiles
            .iter()
            .position(|existing| existing.eq_ignore_ascii_case(&profile))
        {
            let removed = self.profiles.remove(index);
            return Ok(CommandOutcome::Changed(format!(
                "This item can no longer be worn with the {} profile.",
                removed
            )));
        }
        self.profiles.push(profile.clone());
        Ok(CommandOutcome::Changed(format!(
            "This item can now be worn with the {} profile.",
            profile
        )))
    }

    fn cmd_bulky(&mut self, _ctx: &BuildContext<'_>, _input: &mut StringStack) -> CommandResult {
        self.bulky = !self.bulky;
        Ok(CommandOutcome::Changed(format!(
            "This item is {} bulky when worn.",
            if self.bulky { "now" } else { "no longer" }
        )))
    }

    fn cmd_displays(&mut self, _ctx: &BuildContext<'_>, _input: &mut StringStack) -> CommandResult {
        self.displays_when_worn = !self.displays_when_worn;
        Ok(CommandOutcome::Changed(format!(
            "This item will {} when worn.",
            if self.displays_when_worn { "now display" } else { "no longer display" }
        )))
    }

    fn cmd_can_wear(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        match parse_optional_reference(ctx, input, CatalogKind::Prog)? {
            Some(prog) => {
                self.can_wear_prog = Some(prog.id);
                Ok(CommandOutcome::Changed(format!(
                    "The prog {} (#{}) now decides who may wear this item.",
                    prog.name, prog.id
                )))
            }
            None => {
                self.can_wear_prog = None;
                Ok(CommandOutcome::Changed("Anyone may now wear this item.".to_string()))
            }
        }
    }

    pub fn describe(&self, ctx: &BuildContext<'_>) -> String {
        let profiles = if self.profiles.is_empty() {
            "None".to_string()
        } else {
            self.profiles.join(", ")
        };
        format!(
            "Wear Profiles: {}\nBulky: {}\nDisplays When Worn: {}\nCan Wear Prog: {}\n",
            profiles,
            yes_no(self.bulky),
            yes_no(self.displays_when_worn),
            ctx.catalog.describe(CatalogKind::Prog, self.can_wear_prog)
        )
    }

    pub fn why_cannot_submit(&self) -> Option<String> {
        if self.profiles.is_empty() {
            return Some("It must have at least one wear profile.".to_string());
        }
        None
    }
}
