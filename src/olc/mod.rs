//! # Online Creation Workshop
//!
//! Line-oriented front end for authoring component prototypes. A builder
//! opens one prototype at a time with `comp new` or `comp edit`; every line
//! that is not a `comp` command is handed to the open draft as a building
//! command, and the draft is written back to the store whenever the command
//! reports a change.
//!
//! ## Commands
//! - `comp new <type> <name>` - create and open a new draft
//! - `comp edit <id>` - open the latest revision of a component
//! - `comp close` - stop editing
//! - `comp show` - describe the open prototype
//! - `comp list` - list stored components
//! - `comp submit` - report whether the open draft could be approved
//! - `comp approve` - make the open draft current
//! - `comp revise` - open a new draft revision of the current prototype
//! - `comp types` / `comp help <type>` - type reference
//! - `comp xml` - show the persisted definition of the open prototype

use log::{debug, info, warn};

use crate::components::catalog::Catalog;
use crate::components::command::{BuildContext, CommandOutcome};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::manager::ComponentManager;
use crate::components::proto::ComponentPrototype;
use crate::components::storage::ComponentStore;
use crate::components::types::RevisionStatus;
use crate::components::units::UnitConverter;
use crate::logutil::escape_log;

/// One parsed workshop line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OlcCommand {
    New { keyword: String, name: String },
    Edit(u64),
    Close,
    Show,
    List,
    Submit,
    Approve,
    Revise,
    Types,
    Help(Option<String>),
    Xml,
    /// A building command for the open draft, passed through untouched.
    Building(String),
    /// A malformed `comp` line; carries the usage message.
    Invalid(String),
}

impl OlcCommand {
    pub fn parse(line: &str) -> OlcCommand {
        let line = line.trim();
        let mut input = StringStack::new(line);
        let head = input.pop_for_switch();
        if head != "comp" && head != "component" {
            return OlcCommand::Building(line.to_string());
        }

        match input.pop_for_switch().as_str() {
            "new" | "create" => {
                let keyword = input.pop();
                if keyword.is_empty() {
                    return OlcCommand::Invalid("Usage: comp new <type> <name>".to_string());
                }
                let name = input.pop_remaining();
                let name = if name.is_empty() {
                    format!("new {}", keyword.to_lowercase())
                } else {
                    name
                };
                OlcCommand::New { keyword, name }
            }
            "edit" | "open" => match input.pop().trim_start_matches('#').parse() {
                Ok(id) => OlcCommand::Edit(id),
                Err(_) => OlcCommand::Invalid("Usage: comp edit <id>".to_string()),
            },
            "close" => OlcCommand::Close,
            "show" | "view" => OlcCommand::Show,
            "list" => OlcCommand::List,
            "submit" | "check" => OlcCommand::Submit,
            "approve" => OlcCommand::Approve,
            "revise" | "revision" => OlcCommand::Revise,
            "types" => OlcCommand::Types,
            "help" => {
                let topic = input.pop();
                OlcCommand::Help((!topic.is_empty()).then_some(topic))
            }
            "xml" => OlcCommand::Xml,
            "" => OlcCommand::Help(None),
            other => OlcCommand::Invalid(format!(
                "'{}' is not a comp command. Type comp help for the list.",
                other
            )),
        }
    }
}

pub struct Workshop {
    manager: ComponentManager,
    store: ComponentStore,
    catalog: Box<dyn Catalog>,
    units: Box<dyn UnitConverter>,
    actor: String,
    allow_self_approval: bool,
    open: Option<ComponentPrototype>,
}

impl Workshop {
    pub fn new(
        manager: ComponentManager,
        store: ComponentStore,
        catalog: Box<dyn Catalog>,
        units: Box<dyn UnitConverter>,
        actor: &str,
    ) -> Self {
        Self {
            manager,
            store,
            catalog,
            units,
            actor: actor.to_string(),
            allow_self_approval: true,
            open: None,
        }
    }

    pub fn with_self_approval(mut self, allowed: bool) -> Self {
        self.allow_self_approval = allowed;
        self
    }

    /// Switch the author attributed with subsequent edits.
    pub fn set_actor(&mut self, actor: &str) {
        self.actor = actor.to_string();
    }

    pub fn manager(&self) -> &ComponentManager {
        &self.manager
    }

    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    pub fn open_prototype(&self) -> Option<&ComponentPrototype> {
        self.open.as_ref()
    }

    /// Process one line and return the text to show the author.
    ///
    /// Author mistakes come back as `Ok` messages; `Err` is reserved for
    /// storage failures and broken invariants.
    pub fn handle_line(&mut self, line: &str) -> Result<String, ComponentError> {
        let command = OlcCommand::parse(line);
        debug!("olc {}: {:?}", escape_log(&self.actor), command);
        let result = match command {
            OlcCommand::New { keyword, name } => self.create(&keyword, &name),
            OlcCommand::Edit(id) => self.edit(id),
            OlcCommand::Close => Ok(self.close()),
            OlcCommand::Show => Ok(self.show()),
            OlcCommand::List => self.list(),
            OlcCommand::Submit => Ok(self.submit_report()),
            OlcCommand::Approve => self.approve(),
            OlcCommand::Revise => self.revise(),
            OlcCommand::Types => Ok(self.types()),
            OlcCommand::Help(topic) => Ok(self.help(topic.as_deref())),
            OlcCommand::Xml => Ok(self.xml()),
            OlcCommand::Building(line) => self.building(&line),
            OlcCommand::Invalid(usage) => Ok(usage),
        };
        author_facing(result)
    }

    fn create(&mut self, keyword: &str, name: &str) -> Result<String, ComponentError> {
        let id = self.store.next_component_id()?;
        let mut prototype = self.manager.new_prototype(keyword, id, &self.actor, name)?;
        self.store.save_component(&mut prototype)?;
        info!(
            "{} created {} component {} ({})",
            escape_log(&self.actor),
            prototype.type_name(),
            prototype.key(),
            escape_log(name)
        );
        let message = format!(
            "You create a new {} component {} called {} and open it for editing.",
            prototype.type_name(),
            prototype.key(),
            prototype.name()
        );
        self.open = Some(prototype);
        Ok(message)
    }

    fn edit(&mut self, id: u64) -> Result<String, ComponentError> {
        let prototype = self.store.latest_component(&self.manager, id)?;
        let message = match prototype.status() {
            RevisionStatus::Draft => format!(
                "You open {} component {} ({}) for editing.",
                prototype.type_name(),
                prototype.key(),
                prototype.name()
            ),
            status => format!(
                "You open {} component {} ({}). It is {}; use comp revise to edit it.",
                prototype.type_name(),
                prototype.key(),
                prototype.name(),
                status
            ),
        };
        self.open = Some(prototype);
        Ok(message)
    }

    fn close(&mut self) -> String {
        match self.open.take() {
            Some(prototype) => format!("You stop editing component {}.", prototype.key()),
            None => "You are not editing anything.".to_string(),
        }
    }

    fn show(&self) -> String {
        let Some(prototype) = &self.open else {
            return NOTHING_OPEN.to_string();
        };
        let ctx = BuildContext::new(&self.actor, self.catalog.as_ref(), self.units.as_ref());
        prototype.component_description_olc(&ctx)
    }

    fn list(&self) -> Result<String, ComponentError> {
        let records = self.store.list_components()?;
        if records.is_empty() {
            return Ok("There are no components yet.".to_string());
        }
        let mut out = String::from("Components:\n");
        for record in records {
            out.push_str(&format!(
                "  {:<10} {:<22} {:<12} {}\n",
                record.key(),
                record.type_name,
                record.header.status,
                record.header.name
            ));
        }
        Ok(out)
    }

    fn submit_report(&self) -> String {
        let Some(prototype) = &self.open else {
            return NOTHING_OPEN.to_string();
        };
        if prototype.status() != RevisionStatus::Draft {
            return format!("Component {} is already {}.", prototype.key(), prototype.status());
        }
        match prototype.why_cannot_submit() {
            Some(reason) => format!("Component {} cannot be approved yet. {}", prototype.key(), reason),
            None => format!("Component {} is ready for approval.", prototype.key()),
        }
    }

    fn approve(&mut self) -> Result<String, ComponentError> {
        let Some(prototype) = self.open.as_mut() else {
            return Ok(NOTHING_OPEN.to_string());
        };
        if !self.allow_self_approval && prototype.header().builder == self.actor {
            return Ok("You cannot approve your own work.".to_string());
        }
        self.store
            .approve_component(&self.manager, prototype, &self.actor)?;
        Ok(format!(
            "{} component {} ({}) is now current.",
            prototype.type_name(),
            prototype.key(),
            prototype.name()
        ))
    }

    fn revise(&mut self) -> Result<String, ComponentError> {
        let Some(prototype) = &self.open else {
            return Ok(NOTHING_OPEN.to_string());
        };
        let latest = self.store.latest_component(&self.manager, prototype.id())?;
        if latest.revision() > prototype.revision() && latest.status() == RevisionStatus::Draft {
            let message = format!(
                "Component {} already has an open draft {}; you open that instead.",
                prototype.id(),
                latest.key()
            );
            self.open = Some(latest);
            return Ok(message);
        }
        let mut revision = prototype.create_new_revision(&self.actor)?;
        self.store.save_component(&mut revision)?;
        let message = format!(
            "You create revision {} of component {} and open it for editing.",
            revision.revision(),
            revision.id()
        );
        self.open = Some(revision);
        Ok(message)
    }

    fn types(&self) -> String {
        let mut out = String::from("Component types:\n");
        for (keyword, type_name) in self.manager.keywords() {
            let short = self
                .manager
                .type_help(type_name)
                .map(|help| help.short_help.as_str())
                .unwrap_or("");
            out.push_str(&format!("  {:<22} {}\n", keyword, short));
        }
        out
    }

    fn help(&self, topic: Option<&str>) -> String {
        match topic {
            Some(topic) => match self.manager.type_help(topic) {
                Some(help) => format!("{}: {}\n{}", help.type_name, help.short_help, help.long_help),
                None => format!("There is no component type called {}.", topic),
            },
            None => [
                "comp new <type> <name> - create a new component",
                "comp edit <id>         - open a component",
                "comp close             - stop editing",
                "comp show              - describe the open component",
                "comp list              - list all components",
                "comp submit            - check whether the draft can be approved",
                "comp approve           - approve the open draft",
                "comp revise            - start a new revision of a current component",
                "comp types             - list component types",
                "comp help <type>       - options for a component type",
                "comp xml               - show the stored definition",
                "Any other line is a building command for the open component.",
            ]
            .join("\n"),
        }
    }

    fn xml(&self) -> String {
        match &self.open {
            Some(prototype) => prototype.save_to_xml(),
            None => NOTHING_OPEN.to_string(),
        }
    }

    fn building(&mut self, line: &str) -> Result<String, ComponentError> {
        let Some(prototype) = self.open.as_mut() else {
            return Ok(NOTHING_OPEN.to_string());
        };
        let ctx = BuildContext::new(&self.actor, self.catalog.as_ref(), self.units.as_ref());
        let outcome = prototype.building_command(&ctx, &mut StringStack::new(line));
        if let CommandOutcome::Changed(_) = outcome {
            self.store.save_component(prototype)?;
        }
        Ok(outcome.message().to_string())
    }
}

const NOTHING_OPEN: &str = "You are not editing any component. Use comp new or comp edit first.";

/// Turn lifecycle errors an author can cause into plain messages.
fn author_facing(result: Result<String, ComponentError>) -> Result<String, ComponentError> {
    match result {
        Err(err @ ComponentError::UnknownComponentType(_)) => {
            Ok(format!("{}. Type comp types to see what you can build.", capitalised(&err)))
        }
        Err(
            err @ (ComponentError::NotFound(_)
            | ComponentError::SubmissionBlocked { .. }
            | ComponentError::InvalidTransition { .. }
            | ComponentError::RevisionNotSupported(_)
            | ComponentError::NotEditable(_)),
        ) => {
            warn!("olc request refused: {}", err);
            let mut message = capitalised(&err);
            if !message.ends_with('.') {
                message.push('.');
            }
            Ok(message)
        }
        Err(err @ ComponentError::MalformedDefinition(_)) => {
            warn!("olc could not load a stored definition: {}", err);
            Ok(format!(
                "That component could not be loaded ({}). It needs repair before it can be edited.",
                err
            ))
        }
        other => other,
    }
}

fn capitalised(err: &ComponentError) -> String {
    crate::components::command::capitalise(&err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comp_lines_parse_into_commands() {
        assert_eq!(
            OlcCommand::parse("comp new belt \"leather belt\""),
            OlcCommand::New {
                keyword: "belt".to_string(),
                name: "leather belt".to_string()
            }
        );
        assert_eq!(OlcCommand::parse("COMP EDIT #12"), OlcCommand::Edit(12));
        assert_eq!(OlcCommand::parse("comp help armour"), OlcCommand::Help(Some("armour".to_string())));
        assert_eq!(OlcCommand::parse("comp"), OlcCommand::Help(None));
        assert!(matches!(OlcCommand::parse("comp edit fred"), OlcCommand::Invalid(_)));
        assert!(matches!(OlcCommand::parse("comp dance"), OlcCommand::Invalid(_)));
    }

    #[test]
    fn other_lines_are_building_commands() {
        assert_eq!(
            OlcCommand::parse("  capacity 3 "),
            OlcCommand::Building("capacity 3".to_string())
        );
    }
}
