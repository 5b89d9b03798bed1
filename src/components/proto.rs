//! The component prototype contract.
//!
//! A [`ComponentPrototype`] is the revisioned envelope (id, revision, status,
//! name, description) around a type-specific [`ComponentDefinition`]. The
//! envelope owns the lifecycle rules; the definition owns its XML fields,
//! verbs and description.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::components::command::{BuildContext, CommandOutcome};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::ComponentInstance;
use crate::components::types::{Connectable, ConnectorType, ItemId, ProtoKey, RevisionStatus};
use crate::components::xml::XmlElement;
use crate::logutil::escape_log;

/// Type-specific half of a component prototype.
pub trait ComponentDefinition: fmt::Debug + Send + Sync + Any {
    /// Canonical persistence type name, e.g. `Belt`.
    fn type_name(&self) -> &'static str;

    /// Read fields from a `<Definition>` element. Absent optional elements keep their defaults.
    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError>;

    /// Write fields to a `<Definition>` element; the left inverse of [`load`](Self::load).
    fn save(&self) -> XmlElement;

    /// Handle one verb, or `None` if this type does not know it.
    fn building_command(
        &mut self,
        verb: &str,
        ctx: &BuildContext<'_>,
        input: &mut StringStack,
    ) -> Option<CommandOutcome>;

    fn help_lines(&self) -> Vec<String>;

    /// Type-specific part of the OLC summary.
    fn describe(&self, ctx: &BuildContext<'_>) -> String;

    /// Reason a draft cannot be approved yet, if any.
    fn why_cannot_submit(&self) -> Option<String> {
        None
    }

    /// System-generated types can never be edited by authors.
    fn read_only(&self) -> bool {
        false
    }

    /// System-generated types can never be loaded onto items by hand.
    fn prevent_manual_load(&self) -> bool {
        false
    }

    fn connectors(&self) -> Vec<ConnectorType> {
        Vec::new()
    }

    /// Component types this one expects to find on the same item prototype.
    fn companion_types(&self) -> &'static [&'static str] {
        &[]
    }

    fn clone_box(&self) -> Box<dyn ComponentDefinition>;

    fn create_instance(
        &self,
        prototype: Arc<ComponentPrototype>,
        parent: ItemId,
        temporary: bool,
    ) -> Box<dyn ComponentInstance>;

    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProtoHeader {
    pub id: u64,
    pub revision: u32,
    pub status: RevisionStatus,
    pub name: String,
    pub description: String,
    pub builder: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewer: Option<String>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    /// Unsaved edits are pending. Never persisted.
    #[serde(skip)]
    pub changed: bool,
}

impl ProtoHeader {
    pub fn new_draft(id: u64, builder: &str, name: &str) -> Self {
        Self {
            id,
            revision: 0,
            status: RevisionStatus::Draft,
            name: name.to_string(),
            description: String::new(),
            builder: builder.to_string(),
            created_at: Utc::now(),
            reviewer: None,
            approved_at: None,
            changed: true,
        }
    }

    pub fn key(&self) -> ProtoKey {
        ProtoKey::new(self.id, self.revision)
    }
}

#[derive(Debug)]
pub struct ComponentPrototype {
    header: ProtoHeader,
    definition: Box<dyn ComponentDefinition>,
}

impl Clone for ComponentPrototype {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            definition: self.definition.clone_box(),
        }
    }
}

impl ComponentPrototype {
    pub fn new(header: ProtoHeader, definition: Box<dyn ComponentDefinition>) -> Self {
        Self { header, definition }
    }

    pub fn header(&self) -> &ProtoHeader {
        &self.header
    }

    pub fn key(&self) -> ProtoKey {
        self.header.key()
    }

    pub fn id(&self) -> u64 {
        self.header.id
    }

    pub fn revision(&self) -> u32 {
        self.header.revision
    }

    pub fn status(&self) -> RevisionStatus {
        self.header.status
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn description(&self) -> &str {
        &self.header.description
    }

    pub fn type_name(&self) -> &'static str {
        self.definition.type_name()
    }

    pub fn definition(&self) -> &dyn ComponentDefinition {
        self.definition.as_ref()
    }

    /// Downcast the definition to a concrete component type.
    pub fn definition_as<T: ComponentDefinition>(&self) -> Option<&T> {
        self.definition.as_any().downcast_ref::<T>()
    }

    pub fn is_changed(&self) -> bool {
        self.header.changed
    }

    /// Clear the dirty marker after the prototype has been written out.
    pub fn mark_saved(&mut self) {
        self.header.changed = false;
    }

    pub fn read_only(&self) -> bool {
        self.definition.read_only()
    }

    pub fn prevent_manual_load(&self) -> bool {
        self.definition.prevent_manual_load()
    }

    /// Replace the definition's fields from persisted XML text.
    pub fn load_from_xml(&mut self, xml: &str) -> Result<(), ComponentError> {
        let root = XmlElement::parse(xml)?;
        self.load_definition(&root)
    }

    pub fn load_definition(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        if definition.name != "Definition" {
            return Err(ComponentError::MalformedDefinition(format!(
                "expected <Definition>, found <{}>",
                definition.name
            )));
        }
        self.definition.load(definition)
    }

    pub fn save_to_xml(&self) -> String {
        self.definition.save().to_string()
    }

    /// Run one building command line against this prototype.
    ///
    /// Only drafts can be edited. The first token selects the verb; the type's
    /// own table is consulted before the shared `name`/`desc`/`help` verbs.
    pub fn building_command(&mut self, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandOutcome {
        if self.read_only() {
            return CommandOutcome::Rejected(format!(
                "{} components are generated by the system and cannot be edited.",
                self.type_name()
            ));
        }
        if self.header.status != RevisionStatus::Draft {
            return CommandOutcome::Rejected(format!(
                "Component {} is {}; create a new revision before editing it.",
                self.key(),
                self.header.status
            ));
        }

        let before = (self.save_to_xml(), self.header.name.clone(), self.header.description.clone());
        let verb = input.pop_for_switch();
        let outcome = if verb.is_empty() {
            CommandOutcome::Unchanged(self.help_text())
        } else if let Some(outcome) = self.definition.building_command(&verb, ctx, input) {
            outcome
        } else {
            self.base_command(&verb, ctx, input)
        };
        // Re-applying a value already in place leaves nothing to persist.
        let outcome = match outcome {
            CommandOutcome::Changed(message)
                if before == (self.save_to_xml(), self.header.name.clone(), self.header.description.clone()) =>
            {
                CommandOutcome::Unchanged(message)
            }
            other => other,
        };

        if outcome.is_changed() {
            self.header.changed = true;
            debug!(
                "component {} edited by {}: {}",
                self.key(),
                escape_log(ctx.actor),
                escape_log(outcome.message())
            );
        }
        outcome
    }

    fn base_command(&mut self, verb: &str, ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandOutcome {
        match verb {
            "name" => {
                if input.is_finished() {
                    return CommandOutcome::Rejected("What name do you want to give this component?".to_string());
                }
                self.header.name = input.pop_remaining();
                CommandOutcome::Changed(format!("This component is now called {}.", self.header.name))
            }
            "desc" | "description" => {
                if input.is_finished() {
                    return CommandOutcome::Rejected("What description do you want to give this component?".to_string());
                }
                self.header.description = input.pop_remaining();
                CommandOutcome::Changed(format!("The description is now: {}", self.header.description))
            }
            "help" | "?" => CommandOutcome::Unchanged(self.help_text()),
            "show" => CommandOutcome::Unchanged(self.component_description_olc(ctx)),
            other => CommandOutcome::Unknown(format!(
                "'{}' is not a valid option for {} components. Type help to see the options.",
                other,
                self.type_name()
            )),
        }
    }

    pub fn help_text(&self) -> String {
        let mut lines = vec![format!("Options for {} components:", self.type_name())];
        lines.push("  name <name> - sets the name of this component".to_string());
        lines.push("  desc <text> - sets the builder-facing description".to_string());
        lines.push("  show - shows the current configuration".to_string());
        lines.extend(self.definition.help_lines().into_iter().map(|line| format!("  {}", line)));
        lines.join("\n")
    }

    /// Human-readable summary of the current configuration for the editing UI.
    pub fn component_description_olc(&self, ctx: &BuildContext<'_>) -> String {
        let mut out = format!(
            "{} Component {} - {} [{}]\n",
            self.type_name(),
            self.key(),
            self.header.name,
            self.header.status
        );
        if !self.header.description.is_empty() {
            out.push_str(&self.header.description);
            out.push('\n');
        }
        out.push_str(&format!("Built by {}\n\n", self.header.builder));
        out.push_str(&self.definition.describe(ctx));
        out
    }

    /// Create the runtime instance of this component for one item.
    pub fn create_new(
        self: &Arc<Self>,
        parent: ItemId,
        temporary: bool,
    ) -> Result<Box<dyn ComponentInstance>, ComponentError> {
        if self.header.status != RevisionStatus::Current {
            return Err(ComponentError::NotApproved {
                key: self.key(),
                status: self.header.status,
            });
        }
        Ok(self.definition.create_instance(Arc::clone(self), parent, temporary))
    }

    /// Copy-on-write: a new draft seeded from this revision's fields. `self` is untouched.
    pub fn create_new_revision(&self, initiator: &str) -> Result<ComponentPrototype, ComponentError> {
        if self.read_only() {
            return Err(ComponentError::RevisionNotSupported(self.type_name()));
        }
        if self.header.status != RevisionStatus::Current {
            return Err(ComponentError::InvalidTransition {
                key: self.key(),
                from: self.header.status,
                to: RevisionStatus::Draft,
            });
        }
        let mut header = self.header.clone();
        header.revision += 1;
        header.status = RevisionStatus::Draft;
        header.builder = initiator.to_string();
        header.created_at = Utc::now();
        header.reviewer = None;
        header.approved_at = None;
        header.changed = true;
        info!(
            "component {} revised by {} as {}",
            self.key(),
            escape_log(initiator),
            header.key()
        );
        Ok(ComponentPrototype {
            header,
            definition: self.definition.clone_box(),
        })
    }

    pub fn why_cannot_submit(&self) -> Option<String> {
        if self.header.name.trim().is_empty() {
            return Some("It must have a name.".to_string());
        }
        self.definition.why_cannot_submit()
    }

    pub fn can_submit(&self) -> bool {
        self.why_cannot_submit().is_none()
    }

    /// Move along `Draft -> Current -> Superseded`.
    pub fn change_status(&mut self, to: RevisionStatus, actor: &str) -> Result<(), ComponentError> {
        let from = self.header.status;
        match (from, to) {
            (RevisionStatus::Draft, RevisionStatus::Current) => {
                if let Some(reason) = self.why_cannot_submit() {
                    return Err(ComponentError::SubmissionBlocked {
                        key: self.key(),
                        reason,
                    });
                }
                self.header.reviewer = Some(actor.to_string());
                self.header.approved_at = Some(Utc::now());
            }
            (RevisionStatus::Current, RevisionStatus::Superseded) => {}
            _ => {
                return Err(ComponentError::InvalidTransition {
                    key: self.key(),
                    from,
                    to,
                })
            }
        }
        self.header.status = to;
        self.header.changed = true;
        info!("component {} {} -> {} by {}", self.key(), from, to, escape_log(actor));
        Ok(())
    }
}

impl Connectable for ComponentPrototype {
    fn connectors(&self) -> Vec<ConnectorType> {
        self.definition.connectors()
    }
}
