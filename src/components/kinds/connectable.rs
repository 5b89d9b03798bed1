use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::command::{BuildContext, CommandOutcome, CommandResult, CommandTable};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{load_item_ids, save_item_ids, ComponentInstance, InstanceCore};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::{Connectable, ConnectorGender, ConnectorType, ItemId};
use crate::components::xml::XmlElement;

/// Parse `<gender> <type name>` as typed by an author.
pub(crate) fn parse_connector(input: &mut StringStack) -> Result<ConnectorType, String> {
    const USAGE: &str = "You must specify a gender (male, female or neuter) and a connection type.";
    if input.is_finished() {
        return Err(USAGE.to_string());
    }
    let gender: ConnectorGender = input.pop().parse()?;
    if input.is_finished() {
        return Err(USAGE.to_string());
    }
    let connection_type = input.pop_remaining();
    let connection_type = connection_type.trim();
    if connection_type.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(ConnectorType::new(gender, connection_type))
}

pub(crate) fn connector_element(connector: &ConnectorType) -> XmlElement {
    XmlElement::new("Connection")
        .with_attr("gender", connector.gender)
        .with_attr("type", &connector.connection_type)
}

pub(crate) fn load_connector(element: &XmlElement) -> Result<ConnectorType, ComponentError> {
    let gender = element
        .attr("gender")
        .unwrap_or_default()
        .parse::<ConnectorGender>()
        .map_err(ComponentError::MalformedDefinition)?;
    let connection_type = element.attr("type").unwrap_or_default();
    if connection_type.trim().is_empty() {
        return Err(ComponentError::MalformedDefinition(
            "<Connection> without a type".to_string(),
        ));
    }
    Ok(ConnectorType::new(gender, connection_type))
}

/// An item that plugs into other items through one or more typed connectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachableConnectable {
    pub connectors: Vec<ConnectorType>,
}

impl AttachableConnectable {
    pub const TYPE_NAME: &'static str = "AttachableConnectable";

    pub fn command_table() -> &'static CommandTable<AttachableConnectable> {
        static TABLE: OnceLock<CommandTable<AttachableConnectable>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["connector", "connection"],
                    "connector <gender> <type> - toggles a connector on this item",
                    Self::cmd_connector,
                )
                .verb(&["clear"], "clear - removes every connector", Self::cmd_clear)
        })
    }

    fn cmd_connector(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        let connector = parse_connector(input)?;
        if let Some(index) = self.connectors.iter().position(|existing| {
            existing.gender == connector.gender
                && existing
                    .connection_type
                    .eq_ignore_ascii_case(&connector.connection_type)
        }) {
            let removed = self.connectors.remove(index);
            return Ok(CommandOutcome::Changed(format!(
                "This item no longer has a {} connector.",
                removed
            )));
        }
        let message = format!("This item now has a {} connector.", connector);
        self.connectors.push(connector);
        Ok(CommandOutcome::Changed(message))
    }

    fn cmd_clear(&mut self, _ctx: &BuildContext<'_>, _input: &mut StringStack) -> CommandResult {
        if self.connectors.is_empty() {
            return Ok(CommandOutcome::Unchanged(
                "This item has no connectors to clear.".to_string(),
            ));
        }
        self.connectors.clear();
        Ok(CommandOutcome::Changed("This item no longer has any connectors.".to_string()))
    }
}

impl ComponentDefinition for AttachableConnectable {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        if let Some(connectors) = definition.child("Connectors") {
            self.connectors = connectors
                .children_named("Connection")
                .map(load_connector)
                .collect::<Result<_, _>>()?;
        }
        Ok(())
    }

    fn save(&self) -> XmlElement {
        let mut connectors = XmlElement::new("Connectors");
        for connector in &self.connectors {
            connectors.push(connector_element(connector));
        }
        XmlElement::new("Definition").with_child(connectors)
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

    fn describe(&self, _ctx: &BuildContext<'_>) -> String {
        let mut out = "This item can be attached to other items by connectors.\n".to_string();
        if self.connectors.is_empty() {
            out.push_str("Connectors: None\n");
        }
        for connector in &self.connectors {
            out.push_str(&format!("Connector: {}\n", connector));
        }
        out
    }

    fn why_cannot_submit(&self) -> Option<String> {
        if self.connectors.is_empty() {
            return Some("It must have at least one connector.".to_string());
        }
        None
    }

    fn connectors(&self) -> Vec<ConnectorType> {
        self.connectors.clone()
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
        Box::new(ConnectableInstance {
            core: InstanceCore::new(prototype, parent, temporary),
            connected: Vec::new(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct ConnectableInstance {
    core: InstanceCore,
    connected: Vec<ItemId>,
}

impl ConnectableInstance {
    pub fn connected(&self) -> &[ItemId] {
        &self.connected
    }

    /// Connect to `item` whose components expose `other`'s connectors.
    /// Each connector carries at most one connection.
    pub fn connect(&mut self, item: ItemId, other: &dyn Connectable) -> Result<(), String> {
        let prototype = self.core.prototype.as_ref();
        if !prototype.can_connect_to(other) {
            return Err("Those connectors are not compatible.".to_string());
        }
        if self.connected.contains(&item) {
            return Err("Those are already connected.".to_string());
        }
        if self.connected.len() >= prototype.connectors().len() {
            return Err("There are no free connectors left.".to_string());
        }
        self.connected.push(item);
        Ok(())
    }

    pub fn disconnect(&mut self, item: ItemId) -> bool {
        let before = self.connected.len();
        self.connected.retain(|connected| *connected != item);
        before != self.connected.len()
    }
}

impl ComponentInstance for ConnectableInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        save_item_ids(self.core.state_element(), &self.connected)
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.connected = load_item_ids(state)?;
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
    manager.add_builder_loader("connectable", true, || {
        Box::new(AttachableConnectable::default())
    });
    manager.add_builder_loader("attachableconnectable", false, || {
        Box::new(AttachableConnectable::default())
    });
    manager.add_database_loader(AttachableConnectable::TYPE_NAME, || {
        Box::new(AttachableConnectable::default())
    });
    manager.add_type_help_info(
        AttachableConnectable::TYPE_NAME,
        "Lets an item plug into other items through typed connectors",
        &long_help(AttachableConnectable::command_table()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::catalog::InMemoryCatalog;
    use crate::components::units::MetricUnits;

    #[test]
    fn connector_verb_toggles_and_validates() {
        let catalog = InMemoryCatalog::new();
        let ctx = BuildContext::new("tester", &catalog, &MetricUnits);
        let mut item = AttachableConnectable::default();

        let outcome = item
            .building_command("connector", &ctx, &mut StringStack::new("sideways power"))
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::Rejected(_)));
        let outcome = item
            .building_command("connector", &ctx, &mut StringStack::new("male"))
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::Rejected(_)));

        item.building_command("connector", &ctx, &mut StringStack::new("male \"Audio Jack\""))
            .unwrap();
        assert_eq!(
            item.connectors,
            vec![ConnectorType::new(ConnectorGender::Male, "Audio Jack")]
        );
        item.building_command("connector", &ctx, &mut StringStack::new("m audio jack"))
            .unwrap();
        assert!(item.connectors.is_empty());
    }

    #[test]
    fn connectors_survive_xml() {
        let item = AttachableConnectable {
            connectors: vec![
                ConnectorType::new(ConnectorGender::Female, "Power"),
                ConnectorType::new(ConnectorGender::Neuter, "Chain"),
            ],
        };
        let mut loaded = AttachableConnectable::default();
        loaded.load(&item.save()).unwrap();
        assert_eq!(loaded, item);
    }
}
