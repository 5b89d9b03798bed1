use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::bases::WearableBase;
use crate::components::command::{BuildContext, CommandOutcome, CommandTable};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{ComponentInstance, StatelessInstance};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::ItemId;
use crate::components::xml::XmlElement;

/// Plain wearable item: clothing, jewellery and the like.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wearable {
    pub wearable: WearableBase,
}

impl Wearable {
    pub const TYPE_NAME: &'static str = "Wearable";

    pub fn command_table() -> &'static CommandTable<Wearable> {
        static TABLE: OnceLock<CommandTable<Wearable>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new().overlay(WearableBase::command_table(), |leaf| &mut leaf.wearable)
        })
    }
}

impl ComponentDefinition for Wearable {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.wearable.load(definition)
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition").with_child(self.wearable.save())
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
        format!("This item can be worn.\n{}", self.wearable.describe(ctx))
    }

    fn why_cannot_submit(&self) -> Option<String> {
        self.wearable.why_cannot_submit()
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
    manager.add_builder_loader("wearable", true, || Box::new(Wearable::default()));
    manager.add_builder_loader("clothing", false, || Box::new(Wearable::default()));
    manager.add_database_loader(Wearable::TYPE_NAME, || Box::new(Wearable::default()));
    manager.add_type_help_info(
        Wearable::TYPE_NAME,
        "Lets an item be worn on one or more wear profiles",
        &long_help(Wearable::command_table()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::catalog::InMemoryCatalog;
    use crate::components::units::MetricUnits;

    #[test]
    fn profile_verb_reaches_the_embedded_base() {
        let catalog = InMemoryCatalog::new();
        let ctx = BuildContext::new("tester", &catalog, &MetricUnits);
        let mut wearable = Wearable::default();
        assert!(wearable.why_cannot_submit().is_some());

        let outcome = wearable
            .building_command("profile", &ctx, &mut StringStack::new("Torso"))
            .unwrap();
        assert!(outcome.is_changed());
        assert_eq!(wearable.wearable.profiles, vec!["Torso".to_string()]);
        assert!(wearable.why_cannot_submit().is_none());

        // A second toggle removes it again.
        wearable
            .building_command("wear", &ctx, &mut StringStack::new("torso"))
            .unwrap();
        assert!(wearable.wearable.profiles.is_empty());
    }
}
