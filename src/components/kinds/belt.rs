use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::components::command::{
    parse_number, parse_size, BuildContext, CommandOutcome, CommandResult, CommandTable,
};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{load_item_ids, save_item_ids, ComponentInstance, InstanceCore};
use crate::components::kinds::long_help;
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::{ItemId, SizeCategory};
use crate::components::xml::XmlElement;

/// An item other items can be hung from (pouches, scabbards, tools).
#[derive(Debug, Clone, PartialEq)]
pub struct Belt {
    pub maximum_number_of_belted_items: u32,
    pub maximum_size: SizeCategory,
}

impl Default for Belt {
    fn default() -> Self {
        Self {
            maximum_number_of_belted_items: 1,
            maximum_size: SizeCategory::Small,
        }
    }
}

impl Belt {
    pub const TYPE_NAME: &'static str = "Belt";

    pub fn command_table() -> &'static CommandTable<Belt> {
        static TABLE: OnceLock<CommandTable<Belt>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::new()
                .verb(
                    &["capacity", "count"],
                    "capacity <number> - sets how many items can be attached",
                    Self::cmd_capacity,
                )
                .verb(
                    &["size"],
                    "size <size> - sets the largest item that can be attached",
                    Self::cmd_size,
                )
        })
    }

    fn cmd_capacity(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.maximum_number_of_belted_items = parse_number(input, "the belt capacity", 1, 100)?;
        Ok(CommandOutcome::Changed(format!(
            "This belt can now hold {} {}.",
            self.maximum_number_of_belted_items,
            if self.maximum_number_of_belted_items == 1 { "item" } else { "items" }
        )))
    }

    fn cmd_size(&mut self, _ctx: &BuildContext<'_>, input: &mut StringStack) -> CommandResult {
        self.maximum_size = parse_size(input, "the largest attachable item")?;
        Ok(CommandOutcome::Changed(format!(
            "This belt can now hold items of size {} or smaller.",
            self.maximum_size
        )))
    }
}

impl ComponentDefinition for Belt {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn load(&mut self, definition: &XmlElement) -> Result<(), ComponentError> {
        self.maximum_number_of_belted_items = definition.child_or(
            "MaximumNumberOfBeltedItems",
            self.maximum_number_of_belted_items,
        )?;
        if let Some(size) = definition.child_text("MaximumSize") {
            self.maximum_size = size.parse().map_err(ComponentError::MalformedDefinition)?;
        }
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
            .with_value("MaximumNumberOfBeltedItems", self.maximum_number_of_belted_items)
            .with_value("MaximumSize", self.maximum_size)
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
        format!(
            "This item is a belt. It can hold {} {} of size {} or smaller.\n",
            self.maximum_number_of_belted_items,
            if self.maximum_number_of_belted_items == 1 { "item" } else { "items" },
            self.maximum_size
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
        Box::new(BeltInstance {
            core: InstanceCore::new(prototype, parent, temporary),
            belted: Vec::new(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct BeltInstance {
    core: InstanceCore,
    belted: Vec<ItemId>,
}

impl BeltInstance {
    pub fn belted(&self) -> &[ItemId] {
        &self.belted
    }

    /// Hang `item` of `size` from the belt, or explain why it will not fit.
    pub fn attach(&mut self, item: ItemId, size: SizeCategory) -> Result<(), String> {
        let Some(belt) = self.core.config::<Belt>() else {
            return Err("That is not a belt.".to_string());
        };
        if self.belted.contains(&item) {
            return Err("That item is already attached.".to_string());
        }
        if size > belt.maximum_size {
            return Err(format!(
                "Only items of size {} or smaller can be attached.",
                belt.maximum_size
            ));
        }
        if self.belted.len() >= belt.maximum_number_of_belted_items as usize {
            return Err("There is no room left on the belt.".to_string());
        }
        self.belted.push(item);
        Ok(())
    }

    pub fn detach(&mut self, item: ItemId) -> bool {
        let before = self.belted.len();
        self.belted.retain(|existing| *existing != item);
        before != self.belted.len()
    }
}

impl ComponentInstance for BeltInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        save_item_ids(self.core.state_element(), &self.belted)
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.belted = load_item_ids(state)?;
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
    manager.add_builder_loader("belt", true, || Box::new(Belt::default()));
    manager.add_database_loader(Belt::TYPE_NAME, || Box::new(Belt::default()));
    manager.add_type_help_info(
        Belt::TYPE_NAME,
        "Lets other items be attached to this one when worn",
        &long_help(Belt::command_table()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::catalog::InMemoryCatalog;
    use crate::components::proto::ProtoHeader;
    use crate::components::types::RevisionStatus;
    use crate::components::units::MetricUnits;

    fn run(belt: &mut Belt, verb: &str, args: &str) -> CommandOutcome {
        let catalog = InMemoryCatalog::new();
        let ctx = BuildContext::new("tester", &catalog, &MetricUnits);
        belt.building_command(verb, &ctx, &mut StringStack::new(args))
            .expect("known verb")
    }

    #[test]
    fn rejects_out_of_range_capacity() {
        let mut belt = Belt::default();
        assert!(matches!(run(&mut belt, "capacity", "0"), CommandOutcome::Rejected(_)));
        assert!(matches!(run(&mut belt, "capacity", "lots"), CommandOutcome::Rejected(_)));
        assert!(matches!(run(&mut belt, "size", "colossal"), CommandOutcome::Rejected(_)));
        assert_eq!(belt, Belt::default());
    }

    #[test]
    fn instance_respects_capacity_and_size() {
        let belt = Belt {
            maximum_number_of_belted_items: 2,
            maximum_size: SizeCategory::Small,
        };
        let mut header = ProtoHeader::new_draft(1, "tester", "Belt");
        header.status = RevisionStatus::Current;
        let proto = Arc::new(ComponentPrototype::new(header, Box::new(belt)));
        let mut instance = proto.create_new(10, false).unwrap();
        let belt = instance.as_any_mut().downcast_mut::<BeltInstance>().unwrap();

        assert!(belt.attach(20, SizeCategory::Medium).is_err());
        assert!(belt.attach(20, SizeCategory::Tiny).is_ok());
        assert!(belt.attach(20, SizeCategory::Tiny).is_err());
        assert!(belt.attach(21, SizeCategory::Small).is_ok());
        assert!(belt.attach(22, SizeCategory::Tiny).is_err());
        assert!(belt.detach(20));
        assert!(!belt.detach(20));

        let state = belt.save_state();
        let mut restored = proto.create_new(10, false).unwrap();
        restored.load_state(&state).unwrap();
        let restored = restored.as_any().downcast_ref::<BeltInstance>().unwrap();
        assert_eq!(restored.belted(), &[21]);
    }
}
