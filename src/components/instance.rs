use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::components::errors::ComponentError;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::ItemId;
use crate::components::xml::XmlElement;

/// Per-item runtime state of a component. Shared configuration stays on the prototype.
pub trait ComponentInstance: fmt::Debug + Send + Sync + Any {
    fn core(&self) -> &InstanceCore;

    fn prototype(&self) -> &Arc<ComponentPrototype> {
        &self.core().prototype
    }

    fn parent(&self) -> ItemId {
        self.core().parent
    }

    /// Temporary instances belong to items that are never saved (previews, loose piles).
    fn is_temporary(&self) -> bool {
        self.core().temporary
    }

    /// Instance-varying state as a `<Component>` element.
    fn save_state(&self) -> XmlElement {
        self.core().state_element()
    }

    fn load_state(&mut self, _state: &XmlElement) -> Result<(), ComponentError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Fields every instance carries.
#[derive(Debug, Clone)]
pub struct InstanceCore {
    pub prototype: Arc<ComponentPrototype>,
    pub parent: ItemId,
    pub temporary: bool,
}

impl InstanceCore {
    pub fn new(prototype: Arc<ComponentPrototype>, parent: ItemId, temporary: bool) -> Self {
        Self {
            prototype,
            parent,
            temporary,
        }
    }

    /// The prototype's definition as its concrete type.
    pub fn config<T: ComponentDefinition>(&self) -> Option<&T> {
        self.prototype.definition_as::<T>()
    }

    /// An empty `<Component>` element tagged with the prototype key.
    pub fn state_element(&self) -> XmlElement {
        let key = self.prototype.key();
        XmlElement::new("Component")
            .with_attr("id", key.id)
            .with_attr("revision", key.revision)
            .with_attr("type", self.prototype.type_name())
    }
}

/// Instance for components that carry no per-item state.
#[derive(Debug, Clone)]
pub struct StatelessInstance {
    core: InstanceCore,
}

impl StatelessInstance {
    pub fn boxed(prototype: Arc<ComponentPrototype>, parent: ItemId, temporary: bool) -> Box<dyn ComponentInstance> {
        Box::new(Self {
            core: InstanceCore::new(prototype, parent, temporary),
        })
    }
}

impl ComponentInstance for StatelessInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Read a list of `<Item id="..."/>` children, used by holders such as belts and piles.
pub fn load_item_ids(state: &XmlElement) -> Result<Vec<ItemId>, ComponentError> {
    state
        .children_named("Item")
        .map(|item| {
            item.attr_value::<ItemId>("id")?.ok_or_else(|| {
                ComponentError::MalformedDefinition("<Item> without an id".to_string())
            })
        })
        .collect()
}

pub fn save_item_ids(mut state: XmlElement, items: &[ItemId]) -> XmlElement {
    for item in items {
        state.push(XmlElement::new("Item").with_attr("id", item));
    }
    state
}
