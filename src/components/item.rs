//! Item prototypes and the items built from them.
//!
//! An [`ItemProto`] lists the component prototype revisions an item is made
//! of. Instantiating it creates one component instance per entry, and only
//! approved (current) component revisions may be used.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::components::errors::ComponentError;
use crate::components::instance::ComponentInstance;
use crate::components::kinds::system::BodypartInstance;
use crate::components::proto::ComponentPrototype;
use crate::components::types::{CatalogId, ItemId, ProtoKey};
use crate::components::xml::XmlElement;

/// Anything that can hand out component prototypes by key.
pub trait PrototypeSource {
    fn component(&self, key: ProtoKey) -> Result<Arc<ComponentPrototype>, ComponentError>;
}

/// In-memory prototype source, used by tests and by callers that preload revisions.
#[derive(Debug, Clone, Default)]
pub struct PrototypeSet {
    prototypes: HashMap<ProtoKey, Arc<ComponentPrototype>>,
}

impl PrototypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prototype: ComponentPrototype) -> Arc<ComponentPrototype> {
        let prototype = Arc::new(prototype);
        self.prototypes.insert(prototype.key(), Arc::clone(&prototype));
        prototype
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }
}

impl PrototypeSource for PrototypeSet {
    fn component(&self, key: ProtoKey) -> Result<Arc<ComponentPrototype>, ComponentError> {
        self.prototypes
            .get(&key)
            .cloned()
            .ok_or_else(|| ComponentError::NotFound(format!("component {}", key)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemProto {
    pub id: u64,
    pub revision: u32,
    pub name: String,
    /// Grams.
    pub weight: f64,
    /// Component revisions in attachment order, at most one per component id.
    pub components: Vec<ProtoKey>,
}

impl ItemProto {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            revision: 0,
            name: name.to_string(),
            weight: 0.0,
            components: Vec::new(),
        }
    }

    /// Attach a component revision. Re-adding a component id moves it to the
    /// new revision in place. Returns false when the exact key was already present.
    pub fn add_component(&mut self, key: ProtoKey) -> bool {
        match self.components.iter_mut().find(|existing| existing.id == key.id) {
            Some(existing) if *existing == key => false,
            Some(existing) => {
                *existing = key;
                true
            }
            None => {
                self.components.push(key);
                true
            }
        }
    }

    pub fn remove_component(&mut self, component_id: u64) -> bool {
        let before = self.components.len();
        self.components.retain(|key| key.id != component_id);
        before != self.components.len()
    }

    /// Advisory messages for components whose expected companions are missing.
    /// Nothing is enforced; builders decide whether to act on them.
    pub fn companion_warnings(&self, source: &dyn PrototypeSource) -> Result<Vec<String>, ComponentError> {
        let prototypes = self
            .components
            .iter()
            .map(|key| source.component(*key))
            .collect::<Result<Vec<_>, _>>()?;
        let mut warnings = Vec::new();
        for prototype in &prototypes {
            for companion in prototype.definition().companion_types() {
                let present = prototypes
                    .iter()
                    .any(|other| other.type_name().eq_ignore_ascii_case(companion));
                if !present {
                    warnings.push(format!(
                        "{} component {} ({}) expects a {} component on the same item.",
                        prototype.type_name(),
                        prototype.key(),
                        prototype.name(),
                        companion
                    ));
                }
            }
        }
        Ok(warnings)
    }

    /// Build a live item. Every referenced component revision must be current.
    pub fn instantiate(
        &self,
        source: &dyn PrototypeSource,
        item_id: ItemId,
        temporary: bool,
    ) -> Result<Item, ComponentError> {
        let mut components = Vec::with_capacity(self.components.len());
        for key in &self.components {
            let prototype = source.component(*key)?;
            components.push(prototype.create_new(item_id, temporary)?);
        }
        debug!(
            "item {} instantiated from item proto #{} with {} components",
            item_id,
            self.id,
            components.len()
        );
        Ok(Item {
            id: item_id,
            proto: ProtoKey::new(self.id, self.revision),
            name: self.name.clone(),
            components,
        })
    }
}

#[derive(Debug)]
pub struct Item {
    pub id: ItemId,
    pub proto: ProtoKey,
    pub name: String,
    components: Vec<Box<dyn ComponentInstance>>,
}

impl Item {
    /// A severed bodypart item. The item prototype must carry a Bodypart
    /// component; anything else means the engine asked for the wrong prototype.
    pub fn severed_bodypart(
        proto: &ItemProto,
        source: &dyn PrototypeSource,
        item_id: ItemId,
        bodypart: CatalogId,
        original_character: Option<u64>,
    ) -> Result<Item, ComponentError> {
        let mut item = proto.instantiate(source, item_id, false)?;
        let Some(part) = item.component_mut::<BodypartInstance>() else {
            return Err(ComponentError::InvariantViolation(format!(
                "item proto #{} has no bodypart component but was used for a severed bodypart",
                proto.id
            )));
        };
        part.bodypart = Some(bodypart);
        part.original_character = original_character;
        Ok(item)
    }

    pub fn components(&self) -> impl Iterator<Item = &dyn ComponentInstance> {
        self.components.iter().map(|component| component.as_ref())
    }

    /// First component instance of concrete type `T`.
    pub fn component<T: ComponentInstance>(&self) -> Option<&T> {
        self.components
            .iter()
            .find_map(|component| component.as_any().downcast_ref::<T>())
    }

    pub fn component_mut<T: ComponentInstance>(&mut self) -> Option<&mut T> {
        self.components
            .iter_mut()
            .find_map(|component| component.as_any_mut().downcast_mut::<T>())
    }

    pub fn has_component_type(&self, type_name: &str) -> bool {
        self.components
            .iter()
            .any(|component| component.prototype().type_name().eq_ignore_ascii_case(type_name))
    }

    /// Per-item state of every component, keyed by prototype.
    pub fn save_state(&self) -> XmlElement {
        let mut element = XmlElement::new("Item")
            .with_attr("id", self.id)
            .with_attr("proto", self.proto.id);
        for component in &self.components {
            element.push(component.save_state());
        }
        element
    }

    /// Restore state saved by [`save_state`](Self::save_state). Components are
    /// matched by prototype id; saved state for components no longer on the
    /// item is ignored.
    pub fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        for saved in state.children_named("Component") {
            let Some(id) = saved.attr_value::<u64>("id")? else {
                continue;
            };
            if let Some(component) = self
                .components
                .iter_mut()
                .find(|component| component.prototype().id() == id)
            {
                component.load_state(saved)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::kinds::belt::{Belt, BeltInstance};
    use crate::components::kinds::blindfold::Blindfold;
    use crate::components::kinds::system::{SystemComponent, SystemKind};
    use crate::components::kinds::wearable::Wearable;
    use crate::components::proto::{ComponentDefinition, ProtoHeader};
    use crate::components::types::{RevisionStatus, SizeCategory};

    fn proto(id: u64, status: RevisionStatus, definition: Box<dyn ComponentDefinition>) -> ComponentPrototype {
        let mut header = ProtoHeader::new_draft(id, "tester", "test component");
        header.status = status;
        ComponentPrototype::new(header, definition)
    }

    #[test]
    fn add_component_keeps_one_revision_per_id() {
        let mut item = ItemProto::new(1, "satchel");
        assert!(item.add_component(ProtoKey::new(5, 0)));
        assert!(item.add_component(ProtoKey::new(6, 0)));
        assert!(!item.add_component(ProtoKey::new(5, 0)));
        assert!(item.add_component(ProtoKey::new(5, 1)));
        assert_eq!(item.components, vec![ProtoKey::new(5, 1), ProtoKey::new(6, 0)]);
        assert!(item.remove_component(5));
        assert!(!item.remove_component(5));
    }

    #[test]
    fn draft_components_cannot_be_instantiated() {
        let mut set = PrototypeSet::new();
        set.insert(proto(1, RevisionStatus::Draft, Box::new(Belt::default())));
        let mut item = ItemProto::new(10, "belt");
        item.add_component(ProtoKey::new(1, 0));
        assert!(matches!(
            item.instantiate(&set, 100, false),
            Err(ComponentError::NotApproved { .. })
        ));
    }

    #[test]
    fn item_state_round_trips_through_components() {
        let mut set = PrototypeSet::new();
        set.insert(proto(1, RevisionStatus::Current, Box::new(Belt::default())));
        let mut proto_item = ItemProto::new(10, "belt");
        proto_item.add_component(ProtoKey::new(1, 0));

        let mut item = proto_item.instantiate(&set, 100, false).unwrap();
        item.component_mut::<BeltInstance>()
            .unwrap()
            .attach(55, SizeCategory::Tiny)
            .unwrap();
        let state = item.save_state();

        let mut fresh = proto_item.instantiate(&set, 100, false).unwrap();
        fresh.load_state(&state).unwrap();
        assert_eq!(fresh.component::<BeltInstance>().unwrap().belted(), &[55]);
        assert!(fresh.has_component_type("belt"));
    }

    #[test]
    fn blindfold_without_wearable_is_flagged() {
        let mut set = PrototypeSet::new();
        set.insert(proto(1, RevisionStatus::Current, Box::new(Blindfold)));
        set.insert(proto(2, RevisionStatus::Current, Box::new(Wearable::default())));
        let mut item = ItemProto::new(10, "blindfold");
        item.add_component(ProtoKey::new(1, 0));
        assert_eq!(item.companion_warnings(&set).unwrap().len(), 1);
        item.add_component(ProtoKey::new(2, 0));
        assert!(item.companion_warnings(&set).unwrap().is_empty());
    }

    #[test]
    fn severed_bodypart_requires_bodypart_component() {
        let mut set = PrototypeSet::new();
        set.insert(proto(1, RevisionStatus::Current, Box::new(Belt::default())));
        set.insert(proto(
            2,
            RevisionStatus::Current,
            Box::new(SystemComponent::new(SystemKind::Bodypart)),
        ));

        let mut wrong = ItemProto::new(10, "not a bodypart");
        wrong.add_component(ProtoKey::new(1, 0));
        assert!(matches!(
            Item::severed_bodypart(&wrong, &set, 100, 7, Some(3)),
            Err(ComponentError::InvariantViolation(_))
        ));

        let mut right = ItemProto::new(11, "severed hand");
        right.add_component(ProtoKey::new(2, 0));
        let item = Item::severed_bodypart(&right, &set, 101, 7, Some(3)).unwrap();
        let part = item.component::<BodypartInstance>().unwrap();
        assert_eq!(part.bodypart, Some(7));
        assert_eq!(part.original_character, Some(3));
    }
}
