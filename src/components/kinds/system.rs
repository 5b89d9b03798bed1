//! Component types the engine creates on its own: corpses, severed bodyparts
//! and the piles that gather loose currency, commodities and items.
//!
//! They carry no configuration, so one definition type serves all five. Only
//! database loaders are registered; authors cannot create, edit or revise them.

use std::any::Any;
use std::sync::Arc;

use crate::components::command::{BuildContext, CommandOutcome};
use crate::components::errors::ComponentError;
use crate::components::input::StringStack;
use crate::components::instance::{load_item_ids, save_item_ids, ComponentInstance, InstanceCore};
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentDefinition, ComponentPrototype};
use crate::components::types::{CatalogId, ItemId};
use crate::components::xml::XmlElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemKind {
    Corpse,
    CurrencyPile,
    CommodityPile,
    Pile,
    Bodypart,
}

impl SystemKind {
    pub const ALL: [SystemKind; 5] = [
        SystemKind::Corpse,
        SystemKind::CurrencyPile,
        SystemKind::CommodityPile,
        SystemKind::Pile,
        SystemKind::Bodypart,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            SystemKind::Corpse => "Corpse",
            SystemKind::CurrencyPile => "CurrencyPile",
            SystemKind::CommodityPile => "CommodityPile",
            SystemKind::Pile => "Pile",
            SystemKind::Bodypart => "Bodypart",
        }
    }

    fn short_help(self) -> &'static str {
        match self {
            SystemKind::Corpse => "The remains of a dead character",
            SystemKind::CurrencyPile => "A heap of loose coins",
            SystemKind::CommodityPile => "A quantity of raw material",
            SystemKind::Pile => "A temporary heap of loose items",
            SystemKind::Bodypart => "A severed bodypart",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemComponent {
    pub kind: SystemKind,
}

impl SystemComponent {
    pub fn new(kind: SystemKind) -> Self {
        Self { kind }
    }
}

impl ComponentDefinition for SystemComponent {
    fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    fn load(&mut self, _definition: &XmlElement) -> Result<(), ComponentError> {
        Ok(())
    }

    fn save(&self) -> XmlElement {
        XmlElement::new("Definition")
    }

    fn building_command(
        &mut self,
        _verb: &str,
        _ctx: &BuildContext<'_>,
        _input: &mut StringStack,
    ) -> Option<CommandOutcome> {
        None
    }

    fn help_lines(&self) -> Vec<String> {
        Vec::new()
    }

    fn describe(&self, _ctx: &BuildContext<'_>) -> String {
        format!(
            "This is the system-generated {} component. It cannot be edited.\n",
            self.kind.type_name()
        )
    }

    fn read_only(&self) -> bool {
        true
    }

    fn prevent_manual_load(&self) -> bool {
        true
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
        let core = InstanceCore::new(prototype, parent, temporary);
        match self.kind {
            SystemKind::Corpse => Box::new(CorpseInstance {
                core,
                original_character: None,
            }),
            SystemKind::CurrencyPile => Box::new(CurrencyPileInstance {
                core,
                coins: Vec::new(),
            }),
            SystemKind::CommodityPile => Box::new(CommodityPileInstance {
                core,
                material: None,
                weight: 0.0,
            }),
            SystemKind::Pile => Box::new(PileInstance {
                core,
                items: Vec::new(),
            }),
            SystemKind::Bodypart => Box::new(BodypartInstance {
                core,
                bodypart: None,
                original_character: None,
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct CorpseInstance {
    core: InstanceCore,
    pub original_character: Option<u64>,
}

impl ComponentInstance for CorpseInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        self.core
            .state_element()
            .with_optional("OriginalCharacter", self.original_character)
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.original_character = state.child_value("OriginalCharacter")?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct CurrencyPileInstance {
    core: InstanceCore,
    /// `(coin, count)` pairs, one per coin type.
    coins: Vec<(CatalogId, u32)>,
}

impl CurrencyPileInstance {
    pub fn coins(&self) -> &[(CatalogId, u32)] {
        &self.coins
    }

    pub fn add_coins(&mut self, coin: CatalogId, count: u32) {
        match self.coins.iter_mut().find(|(existing, _)| *existing == coin) {
            Some((_, held)) => *held = held.saturating_add(count),
            None => self.coins.push((coin, count)),
        }
    }

    /// Remove coins; an emptied coin type disappears from the pile.
    pub fn take_coins(&mut self, coin: CatalogId, count: u32) -> Result<(), String> {
        let Some(index) = self.coins.iter().position(|(existing, _)| *existing == coin) else {
            return Err("There are no such coins in the pile.".to_string());
        };
        let held = self.coins[index].1;
        if count > held {
            return Err(format!("There are only {} of those coins.", held));
        }
        if count == held {
            self.coins.remove(index);
        } else {
            self.coins[index].1 = held - count;
        }
        Ok(())
    }
}

impl ComponentInstance for CurrencyPileInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        let mut state = self.core.state_element();
        for (coin, count) in &self.coins {
            state.push(
                XmlElement::new("Coin")
                    .with_attr("id", coin)
                    .with_attr("count", count),
            );
        }
        state
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.coins = state
            .children_named("Coin")
            .map(|coin| {
                let id = coin.attr_value::<CatalogId>("id")?.ok_or_else(|| {
                    ComponentError::MalformedDefinition("<Coin> without an id".to_string())
                })?;
                Ok((id, coin.attr_value("count")?.unwrap_or(0)))
            })
            .collect::<Result<_, ComponentError>>()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct CommodityPileInstance {
    core: InstanceCore,
    pub material: Option<CatalogId>,
    /// Grams.
    pub weight: f64,
}

impl ComponentInstance for CommodityPileInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        self.core
            .state_element()
            .with_optional("Material", self.material)
            .with_value("Weight", self.weight)
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.material = state.child_value("Material")?;
        self.weight = state.child_or("Weight", 0.0)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct PileInstance {
    core: InstanceCore,
    items: Vec<ItemId>,
}

impl PileInstance {
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn add(&mut self, item: ItemId) {
        if !self.items.contains(&item) {
            self.items.push(item);
        }
    }

    pub fn remove(&mut self, item: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|existing| *existing != item);
        before != self.items.len()
    }
}

impl ComponentInstance for PileInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        save_item_ids(self.core.state_element(), &self.items)
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.items = load_item_ids(state)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct BodypartInstance {
    core: InstanceCore,
    pub bodypart: Option<CatalogId>,
    pub original_character: Option<u64>,
}

impl ComponentInstance for BodypartInstance {
    fn core(&self) -> &InstanceCore {
        &self.core
    }

    fn save_state(&self) -> XmlElement {
        self.core
            .state_element()
            .with_optional("Bodypart", self.bodypart)
            .with_optional("OriginalCharacter", self.original_character)
    }

    fn load_state(&mut self, state: &XmlElement) -> Result<(), ComponentError> {
        self.bodypart = state.child_value("Bodypart")?;
        self.original_character = state.child_value("OriginalCharacter")?;
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
    for kind in SystemKind::ALL {
        manager.add_database_loader(kind.type_name(), move || Box::new(SystemComponent::new(kind)));
        manager.add_type_help_info(
            kind.type_name(),
            kind.short_help(),
            "System-generated; cannot be created or edited by builders.",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::catalog::InMemoryCatalog;
    use crate::components::proto::ProtoHeader;
    use crate::components::types::RevisionStatus;
    use crate::components::units::MetricUnits;

    fn current(kind: SystemKind) -> ComponentPrototype {
        let mut header = ProtoHeader::new_draft(1, "system", kind.type_name());
        header.status = RevisionStatus::Current;
        ComponentPrototype::new(header, Box::new(SystemComponent::new(kind)))
    }

    #[test]
    fn system_types_cannot_be_revised_or_edited() {
        let catalog = InMemoryCatalog::new();
        let ctx = BuildContext::new("tester", &catalog, &MetricUnits);
        for kind in SystemKind::ALL {
            let mut proto = current(kind);
            assert!(matches!(
                proto.create_new_revision("tester"),
                Err(ComponentError::RevisionNotSupported(_))
            ));
            let outcome = proto.building_command(&ctx, &mut StringStack::new("name Fred"));
            assert!(matches!(outcome, CommandOutcome::Rejected(_)));
            assert_eq!(proto.name(), kind.type_name());
        }
    }

    #[test]
    fn currency_pile_state_round_trips() {
        let proto = Arc::new(current(SystemKind::CurrencyPile));
        let mut instance = proto.create_new(12, true).unwrap();
        let pile = instance
            .as_any_mut()
            .downcast_mut::<CurrencyPileInstance>()
            .unwrap();
        pile.add_coins(3, 10);
        pile.add_coins(3, 5);
        pile.add_coins(4, 1);
        assert!(pile.take_coins(4, 2).is_err());
        pile.take_coins(4, 1).unwrap();
        assert_eq!(pile.coins(), &[(3, 15)]);

        let state = instance.save_state();
        let mut reloaded = proto.create_new(12, true).unwrap();
        reloaded.load_state(&state).unwrap();
        let reloaded = reloaded
            .as_any()
            .downcast_ref::<CurrencyPileInstance>()
            .unwrap();
        assert_eq!(reloaded.coins(), &[(3, 15)]);
    }
}
