//! Built-in component types.
//!
//! Each module exposes a `register` function that adds its builder keywords,
//! database loader and help text to a [`ComponentManager`]. Adding a type
//! means adding a module and one line in [`register_builtin_types`].

pub mod armour;
pub mod belt;
pub mod blindfold;
pub mod chair;
pub mod connectable;
pub mod defibrillator;
pub mod grid_power;
pub mod immobilising;
pub mod implant_organ;
pub mod musket_ball;
pub mod musket_cartridge;
pub mod neural_interface;
pub mod powered_prop;
pub mod rebreather;
pub mod sheath;
pub mod shield;
pub mod syringe;
pub mod system;
pub mod wearable;

use crate::components::command::CommandTable;
use crate::components::manager::ComponentManager;

pub fn register_builtin_types(manager: &mut ComponentManager) {
    armour::register(manager);
    belt::register(manager);
    blindfold::register(manager);
    chair::register(manager);
    connectable::register(manager);
    defibrillator::register(manager);
    grid_power::register(manager);
    immobilising::register(manager);
    implant_organ::register(manager);
    musket_ball::register(manager);
    musket_cartridge::register(manager);
    neural_interface::register(manager);
    powered_prop::register(manager);
    rebreather::register(manager);
    sheath::register(manager);
    shield::register(manager);
    syringe::register(manager);
    system::register(manager);
    wearable::register(manager);
}

/// Long help for a type: one indented line per verb in its command table.
pub(crate) fn long_help<T: 'static>(table: &CommandTable<T>) -> String {
    let lines = table.help_lines();
    if lines.is_empty() {
        return "This component type has no building options.".to_string();
    }
    lines
        .iter()
        .map(|line| format!("  {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
