//! Inventory, equipment and shop operations on a character.
//!
//! Equipped items leave the inventory and their bonus is folded into the
//! character's stats; unequipping reverses both. Every operation validates
//! first and mutates last.

use tracing::debug;

use super::types::{InventoryError, Item, ItemCatalog, ItemKind, Stat, StatEffect};
use crate::character::Character;
use crate::core::constants::MAX_INVENTORY_SIZE;

/// The stat change an item actually produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatChange {
    pub stat: Stat,
    pub amount: u32,
}

pub fn has_item(character: &Character, item_id: &str) -> bool {
    character.inventory.iter().any(|id| id == item_id)
}

pub fn count_item(character: &Character, item_id: &str) -> usize {
    character.inventory.iter().filter(|id| *id == item_id).count()
}

pub fn space_remaining(character: &Character) -> usize {
    MAX_INVENTORY_SIZE.saturating_sub(character.inventory.len())
}

pub fn add_item(character: &mut Character, item_id: &str) -> Result<(), InventoryError> {
    if space_remaining(character) == 0 {
        return Err(InventoryError::InventoryFull);
    }
    character.inventory.push(item_id.to_string());
    Ok(())
}

/// Removes one copy of an item.
pub fn remove_item(character: &mut Character, item_id: &str) -> Result<(), InventoryError> {
    let pos = character
        .inventory
        .iter()
        .position(|id| id == item_id)
        .ok_or_else(|| InventoryError::ItemNotFound(item_id.to_string()))?;
    character.inventory.remove(pos);
    Ok(())
}

/// Empties the inventory. Returns how many items were dropped.
pub fn clear_inventory(character: &mut Character) -> usize {
    let count = character.inventory.len();
    character.inventory.clear();
    count
}

fn lookup<'c>(catalog: &'c ItemCatalog, item_id: &str) -> Result<&'c Item, InventoryError> {
    catalog
        .get(item_id)
        .ok_or_else(|| InventoryError::UnknownItem(item_id.to_string()))
}

fn require_held(character: &Character, item_id: &str) -> Result<(), InventoryError> {
    if has_item(character, item_id) {
        Ok(())
    } else {
        Err(InventoryError::ItemNotFound(item_id.to_string()))
    }
}

fn require_kind(item: &Item, expected: ItemKind) -> Result<(), InventoryError> {
    if item.kind == expected {
        Ok(())
    } else {
        Err(InventoryError::InvalidItemType {
            item_id: item.id.clone(),
            expected,
        })
    }
}

/// Adds an effect to the character. Health is capped at max health.
pub fn apply_effect(character: &mut Character, effect: StatEffect) -> StatChange {
    let amount = match effect.stat {
        Stat::Health => character.heal(effect.value),
        Stat::MaxHealth => {
            character.max_health = character.max_health.saturating_add(effect.value);
            effect.value
        }
        Stat::Strength => {
            character.strength = character.strength.saturating_add(effect.value);
            effect.value
        }
        Stat::Magic => {
            character.magic = character.magic.saturating_add(effect.value);
            effect.value
        }
    };
    StatChange {
        stat: effect.stat,
        amount,
    }
}

/// Takes an equipment bonus back off. Max health never drops below 1 and
/// health is clamped to it.
pub fn remove_effect(character: &mut Character, effect: StatEffect) {
    match effect.stat {
        Stat::Health => character.health = character.health.saturating_sub(effect.value),
        Stat::MaxHealth => {
            character.max_health = character.max_health.saturating_sub(effect.value).max(1);
        }
        Stat::Strength => character.strength = character.strength.saturating_sub(effect.value),
        Stat::Magic => character.magic = character.magic.saturating_sub(effect.value),
    }
    character.health = character.health.min(character.max_health);
}

/// Consumes one copy of a consumable and applies its effect.
pub fn use_item(
    character: &mut Character,
    item_id: &str,
    catalog: &ItemCatalog,
) -> Result<StatChange, InventoryError> {
    require_held(character, item_id)?;
    let item = lookup(catalog, item_id)?;
    require_kind(item, ItemKind::Consumable)?;

    remove_item(character, item_id)?;
    let change = apply_effect(character, item.effect);
    debug!(name = %character.name, item = item_id, ?change, "item used");
    Ok(change)
}

fn slot_mut(character: &mut Character, kind: ItemKind) -> &mut Option<String> {
    match kind {
        ItemKind::Armor => &mut character.equipped_armor,
        _ => &mut character.equipped_weapon,
    }
}

fn equip(
    character: &mut Character,
    item_id: &str,
    catalog: &ItemCatalog,
    kind: ItemKind,
) -> Result<Option<String>, InventoryError> {
    require_held(character, item_id)?;
    let item = lookup(catalog, item_id)?;
    require_kind(item, kind)?;

    // The new item's slot frees up before the old one returns, so a full
    // inventory can always swap.
    remove_item(character, item_id)?;
    let previous = slot_mut(character, kind).replace(item_id.to_string());
    if let Some(old_id) = &previous {
        if let Some(old) = catalog.get(old_id) {
            remove_effect(character, old.effect);
        }
        character.inventory.push(old_id.clone());
    }
    apply_effect(character, item.effect);

    debug!(name = %character.name, item = item_id, ?previous, "equipped {}", kind);
    Ok(previous)
}

/// Equips a weapon from the inventory. Returns the weapon it replaced.
pub fn equip_weapon(
    character: &mut Character,
    item_id: &str,
    catalog: &ItemCatalog,
) -> Result<Option<String>, InventoryError> {
    equip(character, item_id, catalog, ItemKind::Weapon)
}

/// Equips armor from the inventory. Returns the armor it replaced.
pub fn equip_armor(
    character: &mut Character,
    item_id: &str,
    catalog: &ItemCatalog,
) -> Result<Option<String>, InventoryError> {
    equip(character, item_id, catalog, ItemKind::Armor)
}

fn unequip(
    character: &mut Character,
    catalog: &ItemCatalog,
    kind: ItemKind,
) -> Result<Option<String>, InventoryError> {
    if slot_mut(character, kind).is_none() {
        return Ok(None);
    }
    if space_remaining(character) == 0 {
        return Err(InventoryError::InventoryFull);
    }

    let removed = slot_mut(character, kind).take();
    if let Some(id) = &removed {
        if let Some(item) = catalog.get(id) {
            remove_effect(character, item.effect);
        }
        character.inventory.push(id.clone());
    }
    Ok(removed)
}

pub fn unequip_weapon(
    character: &mut Character,
    catalog: &ItemCatalog,
) -> Result<Option<String>, InventoryError> {
    unequip(character, catalog, ItemKind::Weapon)
}

pub fn unequip_armor(
    character: &mut Character,
    catalog: &ItemCatalog,
) -> Result<Option<String>, InventoryError> {
    unequip(character, catalog, ItemKind::Armor)
}

/// Buys one item at catalog cost.
pub fn purchase_item(
    character: &mut Character,
    item_id: &str,
    catalog: &ItemCatalog,
) -> Result<(), InventoryError> {
    let item = lookup(catalog, item_id)?;
    if character.gold < item.cost {
        return Err(InventoryError::InsufficientGold {
            have: character.gold,
            need: item.cost,
        });
    }
    if space_remaining(character) == 0 {
        return Err(InventoryError::InventoryFull);
    }

    character.gold -= item.cost;
    character.inventory.push(item_id.to_string());
    debug!(name = %character.name, item = item_id, cost = item.cost, "item purchased");
    Ok(())
}

/// Sells one copy for half its cost. Returns the gold received.
pub fn sell_item(
    character: &mut Character,
    item_id: &str,
    catalog: &ItemCatalog,
) -> Result<u32, InventoryError> {
    require_held(character, item_id)?;
    let price = lookup(catalog, item_id)?.sell_price();

    remove_item(character, item_id)?;
    character.gold = character.gold.saturating_add(price);
    debug!(name = %character.name, item = item_id, price, "item sold");
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterClass;

    fn item(id: &str, kind: ItemKind, effect: &str, cost: u32) -> Item {
        Item {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            effect: effect.parse().unwrap(),
            cost,
            description: String::new(),
        }
    }

    fn catalog() -> ItemCatalog {
        ItemCatalog::from_items([
            item("potion", ItemKind::Consumable, "health:20", 25),
            item("sword", ItemKind::Weapon, "strength:5", 80),
            item("axe", ItemKind::Weapon, "strength:8", 150),
            item("mail", ItemKind::Armor, "max_health:10", 120),
            item("plate", ItemKind::Armor, "max_health:25", 300),
        ])
        .unwrap()
    }

    fn hero() -> Character {
        Character::new("Hero", CharacterClass::Warrior)
    }

    fn fill(character: &mut Character) {
        while space_remaining(character) > 0 {
            add_item(character, "potion").unwrap();
        }
    }

    #[test]
    fn test_add_and_remove() {
        let mut h = hero();
        add_item(&mut h, "potion").unwrap();
        add_item(&mut h, "potion").unwrap();
        assert_eq!(count_item(&h, "potion"), 2);
        assert_eq!(space_remaining(&h), 18);

        remove_item(&mut h, "potion").unwrap();
        assert_eq!(count_item(&h, "potion"), 1);
        assert_eq!(
            remove_item(&mut h, "sword"),
            Err(InventoryError::ItemNotFound("sword".to_string()))
        );
        assert_eq!(clear_inventory(&mut h), 1);
        assert!(!has_item(&h, "potion"));
    }

    #[test]
    fn test_inventory_capacity() {
        let mut h = hero();
        fill(&mut h);
        assert_eq!(h.inventory.len(), 20);
        let err = add_item(&mut h, "potion").unwrap_err();
        assert_eq!(err, InventoryError::InventoryFull);
        assert_eq!(h.inventory.len(), 20);
    }

    #[test]
    fn test_use_potion_heals_and_consumes() {
        let mut h = hero();
        h.health = 110;
        add_item(&mut h, "potion").unwrap();

        let change = use_item(&mut h, "potion", &catalog()).unwrap();
        assert_eq!(
            change,
            StatChange {
                stat: Stat::Health,
                amount: 10
            }
        );
        assert_eq!(h.health, 120);
        assert!(h.inventory.is_empty());
    }

    #[test]
    fn test_use_non_consumable_rejected() {
        let mut h = hero();
        add_item(&mut h, "sword").unwrap();
        let err = use_item(&mut h, "sword", &catalog()).unwrap_err();
        assert_eq!(
            err,
            InventoryError::InvalidItemType {
                item_id: "sword".to_string(),
                expected: ItemKind::Consumable
            }
        );
        assert_eq!(h.inventory, vec!["sword".to_string()]);
        assert_eq!(
            use_item(&mut h, "potion", &catalog()),
            Err(InventoryError::ItemNotFound("potion".to_string()))
        );
    }

    #[test]
    fn test_equip_weapon_swaps_bonus() {
        let catalog = catalog();
        let mut h = hero();
        add_item(&mut h, "sword").unwrap();
        add_item(&mut h, "axe").unwrap();

        assert_eq!(equip_weapon(&mut h, "sword", &catalog).unwrap(), None);
        assert_eq!(h.strength, 20);
        assert_eq!(h.equipped_weapon.as_deref(), Some("sword"));
        assert_eq!(h.inventory, vec!["axe".to_string()]);

        assert_eq!(
            equip_weapon(&mut h, "axe", &catalog).unwrap(),
            Some("sword".to_string())
        );
        assert_eq!(h.strength, 23);
        assert_eq!(h.inventory, vec!["sword".to_string()]);
    }

    #[test]
    fn test_equip_wrong_slot_rejected() {
        let catalog = catalog();
        let mut h = hero();
        add_item(&mut h, "mail").unwrap();
        assert!(matches!(
            equip_weapon(&mut h, "mail", &catalog),
            Err(InventoryError::InvalidItemType { .. })
        ));
        assert_eq!(h.equipped_weapon, None);
        assert!(has_item(&h, "mail"));
    }

    #[test]
    fn test_armor_swap_clamps_health() {
        let catalog = catalog();
        let mut h = hero();
        add_item(&mut h, "plate").unwrap();
        add_item(&mut h, "mail").unwrap();

        equip_armor(&mut h, "plate", &catalog).unwrap();
        assert_eq!(h.max_health, 145);
        h.health = 145;

        equip_armor(&mut h, "mail", &catalog).unwrap();
        // Plate's bonus comes off first and clamps health before mail applies
        assert_eq!(h.max_health, 130);
        assert_eq!(h.health, 120);
    }

    #[test]
    fn test_swap_with_full_inventory() {
        let catalog = catalog();
        let mut h = hero();
        add_item(&mut h, "sword").unwrap();
        equip_weapon(&mut h, "sword", &catalog).unwrap();
        add_item(&mut h, "axe").unwrap();
        fill(&mut h);

        equip_weapon(&mut h, "axe", &catalog).unwrap();
        assert_eq!(h.inventory.len(), 20);
        assert!(has_item(&h, "sword"));
    }

    #[test]
    fn test_unequip() {
        let catalog = catalog();
        let mut h = hero();
        assert_eq!(unequip_armor(&mut h, &catalog).unwrap(), None);

        add_item(&mut h, "mail").unwrap();
        equip_armor(&mut h, "mail", &catalog).unwrap();
        fill(&mut h);

        let before = h.clone();
        assert_eq!(
            unequip_armor(&mut h, &catalog),
            Err(InventoryError::InventoryFull)
        );
        assert_eq!(h, before);

        remove_item(&mut h, "potion").unwrap();
        assert_eq!(
            unequip_armor(&mut h, &catalog).unwrap(),
            Some("mail".to_string())
        );
        assert_eq!(h.max_health, 120);
        assert_eq!(h.equipped_armor, None);
    }

    #[test]
    fn test_purchase() {
        let catalog = catalog();
        let mut h = hero();
        purchase_item(&mut h, "sword", &catalog).unwrap();
        assert_eq!(h.gold, 20);
        assert!(has_item(&h, "sword"));

        let err = purchase_item(&mut h, "sword", &catalog).unwrap_err();
        assert_eq!(err, InventoryError::InsufficientGold { have: 20, need: 80 });
        assert_eq!(err.kind(), crate::core::error::ErrorKind::ResourceExhausted);

        assert_eq!(
            purchase_item(&mut h, "cake", &catalog),
            Err(InventoryError::UnknownItem("cake".to_string()))
        );
    }

    #[test]
    fn test_purchase_with_full_inventory() {
        let catalog = catalog();
        let mut h = hero();
        fill(&mut h);
        assert_eq!(
            purchase_item(&mut h, "potion", &catalog),
            Err(InventoryError::InventoryFull)
        );
        assert_eq!(h.gold, 100);
    }

    #[test]
    fn test_sell_for_half() {
        let catalog = catalog();
        let mut h = hero();
        add_item(&mut h, "potion").unwrap();
        assert_eq!(sell_item(&mut h, "potion", &catalog).unwrap(), 12);
        assert_eq!(h.gold, 112);
        assert_eq!(
            sell_item(&mut h, "potion", &catalog),
            Err(InventoryError::ItemNotFound("potion".to_string()))
        );
    }
}
