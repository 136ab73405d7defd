//! Plain-text rendering of game state for the menus.

use std::fmt::Write as _;

use chrono::{Local, TimeZone};
use quest_chronicles::character::{xp_for_next_level, Character, CharacterInfo};
use quest_chronicles::core::constants::MAX_INVENTORY_SIZE;
use quest_chronicles::core::{ExploreOutcome, QuestProgress};
use quest_chronicles::items::ItemCatalog;
use quest_chronicles::quests::Quest;
use quest_chronicles::Winner;

pub fn character_sheet(c: &Character) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} the {} ===", c.name, c.class);
    let _ = writeln!(
        out,
        "Level {}  ({}/{} XP)",
        c.level,
        c.experience,
        xp_for_next_level(c.level)
    );
    let _ = writeln!(out, "Health:   {}/{}", c.health, c.max_health);
    let _ = writeln!(out, "Strength: {}", c.strength);
    let _ = writeln!(out, "Magic:    {}", c.magic);
    let _ = writeln!(out, "Gold:     {}", c.gold);
    let _ = writeln!(out, "Ability:  {}", c.class.ability_name());
    let _ = writeln!(
        out,
        "Weapon:   {}",
        c.equipped_weapon.as_deref().unwrap_or("none")
    );
    let _ = write!(
        out,
        "Armor:    {}",
        c.equipped_armor.as_deref().unwrap_or("none")
    );
    out
}

/// Inventory grouped by item with counts, in first-acquired order.
pub fn inventory_listing(c: &Character, items: &ItemCatalog) -> String {
    if c.inventory.is_empty() {
        return "Your inventory is empty.".to_string();
    }

    let mut seen: Vec<&str> = Vec::new();
    for id in &c.inventory {
        if !seen.contains(&id.as_str()) {
            seen.push(id);
        }
    }

    let mut out = format!("Inventory ({}/{}):", c.inventory.len(), MAX_INVENTORY_SIZE);
    for (i, id) in seen.iter().enumerate() {
        let count = c.inventory.iter().filter(|held| held == id).count();
        let label = match items.get(id) {
            Some(item) => format!("{} [{}, {}]", item.name, item.kind, item.effect),
            None => id.to_string(),
        };
        let _ = write!(out, "\n  {}) {} x{}", i + 1, label, count);
    }
    out
}

/// Distinct item ids in the inventory, matching [`inventory_listing`]'s
/// numbering.
pub fn inventory_ids(c: &Character) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in &c.inventory {
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    }
    ids
}

pub fn quest_list(heading: &str, quests: &[&Quest]) -> String {
    let mut out = heading.to_string();
    if quests.is_empty() {
        out.push_str("\n  (none)");
    }
    for (i, q) in quests.iter().enumerate() {
        let _ = write!(
            out,
            "\n  {}) {} [lvl {}] - {} ({} XP, {} gold)",
            i + 1,
            q.title,
            q.required_level,
            q.description,
            q.reward_xp,
            q.reward_gold
        );
    }
    out
}

pub fn quest_progress(p: &QuestProgress) -> String {
    format!(
        "Quests: {} active, {}/{} completed ({:.1}%)\nRewards earned: {} XP, {} gold",
        p.active, p.completed, p.total, p.percentage, p.rewards.xp, p.rewards.gold
    )
}

pub fn shop_listing(items: &ItemCatalog) -> String {
    let mut out = "Shop:".to_string();
    for (i, item) in items.iter().enumerate() {
        let _ = write!(
            out,
            "\n  {}) {} - {} gold [{}, {}] {}",
            i + 1,
            item.name,
            item.cost,
            item.kind,
            item.effect,
            item.description
        );
    }
    out
}

pub fn battle_report(outcome: &ExploreOutcome) -> String {
    let mut lines: Vec<String> = vec![format!("A wild {} appears!", outcome.enemy_name)];
    lines.extend(outcome.log.iter().map(|e| e.describe(&outcome.enemy_name)));
    if outcome.result.winner == Winner::None {
        lines.push("You live to fight another day.".to_string());
    }
    if outcome.levels_gained > 0 {
        lines.push(format!(
            "Level up! You gained {} level(s).",
            outcome.levels_gained
        ));
    }
    lines.join("\n")
}

pub fn save_list(saves: &[CharacterInfo]) -> String {
    if saves.is_empty() {
        return "No saved characters.".to_string();
    }
    let mut out = String::new();
    for (i, info) in saves.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if info.is_corrupted {
            let _ = write!(out, "{:>2}) {} (unreadable save)", i + 1, info.character_name);
            continue;
        }
        let class = info.class.map(|c| c.name()).unwrap_or("?");
        let _ = write!(
            out,
            "{:>2}) {} - level {} {} - saved {}",
            i + 1,
            info.character_name,
            info.level,
            class,
            format_timestamp(info.last_save_time)
        );
    }
    out
}

fn format_timestamp(secs: i64) -> String {
    match Local.timestamp_opt(secs, 0).single() {
        Some(t) if secs > 0 => t.format("%Y-%m-%d %H:%M").to_string(),
        _ => "never".to_string(),
    }
}
