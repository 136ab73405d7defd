//! Experience, level-ups, gold, healing and revival.

use tracing::{debug, info};

use super::types::{Character, CharacterError};
use crate::core::constants::*;

/// Experience needed to advance from `level` to `level + 1`.
pub fn xp_for_next_level(level: u32) -> u64 {
    level as u64 * XP_PER_LEVEL
}

impl Character {
    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Adds experience and applies any level-ups it pays for.
    /// Returns the number of levels gained.
    pub fn gain_experience(&mut self, xp: u64) -> Result<u32, CharacterError> {
        if self.is_dead() {
            return Err(CharacterError::Dead(self.name.clone()));
        }
        self.experience = self.experience.saturating_add(xp);
        Ok(self.apply_level_ups())
    }

    /// Spends banked experience on level-ups. Each level raises max health,
    /// strength and magic, then restores health to full.
    pub fn apply_level_ups(&mut self) -> u32 {
        let mut gained = 0;
        loop {
            let required = xp_for_next_level(self.level);
            if self.experience < required {
                break;
            }
            self.experience -= required;
            self.level = self.level.saturating_add(1);
            self.max_health = self.max_health.saturating_add(LEVEL_UP_MAX_HEALTH);
            self.strength = self.strength.saturating_add(LEVEL_UP_STRENGTH);
            self.magic = self.magic.saturating_add(LEVEL_UP_MAGIC);
            self.health = self.max_health;
            gained += 1;
        }
        if gained > 0 {
            info!(name = %self.name, level = self.level, "level up");
        }
        gained
    }

    /// Adds (or, when negative, spends) gold. Fails without change when the
    /// result would go below zero. Returns the new total.
    pub fn add_gold(&mut self, amount: i64) -> Result<u32, CharacterError> {
        let new_total = self.gold as i64 + amount;
        if new_total < 0 {
            return Err(CharacterError::InsufficientGold {
                have: self.gold,
                need: amount.unsigned_abs().min(u32::MAX as u64) as u32,
            });
        }
        self.gold = new_total.min(u32::MAX as i64) as u32;
        Ok(self.gold)
    }

    /// Restores health up to max. Returns the amount actually healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }

    /// Brings a dead character back at half health. Returns false if the
    /// character was alive.
    pub fn revive(&mut self) -> bool {
        if !self.is_dead() {
            return false;
        }
        self.health = (self.max_health / REVIVE_HEALTH_DIVISOR).max(1);
        debug!(name = %self.name, health = self.health, "revived");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterClass;

    fn hero() -> Character {
        Character::new("Hero", CharacterClass::Warrior)
    }

    #[test]
    fn test_xp_for_next_level() {
        assert_eq!(xp_for_next_level(1), 100);
        assert_eq!(xp_for_next_level(5), 500);
    }

    #[test]
    fn test_gain_experience_below_threshold() {
        let mut h = hero();
        assert_eq!(h.gain_experience(99).unwrap(), 0);
        assert_eq!(h.level, 1);
        assert_eq!(h.experience, 99);
    }

    #[test]
    fn test_gain_experience_levels_up_and_heals() {
        let mut h = hero();
        h.health = 10;
        assert_eq!(h.gain_experience(100).unwrap(), 1);
        assert_eq!(h.level, 2);
        assert_eq!(h.experience, 0);
        assert_eq!(h.max_health, 130);
        assert_eq!(h.health, 130);
        assert_eq!(h.strength, 17);
        assert_eq!(h.magic, 7);
    }

    #[test]
    fn test_gain_experience_multiple_levels() {
        let mut h = hero();
        // 100 for level 2, 200 for level 3, 50 left over
        assert_eq!(h.gain_experience(350).unwrap(), 2);
        assert_eq!(h.level, 3);
        assert_eq!(h.experience, 50);
    }

    #[test]
    fn test_level_up_saturates_stats() {
        let mut h = hero();
        h.max_health = u32::MAX - 10;
        h.health = 1;
        h.strength = u32::MAX;
        h.magic = u32::MAX - 1;
        assert_eq!(h.gain_experience(100).unwrap(), 1);
        assert_eq!(h.max_health, u32::MAX);
        assert_eq!(h.health, u32::MAX);
        assert_eq!((h.strength, h.magic), (u32::MAX, u32::MAX));
    }

    #[test]
    fn test_dead_character_cannot_gain_experience() {
        let mut h = hero();
        h.health = 0;
        assert_eq!(
            h.gain_experience(500),
            Err(CharacterError::Dead("Hero".to_string()))
        );
        assert_eq!(h.experience, 0);
        assert_eq!(h.level, 1);
    }

    #[test]
    fn test_add_gold_rejects_negative_balance() {
        let mut h = hero();
        assert_eq!(h.add_gold(-40).unwrap(), 60);
        let err = h.add_gold(-61).unwrap_err();
        assert_eq!(err, CharacterError::InsufficientGold { have: 60, need: 61 });
        assert_eq!(h.gold, 60);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut h = hero();
        h.health = 100;
        assert_eq!(h.heal(50), 20);
        assert_eq!(h.health, 120);
        assert_eq!(h.heal(5), 0);
    }

    #[test]
    fn test_revive_only_when_dead() {
        let mut h = hero();
        assert!(!h.revive());
        h.health = 0;
        assert!(h.revive());
        assert_eq!(h.health, 60);
    }
}
