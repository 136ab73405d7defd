//! Turn-based battle resolution.
//!
//! A [`Battle`] borrows the player's character and a freshly spawned enemy
//! and runs rounds until one side drops to 0 health or the player escapes:
//!
//! 1. the player acts (attack, class ability, or escape attempt);
//! 2. a dead enemy ends the battle before it can answer;
//! 3. the enemy always attacks;
//! 4. a dead player ends the battle;
//! 5. otherwise the turn counter advances.
//!
//! Player choices come from an [`ActionSource`]; every random roll comes from
//! the caller's `Rng`, so seeded generators replay battles exactly.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::types::{CombatError, Combatant, Enemy};
use crate::character::{Character, CharacterClass};
use crate::core::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    BasicAttack,
    SpecialAbility,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleState {
    Ongoing,
    PlayerWon,
    EnemyWon,
    Escaped,
}

impl BattleState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BattleState::Ongoing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player,
    Enemy,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub winner: Winner,
    pub xp_gained: u32,
    pub gold_gained: u32,
}

impl BattleResult {
    fn empty(winner: Winner) -> Self {
        Self {
            winner,
            xp_gained: 0,
            gold_gained: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    PlayerAttack {
        damage: u32,
    },
    PowerStrike {
        damage: u32,
    },
    Fireball {
        damage: u32,
    },
    CriticalStrike {
        damage: u32,
        was_crit: bool,
    },
    Heal {
        amount: u32,
    },
    EscapeAttempt {
        success: bool,
    },
    EnemyAttack {
        damage: u32,
    },
    PlayerWon {
        xp_gained: u32,
        gold_gained: u32,
    },
    PlayerDefeated,
}

impl CombatEvent {
    /// One battle-log line, as the menus print it.
    pub fn describe(&self, enemy_name: &str) -> String {
        match self {
            CombatEvent::PlayerAttack { damage } => {
                format!("You attack the {} for {} damage!", enemy_name, damage)
            }
            CombatEvent::PowerStrike { damage } => format!(
                "You use Power Strike and deal {} damage to the {}!",
                damage, enemy_name
            ),
            CombatEvent::Fireball { damage } => format!(
                "You cast Fireball and deal {} magic damage to the {}!",
                damage, enemy_name
            ),
            CombatEvent::CriticalStrike { damage, was_crit } => {
                if *was_crit {
                    format!("Critical Strike! You dealt {} damage!", damage)
                } else {
                    format!("You strike swiftly. You dealt {} damage!", damage)
                }
            }
            CombatEvent::Heal { amount } => {
                format!("You pray for divine aid and heal {} HP!", amount)
            }
            CombatEvent::EscapeAttempt { success: true } => {
                "You successfully escaped the battle!".to_string()
            }
            CombatEvent::EscapeAttempt { success: false } => {
                "Escape failed! The battle continues.".to_string()
            }
            CombatEvent::EnemyAttack { damage } => {
                format!("The {} attacks you for {} damage!", enemy_name, damage)
            }
            CombatEvent::PlayerWon {
                xp_gained,
                gold_gained,
            } => format!(
                "The {} is defeated! You gain {} XP and {} gold.",
                enemy_name, xp_gained, gold_gained
            ),
            CombatEvent::PlayerDefeated => "You have been defeated!".to_string(),
        }
    }
}

/// Supplies the player's choice each round.
pub trait ActionSource {
    fn next_action(&mut self, player: &Character, enemy: &Enemy, turn_number: u32)
        -> PlayerAction;
}

/// Always attacks. The enemy's own policy, reused for auto-battles.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAttack;

impl ActionSource for AlwaysAttack {
    fn next_action(&mut self, _: &Character, _: &Enemy, _: u32) -> PlayerAction {
        PlayerAction::BasicAttack
    }
}

/// Plays a fixed list of actions, then falls back to basic attacks.
#[derive(Debug, Clone, Default)]
pub struct ScriptedActions {
    actions: VecDeque<PlayerAction>,
}

impl ScriptedActions {
    pub fn new(actions: impl IntoIterator<Item = PlayerAction>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
        }
    }
}

impl ActionSource for ScriptedActions {
    fn next_action(&mut self, _: &Character, _: &Enemy, _: u32) -> PlayerAction {
        self.actions
            .pop_front()
            .unwrap_or(PlayerAction::BasicAttack)
    }
}

/// `max(1, attacker.strength - defender.strength / 4)`.
pub fn calculate_damage(attacker: &impl Combatant, defender: &impl Combatant) -> u32 {
    attacker
        .strength()
        .saturating_sub(defender.strength() / DEFENSE_DIVISOR)
        .max(MIN_DAMAGE)
}

/// Applies damage and returns the target's remaining health.
pub fn apply_damage(target: &mut impl Combatant, damage: u32) -> u32 {
    target.take_damage(damage);
    target.health()
}

/// Resolves the character's class ability against the enemy.
pub fn use_special_ability(
    character: &mut Character,
    enemy: &mut Enemy,
    rng: &mut impl Rng,
) -> CombatEvent {
    match character.class {
        CharacterClass::Warrior => warrior_power_strike(character, enemy),
        CharacterClass::Mage => mage_fireball(character, enemy),
        CharacterClass::Rogue => rogue_critical_strike(character, enemy, rng),
        CharacterClass::Cleric => cleric_heal(character),
    }
}

pub fn warrior_power_strike(character: &Character, enemy: &mut Enemy) -> CombatEvent {
    let damage = calculate_damage(character, enemy).saturating_mul(POWER_STRIKE_MULTIPLIER);
    apply_damage(enemy, damage);
    CombatEvent::PowerStrike { damage }
}

/// Raw magic, ignores the enemy's strength.
pub fn mage_fireball(character: &Character, enemy: &mut Enemy) -> CombatEvent {
    let damage = character.magic.saturating_mul(FIREBALL_MULTIPLIER);
    apply_damage(enemy, damage);
    CombatEvent::Fireball { damage }
}

pub fn rogue_critical_strike(
    character: &Character,
    enemy: &mut Enemy,
    rng: &mut impl Rng,
) -> CombatEvent {
    let base = calculate_damage(character, enemy);
    let was_crit = rng.gen_bool(CRITICAL_STRIKE_CHANCE);
    let damage = if was_crit {
        base.saturating_mul(CRITICAL_STRIKE_MULTIPLIER)
    } else {
        base
    };
    apply_damage(enemy, damage);
    CombatEvent::CriticalStrike { damage, was_crit }
}

pub fn cleric_heal(character: &mut Character) -> CombatEvent {
    let amount = character.restore_health(CLERIC_HEAL_AMOUNT);
    CombatEvent::Heal { amount }
}

/// One encounter between the player's character and an enemy.
pub struct Battle<'a> {
    player: &'a mut Character,
    enemy: &'a mut Enemy,
    turn_number: u32,
    state: BattleState,
    log: Vec<CombatEvent>,
}

impl<'a> Battle<'a> {
    pub fn new(player: &'a mut Character, enemy: &'a mut Enemy) -> Self {
        Self {
            player,
            enemy,
            turn_number: 1,
            state: BattleState::Ongoing,
            log: Vec::new(),
        }
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == BattleState::Ongoing
    }

    pub fn player(&self) -> &Character {
        &*self.player
    }

    pub fn enemy(&self) -> &Enemy {
        &*self.enemy
    }

    pub fn log(&self) -> &[CombatEvent] {
        &self.log
    }

    /// Runs rounds until the battle reaches a terminal state and pays out.
    ///
    /// Fails without touching either combatant if the character is already
    /// dead or this battle has already finished.
    pub fn start(
        &mut self,
        actions: &mut impl ActionSource,
        rng: &mut impl Rng,
    ) -> Result<BattleResult, CombatError> {
        if !self.player.is_alive() {
            return Err(CombatError::CharacterDead);
        }
        if !self.is_active() {
            return Err(CombatError::NotActive);
        }

        info!(
            player = %self.player.name,
            enemy = %self.enemy.name(),
            "battle started"
        );

        while self.is_active() {
            let action = actions.next_action(&*self.player, &*self.enemy, self.turn_number);
            self.player_turn(action, rng)?;
            if self.check_battle_end().is_terminal() {
                break;
            }

            self.enemy_turn()?;
            if self.check_battle_end().is_terminal() {
                break;
            }

            self.turn_number += 1;
        }

        let result = self.finish();
        info!(
            winner = ?result.winner,
            turns = self.turn_number,
            xp = result.xp_gained,
            gold = result.gold_gained,
            "battle ended"
        );
        Ok(result)
    }

    /// Executes one player action.
    pub fn player_turn(
        &mut self,
        action: PlayerAction,
        rng: &mut impl Rng,
    ) -> Result<(), CombatError> {
        if !self.is_active() {
            return Err(CombatError::NotActive);
        }

        let event = match action {
            PlayerAction::BasicAttack => {
                let damage = calculate_damage(&*self.player, &*self.enemy);
                apply_damage(&mut *self.enemy, damage);
                CombatEvent::PlayerAttack { damage }
            }
            PlayerAction::SpecialAbility => use_special_ability(&mut *self.player, &mut *self.enemy, rng),
            PlayerAction::Escape => {
                let success = self.attempt_escape(rng);
                CombatEvent::EscapeAttempt { success }
            }
        };

        debug!(turn = self.turn_number, event = ?event, "player turn");
        self.log.push(event);
        Ok(())
    }

    /// The enemy's basic attack.
    pub fn enemy_turn(&mut self) -> Result<(), CombatError> {
        if !self.is_active() {
            return Err(CombatError::NotActive);
        }

        let damage = calculate_damage(&*self.enemy, &*self.player);
        apply_damage(&mut *self.player, damage);

        let event = CombatEvent::EnemyAttack { damage };
        debug!(turn = self.turn_number, event = ?event, "enemy turn");
        self.log.push(event);
        Ok(())
    }

    /// 50% chance. Success ends the battle on the spot.
    fn attempt_escape(&mut self, rng: &mut impl Rng) -> bool {
        let success = rng.gen_bool(ESCAPE_CHANCE);
        if success {
            self.state = BattleState::Escaped;
        }
        success
    }

    /// Moves to a terminal state when either side is at 0 health.
    pub fn check_battle_end(&mut self) -> BattleState {
        if self.state == BattleState::Ongoing {
            if !self.enemy.is_alive() {
                self.state = BattleState::PlayerWon;
            } else if !self.player.is_alive() {
                self.state = BattleState::EnemyWon;
            }
        }
        self.state
    }

    fn finish(&mut self) -> BattleResult {
        match self.state {
            BattleState::PlayerWon => {
                let xp = self.enemy.xp_reward();
                let gold = self.enemy.gold_reward();
                self.player.experience = self.player.experience.saturating_add(xp as u64);
                self.player.gold = self.player.gold.saturating_add(gold);
                self.log.push(CombatEvent::PlayerWon {
                    xp_gained: xp,
                    gold_gained: gold,
                });
                BattleResult {
                    winner: Winner::Player,
                    xp_gained: xp,
                    gold_gained: gold,
                }
            }
            BattleState::EnemyWon => {
                self.log.push(CombatEvent::PlayerDefeated);
                BattleResult::empty(Winner::Enemy)
            }
            BattleState::Escaped | BattleState::Ongoing => BattleResult::empty(Winner::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::types::create_enemy;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Every `gen_bool(0.5)` returns true.
    fn lucky_rng() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Every `gen_bool(0.5)` returns false.
    fn unlucky_rng() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn hero(class: CharacterClass) -> Character {
        Character::new("Hero", class)
    }

    #[test]
    fn test_damage_formula() {
        let warrior = hero(CharacterClass::Warrior);
        let goblin = create_enemy("goblin").unwrap();
        assert_eq!(calculate_damage(&warrior, &goblin), 13);
        assert_eq!(calculate_damage(&goblin, &warrior), 5);
    }

    #[test]
    fn test_damage_is_never_below_one() {
        for attacker_str in 0..40 {
            for defender_str in 0..200 {
                let attacker = Enemy::new("A", 10, attacker_str, 0, 0, 0);
                let defender = Enemy::new("D", 10, defender_str, 0, 0, 0);
                assert!(calculate_damage(&attacker, &defender) >= 1);
            }
        }
    }

    #[test]
    fn test_warrior_power_strike_doubles_damage() {
        let warrior = hero(CharacterClass::Warrior);
        let mut goblin = create_enemy("goblin").unwrap();
        let event = warrior_power_strike(&warrior, &mut goblin);
        assert_eq!(event, CombatEvent::PowerStrike { damage: 26 });
        assert_eq!(goblin.health(), 24);
    }

    #[test]
    fn test_mage_fireball_ignores_defense() {
        let mage = hero(CharacterClass::Mage);
        let mut dragon = create_enemy("dragon").unwrap();
        let event = mage_fireball(&mage, &mut dragon);
        assert_eq!(event, CombatEvent::Fireball { damage: 40 });
        assert_eq!(dragon.health(), 160);
    }

    #[test]
    fn test_rogue_critical_strike_both_outcomes() {
        let rogue = hero(CharacterClass::Rogue);

        let mut orc = create_enemy("orc").unwrap();
        let event = rogue_critical_strike(&rogue, &mut orc, &mut lucky_rng());
        // 12 - 12/4 = 9, tripled
        assert_eq!(
            event,
            CombatEvent::CriticalStrike {
                damage: 27,
                was_crit: true
            }
        );

        let mut orc = create_enemy("orc").unwrap();
        let event = rogue_critical_strike(&rogue, &mut orc, &mut unlucky_rng());
        assert_eq!(
            event,
            CombatEvent::CriticalStrike {
                damage: 9,
                was_crit: false
            }
        );
        assert_eq!(orc.health(), 71);
    }

    #[test]
    fn test_cleric_heal_is_capped() {
        let mut cleric = hero(CharacterClass::Cleric);
        cleric.health = 50;
        assert_eq!(cleric_heal(&mut cleric), CombatEvent::Heal { amount: 30 });
        assert_eq!(cleric.health, 80);
        assert_eq!(cleric.max_health, 100);

        cleric.health = 90;
        assert_eq!(cleric_heal(&mut cleric), CombatEvent::Heal { amount: 10 });
        assert_eq!(cleric.health, 100);
    }

    #[test]
    fn test_abilities_saturate_on_huge_stats() {
        let mut mage = hero(CharacterClass::Mage);
        mage.magic = 3_000_000_000;
        let mut dragon = create_enemy("dragon").unwrap();
        assert_eq!(
            mage_fireball(&mage, &mut dragon),
            CombatEvent::Fireball { damage: u32::MAX }
        );
        assert_eq!(dragon.health(), 0);

        let mut warrior = hero(CharacterClass::Warrior);
        warrior.strength = u32::MAX;
        let mut orc = create_enemy("orc").unwrap();
        assert_eq!(
            warrior_power_strike(&warrior, &mut orc),
            CombatEvent::PowerStrike { damage: u32::MAX }
        );

        let mut rogue = hero(CharacterClass::Rogue);
        rogue.strength = u32::MAX;
        let mut orc = create_enemy("orc").unwrap();
        assert_eq!(
            rogue_critical_strike(&rogue, &mut orc, &mut lucky_rng()),
            CombatEvent::CriticalStrike {
                damage: u32::MAX,
                was_crit: true
            }
        );
    }

    #[test]
    fn test_warrior_beats_goblin_in_four_rounds() {
        let mut warrior = hero(CharacterClass::Warrior);
        let mut goblin = create_enemy("goblin").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let mut battle = Battle::new(&mut warrior, &mut goblin);
        let result = battle.start(&mut AlwaysAttack, &mut rng).unwrap();

        assert_eq!(
            result,
            BattleResult {
                winner: Winner::Player,
                xp_gained: 25,
                gold_gained: 10
            }
        );
        assert_eq!(battle.state(), BattleState::PlayerWon);
        assert_eq!(battle.turn_number(), 4);
        let enemy_attacks = battle
            .log()
            .iter()
            .filter(|e| matches!(e, CombatEvent::EnemyAttack { .. }))
            .count();
        assert_eq!(enemy_attacks, 3);

        assert_eq!(goblin.health(), 0);
        assert_eq!(warrior.health, 120 - 3 * 5);
        assert_eq!(warrior.experience, 25);
        assert_eq!(warrior.gold, 110);
    }

    #[test]
    fn test_dead_character_cannot_start() {
        let mut warrior = hero(CharacterClass::Warrior);
        warrior.health = 0;
        let mut goblin = create_enemy("goblin").unwrap();
        let before = (warrior.clone(), goblin.clone());

        let mut battle = Battle::new(&mut warrior, &mut goblin);
        let err = battle
            .start(&mut AlwaysAttack, &mut lucky_rng())
            .unwrap_err();
        assert_eq!(err, CombatError::CharacterDead);
        assert!(battle.log().is_empty());

        assert_eq!((warrior, goblin), before);
    }

    #[test]
    fn test_successful_escape_skips_enemy_turn() {
        let mut mage = hero(CharacterClass::Mage);
        let mut orc = create_enemy("orc").unwrap();

        let mut battle = Battle::new(&mut mage, &mut orc);
        let mut actions = ScriptedActions::new([PlayerAction::Escape]);
        let result = battle.start(&mut actions, &mut lucky_rng()).unwrap();

        assert_eq!(result.winner, Winner::None);
        assert_eq!(result.xp_gained, 0);
        assert_eq!(battle.state(), BattleState::Escaped);
        assert_eq!(battle.turn_number(), 1);
        assert_eq!(battle.log(), &[CombatEvent::EscapeAttempt { success: true }]);

        assert_eq!(mage.health, 80);
        assert_eq!(mage.experience, 0);
    }

    #[test]
    fn test_failed_escape_lets_enemy_attack() {
        let mut mage = hero(CharacterClass::Mage);
        let mut orc = create_enemy("orc").unwrap();

        let mut battle = Battle::new(&mut mage, &mut orc);
        let mut rng = unlucky_rng();
        battle.player_turn(PlayerAction::Escape, &mut rng).unwrap();
        assert_eq!(battle.check_battle_end(), BattleState::Ongoing);
        battle.enemy_turn().unwrap();

        assert_eq!(
            battle.log(),
            &[
                CombatEvent::EscapeAttempt { success: false },
                CombatEvent::EnemyAttack { damage: 10 },
            ]
        );
        assert_eq!(battle.player().health, 70);
    }

    #[test]
    fn test_enemy_victory_awards_nothing() {
        let mut mage = hero(CharacterClass::Mage);
        mage.health = 5;
        let mut dragon = create_enemy("dragon").unwrap();

        let mut battle = Battle::new(&mut mage, &mut dragon);
        let result = battle
            .start(&mut AlwaysAttack, &mut lucky_rng())
            .unwrap();

        assert_eq!(result.winner, Winner::Enemy);
        assert_eq!((result.xp_gained, result.gold_gained), (0, 0));
        assert_eq!(battle.log().last(), Some(&CombatEvent::PlayerDefeated));
        assert_eq!(mage.health, 0);
        assert_eq!(mage.experience, 0);
        assert_eq!(mage.gold, 100);
    }

    #[test]
    fn test_finished_battle_rejects_more_turns() {
        let mut warrior = hero(CharacterClass::Warrior);
        let mut goblin = create_enemy("goblin").unwrap();
        let mut rng = lucky_rng();

        let mut battle = Battle::new(&mut warrior, &mut goblin);
        battle.start(&mut AlwaysAttack, &mut rng).unwrap();

        assert_eq!(
            battle.player_turn(PlayerAction::BasicAttack, &mut rng),
            Err(CombatError::NotActive)
        );
        assert_eq!(battle.enemy_turn(), Err(CombatError::NotActive));
        assert_eq!(
            battle.start(&mut AlwaysAttack, &mut rng),
            Err(CombatError::NotActive)
        );
        // Rewards were paid once only
        assert_eq!(warrior.experience, 25);
        assert_eq!(warrior.gold, 110);
    }

    #[test]
    fn test_health_stays_in_bounds_across_seeds() {
        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let class = CharacterClass::all()[(seed % 4) as usize];
            let mut player = hero(class);
            let mut enemy = create_enemy(["goblin", "orc", "dragon"][(seed % 3) as usize]).unwrap();
            let mut actions = ScriptedActions::new(
                (0..50).map(|i| match (seed + i) % 3 {
                    0 => PlayerAction::BasicAttack,
                    1 => PlayerAction::SpecialAbility,
                    _ => PlayerAction::Escape,
                }),
            );

            let mut battle = Battle::new(&mut player, &mut enemy);
            let result = battle.start(&mut actions, &mut rng).unwrap();
            assert!(battle.state().is_terminal());

            if result.winner == Winner::Player {
                assert_eq!(battle.enemy().health(), 0);
            }
            assert!(player.health <= player.max_health);
            assert!(enemy.health() <= enemy.max_health());
        }
    }

    #[test]
    fn test_event_descriptions() {
        assert_eq!(
            CombatEvent::PlayerAttack { damage: 13 }.describe("Goblin"),
            "You attack the Goblin for 13 damage!"
        );
        assert_eq!(
            CombatEvent::Heal { amount: 30 }.describe("Goblin"),
            "You pray for divine aid and heal 30 HP!"
        );
    }
}
