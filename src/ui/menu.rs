//! The menu loops: main menu, in-game menu and its submenus, and the death
//! screen.

use std::io::{self, BufRead, Write};

use quest_chronicles::character::{validate_name, CharacterManager};
use quest_chronicles::combat::{ActionSource, Combatant, Enemy, PlayerAction};
use quest_chronicles::core::{GameData, GameError, Session};
use quest_chronicles::{Character, CharacterClass};
use rand::Rng;
use tracing::info;

use super::display;
use super::Prompt;

enum Flow {
    Stay,
    Leave,
}

/// Asks the player for each battle action. End of input counts as an
/// escape attempt.
struct PromptActions<'p, R, W> {
    prompt: &'p mut Prompt<R, W>,
    error: Option<io::Error>,
}

impl<R: BufRead, W: Write> PromptActions<'_, R, W> {
    fn ask(&mut self, player: &Character, enemy: &Enemy, turn: u32) -> io::Result<PlayerAction> {
        self.prompt.say(format!(
            "\n-- Turn {} -- {} {}/{} HP | {} {}/{} HP",
            turn,
            player.name,
            player.health,
            player.max_health,
            enemy.name(),
            enemy.health(),
            enemy.max_health()
        ))?;
        self.prompt.say(format!(
            "1) Attack  2) {}  3) Run",
            player.class.ability_name()
        ))?;
        Ok(match self.prompt.choose("> ", 3)? {
            Some(1) => PlayerAction::BasicAttack,
            Some(2) => PlayerAction::SpecialAbility,
            _ => PlayerAction::Escape,
        })
    }
}

impl<R: BufRead, W: Write> ActionSource for PromptActions<'_, R, W> {
    fn next_action(&mut self, player: &Character, enemy: &Enemy, turn: u32) -> PlayerAction {
        if self.error.is_some() {
            return PlayerAction::Escape;
        }
        match self.ask(player, enemy, turn) {
            Ok(action) => action,
            Err(e) => {
                self.error = Some(e);
                PlayerAction::Escape
            }
        }
    }
}

/// New game / load game / quit, until the player quits or input ends.
pub fn main_menu<R, W, G>(
    prompt: &mut Prompt<R, W>,
    manager: &CharacterManager,
    data: &GameData,
    mut new_rng: impl FnMut() -> G,
) -> Result<(), GameError>
where
    R: BufRead,
    W: Write,
    G: Rng,
{
    loop {
        prompt.say("\n=== QUEST CHRONICLES ===\n1) New game\n2) Load game\n3) Quit")?;
        let character = match prompt.choose("> ", 3)? {
            Some(1) => new_character(prompt, manager)?,
            Some(2) => load_character(prompt, manager)?,
            _ => {
                prompt.say("Farewell, adventurer.")?;
                return Ok(());
            }
        };

        if let Some(character) = character {
            let mut session = Session::new(character, data.clone(), new_rng());
            game_loop(prompt, manager, &mut session)?;
        }
    }
}

fn new_character<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    manager: &CharacterManager,
) -> Result<Option<Character>, GameError> {
    let name = loop {
        let Some(name) = prompt.ask("Character name: ")? else {
            return Ok(None);
        };
        match validate_name(&name) {
            Ok(()) if manager.save_path(&name).exists() => {
                prompt.say(format!("A character named {} already exists.", name))?;
            }
            Ok(()) => break name,
            Err(reason) => prompt.say(reason)?,
        }
    };

    prompt.say("Choose a class:")?;
    for (i, class) in CharacterClass::all().iter().enumerate() {
        let (health, strength, magic) = class.base_stats();
        prompt.say(format!(
            "{}) {} - {} HP, {} STR, {} MAG, {}",
            i + 1,
            class,
            health,
            strength,
            magic,
            class.ability_name()
        ))?;
    }
    let Some(choice) = prompt.choose("> ", CharacterClass::all().len())? else {
        return Ok(None);
    };

    let class = CharacterClass::all()[choice - 1];
    let character = Character::new(name, class);
    manager.save_character(&character)?;
    info!(name = %character.name, class = %class, "character created");
    prompt.say(format!("Welcome, {} the {}!", character.name, class))?;
    Ok(Some(character))
}

fn load_character<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    manager: &CharacterManager,
) -> Result<Option<Character>, GameError> {
    let saves = manager.list_characters()?;
    prompt.say(display::save_list(&saves))?;
    if saves.is_empty() {
        return Ok(None);
    }

    let Some(choice) = prompt.choose("Load which character? ", saves.len())? else {
        return Ok(None);
    };
    let info = &saves[choice - 1];
    match manager.load_character(&info.character_name) {
        Ok(character) => Ok(Some(character)),
        Err(e) => {
            prompt.say(format!("Could not load {}: {}", info.character_name, e))?;
            Ok(None)
        }
    }
}

/// The in-game menu. Returns when the player saves and quits, gives up
/// after dying, or input ends.
pub fn game_loop<R, W, G>(
    prompt: &mut Prompt<R, W>,
    manager: &CharacterManager,
    session: &mut Session<G>,
) -> Result<(), GameError>
where
    R: BufRead,
    W: Write,
    G: Rng,
{
    loop {
        if session.character().is_dead() {
            if let Flow::Leave = death_menu(prompt, session)? {
                return Ok(());
            }
        }

        prompt.say(
            "\n=== GAME MENU ===\n1) Character stats\n2) Inventory\n3) Quests\n4) Explore\n5) Shop\n6) Save & quit",
        )?;
        let flow = match prompt.choose("> ", 6)? {
            Some(1) => {
                prompt.say(display::character_sheet(session.character()))?;
                Flow::Stay
            }
            Some(2) => inventory_menu(prompt, session)?,
            Some(3) => quest_menu(prompt, session)?,
            Some(4) => explore(prompt, session)?,
            Some(5) => shop_menu(prompt, session)?,
            Some(_) => {
                let path = session.save(manager)?;
                prompt.say(format!("Game saved to {}.", path.display()))?;
                Flow::Leave
            }
            None => Flow::Leave,
        };
        if let Flow::Leave = flow {
            return Ok(());
        }
    }
}

fn explore<R: BufRead, W: Write, G: Rng>(
    prompt: &mut Prompt<R, W>,
    session: &mut Session<G>,
) -> Result<Flow, GameError> {
    prompt.say("\nYou venture out of town...")?;
    let mut actions = PromptActions {
        prompt: &mut *prompt,
        error: None,
    };
    let outcome = session.explore(&mut actions)?;
    if let Some(e) = actions.error {
        return Err(e.into());
    }
    prompt.say(display::battle_report(&outcome))?;
    Ok(Flow::Stay)
}

fn death_menu<R: BufRead, W: Write, G: Rng>(
    prompt: &mut Prompt<R, W>,
    session: &mut Session<G>,
) -> Result<Flow, GameError> {
    prompt.say("\nYour character has fallen in battle!\n1) Revive for 50 gold\n2) Quit to main menu")?;
    match prompt.choose("> ", 2)? {
        Some(1) => match session.revive_for_gold() {
            Ok(_) => {
                prompt.say(format!(
                    "You have been revived with {} HP.",
                    session.character().health
                ))?;
                Ok(Flow::Stay)
            }
            Err(e) => {
                prompt.say(format!("{}. Returning to the main menu.", e))?;
                Ok(Flow::Leave)
            }
        },
        _ => Ok(Flow::Leave),
    }
}

fn inventory_menu<R: BufRead, W: Write, G: Rng>(
    prompt: &mut Prompt<R, W>,
    session: &mut Session<G>,
) -> Result<Flow, GameError> {
    loop {
        prompt.say(display::inventory_listing(
            session.character(),
            &session.data().items,
        ))?;
        prompt.say("1) Use item\n2) Equip item\n3) Unequip weapon\n4) Unequip armor\n5) Back")?;
        let result = match prompt.choose("> ", 5)? {
            Some(1) => match pick_item(prompt, session.character())? {
                Some(id) => session.use_item(&id).map(|change| {
                    format!("You used {} and gained {} {}.", id, change.amount, change.stat)
                }),
                None => continue,
            },
            Some(2) => match pick_item(prompt, session.character())? {
                Some(id) => session.equip(&id).map(|old| match old {
                    Some(old) => format!("You equipped {} and put away {}.", id, old),
                    None => format!("You equipped {}.", id),
                }),
                None => continue,
            },
            Some(3) => session.unequip_weapon().map(unequipped),
            Some(4) => session.unequip_armor().map(unequipped),
            _ => return Ok(Flow::Stay),
        };
        report(prompt, result)?;
    }
}

fn unequipped(item: Option<String>) -> String {
    match item {
        Some(id) => format!("You unequipped {}.", id),
        None => "Nothing to unequip.".to_string(),
    }
}

fn pick_item<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    character: &Character,
) -> Result<Option<String>, GameError> {
    let ids = display::inventory_ids(character);
    if ids.is_empty() {
        return Ok(None);
    }
    Ok(prompt
        .choose("Which item? ", ids.len())?
        .map(|n| ids[n - 1].clone()))
}

fn quest_menu<R: BufRead, W: Write, G: Rng>(
    prompt: &mut Prompt<R, W>,
    session: &mut Session<G>,
) -> Result<Flow, GameError> {
    loop {
        prompt.say(format!("\n{}", display::quest_progress(&session.quest_progress())))?;
        prompt.say("1) Active quests\n2) Available quests\n3) Accept a quest\n4) Complete a quest\n5) Abandon a quest\n6) Back")?;
        let result = match prompt.choose("> ", 6)? {
            Some(1) => {
                prompt.say(display::quest_list("Active quests:", &session.active_quests()))?;
                continue;
            }
            Some(2) => {
                prompt.say(display::quest_list(
                    "Available quests:",
                    &session.available_quests(),
                ))?;
                continue;
            }
            Some(3) => match ask_quest_id(prompt, "accept")? {
                Some(id) => session
                    .accept_quest(&id)
                    .map(|()| format!("Quest {} accepted!", id)),
                None => continue,
            },
            Some(4) => match ask_quest_id(prompt, "complete")? {
                Some(id) => session.complete_quest(&id).map(|done| {
                    let mut msg = format!(
                        "Quest complete: {}! You earned {} XP and {} gold.",
                        done.reward.title, done.reward.xp, done.reward.gold
                    );
                    if done.levels_gained > 0 {
                        msg.push_str(&format!(" You reached level {}!", session.character().level));
                    }
                    msg
                }),
                None => continue,
            },
            Some(5) => match ask_quest_id(prompt, "abandon")? {
                Some(id) => session
                    .abandon_quest(&id)
                    .map(|()| format!("Quest {} abandoned.", id)),
                None => continue,
            },
            _ => return Ok(Flow::Stay),
        };
        report(prompt, result)?;
    }
}

fn ask_quest_id<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    verb: &str,
) -> io::Result<Option<String>> {
    Ok(prompt
        .ask(&format!("Quest id to {}: ", verb))?
        .filter(|id| !id.is_empty()))
}

fn shop_menu<R: BufRead, W: Write, G: Rng>(
    prompt: &mut Prompt<R, W>,
    session: &mut Session<G>,
) -> Result<Flow, GameError> {
    loop {
        prompt.say(format!(
            "\n{}\nYou have {} gold.",
            display::shop_listing(&session.data().items),
            session.character().gold
        ))?;
        prompt.say("1) Buy\n2) Sell\n3) Back")?;
        let result = match prompt.choose("> ", 3)? {
            Some(1) => {
                let ids: Vec<String> = session.data().items.iter().map(|i| i.id.clone()).collect();
                if ids.is_empty() {
                    prompt.say("Nothing is for sale.")?;
                    continue;
                }
                match prompt.choose("Buy which item? ", ids.len())? {
                    Some(n) => session
                        .buy(&ids[n - 1])
                        .map(|()| format!("You bought {}.", ids[n - 1])),
                    None => continue,
                }
            }
            Some(2) => {
                prompt.say(display::inventory_listing(
                    session.character(),
                    &session.data().items,
                ))?;
                match pick_item(prompt, session.character())? {
                    Some(id) => session
                        .sell(&id)
                        .map(|gold| format!("You sold {} for {} gold.", id, gold)),
                    None => continue,
                }
            }
            _ => return Ok(Flow::Stay),
        };
        report(prompt, result)?;
    }
}

/// Prints the outcome of a player action. Rule violations are shown to the
/// player; only I/O failures propagate.
fn report<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    result: Result<String, GameError>,
) -> Result<(), GameError> {
    match result {
        Ok(message) => prompt.say(message)?,
        Err(GameError::Io(e)) => return Err(GameError::Io(e)),
        Err(e) => prompt.say(e.to_string())?,
    }
    Ok(())
}
