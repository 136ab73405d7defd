mod ui;

use std::io;
use std::path::PathBuf;

use quest_chronicles::build_info;
use quest_chronicles::character::CharacterManager;
use quest_chronicles::core::{GameConfig, GameData, GameError};
use tracing_subscriber::EnvFilter;
use ui::display;
use ui::Prompt;

const USAGE: &str = "\
Quest Chronicles - a text-menu RPG

Usage: quest-chronicles [--data-dir DIR] [command]

Commands:
  (none)             Play
  list               List saved characters
  sheet NAME         Show a character sheet
  sheet NAME --json  Show a character as JSON
  --version          Show version information
  --help             Show this help message

Environment:
  QUEST_CHRONICLES_DIR  Data directory when --data-dir is not given
  RUST_LOG              Log filter (logs go to stderr)";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Play,
    List,
    Sheet { name: String, json: bool },
    Version,
    Help,
}

#[derive(Debug, PartialEq, Eq)]
struct Cli {
    data_dir: Option<PathBuf>,
    command: Command,
}

fn parse_args(args: &[String]) -> Result<Cli, String> {
    let mut data_dir = None;
    let mut rest = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--data-dir" => {
                let dir = iter.next().ok_or("--data-dir needs a directory")?;
                data_dir = Some(PathBuf::from(dir));
            }
            _ => rest.push(arg.as_str()),
        }
    }

    let command = match rest.as_slice() {
        [] => Command::Play,
        ["--version" | "-v"] => Command::Version,
        ["--help" | "-h"] => Command::Help,
        ["list"] => Command::List,
        ["sheet", name] => Command::Sheet {
            name: name.to_string(),
            json: false,
        },
        ["sheet", name, "--json"] => Command::Sheet {
            name: name.to_string(),
            json: true,
        },
        [other, ..] => return Err(format!("Unknown command: {}", other)),
    };

    Ok(Cli { data_dir, command })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quest_chronicles=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{}", msg);
            eprintln!("Run 'quest-chronicles --help' for usage.");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), GameError> {
    match cli.command {
        Command::Version => {
            println!("{}", build_info::version_line());
            return Ok(());
        }
        Command::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        _ => {}
    }

    let config = GameConfig::resolve(cli.data_dir)?;
    let manager = CharacterManager::new(&config.save_dir)?;

    match cli.command {
        Command::List => {
            println!("{}", display::save_list(&manager.list_characters()?));
        }
        Command::Sheet { name, json } => {
            let character = manager.load_character(&name)?;
            if json {
                let text = serde_json::to_string_pretty(&character).map_err(io::Error::from)?;
                println!("{}", text);
            } else {
                println!("{}", display::character_sheet(&character));
            }
        }
        _ => {
            let data = GameData::load_or_create(&config)?;
            let stdin = io::stdin();
            let mut prompt = Prompt::new(stdin.lock(), io::stdout());
            ui::menu::main_menu(&mut prompt, &manager, &data, rand::thread_rng)?;
        }
    }
    Ok(())
}
