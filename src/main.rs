//! duel - command line front end for the duel engine
//!
//! Validates card databases, lists registered action kinds, and runs a
//! short bot-vs-bot demo duel.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use duel_engine::{
    actions::{Activation, ActionRegistry, Engine},
    core::{CardKind, CardSubtype, PlayerId, Position, Timing},
    game::{ActionContext, DuelConfig, MoveOptions, SummonMethod, VerbosityLevel},
    loader::{load_directory, CardDatabase, CardRef, DeckList, GameInitializer},
    zones::ZoneKind,
    DuelError,
};
use std::path::PathBuf;

/// Verbosity level for duel output (accepts names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Rules engine for a two-player monster/spell/trap card game", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a card database file, or every *.json file in a directory
    Validate {
        #[arg(value_name = "DATABASE")]
        path: PathBuf,
    },

    /// List the registered action types
    Actions,

    /// Run a short scripted bot-vs-bot duel
    Demo {
        /// Random seed for the deck shuffle
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Number of turns to play
        #[arg(long, default_value_t = 4)]
        turns: u32,

        /// Duel configuration file (JSON)
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Verbosity level (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, short = 'v', default_value = "verbose")]
        verbosity: VerbosityArg,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let registry = ActionRegistry::with_builtins();

    match cli.command {
        Commands::Validate { path } => {
            let loaded = if path.is_dir() {
                load_directory(&path, &registry).await.map(|(db, _)| db)
            } else {
                CardDatabase::load_from_file(&path, &registry)
            };
            match loaded {
                Ok(db) => {
                    println!("{}", db.report());
                    println!("{} card(s) loaded from {}", db.len(), path.display());
                }
                Err(DuelError::Validation(report)) => {
                    println!("{report}");
                    bail!("{} failed validation", path.display());
                }
                Err(e) => return Err(e).with_context(|| format!("loading {}", path.display())),
            }
        }
        Commands::Actions => {
            for kind in registry.list_types() {
                println!("{kind}");
            }
        }
        Commands::Demo {
            seed,
            turns,
            config,
            verbosity,
        } => {
            let mut config = match config {
                Some(path) => DuelConfig::from_json_file(&path)
                    .with_context(|| format!("reading config {}", path.display()))?,
                None => DuelConfig::default(),
            };
            config.seed = seed;
            config.verbosity = verbosity.0;
            run_demo(&registry, config, turns)?;
        }
    }
    Ok(())
}

const DEMO_CARDS: &str = r#"[
    {"id": 1, "name": "Ember Drake", "cardKind": "monster", "types": ["Dragon"],
     "archetypes": ["Drake"], "atk": 1800, "def": 1200, "level": 4, "effects": [
        {"timing": "passive", "passive": {"kind": "archetype_population", "archetype": "Drake",
         "atkPer": 100}}
    ]},
    {"id": 2, "name": "Grave Wyrm", "cardKind": "monster", "types": ["Zombie"],
     "atk": 1200, "def": 1600, "level": 4, "effects": [
        {"timing": "passive", "passive": {"kind": "graveyard_type_count", "type": "Zombie",
         "atkPer": 200, "side": "both"}}
    ]},
    {"id": 3, "name": "Chorus Herald", "cardKind": "monster", "types": ["Fairy"],
     "atk": 1000, "def": 1000, "level": 3, "effects": [
        {"id": "chorus-draw", "timing": "on_event", "event": "after_summon", "oncePerTurn": true,
         "scope": "player", "actions": [{"type": "draw", "amount": 1}]}
    ]},
    {"id": 4, "name": "Drake Lance", "cardKind": "spell", "subtype": "equip", "effects": [
        {"timing": "on_play", "actions": [
            {"type": "equip", "atk": 500, "filter": {"cardKind": "monster"}}
        ]}
    ]},
    {"id": 5, "name": "Call of the Pit", "cardKind": "spell", "subtype": "normal", "effects": [
        {"timing": "on_play", "actions": [
            {"type": "pay_cost", "from": "hand", "count": 1, "then": [
                {"type": "special_summon", "from": "graveyard", "filter": {"cardKind": "monster"}}
            ]}
        ]}
    ]},
    {"id": 6, "name": "Shatter", "cardKind": "spell", "subtype": "normal", "effects": [
        {"timing": "on_play", "actions": [
            {"type": "destroy", "player": "opponent", "filter": {"cardKind": "monster"}}
        ]}
    ]}
]"#;

fn demo_deck() -> DeckList {
    let mut deck = DeckList::default();
    for (id, count) in [(1, 4), (2, 4), (3, 3), (4, 3), (5, 3), (6, 3)] {
        deck.push(CardRef::Id(id), count);
    }
    deck
}

fn run_demo(registry: &ActionRegistry, config: DuelConfig, turns: u32) -> anyhow::Result<()> {
    let db = CardDatabase::from_json_str(DEMO_CARDS, registry)?;
    let deck = demo_deck();
    let state = GameInitializer::new(&db).init_game(("Alice", &deck), ("Bob", &deck), config)?;
    let mut engine = Engine::new(state).with_registry(registry.clone());

    for _ in 0..turns {
        let player = engine.state.active_player;
        if engine.state.turn_counter > 1 {
            engine.state.draw_cards(player, 1);
        }
        play_turn(&mut engine, player)?;
        report_board(&engine);
        if engine.state.players.iter().any(|p| p.has_lost) {
            break;
        }
        engine.state.end_turn();
    }
    Ok(())
}

/// One greedy turn: summon the strongest monster, then play every spell
fn play_turn(engine: &mut Engine, player: PlayerId) -> anyhow::Result<()> {
    let hand = engine.state.zone(player, ZoneKind::Hand).to_vec();

    let strongest = hand
        .iter()
        .filter_map(|id| engine.state.card(*id).ok())
        .filter(|c| c.kind == CardKind::Monster)
        .max_by_key(|c| c.atk)
        .map(|c| c.id);
    if let Some(monster) = strongest {
        let position = engine.state.preferred_position(monster);
        let options = MoveOptions::summon(SummonMethod::Normal, position);
        if engine.state.move_card(monster, player, ZoneKind::Field, options).is_ok() {
            resolve_triggers(engine)?;
        }
    }

    for card in hand {
        let Ok(c) = engine.state.card(card) else { continue };
        let in_hand = matches!(engine.state.locate(card), Some((_, ZoneKind::Hand)));
        if c.kind != CardKind::Spell || !in_hand {
            continue;
        }
        let lingers = c.is_subtype(CardSubtype::Equip) || c.is_subtype(CardSubtype::Continuous);
        let on_play = c.effects.iter().position(|e| e.timing == Timing::OnPlay);

        let options = MoveOptions::from_zone(ZoneKind::Hand);
        if engine.state.move_card(card, player, ZoneKind::SpellTrap, options).is_err() {
            continue;
        }
        if let Some(index) = on_play {
            let activation = engine.activate_effect(card, index, ActionContext::new(player))?;
            if !matches!(activation, Activation::Resolved { effective: true }) || !lingers {
                let owner = engine.state.card(card)?.owner;
                engine
                    .state
                    .move_card(card, owner, ZoneKind::Graveyard, MoveOptions::default())
                    .ok();
            }
        }
        resolve_triggers(engine)?;
    }
    Ok(())
}

/// Resolve triggered effects until no new events are raised
fn resolve_triggers(engine: &mut Engine) -> anyhow::Result<()> {
    for _ in 0..16 {
        if engine.state.events().is_empty() {
            return Ok(());
        }
        engine.process_events()?;
    }
    bail!("trigger chain did not settle")
}

fn report_board(engine: &Engine) {
    let state = &engine.state;
    println!("--- end of turn {} ---", state.turn_counter);
    for player in state.player_ids() {
        let Ok(p) = state.get_player(player) else { continue };
        let field: Vec<String> = state
            .zone(player, ZoneKind::Field)
            .iter()
            .filter_map(|id| state.card(*id).ok())
            .map(|c| {
                let pos = if c.position == Position::Attack { "ATK" } else { "DEF" };
                format!("{} {}/{} {pos}", c.name, c.atk, c.def)
            })
            .collect();
        println!(
            "{}: {} LP, hand {}, deck {}, graveyard {}, field [{}]",
            p.name,
            p.lp,
            state.zone(player, ZoneKind::Hand).len(),
            state.zone(player, ZoneKind::Deck).len(),
            state.zone(player, ZoneKind::Graveyard).len(),
            field.join(", ")
        );
    }
}
