//! game-runner: headless runner for the money-choices game.
//!
//! Usage:
//!   game-runner --seed 12345 --games 5 --strategy cautious --goal bike --db runs.db
//!   game-runner --seed 12345 --ipc-mode
//!
//! Autoplay drives each game with a scripted strategy, persists the engine
//! event log, and prints a summary per game plus the leaderboard.

use anyhow::{Context, Result};
use longgame_core::{
    asset_catalog::RiskLevel,
    command::PlayerCommand,
    config::SimConfig,
    engine::{Continuation, GameEngine, TurnProgress},
    event::EventLogEntry,
    event_catalog::{ChoiceEffect, LifeEvent},
    outcome::GameSummary,
    ranking::LeaderboardEntry,
    rng::{RandomSource, RngBank, RngStream, SimRng},
    state::TurnRecord,
    store::SimStore,
    types::{AssetKey, Money, Turn},
};
use std::collections::BTreeMap;
use std::env;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Command { command: PlayerCommand },
    Leaderboard,
    RecentRuns { count: usize },
    ClearLeaderboard,
    NewGame { seed: u64 },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    run_id:         &'a str,
    turn:           Turn,
    max_turns:      Turn,
    money:          Money,
    goal:           Money,
    goal_key:       &'a str,
    phase:          &'a str,
    allocations:    &'a BTreeMap<AssetKey, Money>,
    cash_remaining: Money,
    pending_event:  Option<&'a LifeEvent>,
    last_turn:      Option<&'a TurnRecord>,
    summary:        Option<&'a GameSummary>,
    error:          Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// Everything in the safest asset; always the best expected choice.
    Cautious,
    /// Random split across assets; random choices.
    Balanced,
    /// Everything in the riskiest asset; takes every gamble.
    Yolo,
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cautious" => Ok(Self::Cautious),
            "balanced" => Ok(Self::Balanced),
            "yolo"     => Ok(Self::Yolo),
            other      => anyhow::bail!("unknown strategy '{other}'"),
        }
    }
}

impl Strategy {
    fn name(&self) -> &'static str {
        match self {
            Self::Cautious => "cautious",
            Self::Balanced => "balanced",
            Self::Yolo     => "yolo",
        }
    }

    fn allocate(&self, engine: &mut GameEngine, rng: &mut SimRng) -> Result<()> {
        let assets = engine.config().assets.clone();
        let target = match self {
            Self::Cautious => assets.first_with_risk(RiskLevel::Safe),
            Self::Yolo => assets
                .first_with_risk(RiskLevel::Dangerous)
                .or_else(|| assets.first_with_risk(RiskLevel::Risky)),
            Self::Balanced => {
                for asset in assets.iter() {
                    let share = rng.next_f64() * 0.5;
                    let amount = (engine.cash_remaining() as f64 * share) as Money;
                    engine.set_allocation(&asset.key, amount)?;
                }
                return Ok(());
            }
        };
        if let Some(asset) = target {
            engine.set_allocation(&asset.key, engine.money())?;
        }
        Ok(())
    }

    fn choose(&self, event: &LifeEvent, rng: &mut SimRng) -> usize {
        match self {
            Self::Cautious => {
                let mut best = (0, f64::MIN);
                for (i, choice) in event.choices.iter().enumerate() {
                    let value = match choice.effect {
                        ChoiceEffect::Fixed { amount } => amount as f64,
                        ChoiceEffect::Gamble { cost, reward, win_probability } => {
                            win_probability * reward as f64 - cost as f64
                        }
                    };
                    if value > best.1 {
                        best = (i, value);
                    }
                }
                best.0
            }
            Self::Balanced => rng.pick_index(event.choices.len()),
            Self::Yolo => event
                .choices
                .iter()
                .position(|c| c.effect.is_gamble())
                .unwrap_or(0),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let games = parse_arg(&args, "--games", 1u32);
    let strategy = parse_arg(&args, "--strategy", Strategy::Balanced);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let goal = string_arg(&args, "--goal", "bike");
    let db = string_arg(&args, "--db", ":memory:");
    let data_dir = string_arg(&args, "--data-dir", "./data");

    if !ipc_mode {
        println!("Money Choices: game-runner");
        println!("  seed:      {seed}");
        println!("  games:     {games}");
        println!("  strategy:  {}", strategy.name());
        println!("  goal:      {goal}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let config = SimConfig::load(data_dir)?;

    let store = if db == ":memory:" { SimStore::in_memory()? } else { SimStore::open(db)? };
    store.migrate()?;

    if ipc_mode {
        let engine = match GameEngine::resume_saved(config.clone(), Box::new(store.reopen()?))? {
            Some(engine) => engine,
            None => start_game(&store, &config, seed, goal)?,
        };
        return run_ipc_loop(engine, &store);
    }

    for game in 0..games {
        let game_seed = seed.wrapping_add(u64::from(game));
        let mut engine = start_game(&store, &config, game_seed, goal)?;
        let mut rng = RngBank::new(game_seed).for_stream(RngStream::Strategy);
        let summary = play_game(&mut engine, strategy, &mut rng, &store)?;
        print_summary(&engine.run_id, game_seed, &summary);
    }
    print_leaderboard(&store.leaderboard_entries()?);
    Ok(())
}

fn start_game(store: &SimStore, config: &SimConfig, seed: u64, goal: &str) -> Result<GameEngine> {
    let run_id = uuid::Uuid::new_v4().to_string();
    store.insert_run(
        &run_id,
        seed,
        env!("CARGO_PKG_VERSION"),
        goal,
        chrono::Utc::now().timestamp_millis(),
    )?;
    let mut engine = GameEngine::build(run_id, seed, config.clone(), goal, Box::new(store.reopen()?))?;
    persist_events(&mut engine, store)?;
    Ok(engine)
}

fn play_game(
    engine: &mut GameEngine,
    strategy: Strategy,
    rng: &mut SimRng,
    store: &SimStore,
) -> Result<GameSummary> {
    loop {
        strategy.allocate(engine, rng)?;
        let mut progress = engine.end_turn()?;
        while matches!(progress, TurnProgress::AwaitingChoice { .. }) {
            let event = engine.pending_event().cloned().context("awaiting a choice with no event")?;
            let index = strategy.choose(&event, rng);
            log::debug!("{} picks choice {index} for {}", strategy.name(), event.id);
            progress = engine.choose(index)?;
        }
        let next = engine.continue_game()?;
        persist_events(engine, store)?;
        if let Continuation::GameOver(summary) = next {
            return Ok(*summary);
        }
    }
}

fn persist_events(engine: &mut GameEngine, store: &SimStore) -> Result<()> {
    let run_id = engine.run_id.clone();
    for event in engine.drain_events() {
        store.append_event(&EventLogEntry::from_event(&run_id, &event)?)?;
    }
    Ok(())
}

fn run_ipc_loop(mut engine: GameEngine, store: &SimStore) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let mut error = None;
        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::Leaderboard => {
                writeln!(stdout, "{}", serde_json::to_string(&engine.leaderboard())?)?;
                stdout.flush()?;
                continue;
            }
            IpcCommand::RecentRuns { count } => {
                writeln!(stdout, "{}", serde_json::to_string(&engine.recent_runs(count))?)?;
                stdout.flush()?;
                continue;
            }
            IpcCommand::ClearLeaderboard => {
                if let Err(e) = engine.clear_leaderboard() {
                    log::warn!("Could not clear leaderboard: {e}");
                    error = Some(e.to_string());
                }
            }
            IpcCommand::Command { command } => {
                let name = command.name();
                if let Err(e) = engine.apply(command) {
                    log::warn!("Rejected {name}: {e}");
                    error = Some(e.to_string());
                }
            }
            IpcCommand::NewGame { seed } => {
                let run_id = uuid::Uuid::new_v4().to_string();
                store.insert_run(
                    &run_id,
                    seed,
                    env!("CARGO_PKG_VERSION"),
                    &engine.state().goal_key,
                    chrono::Utc::now().timestamp_millis(),
                )?;
                engine = engine.play_again(run_id, seed)?;
            }
        }
        persist_events(&mut engine, store)?;
        let state = build_ui_state(&engine, error);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(engine: &GameEngine, error: Option<String>) -> UiState<'_> {
    let state = engine.state();
    UiState {
        run_id:         &engine.run_id,
        turn:           state.turn(),
        max_turns:      state.clock.max_turns,
        money:          state.money,
        goal:           state.goal,
        goal_key:       &state.goal_key,
        phase:          state.phase.name(),
        allocations:    &state.allocations,
        cash_remaining: state.cash_remaining(),
        pending_event:  engine.pending_event(),
        last_turn:      engine.last_turn(),
        summary:        engine.summary(),
        error,
    }
}

fn print_summary(run_id: &str, seed: u64, summary: &GameSummary) {
    println!("=== GAME SUMMARY ===");
    println!("  run_id:         {run_id}");
    println!("  seed:           {seed}");
    println!("  outcome:        {:?}", summary.outcome);
    println!("  final money:    {} / {}", summary.final_money, summary.goal);
    println!("  turns:          {}", summary.turn);
    println!("  lowest money:   {}", summary.stats.lowest_money);
    println!("  events:         {}", summary.stats.events_encountered);
    println!(
        "  gambles:        {} taken, {} won",
        summary.stats.gambles_taken, summary.stats.gambles_won
    );
    match &summary.best_asset {
        Some(best) => println!("  best asset:     {} ({:+.1}% ROI)", best.name, best.roi * 100.0),
        None => println!("  best asset:     (nothing invested)"),
    }
    match summary.rank {
        Some(rank) => println!("  leaderboard:    #{rank}"),
        None => println!("  leaderboard:    not ranked"),
    }
    for lesson in &summary.lessons {
        println!("  lesson:         {}", lesson.text);
    }
    println!();
}

fn print_leaderboard(entries: &[LeaderboardEntry]) {
    println!("=== LEADERBOARD ===");
    if entries.is_empty() {
        println!("  (No games recorded yet)");
    }
    for (i, e) in entries.iter().enumerate() {
        println!(
            "  {:>2}. {:>5} | {} | {} | {} turns | {}",
            i + 1,
            e.final_money,
            if e.won { "won " } else { "lost" },
            e.goal_key,
            e.turns,
            e.date
        );
    }
}

fn parse_arg<T: FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str, default: &'a str) -> &'a str {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
        .unwrap_or(default)
}
