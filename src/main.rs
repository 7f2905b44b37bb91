// Pokedraft entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config (copying defaults on first run)
// 3. Load the draft pool and season schedule
// 4. Open database (seeds the order row on first run)
// 5. Run the interactive command loop

use pokedraft::autopick::{AutoPicker, CoachPrefs, WishlistStore};
use pokedraft::config;
use pokedraft::db::Database;
use pokedraft::draft::engine::{DraftEngine, LeagueRules, PickStore};
use pokedraft::pool::Pool;
use pokedraft::queue::{normalize_queue, SkipPolicy};
use pokedraft::schedule::Schedule;
use pokedraft::standings::{compute_standings, MatchResult};

use anyhow::Context;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("pokedraft starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} coaches, {} point budget",
        config.league.name,
        config.league.coaches.len(),
        config.league.budget
    );

    let pool = Pool::from_csv_path(&config.data_paths.pool)
        .with_context(|| format!("failed to load pool from {}", config.data_paths.pool))?;
    info!("Loaded {} pool entries", pool.len());

    let schedule = match Schedule::from_csv_path(&config.data_paths.schedule) {
        Ok(s) => s,
        Err(e) => {
            warn!("schedule unavailable ({e}); result reporting disabled");
            Schedule::default()
        }
    };

    let db = Database::open(&config.db_path, &config.league.coaches)
        .context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    let rules = LeagueRules {
        coaches: config.league.coaches.clone(),
        budget_cap: config.league.budget,
        team_size: config.league.team_size,
    };
    let engine = DraftEngine::new(&db, &pool, &rules);
    let mut auto = AutoPicker::new();

    println!("{} - type 'help' for commands", config.league.name);
    print_status(&engine, &db);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((&cmd, rest)) = args.split_first() else {
            continue;
        };

        match cmd {
            "help" => print_help(),
            "status" => print_status(&engine, &db),
            "shuffle" => match engine.reshuffle() {
                Ok(state) => println!("order: {}", state.base_order.join(", ")),
                Err(e) => println!("error: {e}"),
            },
            "lock" => match engine.lock() {
                Ok(state) => {
                    println!("draft locked; order: {}", state.base_order.join(", "));
                    run_auto(&mut auto, &engine, &db);
                    print_status(&engine, &db);
                }
                Err(e) => println!("error: {e}"),
            },
            "pick" => {
                let Some(dex) = rest.first().and_then(|s| s.parse::<u32>().ok()) else {
                    println!("usage: pick <dex>");
                    continue;
                };
                let Some(coach) = engine.turn()?.on_the_clock else {
                    println!("error: draft complete");
                    continue;
                };
                match engine.submit_pick(&coach, dex) {
                    Ok(pick) => {
                        let name = pool.get(dex).map(|i| i.name.as_str()).unwrap_or("?");
                        println!("pick #{}: {} -> {} ({} pts)", pick.pick_no, coach, name, pick.points);
                        run_auto(&mut auto, &engine, &db);
                        print_status(&engine, &db);
                    }
                    Err(e) => println!("error: {e}"),
                }
            }
            "top" => {
                let n = rest.first().and_then(|s| s.parse().ok()).unwrap_or(10);
                let drafted = engine.drafted()?;
                for item in pool.top_available(&drafted, n) {
                    println!(
                        "#{:>4} {:<14} {:<16} {:>3} pts  {:>3} bst  [{}]",
                        item.dex, item.name, item.types, item.points, item.bst, item.tier
                    );
                }
            }
            "team" => {
                let Some(coach) = rest.first() else {
                    println!("usage: team <coach>");
                    continue;
                };
                let roster = engine.roster(coach)?;
                if roster.is_empty() {
                    println!("{coach}: no picks yet");
                } else {
                    for (pick, item) in &roster {
                        let name = item.as_ref().map(|i| i.name.as_str()).unwrap_or("?");
                        println!("#{:>2} dex {:>4} {:<14} {} pts", pick.pick_no, pick.dex, name, pick.points);
                    }
                }
                let budgets = engine.budgets()?;
                println!(
                    "spent {} / remaining {}",
                    budgets.spent_for(coach),
                    budgets.remaining_for(coach)
                );
            }
            "queue" => {
                let Some(coach) = rest.first() else {
                    println!("usage: queue <coach> [dex ...]");
                    continue;
                };
                if rest.len() > 1 {
                    let queue = normalize_queue(&rest[1..]);
                    db.set_wishlist(coach, &queue)?;
                    println!("{coach}'s queue: {queue:?}");
                } else {
                    println!("{coach}'s queue: {:?}", normalize_queue(&db.wishlist(coach)?));
                }
            }
            "auto" => {
                let (Some(coach), Some(&setting)) = (rest.first(), rest.get(1)) else {
                    println!("usage: auto <coach> on|off [skip|stop]");
                    continue;
                };
                let policy = match rest.get(2).copied() {
                    Some("stop") => SkipPolicy::StopOnInvalid,
                    _ => SkipPolicy::SkipInvalid,
                };
                let prefs = CoachPrefs {
                    auto_pick: setting == "on",
                    policy,
                };
                db.set_preferences(coach, &prefs)?;
                println!("{coach}: auto_pick={} policy={policy:?}", prefs.auto_pick);
                if prefs.auto_pick {
                    run_auto(&mut auto, &engine, &db);
                    print_status(&engine, &db);
                }
            }
            "undo" => match engine.undo_last()? {
                Some(pick) => {
                    println!("undid pick #{} ({} -> dex {})", pick.pick_no, pick.coach, pick.dex);
                    print_status(&engine, &db);
                }
                None => println!("nothing to undo"),
            },
            "reset" => {
                engine.reset()?;
                println!("draft reset; order unlocked");
            }
            "result" => {
                let (Some(&key), Some(w1), Some(w2)) = (
                    rest.first(),
                    rest.get(1).and_then(|s| s.parse::<u8>().ok()),
                    rest.get(2).and_then(|s| s.parse::<u8>().ok()),
                ) else {
                    println!("usage: result <match_key> <wins1> <wins2>");
                    continue;
                };
                let Some(m) = schedule.by_key(key) else {
                    println!("error: no scheduled match with key {key}");
                    continue;
                };
                match MatchResult::new(key, &m.coach1, &m.coach2, w1, w2) {
                    Ok(result) => {
                        db.upsert_result(&result)?;
                        println!("recorded {key}: {} {w1} - {w2} {}", m.coach1, m.coach2);
                    }
                    Err(e) => println!("error: {e}"),
                }
            }
            "standings" => {
                let results = db.list_results()?;
                for row in compute_standings(&rules.coaches, &results) {
                    println!(
                        "{:>2}. {:<12} {} pts  diff {:+}",
                        row.seed, row.coach, row.points, row.diff
                    );
                }
            }
            "quit" | "exit" => break,
            other => println!("unknown command: {other} (try 'help')"),
        }
    }

    info!("pokedraft shut down cleanly");
    Ok(())
}

fn run_auto(auto: &mut AutoPicker, engine: &DraftEngine<'_, Database>, db: &Database) {
    match auto.run(engine, db) {
        Ok(picks) => {
            for pick in picks {
                println!(
                    "auto pick #{}: {} -> dex {} ({} pts)",
                    pick.pick_no, pick.coach, pick.dex, pick.points
                );
            }
        }
        Err(e) => println!("auto-pick error: {e}"),
    }
}

fn print_status(engine: &DraftEngine<'_, Database>, db: &Database) {
    if !db.order_state().map(|s| s.locked).unwrap_or(false) {
        println!("draft not started (shuffle, then lock)");
        return;
    }
    match engine.turn() {
        Ok(turn) if turn.done => println!("draft complete ({} picks)", turn.total_picks),
        Ok(turn) => {
            if let Some(coach) = turn.on_the_clock {
                println!(
                    "pick {}/{}: {} on the clock",
                    turn.pick_index + 1,
                    turn.total_picks,
                    coach
                );
            }
        }
        Err(e) => println!("error: {e}"),
    }
}

fn print_help() {
    println!(
        "commands:
  status                       show whose turn it is
  shuffle                      randomize the draft order (before lock)
  lock                         lock the order and start the draft
  pick <dex>                   submit a pick for the coach on the clock
  top [n]                      best available by points
  team <coach>                 show a coach's roster and budget
  queue <coach> [dex ...]      show or set a coach's wishlist
  auto <coach> on|off [skip|stop]  toggle auto-pick
  undo                         remove the most recent pick
  reset                        wipe all picks and unlock the order
  result <match_key> <w1> <w2> record a series result
  standings                    show the current table
  quit"
    );
}

/// Initialize tracing to log to a file (keeps the terminal free for the
/// command loop).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("pokedraft.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pokedraft=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
