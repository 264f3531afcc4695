use std::{
    fs,
    io::{self, Read},
};

use homegame_core::{
    api::{self, ErrorResponse, OddsRequest, SettleRequest},
    cards::Cards,
    config::Config,
    equity::{Equity, Spot},
    hand::Hand,
    ledger::{self, SessionRecord},
    result::Result,
};
use serde::Serialize;

const INVALID_COMMAND_ERROR: &str = "Invalid command. Usage: homegame odds <hand> [board|-] [opponents] \
     | odds-json <file|-> | settle <file|-> | history <file|-> [limit] | session <file|-> <id> | stats <file|->";

fn main() {
    env_logger::init();

    let args: Vec<_> = std::env::args().collect();
    if let Err(err) = run(&args) {
        log::error!("{err}");
        let response = ErrorResponse::from_error(&err);
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(_) => println!("{}", response.message),
        }
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let config = Config::from_env()?;
    match args.get(1).map(|s| s.as_str()) {
        Some("odds") => odds(&args[2..], &config),
        Some("odds-json") => odds_json(&args[2..], &config),
        Some("settle") => settle(&args[2..]),
        Some("history") => history(&args[2..], &config),
        Some("session") => session(&args[2..]),
        Some("stats") => stats(&args[2..]),
        _ => Err(INVALID_COMMAND_ERROR.into()),
    }
}

/// Reads a file, or stdin for `-`.
fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut out = String::new();
        io::stdin().read_to_string(&mut out)?;
        Ok(out)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn odds(args: &[String], config: &Config) -> Result<()> {
    let (hand_raw, board_raw, opponents_raw) = match args {
        [hand] => (hand, "-", "1"),
        [hand, board] => (hand, board.as_str(), "1"),
        [hand, board, opponents] => (hand, board.as_str(), opponents.as_str()),
        _ => return Err(INVALID_COMMAND_ERROR.into()),
    };
    let hand: Hand = hand_raw.parse()?;
    let board: Cards = if board_raw == "-" {
        Cards::EMPTY
    } else {
        board_raw.parse()?
    };
    let opponents: usize = opponents_raw
        .parse()
        .map_err(|_| format!("odds: invalid opponent count '{opponents_raw}'"))?;

    let spot = Spot::new(hand, board, opponents)?;
    let equity = Equity::calculate(spot, &config.equity)?;
    println!("{spot}: {equity}");
    Ok(())
}

fn odds_json(args: &[String], config: &Config) -> Result<()> {
    let [path] = args else {
        return Err(INVALID_COMMAND_ERROR.into());
    };
    let request: OddsRequest = serde_json::from_str(&read_input(path)?)?;
    print_json(&api::odds(&request, &config.equity)?)
}

fn settle(args: &[String]) -> Result<()> {
    let [path] = args else {
        return Err(INVALID_COMMAND_ERROR.into());
    };
    let request: SettleRequest = serde_json::from_str(&read_input(path)?)?;
    print_json(&api::settle(&request)?)
}

fn read_sessions(path: &str) -> Result<Vec<SessionRecord>> {
    let sessions: Vec<SessionRecord> = serde_json::from_str(&read_input(path)?)?;
    log::debug!("loaded {} sessions from {path}", sessions.len());
    Ok(sessions)
}

fn history(args: &[String], config: &Config) -> Result<()> {
    let (path, limit) = match args {
        [path] => (path, config.history_limit),
        [path, limit_raw] => {
            let limit: usize = limit_raw
                .parse()
                .map_err(|_| format!("history: invalid limit '{limit_raw}'"))?;
            (path, limit)
        }
        _ => return Err(INVALID_COMMAND_ERROR.into()),
    };
    print_json(&ledger::history(&read_sessions(path)?, limit)?)
}

fn session(args: &[String]) -> Result<()> {
    let [path, id_raw] = args else {
        return Err(INVALID_COMMAND_ERROR.into());
    };
    let id: u64 = id_raw
        .parse()
        .map_err(|_| format!("session: invalid id '{id_raw}'"))?;
    print_json(&ledger::session(&read_sessions(path)?, id)?)
}

fn stats(args: &[String]) -> Result<()> {
    let [path] = args else {
        return Err(INVALID_COMMAND_ERROR.into());
    };
    print_json(&ledger::stats(&read_sessions(path)?)?)
}
