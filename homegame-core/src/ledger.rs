use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::{
    result::Result,
    settlement::{self, cents_to_amount, to_cents, Player, Settlement},
};

pub const DEFAULT_SESSION_NAME: &str = "Poker Round";

fn unknown_player() -> String {
    "Unknown".to_owned()
}

fn add_cents(total: i64, cents: i64) -> Result<i64> {
    total
        .checked_add(cents)
        .ok_or_else(|| "ledger: totals are out of range".into())
}

/// One player's line in a saved session. Older clients send the amounts as
/// strings and under different keys, both are accepted.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPlayer {
    #[serde(default = "unknown_player")]
    pub name: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    pub rebuys: u32,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default, alias = "buy_in_total")]
    pub buy_in: f64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default, alias = "endChips")]
    pub end_chip: f64,
}

impl SessionPlayer {
    pub fn buy_in_cents(&self) -> Result<i64> {
        to_cents(&format!("ledger: buy_in of '{}'", self.name), self.buy_in)
    }

    pub fn end_chip_cents(&self) -> Result<i64> {
        to_cents(&format!("ledger: end_chip of '{}'", self.name), self.end_chip)
    }

    pub fn net_cents(&self) -> Result<i64> {
        Ok(self.end_chip_cents()? - self.buy_in_cents()?)
    }

    pub fn net(&self) -> Result<f64> {
        Ok(cents_to_amount(self.net_cents()?))
    }
}

/// Body of a save request: just the players, the rest is stamped on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveSession {
    #[serde(default)]
    pub players: Vec<SessionPlayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: u64,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub players: Vec<SessionPlayer>,
}

impl SessionRecord {
    pub fn new(id: u64, date: NaiveDateTime, save: SaveSession) -> Self {
        Self {
            id,
            date,
            name: DEFAULT_SESSION_NAME.to_owned(),
            players: save.players,
        }
    }

    /// Net of the first player with that name, `None` if nobody has it.
    pub fn net(&self, player: &str) -> Result<Option<f64>> {
        self.players
            .iter()
            .find(|p| p.name == player)
            .map(SessionPlayer::net)
            .transpose()
    }

    /// Largest net, the earlier player on ties.
    pub fn winner(&self) -> Result<Option<&SessionPlayer>> {
        let mut best: Option<(&SessionPlayer, i64)> = None;
        for player in &self.players {
            let net = player.net_cents()?;
            if best.map_or(true, |(_, best_net)| net > best_net) {
                best = Some((player, net));
            }
        }
        Ok(best.map(|(player, _)| player))
    }

    pub fn settle(&self) -> Result<Settlement> {
        let players: Vec<Player> = self
            .players
            .iter()
            .map(|p| Player::new(p.name.clone(), p.buy_in, p.end_chip))
            .collect();
        settlement::settle(&players)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub id: u64,
    pub date: NaiveDateTime,
    pub name: String,
    pub winner: String,
    pub player_count: usize,
}

/// Newest sessions first, at most `limit` of them.
pub fn history(records: &[SessionRecord], limit: usize) -> Result<Vec<SessionSummary>> {
    let mut sorted: Vec<&SessionRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    sorted
        .into_iter()
        .take(limit)
        .map(|record| -> Result<SessionSummary> {
            Ok(SessionSummary {
                id: record.id,
                date: record.date,
                name: record.name.clone(),
                winner: record
                    .winner()?
                    .map_or_else(|| "N/A".to_owned(), |p| p.name.clone()),
                player_count: record.players.len(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerDetail {
    pub name: String,
    pub rebuys: u32,
    pub buy_in: f64,
    pub end_chip: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionDetail {
    pub id: u64,
    pub date: NaiveDateTime,
    pub name: String,
    pub players: Vec<PlayerDetail>,
}

/// One session with every player's net, looked up by id.
pub fn session(records: &[SessionRecord], id: u64) -> Result<SessionDetail> {
    let record = records
        .iter()
        .find(|record| record.id == id)
        .ok_or_else(|| format!("ledger: session {id} not found"))?;
    let players = record
        .players
        .iter()
        .map(|player| -> Result<PlayerDetail> {
            Ok(PlayerDetail {
                name: player.name.clone(),
                rebuys: player.rebuys,
                buy_in: cents_to_amount(player.buy_in_cents()?),
                end_chip: cents_to_amount(player.end_chip_cents()?),
                net: player.net()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SessionDetail {
        id: record.id,
        date: record.date,
        name: record.name.clone(),
        players,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub name: String,
    pub total_games: u32,
    pub total_buyin: f64,
    pub total_cashout: f64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total_sessions: usize,
    pub player_stats: Vec<PlayerStats>,
}

#[derive(Default)]
struct Totals {
    games: u32,
    buy_in: i64,
    cash_out: i64,
}

impl Totals {
    fn net(&self) -> i64 {
        self.cash_out - self.buy_in
    }
}

/// Lifetime totals per player name, biggest winner first.
pub fn stats(records: &[SessionRecord]) -> Result<Stats> {
    let mut totals: HashMap<&str, Totals> = HashMap::new();
    for player in records.iter().flat_map(|record| &record.players) {
        let buy_in = player.buy_in_cents()?;
        let end_chip = player.end_chip_cents()?;
        let entry = totals.entry(player.name.as_str()).or_default();
        entry.games = entry.games.saturating_add(1);
        entry.buy_in = add_cents(entry.buy_in, buy_in)?;
        entry.cash_out = add_cents(entry.cash_out, end_chip)?;
    }

    let mut rows: Vec<(&str, Totals)> = totals.into_iter().collect();
    rows.sort_by(|(a_name, a), (b_name, b)| b.net().cmp(&a.net()).then(a_name.cmp(b_name)));

    Ok(Stats {
        total_sessions: records.len(),
        player_stats: rows
            .into_iter()
            .map(|(name, totals)| PlayerStats {
                name: name.to_owned(),
                total_games: totals.games,
                total_buyin: cents_to_amount(totals.buy_in),
                total_cashout: cents_to_amount(totals.cash_out),
                net_profit: cents_to_amount(totals.net()),
            })
            .collect(),
    })
}
