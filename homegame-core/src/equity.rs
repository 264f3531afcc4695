use core::fmt;

use rand::{rngs::SmallRng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    card::Card,
    cards::Cards,
    config::EquityConfig,
    deck::Deck,
    evaluator::HandRank,
    hand::Hand,
    result::Result,
};

/// Hero, five board cards and two cards for every opponent have to fit into
/// one deck.
pub const MAX_OPPONENTS: usize = (Card::COUNT - 2 - 5) / 2;

const MAX_PLAYERS: usize = MAX_OPPONENTS + 1;

/// Monte Carlo trials handed to one worker at a time.
const SHARD_TRIALS: u64 = 4096;

fn binomial(n: u128, k: u128) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let mut out = 1u128;
    for i in 0..k {
        out = out.checked_mul(n - i)? / (i + 1);
    }
    Some(out)
}

fn percent(part: f64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part / total as f64
    }
}

/// A validated equity question: the hero's hole cards, the known part of the
/// board and how many random opponents are dealt in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spot {
    hero: Hand,
    board: Cards,
    opponents: usize,
}

impl Spot {
    pub fn new(hero: Hand, board: Cards, opponents: usize) -> Result<Self> {
        if !matches!(board.count(), 0 | 3 | 4 | 5) {
            return Err(format!(
                "spot: expected 0, 3, 4 or 5 community cards, got {}",
                board.count()
            )
            .into());
        }
        if !board.is_disjoint(hero.to_cards()) {
            return Err("spot: hole cards and community cards overlap".into());
        }
        if opponents == 0 || opponents > MAX_OPPONENTS {
            return Err(format!(
                "spot: opponent count must be between 1 and {MAX_OPPONENTS}, got {opponents}"
            )
            .into());
        }
        Ok(Self {
            hero,
            board,
            opponents,
        })
    }

    pub fn from_cards(hero: &[Card], board: &[Card], opponents: usize) -> Result<Self> {
        Self::new(Hand::from_slice(hero)?, Cards::from_slice(board)?, opponents)
    }

    pub fn hero(self) -> Hand {
        self.hero
    }

    pub fn board(self) -> Cards {
        self.board
    }

    pub fn opponents(self) -> usize {
        self.opponents
    }

    pub fn known_cards(self) -> Cards {
        self.board | self.hero.to_cards()
    }

    pub fn remaining_board(self) -> usize {
        5 - usize::from(self.board.count())
    }

    /// Number of deals [`Equity::enumerate`] visits: every board completion
    /// times every unordered assignment of opponent hands. `None` if it does
    /// not fit into 128 bits.
    pub fn exact_deal_count(self) -> Option<u128> {
        let mut left = u128::from(52 - self.known_cards().count());
        let board = self.remaining_board() as u128;
        let mut count = binomial(left, board)?;
        left -= board;
        for dealt in 1..=self.opponents as u128 {
            count = count.checked_mul(binomial(left, 2)?)? / dealt;
            left -= 2;
        }
        Some(count)
    }
}

impl fmt::Display for Spot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on [{}] vs {}", self.hero, self.board, self.opponents)
    }
}

/// Strongest opponent rank seen so far and how many opponents hold exactly
/// the hero's rank.
#[derive(Clone, Copy)]
struct Field {
    hero: HandRank,
    best: HandRank,
    level_with_hero: usize,
}

impl Field {
    fn new(hero: HandRank) -> Self {
        Self {
            hero,
            best: HandRank::ZERO,
            level_with_hero: 0,
        }
    }

    fn with(mut self, rank: HandRank) -> Self {
        self.best = self.best.max(rank);
        self.level_with_hero += usize::from(rank == self.hero);
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Tally {
    wins: u64,
    losses: u64,
    /// `ties[k]` counts deals split between `k` players.
    ties: [u64; MAX_PLAYERS + 1],
}

impl Default for Tally {
    fn default() -> Self {
        Self {
            wins: 0,
            losses: 0,
            ties: [0; MAX_PLAYERS + 1],
        }
    }
}

impl Tally {
    fn showdown(&mut self, field: Field) {
        if field.hero > field.best {
            self.wins += 1;
        } else if field.hero == field.best {
            self.ties[field.level_with_hero + 1] += 1;
        } else {
            self.losses += 1;
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.wins += other.wins;
        self.losses += other.losses;
        for (a, b) in self.ties.iter_mut().zip(other.ties) {
            *a += b;
        }
        self
    }

    fn ties(&self) -> u64 {
        self.ties.iter().sum()
    }

    fn total(&self) -> u64 {
        self.wins + self.losses + self.ties()
    }

    /// A tie between `k` players is worth `1 / k` of a win.
    fn tie_share(&self) -> f64 {
        self.ties
            .iter()
            .enumerate()
            .skip(2)
            .map(|(players, count)| *count as f64 / players as f64)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Exact,
    Sampled,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Exact => write!(f, "exact"),
            Method::Sampled => write!(f, "sampled"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Equity {
    wins: u64,
    ties: u64,
    losses: u64,
    tie_share: f64,
    method: Method,
}

impl fmt::Display for Equity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "equity={:2.2} win={:2.2} tie={:2.2} ({} over {} deals)",
            self.equity_percent(),
            self.win_percent(),
            self.tie_percent(),
            self.method,
            self.deals(),
        )
    }
}

impl Equity {
    fn from_tally(tally: Tally, method: Method) -> Self {
        Self {
            wins: tally.wins,
            ties: tally.ties(),
            losses: tally.losses,
            tie_share: tally.tie_share(),
            method,
        }
    }

    /// Picks exact enumeration when the deal count stays within
    /// `config.exact_limit` and sampling otherwise.
    pub fn calculate(spot: Spot, config: &EquityConfig) -> Result<Self> {
        match spot.exact_deal_count() {
            Some(deals) if deals <= u128::from(config.exact_limit) => {
                log::debug!("equity: enumerating {deals} deals for {spot}");
                Ok(Self::enumerate(spot))
            }
            deals => {
                log::debug!(
                    "equity: {spot} needs {} deals, sampling {} instead",
                    deals.map_or_else(|| "too many".to_owned(), |d| d.to_string()),
                    config.trials,
                );
                Self::simulate(spot, config.trials, config.seed)
            }
        }
    }

    /// Visits every deal once. Callers should check
    /// [`Spot::exact_deal_count`] first, the work grows with it.
    pub fn enumerate(spot: Spot) -> Self {
        let remaining = !spot.known_cards();
        let mut completions = Vec::new();
        board_completions(
            remaining,
            spot.board,
            spot.remaining_board(),
            &mut completions,
        );

        let tally = completions
            .par_iter()
            .map(|board| {
                let board = *board;
                let hero = (board | spot.hero.to_cards()).hand_rank();
                let hands: Vec<(Cards, HandRank)> = Hand::all_from(remaining & !board)
                    .into_iter()
                    .map(|hand| {
                        let cards = hand.to_cards();
                        (cards, (board | cards).hand_rank())
                    })
                    .collect();
                let mut tally = Tally::default();
                deal_opponents(
                    &hands,
                    0,
                    Cards::EMPTY,
                    spot.opponents,
                    Field::new(hero),
                    &mut tally,
                );
                tally
            })
            .reduce(Tally::default, Tally::merge);

        Self::from_tally(tally, Method::Exact)
    }

    /// Deals `trials` random runouts. With a seed the result is reproducible,
    /// independent of how the work is spread over threads.
    pub fn simulate(spot: Spot, trials: u64, seed: Option<u64>) -> Result<Self> {
        if trials == 0 {
            return Err("simulate: trials must be positive".into());
        }

        let shards = trials.div_ceil(SHARD_TRIALS);
        let tally = (0..shards)
            .into_par_iter()
            .map(|shard| {
                let mut rng = match seed {
                    Some(seed) => SmallRng::seed_from_u64(
                        seed.wrapping_add(shard.wrapping_mul(0x9e37_79b9_7f4a_7c15)),
                    ),
                    None => SmallRng::from_entropy(),
                };
                let rounds = SHARD_TRIALS.min(trials - shard * SHARD_TRIALS);
                let mut deck = Deck::from_cards(spot.known_cards());
                let mut tally = Tally::default();
                for _ in 0..rounds {
                    deck.reset();
                    if let Some(field) = deal_random(spot, &mut deck, &mut rng) {
                        tally.showdown(field);
                    }
                }
                tally
            })
            .reduce(Tally::default, Tally::merge);

        if tally.total() == 0 {
            return Err("simulate: no complete deal".into());
        }
        Ok(Self::from_tally(tally, Method::Sampled))
    }

    pub fn method(self) -> Method {
        self.method
    }

    pub fn deals(self) -> u64 {
        self.wins + self.ties + self.losses
    }

    pub fn wins(self) -> u64 {
        self.wins
    }

    pub fn ties(self) -> u64 {
        self.ties
    }

    pub fn losses(self) -> u64 {
        self.losses
    }

    pub fn win_percent(self) -> f64 {
        percent(self.wins as f64, self.deals())
    }

    pub fn tie_percent(self) -> f64 {
        percent(self.ties as f64, self.deals())
    }

    pub fn loss_percent(self) -> f64 {
        percent(self.losses as f64, self.deals())
    }

    /// Wins plus each tie's share of the pot.
    pub fn equity_percent(self) -> f64 {
        percent(self.wins as f64 + self.tie_share, self.deals())
    }
}

fn board_completions(remaining: Cards, board: Cards, needed: usize, out: &mut Vec<Cards>) {
    if needed == 0 {
        out.push(board);
        return;
    }
    let mut candidates = remaining;
    while let Some(card) = candidates.first() {
        candidates.remove(card);
        board_completions(candidates, board.with(card), needed - 1, out);
    }
}

/// Hands are handed out in increasing index order, so every unordered set of
/// opponent hands is visited once.
fn deal_opponents(
    hands: &[(Cards, HandRank)],
    start: usize,
    used: Cards,
    remainder: usize,
    field: Field,
    tally: &mut Tally,
) {
    if remainder == 0 {
        tally.showdown(field);
        return;
    }
    for (index, (cards, rank)) in hands.iter().enumerate().skip(start) {
        if !used.is_disjoint(*cards) {
            continue;
        }
        deal_opponents(
            hands,
            index + 1,
            used | *cards,
            remainder - 1,
            field.with(*rank),
            tally,
        );
    }
}

fn deal_random(spot: Spot, deck: &mut Deck, rng: &mut SmallRng) -> Option<Field> {
    let mut board = spot.board;
    for _ in 0..spot.remaining_board() {
        board.add(deck.draw(rng)?);
    }
    let hero = (board | spot.hero.to_cards()).hand_rank();
    let mut field = Field::new(hero);
    for _ in 0..spot.opponents {
        let hand = deck.hand(rng)?;
        field = field.with((board | hand.to_cards()).hand_rank());
    }
    Some(field)
}
