use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::result::Result;

/// Counter party for chips that appeared or vanished during the session.
pub const POT: &str = "Pot";

/// Anything above this many cents is rejected as a typo.
pub const MAX_CENTS: f64 = 1e15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub buy_in: f64,
    pub end_chip: f64,
}

impl Player {
    pub fn new(name: impl Into<String>, buy_in: f64, end_chip: f64) -> Self {
        Self {
            name: name.into(),
            buy_in,
            end_chip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub cents: i64,
    /// Set when the Pot is one side of the transfer.
    pub is_error: bool,
}

impl Transaction {
    pub fn amount(&self) -> f64 {
        cents_to_amount(self.cents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub transactions: Vec<Transaction>,
    /// End chips minus buy-ins over all players.
    pub discrepancy_cents: i64,
}

impl Settlement {
    pub fn discrepancy(&self) -> f64 {
        cents_to_amount(self.discrepancy_cents)
    }

    pub fn is_balanced(&self) -> bool {
        self.discrepancy_cents == 0
    }
}

pub fn cents_to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Validated conversion of a money amount to whole cents. `what` names the
/// amount in the error.
pub fn to_cents(what: &str, amount: f64) -> Result<i64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(format!("{what} must be a non-negative number, got {amount}").into());
    }
    let cents = (amount * 100.0).round();
    if cents > MAX_CENTS {
        return Err(format!("{what} is too large: {amount}").into());
    }
    Ok(cents as i64)
}

struct Party<'a> {
    name: &'a str,
    is_pot: bool,
    net: i64,
}

fn parties(players: &[Player]) -> Result<Vec<Party<'_>>> {
    if players.len() < 2 {
        return Err(format!("settle: need at least 2 players, got {}", players.len()).into());
    }

    let mut names = HashSet::with_capacity(players.len());
    let mut parties = Vec::with_capacity(players.len() + 1);
    for player in players {
        let name = player.name.as_str();
        if name.trim().is_empty() {
            return Err("settle: player name must not be empty".into());
        }
        if !names.insert(name) {
            return Err(format!("settle: duplicate player '{name}'").into());
        }
        let buy_in = to_cents(&format!("settle: buy_in of '{name}'"), player.buy_in)?;
        let end_chip = to_cents(&format!("settle: end_chip of '{name}'"), player.end_chip)?;
        parties.push(Party {
            name,
            is_pot: false,
            net: end_chip - buy_in,
        });
    }
    Ok(parties)
}

/// Index of the largest open balance, the earliest party on ties.
fn largest(open: &[(usize, i64)]) -> Option<usize> {
    open.iter()
        .enumerate()
        .filter(|(_, (_, cents))| *cents > 0)
        .max_by(|(_, (a_party, a)), (_, (b_party, b))| a.cmp(b).then(b_party.cmp(a_party)))
        .map(|(slot, _)| slot)
}

/// Greedy settlement: the largest debtor pays the largest creditor until every
/// balance is zero. Not always the fewest transfers possible.
pub fn settle(players: &[Player]) -> Result<Settlement> {
    let mut parties = parties(players)?;

    let discrepancy_cents: i64 = parties.iter().map(|party| party.net).sum();
    if discrepancy_cents != 0 {
        log::warn!(
            "settle: chips do not add up, off by {:.2}",
            cents_to_amount(discrepancy_cents)
        );
        parties.push(Party {
            name: POT,
            is_pot: true,
            net: -discrepancy_cents,
        });
    }

    let mut debtors: Vec<(usize, i64)> = Vec::new();
    let mut creditors: Vec<(usize, i64)> = Vec::new();
    for (index, party) in parties.iter().enumerate() {
        if party.net < 0 {
            debtors.push((index, -party.net));
        } else if party.net > 0 {
            creditors.push((index, party.net));
        }
    }

    let mut transactions = Vec::new();
    while let (Some(d), Some(c)) = (largest(&debtors), largest(&creditors)) {
        let cents = debtors[d].1.min(creditors[c].1);
        debtors[d].1 -= cents;
        creditors[c].1 -= cents;

        let from = &parties[debtors[d].0];
        let to = &parties[creditors[c].0];
        log::debug!("settle: {} pays {} {:.2}", from.name, to.name, cents_to_amount(cents));
        transactions.push(Transaction {
            from: from.name.to_owned(),
            to: to.name.to_owned(),
            cents,
            is_error: from.is_pot || to.is_pot,
        });
    }

    Ok(Settlement {
        transactions,
        discrepancy_cents,
    })
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, fs, path::Path};

    use serde::Deserialize;

    use super::*;

    fn transfer(from: &str, to: &str, cents: i64, is_error: bool) -> Transaction {
        Transaction {
            from: from.to_owned(),
            to: to.to_owned(),
            cents,
            is_error,
        }
    }

    #[test]
    fn heads_up_settles_with_one_transfer() {
        let settlement = settle(&[
            Player::new("A", 100.0, 150.0),
            Player::new("B", 100.0, 50.0),
        ])
        .unwrap();
        assert!(settlement.is_balanced());
        assert_eq!(settlement.transactions, vec![transfer("B", "A", 5000, false)]);
        assert_eq!(settlement.transactions[0].amount(), 50.0);
    }

    #[test]
    fn missing_chips_are_paid_into_the_pot() {
        let settlement = settle(&[
            Player::new("A", 100.0, 150.0),
            Player::new("B", 100.0, 50.0),
            Player::new("C", 100.0, 90.0),
        ])
        .unwrap();
        assert_eq!(settlement.discrepancy(), -10.0);
        assert_eq!(
            settlement.transactions,
            vec![
                transfer("B", "A", 5000, false),
                transfer("C", POT, 1000, true),
            ]
        );
    }

    #[test]
    fn extra_chips_are_paid_out_of_the_pot() {
        let settlement = settle(&[
            Player::new("A", 100.0, 130.0),
            Player::new("B", 100.0, 100.0),
            Player::new("C", 100.0, 80.0),
        ])
        .unwrap();
        assert_eq!(settlement.discrepancy_cents, 1000);
        assert_eq!(
            settlement.transactions,
            vec![
                transfer("C", "A", 2000, false),
                transfer(POT, "A", 1000, true),
            ]
        );
    }

    #[test]
    fn break_even_players_do_not_appear() {
        let settlement = settle(&[
            Player::new("A", 20.0, 20.0),
            Player::new("B", 20.0, 20.0),
        ])
        .unwrap();
        assert!(settlement.transactions.is_empty());
    }

    #[test]
    fn equal_balances_follow_input_order() {
        let settlement = settle(&[
            Player::new("A", 0.0, 10.0),
            Player::new("B", 0.0, 10.0),
            Player::new("C", 10.0, 0.0),
            Player::new("D", 10.0, 0.0),
        ])
        .unwrap();
        assert_eq!(
            settlement.transactions,
            vec![
                transfer("C", "A", 1000, false),
                transfer("D", "B", 1000, false),
            ]
        );
    }

    #[test]
    fn amounts_are_rounded_to_cents() {
        let settlement = settle(&[
            Player::new("A", 0.1, 0.3),
            Player::new("B", 0.2, 0.0),
        ])
        .unwrap();
        assert!(settlement.is_balanced());
        assert_eq!(settlement.transactions, vec![transfer("B", "A", 20, false)]);
    }

    #[test]
    fn invalid_players_are_rejected() {
        let ok = Player::new("A", 10.0, 0.0);
        let cases = [
            vec![ok.clone()],
            vec![ok.clone(), Player::new("A", 0.0, 10.0)],
            vec![ok.clone(), Player::new(" ", 0.0, 10.0)],
            vec![ok.clone(), Player::new("B", -1.0, 10.0)],
            vec![ok.clone(), Player::new("B", 0.0, f64::NAN)],
            vec![ok.clone(), Player::new("B", f64::INFINITY, 0.0)],
            vec![ok.clone(), Player::new("B", 0.0, 1e300)],
        ];
        for players in cases {
            let err = settle(&players).unwrap_err();
            assert!(err.is_invalid_input(), "{players:?}: {err}");
        }
    }

    #[test]
    fn one_cent_off_still_books_the_pot() {
        let settlement = settle(&[
            Player::new("A", 10.0, 20.0),
            Player::new("B", 10.0, 0.01),
        ])
        .unwrap();
        assert_eq!(settlement.discrepancy_cents, 1);
        assert_eq!(
            settlement.transactions,
            vec![
                transfer("B", "A", 999, false),
                transfer(POT, "A", 1, true),
            ]
        );
    }

    #[test]
    fn to_cents_names_the_amount() {
        assert_eq!(to_cents("tip", 12.34).unwrap(), 1234);
        let err = to_cents("tip", f64::NAN).unwrap_err();
        assert!(err.to_string().contains("tip must be a non-negative number"));
        assert!(to_cents("tip", 1e300).unwrap_err().to_string().contains("too large"));
    }

    #[derive(Deserialize)]
    struct SettlementCase {
        name: String,
        players: Vec<Player>,
        discrepancy: f64,
        transactions: usize,
    }

    #[test]
    fn settles_recorded_sessions() {
        let path = Path::new("src")
            .join("test_data")
            .join("settlement_cases.json");
        let content = fs::read_to_string(path).unwrap();
        let cases: Vec<SettlementCase> = serde_json::from_str(&content).unwrap();
        assert!(!cases.is_empty());

        for case in cases {
            let settlement = settle(&case.players).unwrap();
            assert_eq!(settlement.discrepancy(), case.discrepancy, "{}", case.name);
            assert_eq!(settlement.transactions.len(), case.transactions, "{}", case.name);
            assert_eq!(settle(&case.players).unwrap(), settlement, "{}", case.name);

            let mut flow: HashMap<&str, i64> = HashMap::new();
            for transaction in &settlement.transactions {
                assert!(transaction.cents > 0, "{}", case.name);
                *flow.entry(transaction.from.as_str()).or_default() -= transaction.cents;
                *flow.entry(transaction.to.as_str()).or_default() += transaction.cents;
            }
            for player in &case.players {
                let net = to_cents("end_chip", player.end_chip).unwrap()
                    - to_cents("buy_in", player.buy_in).unwrap();
                let received = flow.get(player.name.as_str()).copied().unwrap_or(0);
                assert_eq!(received, net, "{}: {}", case.name, player.name);
            }
        }
    }
}
