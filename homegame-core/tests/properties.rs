use std::collections::HashMap;

use homegame_core::{
    card::Card,
    cards::Cards,
    equity::{Equity, Spot},
    evaluator::{best_five, evaluate},
    settlement::{settle, Player},
};
use proptest::prelude::*;

fn distinct_cards(min: usize, max: usize) -> impl Strategy<Value = Vec<Card>> {
    let deck: Vec<Card> = Card::all().collect();
    (min..=max).prop_flat_map(move |n| prop::sample::subsequence(deck.clone(), n).prop_shuffle())
}

fn players() -> impl Strategy<Value = Vec<Player>> {
    prop::collection::vec((0u32..50_000, 0u32..50_000), 2..9).prop_map(|amounts| {
        amounts
            .into_iter()
            .enumerate()
            .map(|(i, (buy_in, end_chip))| {
                Player::new(
                    format!("player {i}"),
                    f64::from(buy_in) / 100.0,
                    f64::from(end_chip) / 100.0,
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn evaluation_ignores_card_order(cards in distinct_cards(5, 7)) {
        let mut reversed = cards.clone();
        reversed.reverse();
        prop_assert_eq!(evaluate(&cards).unwrap(), evaluate(&reversed).unwrap());
    }

    #[test]
    fn best_five_agrees_with_evaluate(cards in distinct_cards(5, 7)) {
        let rank = evaluate(&cards).unwrap();
        let (best, five) = best_five(&cards).unwrap();
        prop_assert_eq!(rank, best);
        prop_assert_eq!(evaluate(&five).unwrap(), rank);
        prop_assert_eq!(rank.kickers().len(), rank.category().kicker_count());

        prop_assert!(five.iter().all(|c| cards.contains(c)));
        prop_assert_eq!(Cards::from_slice(&five).unwrap().count(), 5);
    }

    #[test]
    fn settlement_zeroes_every_balance(players in players()) {
        let settlement = settle(&players).unwrap();
        let mut received: HashMap<&str, i64> = HashMap::new();
        for transaction in &settlement.transactions {
            prop_assert!(transaction.cents > 0);
            prop_assert_eq!(
                transaction.is_error,
                transaction.from == "Pot" || transaction.to == "Pot"
            );
            *received.entry(transaction.from.as_str()).or_default() -= transaction.cents;
            *received.entry(transaction.to.as_str()).or_default() += transaction.cents;
        }
        for player in &players {
            let net = (player.end_chip * 100.0).round() as i64 - (player.buy_in * 100.0).round() as i64;
            prop_assert_eq!(received.get(player.name.as_str()).copied().unwrap_or(0), net);
        }
        prop_assert_eq!(
            received.get("Pot").copied().unwrap_or(0),
            -settlement.discrepancy_cents
        );
        prop_assert_eq!(settle(&players).unwrap(), settlement);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn river_outcomes_add_up(cards in distinct_cards(7, 7), opponents in 1usize..=2) {
        let spot = Spot::from_cards(&cards[..2], &cards[2..], opponents).unwrap();
        let equity = Equity::enumerate(spot);
        prop_assert_eq!(u128::from(equity.deals()), spot.exact_deal_count().unwrap());
        let total = equity.win_percent() + equity.tie_percent() + equity.loss_percent();
        prop_assert!((total - 100.0).abs() < 1e-9);
        prop_assert!(equity.equity_percent() >= equity.win_percent());
        prop_assert!(equity.equity_percent() <= equity.win_percent() + equity.tie_percent() + 1e-9);
    }
}
