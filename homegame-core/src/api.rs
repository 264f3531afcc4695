//! Request and response documents exchanged with clients.

use serde::{Deserialize, Serialize};

use crate::{
    card::Card,
    config::EquityConfig,
    equity::{Equity, Method, Spot, MAX_OPPONENTS},
    result::{Error, Result},
    settlement::{self, Player, Settlement},
};

fn one_opponent() -> i64 {
    1
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Cards and the opponent count are kept raw so that bad values are reported
/// as input errors with their detail, not as malformed documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddsRequest {
    pub player_hand: Vec<String>,
    #[serde(default)]
    pub community_cards: Vec<String>,
    #[serde(default = "one_opponent")]
    pub opponent_count: i64,
}

fn parse_cards(raw: &[String]) -> Result<Vec<Card>> {
    raw.iter()
        .map(|card| -> Result<Card> {
            card.parse::<Card>()
                .map_err(|_| format!("odds: invalid card '{card}'").into())
        })
        .collect()
}

impl OddsRequest {
    pub fn to_spot(&self) -> Result<Spot> {
        let opponents = usize::try_from(self.opponent_count)
            .ok()
            .filter(|count| (1..=MAX_OPPONENTS).contains(count))
            .ok_or_else(|| {
                format!(
                    "odds: opponent count must be between 1 and {MAX_OPPONENTS}, got {}",
                    self.opponent_count
                )
            })?;
        Spot::from_cards(
            &parse_cards(&self.player_hand)?,
            &parse_cards(&self.community_cards)?,
            opponents,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OddsResponse {
    pub win_rate: f64,
    pub tie_rate: f64,
    pub equity: f64,
    pub method: Method,
    pub trials: u64,
}

impl From<Equity> for OddsResponse {
    fn from(equity: Equity) -> Self {
        Self {
            win_rate: round_to(equity.win_percent(), 1),
            tie_rate: round_to(equity.tie_percent(), 1),
            equity: round_to(equity.equity_percent(), 1),
            method: equity.method(),
            trials: equity.deals(),
        }
    }
}

pub fn odds(request: &OddsRequest, config: &EquityConfig) -> Result<OddsResponse> {
    Ok(Equity::calculate(request.to_spot()?, config)?.into())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettleRequest {
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDto {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettleResponse {
    pub transactions: Vec<TransactionDto>,
    pub discrepancy: f64,
}

impl From<Settlement> for SettleResponse {
    fn from(settlement: Settlement) -> Self {
        let discrepancy = settlement.discrepancy();
        Self {
            transactions: settlement
                .transactions
                .into_iter()
                .map(|t| TransactionDto {
                    amount: t.amount(),
                    from: t.from,
                    to: t.to,
                    is_error: t.is_error,
                })
                .collect(),
            discrepancy,
        }
    }
}

pub fn settle(request: &SettleRequest) -> Result<SettleResponse> {
    Ok(settlement::settle(&request.players)?.into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    /// Only input problems are echoed back, anything else stays generic.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::InvalidInput(detail) => Self {
                error: detail.clone(),
                message: "The request could not be processed, please check the input."
                    .to_owned(),
            },
            Error::Json(_) => Self {
                error: "malformed document".to_owned(),
                message: "The request is not a valid JSON document.".to_owned(),
            },
            Error::Io(_) => Self {
                error: "internal error".to_owned(),
                message: "Something went wrong, please try again.".to_owned(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odds_request_defaults_to_one_opponent() {
        let request: OddsRequest =
            serde_json::from_str(r#"{"player_hand": ["Ah", "Kh"], "community_cards": []}"#)
                .unwrap();
        assert_eq!(request.opponent_count, 1);
        assert!(serde_json::from_str::<OddsRequest>(r#"{"player_hand": "AhKh"}"#).is_err());
    }

    #[test]
    fn odds_are_rounded_to_one_decimal() {
        let request = OddsRequest {
            player_hand: vec!["Ah".to_owned(), "Kh".to_owned()],
            community_cards: ["Qh", "Jh", "2c", "3d"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            opponent_count: 1,
        };
        let response = odds(&request, &EquityConfig::default()).unwrap();
        assert_eq!(response.method, Method::Exact);
        assert_eq!(response.trials, 45_540);
        assert_eq!(response.win_rate, 62.8);
        assert_eq!(response.tie_rate, 0.7);
        assert_eq!(response.equity, 63.1);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["method"], "exact");
    }

    #[test]
    fn odds_reject_bad_requests() {
        let request: OddsRequest =
            serde_json::from_str(r#"{"player_hand": ["Ah"], "opponent_count": 2}"#).unwrap();
        let err = odds(&request, &EquityConfig::default()).unwrap_err();
        assert!(err.is_invalid_input());

        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.error, "hand: expected 2 cards, got 1");
    }

    #[test]
    fn bad_cards_and_counts_are_input_errors() {
        let cases = [
            (
                r#"{"player_hand": ["Xh", "Kh"], "community_cards": []}"#,
                "odds: invalid card 'Xh'",
            ),
            (
                r#"{"player_hand": ["Ah", "Kh"], "community_cards": ["Qh", "J"]}"#,
                "odds: invalid card 'J'",
            ),
            (
                r#"{"player_hand": ["Ah", "Kh"], "opponent_count": -1}"#,
                "odds: opponent count must be between 1 and 22, got -1",
            ),
            (
                r#"{"player_hand": ["Ah", "Kh"], "opponent_count": 23}"#,
                "odds: opponent count must be between 1 and 22, got 23",
            ),
        ];
        for (raw, detail) in cases {
            let request: OddsRequest = serde_json::from_str(raw).unwrap();
            let err = odds(&request, &EquityConfig::default()).unwrap_err();
            assert!(err.is_invalid_input(), "{raw}: {err}");
            assert_eq!(ErrorResponse::from_error(&err).error, detail);
        }
    }

    #[test]
    fn settle_reports_amounts_in_currency() {
        let request: SettleRequest = serde_json::from_str(
            r#"{"players": [
                {"name": "A", "buy_in": 100, "end_chip": 150},
                {"name": "B", "buy_in": 100, "end_chip": 50},
                {"name": "C", "buy_in": 100, "end_chip": 90}
            ]}"#,
        )
        .unwrap();
        let response = settle(&request).unwrap();
        assert_eq!(response.discrepancy, -10.0);
        assert_eq!(
            response.transactions,
            vec![
                TransactionDto {
                    from: "B".to_owned(),
                    to: "A".to_owned(),
                    amount: 50.0,
                    is_error: false,
                },
                TransactionDto {
                    from: "C".to_owned(),
                    to: settlement::POT.to_owned(),
                    amount: 10.0,
                    is_error: true,
                },
            ]
        );
    }

    #[test]
    fn internal_errors_stay_generic() {
        let err: Error = std::io::Error::other("disk on fire").into();
        let response = ErrorResponse::from_error(&err);
        assert!(!response.error.contains("disk"));
        assert!(!response.message.contains("disk"));
    }
}
