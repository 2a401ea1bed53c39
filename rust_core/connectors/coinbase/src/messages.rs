//! Feed frames as a closed set of variants, and their application to state.

use connectors_common::numeric::{levels_from_wire, parse_decimal};
use connectors_common::BOOK_DEPTH;
use log::{debug, warn};
use market_state::MarketState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct Subscribe {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub product_ids: Vec<String>,
    pub channels: Vec<&'static str>,
}

impl Subscribe {
    pub fn ticker_and_level2(product_id: &str) -> Self {
        Subscribe {
            kind: "subscribe",
            product_ids: vec![product_id.to_string()],
            channels: vec!["ticker", "level2"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum FeedMessage {
    #[serde(rename = "ticker")]
    Ticker {
        product_id: String,
        #[serde(default)]
        price: Option<Value>,
    },
    /// A side that is missing or `null` leaves the stored side untouched.
    #[serde(rename = "snapshot")]
    Snapshot {
        product_id: String,
        #[serde(default)]
        bids: Option<Vec<Value>>,
        #[serde(default)]
        asks: Option<Vec<Value>>,
    },
    #[serde(rename = "l2update")]
    L2Update { product_id: String },
    #[serde(rename = "subscriptions")]
    Subscriptions,
    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        message: String,
        #[serde(default)]
        reason: String,
    },
    #[serde(other)]
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    PriceRecorded,
    BookReplaced,
    Ignored,
}

pub fn apply(state: &MarketState, product_id: &str, msg: FeedMessage) -> Dispatch {
    match msg {
        FeedMessage::Ticker { product_id: pid, price } if pid == product_id => {
            let parsed = price
                .as_ref()
                .and_then(|v| v.as_str())
                .and_then(|s| parse_decimal(s).ok());
            match parsed {
                Some(p) => {
                    state.prices.record(p);
                    debug!("updated {} price: {:.2}", product_id, p);
                    Dispatch::PriceRecorded
                }
                None => Dispatch::Ignored,
            }
        }
        FeedMessage::Snapshot { product_id: pid, bids, asks } if pid == product_id => {
            state.book.replace_sides(
                bids.map(|b| levels_from_wire(&b, BOOK_DEPTH)),
                asks.map(|a| levels_from_wire(&a, BOOK_DEPTH)),
            );
            Dispatch::BookReplaced
        }
        // the book is resynchronized from snapshots, deltas are not applied
        FeedMessage::L2Update { .. } => Dispatch::Ignored,
        FeedMessage::Error { message, reason } => {
            warn!("coinbase feed error frame: {} {}", message, reason);
            Dispatch::Ignored
        }
        _ => Dispatch::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(v: Value) -> FeedMessage {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn subscribe_wire_shape() {
        let v = serde_json::to_value(Subscribe::ticker_and_level2("BTC-USD")).unwrap();
        assert_eq!(
            v,
            json!({"type": "subscribe", "product_ids": ["BTC-USD"], "channels": ["ticker", "level2"]})
        );
    }

    #[test]
    fn decodes_known_and_unknown_types() {
        let t = decode(json!({"type": "ticker", "product_id": "BTC-USD", "price": "1.5", "sequence": 7}));
        assert!(matches!(t, FeedMessage::Ticker { .. }));
        assert_eq!(decode(json!({"type": "heartbeat", "product_id": "BTC-USD"})), FeedMessage::Ignored);
        assert_eq!(
            decode(json!({"type": "l2update", "product_id": "BTC-USD", "changes": [["buy", "1", "2"]]})),
            FeedMessage::L2Update { product_id: "BTC-USD".to_string() }
        );
        assert!(serde_json::from_value::<FeedMessage>(json!({"product_id": "BTC-USD"})).is_err());
    }

    #[test]
    fn ticker_records_price() {
        let state = MarketState::new();
        let msg = decode(json!({"type": "ticker", "product_id": "BTC-USD", "price": "50123.45"}));
        assert_eq!(apply(&state, "BTC-USD", msg), Dispatch::PriceRecorded);
        assert_eq!(state.prices.latest(), 50123.45);
    }

    #[test]
    fn ticker_for_other_product_or_bad_price_is_dropped() {
        let state = MarketState::new();
        let other = decode(json!({"type": "ticker", "product_id": "ETH-USD", "price": "3000"}));
        assert_eq!(apply(&state, "BTC-USD", other), Dispatch::Ignored);
        let bad = decode(json!({"type": "ticker", "product_id": "BTC-USD", "price": "n/a"}));
        assert_eq!(apply(&state, "BTC-USD", bad), Dispatch::Ignored);
        let missing = decode(json!({"type": "ticker", "product_id": "BTC-USD"}));
        assert_eq!(apply(&state, "BTC-USD", missing), Dispatch::Ignored);
        assert!(state.prices.is_empty());
    }

    #[test]
    fn snapshot_replaces_top_ten() {
        let state = MarketState::new();
        let bids: Vec<Value> = (0..15).map(|i| json!([format!("{}", 100 - i), "1.0"])).collect();
        let msg = decode(json!({
            "type": "snapshot",
            "product_id": "BTC-USD",
            "bids": bids,
            "asks": [["101", "2"], [102.5, 3]],
        }));
        assert_eq!(apply(&state, "BTC-USD", msg), Dispatch::BookReplaced);
        let book = state.book.read();
        assert_eq!(book.bids.len(), BOOK_DEPTH);
        assert_eq!(book.bids[0].price, "100");
        assert_eq!(book.bids[9].price, "91");
        assert_eq!(book.asks[1].price, "102.5");
        assert_eq!(book.asks[1].size, "3");
    }

    #[test]
    fn snapshot_with_missing_or_null_side_keeps_it() {
        let state = MarketState::new();
        let full = decode(json!({
            "type": "snapshot", "product_id": "BTC-USD",
            "bids": [["100", "1"]], "asks": [["101", "1"]],
        }));
        apply(&state, "BTC-USD", full);

        let no_asks = decode(json!({"type": "snapshot", "product_id": "BTC-USD", "bids": [["99", "2"]]}));
        assert_eq!(apply(&state, "BTC-USD", no_asks), Dispatch::BookReplaced);
        let book = state.book.read();
        assert_eq!(book.bids[0].price, "99");
        assert_eq!(book.asks[0].price, "101");

        let null_bids = decode(json!({
            "type": "snapshot", "product_id": "BTC-USD", "bids": null, "asks": [["102", "1"]],
        }));
        assert_eq!(apply(&state, "BTC-USD", null_bids), Dispatch::BookReplaced);
        let book = state.book.read();
        assert_eq!(book.bids[0].price, "99");
        assert_eq!(book.asks[0].price, "102");

        let empty_asks = decode(json!({"type": "snapshot", "product_id": "BTC-USD", "asks": []}));
        apply(&state, "BTC-USD", empty_asks);
        assert!(state.book.read().asks.is_empty());
    }

    #[test]
    fn l2update_leaves_book_untouched() {
        let state = MarketState::new();
        state.book.replace(
            vec![connectors_common::types::OrderBookLevel::new("1", "1")],
            Vec::new(),
        );
        let before = state.book.read();
        let msg = decode(json!({"type": "l2update", "product_id": "BTC-USD", "changes": []}));
        assert_eq!(apply(&state, "BTC-USD", msg), Dispatch::Ignored);
        assert_eq!(state.book.read(), before);
    }
}
