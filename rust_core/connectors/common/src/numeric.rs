//! Conversions between the exchange's decimal strings and `f64`.

use serde_json::Value;

use crate::errors::ConnectorError;
use crate::types::OrderBookLevel;

/// Parses an exchange decimal string. Empty and non-finite inputs are errors.
pub fn parse_decimal(s: &str) -> Result<f64, ConnectorError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ConnectorError::Parse("empty decimal".to_string()));
    }
    let v: f64 = trimmed
        .parse()
        .map_err(|_| ConnectorError::Parse(format!("not a decimal: {:?}", s)))?;
    if !v.is_finite() {
        return Err(ConnectorError::Parse(format!("not finite: {:?}", s)));
    }
    Ok(v)
}

/// Uniform stringification of a wire value: strings verbatim, numbers in their
/// shortest decimal form with integral floats rendered without a fraction, so
/// `50010.0` and `"50010"` agree. Anything else has no decimal representation.
pub fn decimal_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_f64() => {
            let v = n.as_f64()?;
            if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e21 {
                Some(format!("{:.0}", v))
            } else {
                Some(n.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Converts the first `depth` entries of `[[price, size, ...], ...]` into
/// levels. Entries that are too short or carry a non-decimal field are
/// skipped without pulling in deeper levels.
pub fn levels_from_wire(entries: &[Value], depth: usize) -> Vec<OrderBookLevel> {
    entries
        .iter()
        .take(depth)
        .filter_map(|entry| {
            let arr = entry.as_array()?;
            if arr.len() < 2 {
                return None;
            }
            Some(OrderBookLevel {
                price: decimal_string(&arr[0])?,
                size: decimal_string(&arr[1])?,
            })
        })
        .collect()
}

pub fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
