//! Shared extraction and coercion helpers for nested attribute blocks.
//!
//! Survey blocks are open mappings with no fixed schema, so every lookup
//! here is alias-aware and every coercion returns an `Option` instead of
//! failing. A value that cannot be coerced drops out of the statistic it
//! would have fed; it never aborts the aggregation pass.

use crate::models::AttrBlock;
use serde_json::Value;
use std::collections::HashMap;

/// Accepted key spellings for one boolean-ish capability flag.
///
/// The primary key is matched against an exact marker string ("Yes",
/// "Received"); the alias key is accepted by plain truthiness. Both checks
/// are kept as collected in the field: the intake clients disagree on which
/// spelling they send.
#[derive(Debug, Clone, Copy)]
pub struct SignalAliases {
    pub primary_key: &'static str,
    pub primary_marker: &'static str,
    pub alias_key: &'static str,
}

/// Primary healthcare funding received, as reported in the funding block.
pub const FUNDING_RECEIVED: SignalAliases = SignalAliases {
    primary_key: "bhcpf_received",
    primary_marker: "Yes",
    alias_key: "has_bhcpf",
};

/// Funding status variant of the received signal, used by the risk rules.
pub const FUNDING_STATUS_RECEIVED: SignalAliases = SignalAliases {
    primary_key: "bhcpf_status",
    primary_marker: "Received",
    alias_key: "has_bhcpf",
};

/// Impact-programme funding received, as reported in the impact block.
pub const IMPACT_FUNDING_RECEIVED: SignalAliases = SignalAliases {
    primary_key: "received",
    primary_marker: "Yes",
    alias_key: "has_impact_funding",
};

pub const POWER_AVAILABLE: SignalAliases = SignalAliases {
    primary_key: "has_power",
    primary_marker: "Yes",
    alias_key: "power_available",
};

pub const WATER_AVAILABLE: SignalAliases = SignalAliases {
    primary_key: "has_water",
    primary_marker: "Yes",
    alias_key: "water_available",
};

pub const INTERNET_AVAILABLE: SignalAliases = SignalAliases {
    primary_key: "has_internet",
    primary_marker: "Yes",
    alias_key: "internet_available",
};

pub const PHARMACY_AVAILABLE: SignalAliases = SignalAliases {
    primary_key: "has_pharmacy",
    primary_marker: "Yes",
    alias_key: "pharmacy_available",
};

pub const REVITALIZED: SignalAliases = SignalAliases {
    primary_key: "revitalization",
    primary_marker: "Yes",
    alias_key: "revitalized",
};

/// The five tracked infrastructure capabilities, in report order.
/// Adding an alias is a one-line change here.
pub const INFRASTRUCTURE_CAPABILITIES: [(&str, SignalAliases); 5] = [
    ("power", POWER_AVAILABLE),
    ("water", WATER_AVAILABLE),
    ("internet", INTERNET_AVAILABLE),
    ("pharmacy", PHARMACY_AVAILABLE),
    ("revitalization", REVITALIZED),
];

/// Key-name markers for staff counts in the human-resources block.
pub const STAFF_MARKERS: [&str; 3] = ["staff", "personnel", "worker"];

/// Key-name markers for patient volumes in the services block.
pub const PATIENT_MARKERS: [&str; 3] = ["patient", "attendance", "utilization"];

/// Key-name markers for satisfaction scores.
pub const SCORE_MARKERS: [&str; 3] = ["satisfaction", "rating", "score"];

/// String values that mark a service as offered.
pub const SERVICE_OFFERED_VALUES: [&str; 3] = ["yes", "true", "available"];

/// Check whether a capability signal is present in a block.
pub fn signal_present(block: &AttrBlock, aliases: &SignalAliases) -> bool {
    block.get(aliases.primary_key).and_then(Value::as_str) == Some(aliases.primary_marker)
        || block.get(aliases.alias_key).is_some_and(is_truthy)
}

/// Plain truthiness of a heterogeneous value: empty strings, zero numbers,
/// empty collections and null are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Coerce a value to an integer count. Strings contribute their first
/// whitespace-delimited integer token ("12 nurses" -> 12).
pub fn parse_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.split_whitespace().next()?.parse().ok(),
        _ => None,
    }
}

/// Coerce a free-form monetary amount, stripping thousands separators
/// ("12,500" -> 12500.0).
pub fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.replace(',', "").trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a satisfaction score. Strings contribute their first
/// whitespace-delimited numeric token ("4.5 stars" -> 4.5).
pub fn parse_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.split_whitespace().next()?.parse().ok(),
        _ => None,
    }
}

/// Coerce a whole value to a float (no token splitting). Used by the
/// satisfaction-survey analysis where values are expected to be bare scores.
pub fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Case-insensitive substring match of a key name against markers.
pub fn key_matches(key: &str, markers: &[&str]) -> bool {
    let lower = key.to_lowercase();
    markers.iter().any(|marker| lower.contains(marker))
}

/// Sum of all staff-marker counts in a human-resources block.
pub fn staff_total(block: &AttrBlock) -> i64 {
    block
        .iter()
        .filter(|(key, _)| key_matches(key, &STAFF_MARKERS))
        .filter_map(|(_, value)| parse_count(value))
        .sum()
}

/// A non-empty string field, or `None`.
pub fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Humanize a snake_case key: "nurse_staff_count" -> "Nurse Staff Count".
pub fn humanize_key(key: &str) -> String {
    key.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Round to two decimal places, the precision of every reported statistic.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of `count` over `total`, rounded; an empty denominator is 0.
pub fn percentage(count: u64, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(count as f64 / total as f64 * 100.0)
    }
}

/// A tally that preserves first-encounter order of its keys, so that ties
/// in a later stable sort keep the order records arrived in.
#[derive(Debug, Default)]
pub struct OrderedTally<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V: Default> OrderedTally<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Mutable access to the value for `key`, inserting the default on
    /// first encounter.
    pub fn entry(&mut self, key: &str) -> &mut V {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.to_string(), V::default()));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[slot].1
    }

    /// The accumulated entries, in first-encounter order.
    pub fn into_entries(self) -> Vec<(String, V)> {
        self.entries
    }
}

/// Stable descending sort by value, truncated to the top `n` entries.
/// Ties keep encounter order.
pub fn top_n<V: PartialOrd + Copy>(mut entries: Vec<(String, V)>, n: usize) -> Vec<(String, V)> {
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(value: serde_json::Value) -> AttrBlock {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_signal_present_exact_marker() {
        let b = block(json!({"has_power": "Yes"}));
        assert!(signal_present(&b, &POWER_AVAILABLE));

        let b = block(json!({"has_power": "yes"}));
        assert!(!signal_present(&b, &POWER_AVAILABLE));
    }

    #[test]
    fn test_signal_present_alias_truthiness() {
        let b = block(json!({"power_available": true}));
        assert!(signal_present(&b, &POWER_AVAILABLE));

        let b = block(json!({"power_available": ""}));
        assert!(!signal_present(&b, &POWER_AVAILABLE));

        let b = block(json!({"power_available": 1}));
        assert!(signal_present(&b, &POWER_AVAILABLE));
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(&json!("Yes")));
        assert!(is_truthy(&json!(3)));
        assert!(is_truthy(&json!([1])));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!({})));
    }

    #[test]
    fn test_parse_count_string_token() {
        assert_eq!(parse_count(&json!("12 nurses")), Some(12));
        assert_eq!(parse_count(&json!("none here")), None);
        assert_eq!(parse_count(&json!("")), None);
        assert_eq!(parse_count(&json!(7)), Some(7));
        assert_eq!(parse_count(&json!(3.9)), Some(3));
        assert_eq!(parse_count(&json!(true)), Some(1));
        assert_eq!(parse_count(&json!(null)), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(&json!("12,500")), Some(12500.0));
        assert_eq!(parse_amount(&json!("1,250,000.50")), Some(1_250_000.5));
        assert_eq!(parse_amount(&json!(900)), Some(900.0));
        assert_eq!(parse_amount(&json!("not-a-number")), None);
    }

    #[test]
    fn test_parse_score_leading_token() {
        assert_eq!(parse_score(&json!("4.5 stars")), Some(4.5));
        assert_eq!(parse_score(&json!(3)), Some(3.0));
        assert_eq!(parse_score(&json!("excellent")), None);
    }

    #[test]
    fn test_parse_float_whole_string() {
        assert_eq!(parse_float(&json!("4.5")), Some(4.5));
        assert_eq!(parse_float(&json!("4.5 stars")), None);
    }

    #[test]
    fn test_key_matches() {
        assert!(key_matches("nurse_staff_count", &STAFF_MARKERS));
        assert!(key_matches("Community_Health_Workers", &STAFF_MARKERS));
        assert!(!key_matches("opening_time", &STAFF_MARKERS));
    }

    #[test]
    fn test_staff_total() {
        let b = block(json!({
            "nurse_staff_count": "12 nurses",
            "chew_workers": 3,
            "opening_time": "08:00",
            "doctor_staff": "two"
        }));
        assert_eq!(staff_total(&b), 15);
    }

    #[test]
    fn test_humanize_key() {
        assert_eq!(humanize_key("nurse_staff_count"), "Nurse Staff Count");
        assert_eq!(humanize_key("ANC_visits"), "Anc Visits");
        assert_eq!(humanize_key(""), "");
    }

    #[test]
    fn test_percentage_zero_denominator() {
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.33);
    }

    #[test]
    fn test_ordered_tally_preserves_order() {
        let mut tally: OrderedTally<u64> = OrderedTally::new();
        *tally.entry("beta") += 1;
        *tally.entry("alpha") += 1;
        *tally.entry("beta") += 1;

        let entries = tally.into_entries();
        assert_eq!(entries, vec![("beta".to_string(), 2), ("alpha".to_string(), 1)]);
    }

    #[test]
    fn test_top_n_stable_ties() {
        let entries = vec![
            ("first".to_string(), 2.0),
            ("second".to_string(), 5.0),
            ("third".to_string(), 2.0),
        ];
        let top = top_n(entries, 2);
        assert_eq!(top[0].0, "second");
        assert_eq!(top[1].0, "first");
    }

    #[test]
    fn test_top_n_caps_length() {
        let entries: Vec<(String, f64)> =
            (0..15).map(|i| (format!("state-{i}"), i as f64)).collect();
        assert_eq!(top_n(entries, 10).len(), 10);
    }
}
