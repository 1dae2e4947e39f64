//! Percentage breakdowns for statistics responses.

use shared::protocol::{Composition, SequenceStats};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionShare {
    pub symbol: String,
    pub count: u64,
    /// Percentage of the summed counts with exactly one decimal.
    pub percentage: String,
}

/// Sorts by count descending; equal counts keep their wire order.
pub fn analyze_composition(composition: &Composition) -> Vec<CompositionShare> {
    let total = composition.total();
    let mut shares: Vec<CompositionShare> = composition
        .iter()
        .map(|(symbol, count)| CompositionShare {
            symbol: symbol.to_string(),
            count,
            percentage: format_percentage(count, total),
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

/// One decimal, halves rounded up.
pub fn format_percentage(count: u64, total: u64) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    let (count, total) = (u128::from(count), u128::from(total));
    let tenths = (2 * 1000 * count + total) / (2 * total);
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// Rounds to at most three decimals and groups thousands with commas.
pub fn format_molecular_weight(weight: f64) -> String {
    if !weight.is_finite() {
        return weight.to_string();
    }

    let fixed = format!("{:.3}", weight.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if weight < 0.0 && (integer != "0" || !fraction.is_empty()) {
        "-"
    } else {
        ""
    };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

/// Display-ready view of a statistics response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSummary {
    pub sequence_type: String,
    pub length: u64,
    pub gc_content: Option<String>,
    pub molecular_weight: Option<String>,
    pub shares: Vec<CompositionShare>,
}

impl StatsSummary {
    pub fn from_stats(stats: &SequenceStats) -> Self {
        Self {
            sequence_type: stats.sequence_type.to_uppercase(),
            length: stats.length,
            gc_content: stats.gc_content.map(|gc| format!("{gc}%")),
            molecular_weight: stats
                .molecular_weight
                .map(|weight| format!("{} Da", format_molecular_weight(weight))),
            shares: analyze_composition(&stats.composition),
        }
    }
}

#[cfg(test)]
#[path = "tests/composition_tests.rs"]
mod tests;
