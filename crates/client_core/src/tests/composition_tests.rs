use super::*;

fn composition(pairs: &[(&str, u64)]) -> Composition {
    Composition::try_from(pairs.to_vec()).expect("unique symbols")
}

fn share(symbol: &str, count: u64, percentage: &str) -> CompositionShare {
    CompositionShare {
        symbol: symbol.to_string(),
        count,
        percentage: percentage.to_string(),
    }
}

#[test]
fn ties_keep_original_order() {
    let shares = analyze_composition(&composition(&[("A", 2), ("T", 2), ("C", 0)]));
    assert_eq!(
        shares,
        vec![share("A", 2, "50.0"), share("T", 2, "50.0"), share("C", 0, "0.0")]
    );
}

#[test]
fn sorts_by_descending_count() {
    let shares = analyze_composition(&composition(&[("C", 1), ("G", 5), ("A", 3), ("T", 3)]));
    let order: Vec<_> = shares.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(order, vec!["G", "A", "T", "C"]);
    assert_eq!(shares[0].percentage, "41.7");
    assert_eq!(shares[3].percentage, "8.3");
}

#[test]
fn exact_halves_round_up() {
    let shares = analyze_composition(&composition(&[("A", 15), ("T", 1)]));
    assert_eq!(shares, vec![share("A", 15, "93.8"), share("T", 1, "6.3")]);

    assert_eq!(format_percentage(5, 16), "31.3");
    assert_eq!(format_percentage(9, 16), "56.3");
    assert_eq!(format_percentage(1, 8), "12.5");
    assert_eq!(format_percentage(4, 4), "100.0");
}

#[test]
fn huge_counts_do_not_overflow() {
    let shares = analyze_composition(&composition(&[("A", u64::MAX), ("T", u64::MAX)]));
    assert_eq!(shares[0].percentage, "100.0");
    assert_eq!(shares[1].percentage, "100.0");
}

#[test]
fn zero_total_yields_zero_percentages() {
    let shares = analyze_composition(&composition(&[("A", 0), ("U", 0)]));
    assert!(shares.iter().all(|s| s.percentage == "0.0"));
    assert!(analyze_composition(&Composition::new()).is_empty());
}

#[test]
fn rounded_percentages_sum_close_to_hundred() {
    for pairs in [
        vec![("A", 1), ("C", 1), ("G", 1)],
        vec![("A", 7), ("C", 3), ("G", 11), ("T", 13)],
        vec![("M", 1), ("K", 2), ("V", 3), ("L", 5)],
        vec![("A", 999), ("T", 1)],
    ] {
        let shares = analyze_composition(&composition(&pairs));
        let sum: f64 = shares
            .iter()
            .map(|s| s.percentage.parse::<f64>().expect("number"))
            .sum();
        assert!((sum - 100.0).abs() <= 0.1 + 1e-9, "{pairs:?} summed to {sum}");
        assert!(shares.iter().all(|s| s.percentage.split('.').nth(1).map(str::len) == Some(1)));
    }
}

#[test]
fn percentages_are_relative_to_visible_counts_not_length() {
    let stats = SequenceStats {
        length: 100,
        composition: composition(&[("A", 1), ("T", 3)]),
        gc_content: Some(0.0),
        molecular_weight: Some(1234567.891),
        sequence_type: "dna".to_string(),
        sequence_id: None,
    };
    let summary = StatsSummary::from_stats(&stats);
    assert_eq!(summary.sequence_type, "DNA");
    assert_eq!(summary.length, 100);
    assert_eq!(summary.shares, vec![share("T", 3, "75.0"), share("A", 1, "25.0")]);
    assert_eq!(summary.gc_content.as_deref(), Some("0%"));
    assert_eq!(summary.molecular_weight.as_deref(), Some("1,234,567.891 Da"));
}

#[test]
fn molecular_weight_grouping() {
    assert_eq!(format_molecular_weight(1253.8), "1,253.8");
    assert_eq!(format_molecular_weight(999.0), "999");
    assert_eq!(format_molecular_weight(1000.0), "1,000");
    assert_eq!(format_molecular_weight(12.34567), "12.346");
    assert_eq!(format_molecular_weight(0.0), "0");
}
