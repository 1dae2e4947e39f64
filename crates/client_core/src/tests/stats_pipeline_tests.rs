use super::*;

const QUIET: Duration = Duration::from_millis(500);

#[test]
fn rearming_pushes_the_deadline_back() {
    let start = Instant::now();
    let mut pipeline = StatsAutoFetch::new(QUIET);
    pipeline.observe_change(start);
    pipeline.observe_change(start + Duration::from_millis(300));

    assert_eq!(pipeline.deadline(), Some(start + Duration::from_millis(800)));
    assert_eq!(
        pipeline.fire(start + Duration::from_millis(500), "ATCG", Availability::Online),
        None
    );

    let action = pipeline.fire(start + Duration::from_millis(800), "ATCG", Availability::Online);
    assert!(matches!(action, Some(StatsAction::Fetch { ref sequence, .. }) if sequence == "ATCG"));
    assert_eq!(pipeline.deadline(), None);
}

#[test]
fn blank_text_or_unavailable_backend_clears() {
    let mut pipeline = StatsAutoFetch::new(QUIET);
    assert_eq!(pipeline.settle("  \n\t", Availability::Online), StatsAction::Clear);
    assert_eq!(pipeline.settle("ATCG", Availability::Offline), StatsAction::Clear);
    assert_eq!(pipeline.settle("ATCG", Availability::Checking), StatsAction::Clear);
}

#[test]
fn fetch_carries_untrimmed_text() {
    let mut pipeline = StatsAutoFetch::new(QUIET);
    let action = pipeline.settle(" atcg ", Availability::Online);
    assert!(matches!(action, StatsAction::Fetch { ref sequence, .. } if sequence == " atcg "));
}

#[test]
fn only_latest_dispatch_is_accepted() {
    let mut pipeline = StatsAutoFetch::new(QUIET);
    let StatsAction::Fetch { generation: older, .. } = pipeline.settle("AT", Availability::Online)
    else {
        panic!("expected fetch");
    };
    let StatsAction::Fetch { generation: newer, .. } = pipeline.settle("ATG", Availability::Online)
    else {
        panic!("expected fetch");
    };
    assert!(!pipeline.accepts(older));
    assert!(pipeline.accepts(newer));

    assert_eq!(pipeline.settle("", Availability::Online), StatsAction::Clear);
    assert!(!pipeline.accepts(newer));
}

#[test]
fn cancel_drops_pending_deadline_and_in_flight_generation() {
    let start = Instant::now();
    let mut pipeline = StatsAutoFetch::new(QUIET);
    let StatsAction::Fetch { generation, .. } = pipeline.settle("AT", Availability::Online) else {
        panic!("expected fetch");
    };
    pipeline.observe_change(start);
    pipeline.cancel();

    assert_eq!(pipeline.deadline(), None);
    assert!(!pipeline.accepts(generation));
    assert_eq!(pipeline.fire(start + QUIET, "AT", Availability::Online), None);
}
