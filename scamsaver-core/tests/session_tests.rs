// Tests for scan session view state

use scamsaver_analyzer::{
    AnalysisError, AnalysisResult, SiteDetails, USER_FACING_FAILURE, Verdict,
};
use scamsaver_core::session::{ScanSession, ViewState};

fn result_for(url: &str, trust_score: u8) -> AnalysisResult {
    AnalysisResult {
        url: url.to_string(),
        trust_score,
        verdict: Verdict::Neutral,
        summary: "summary".to_string(),
        risk_factors: vec![],
        site_details: SiteDetails {
            domain_age: "1 year".to_string(),
            ssl_status: "Valid".to_string(),
            popularity: "Low".to_string(),
            server_location: "Germany".to_string(),
            owner_info: "Redacted".to_string(),
        },
        recommendation: "Be careful".to_string(),
        sources: None,
    }
}

// ============================================================================
// Submission Tests
// ============================================================================

#[test]
fn test_new_session_is_idle() {
    let session = ScanSession::new();
    assert_eq!(session.state(), &ViewState::Idle);
    assert!(!session.is_scanning());
    assert!(session.latest_ticket().is_none());
}

#[test]
fn test_submit_moves_to_scanning() {
    let mut session = ScanSession::new();
    let ticket = session.submit("example.com").unwrap();

    assert!(session.is_scanning());
    assert_eq!(
        session.state(),
        &ViewState::Scanning {
            ticket,
            url: "example.com".to_string()
        }
    );
}

#[test]
fn test_empty_submission_is_ignored() {
    let mut session = ScanSession::new();
    assert!(session.submit("").is_none());
    assert!(session.submit("   ").is_none());
    assert_eq!(session.state(), &ViewState::Idle);
}

#[test]
fn test_empty_submission_keeps_previous_result() {
    let mut session = ScanSession::new();
    let ticket = session.submit("example.com").unwrap();
    session.settle(ticket, Ok(result_for("example.com", 90)));

    assert!(session.submit("").is_none());
    assert!(matches!(session.state(), ViewState::Complete(r) if r.trust_score == 90));
}

#[test]
fn test_tickets_increase() {
    let mut session = ScanSession::new();
    let first = session.submit("a.example").unwrap();
    let second = session.submit("b.example").unwrap();

    assert!(second > first);
    assert_eq!(second.sequence(), first.sequence() + 1);
    assert_eq!(session.latest_ticket(), Some(second));
}

// ============================================================================
// Settlement Tests
// ============================================================================

#[test]
fn test_settle_success() {
    let mut session = ScanSession::new();
    let ticket = session.submit("example.com").unwrap();

    assert!(session.settle(ticket, Ok(result_for("example.com", 85))));
    match session.state() {
        ViewState::Complete(result) => {
            assert_eq!(result.trust_score, 85);
            assert_eq!(result.url, "example.com");
        }
        other => panic!("expected Complete, got {:?}", other),
    }
}

#[test]
fn test_every_failure_kind_maps_to_generic_message() {
    let errors = vec![
        AnalysisError::EmptyInput,
        AnalysisError::RequestFailure("connection reset".to_string()),
        AnalysisError::SchemaViolation("missing field `riskFactors`".to_string()),
        AnalysisError::Configuration("no key".to_string()),
    ];

    for error in errors {
        let mut session = ScanSession::new();
        let ticket = session.submit("example.com").unwrap();
        assert!(session.settle(ticket, Err(error)));
        assert_eq!(
            session.state(),
            &ViewState::Failed(USER_FACING_FAILURE.to_string())
        );
    }
}

#[test]
fn test_stale_response_is_discarded() {
    let mut session = ScanSession::new();
    let old = session.submit("slow.example").unwrap();
    let new = session.submit("fast.example").unwrap();

    assert!(session.settle(new, Ok(result_for("fast.example", 95))));
    assert!(!session.settle(old, Ok(result_for("slow.example", 5))));

    match session.state() {
        ViewState::Complete(result) => assert_eq!(result.url, "fast.example"),
        other => panic!("expected Complete, got {:?}", other),
    }
}

#[test]
fn test_stale_response_does_not_end_pending_scan() {
    let mut session = ScanSession::new();
    let old = session.submit("slow.example").unwrap();
    let new = session.submit("fast.example").unwrap();

    assert!(!session.settle(old, Err(AnalysisError::RequestFailure("timeout".to_string()))));
    assert_eq!(
        session.state(),
        &ViewState::Scanning {
            ticket: new,
            url: "fast.example".to_string()
        }
    );
}

#[test]
fn test_reset_discards_in_flight_scan() {
    let mut session = ScanSession::new();
    let ticket = session.submit("example.com").unwrap();
    session.reset();

    assert!(!session.settle(ticket, Ok(result_for("example.com", 50))));
    assert_eq!(session.state(), &ViewState::Idle);
}
