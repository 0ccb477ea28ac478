use super::*;
use kres_common::Name;

#[test]
fn test_empty_sink_is_applicable() {
    let sink = CheckerSink::new();
    assert_eq!(sink.current_applicability(), CandidateApplicability::Resolved);
    assert!(!sink.should_stop());
    assert_eq!(sink.outcome(), CheckOutcome::Applicable);
}

#[test]
fn test_worst_tier_wins() {
    let mut sink = CheckerSink::new();
    sink.report(ResolutionDiagnostic::LowerPriorityToPreserveCompatibility);
    assert_eq!(
        sink.outcome(),
        CheckOutcome::LowerPriority(ResolutionDiagnostic::LowerPriorityToPreserveCompatibility)
    );
    assert!(!sink.should_stop());

    sink.report(ResolutionDiagnostic::InapplicableCandidate);
    sink.report(ResolutionDiagnostic::TooManyArguments { count: 3 });
    assert!(sink.should_stop());
    // the first diagnostic of the worst tier is the reason
    assert_eq!(
        sink.outcome(),
        CheckOutcome::Inapplicable(ResolutionDiagnostic::InapplicableCandidate)
    );
    assert_eq!(sink.into_diagnostics().len(), 3);
}

#[test]
fn test_applicability_order() {
    assert!(CandidateApplicability::Resolved < CandidateApplicability::ResolvedLowPriority);
    assert!(CandidateApplicability::ResolvedLowPriority < CandidateApplicability::Inapplicable);
    assert!(CheckOutcome::LowerPriority(ResolutionDiagnostic::LowerPriorityToPreserveCompatibility).is_applicable());
    assert!(!CheckOutcome::Inapplicable(ResolutionDiagnostic::MissingReceiver).is_applicable());
}

#[test]
fn test_diagnostic_display() {
    let diagnostic = ResolutionDiagnostic::NoValueForParameter {
        name: Name::identifier("x"),
    };
    assert_eq!(diagnostic.to_string(), "no value passed for `x`");
    let diagnostic = ResolutionDiagnostic::LambdaArityMismatch {
        argument: 0,
        expected: 2,
        actual: 1,
    };
    assert_eq!(
        diagnostic.to_string(),
        "argument 0: expected a lambda with 2 parameters, found 1"
    );
}
