//! Human-readable rendering of evaluation outcomes.

use std::fmt::Write;

use credence_core::{Decision, EvaluationOutcome, EvaluationState, SecurityFinding};

pub fn outcome(outcome: &EvaluationOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "evaluation {}", outcome.evaluation_id);

    match &outcome.state {
        EvaluationState::Blocked {
            finding,
            review_request_id,
        } => {
            let _ = writeln!(out, "state: BLOCKED");
            let _ = writeln!(out, "finding: {}", finding_line(finding));
            let _ = writeln!(out, "review request: {review_request_id}");
        }
        EvaluationState::Decided { decision } => {
            let _ = writeln!(out, "state: decided");
            decision_lines(&mut out, decision);
        }
    }

    let report = &outcome.bundle.security_report;
    let flagged: Vec<_> = report.findings.iter().filter(|f| !f.is_clear()).collect();
    if !flagged.is_empty() {
        let _ = writeln!(out, "findings:");
        for finding in flagged {
            let _ = writeln!(out, "  - {}", finding_line(finding));
        }
    }

    if !outcome.review_requests.is_empty() {
        let _ = writeln!(out, "review requests: {}", outcome.review_requests.len());
    }

    if !outcome.degradations.is_empty() {
        let _ = writeln!(out, "degradations:");
        for d in &outcome.degradations {
            let _ = writeln!(out, "  - {} ({}): {}", d.component, d.kind.as_str(), d.reason);
        }
    }

    out
}

fn finding_line(finding: &SecurityFinding) -> String {
    format!(
        "{} / {} ({}, {})",
        finding.detector_name, finding.finding_type, finding.severity, finding.recommended_action
    )
}

fn decision_lines(out: &mut String, decision: &Decision) {
    let _ = writeln!(
        out,
        "signal: {} (confidence {:.1})",
        decision.signal_strength.as_str(),
        decision.skill_confidence
    );
    let _ = writeln!(out, "credential: {}", decision.credential_status.as_str());
    let _ = writeln!(
        out,
        "test required: {}",
        if decision.test_required { "yes" } else { "no" }
    );

    let skills = &decision.skills;
    for (tier, names) in [
        ("core", &skills.core),
        ("frameworks", &skills.frameworks),
        ("infrastructure", &skills.infrastructure),
        ("tools", &skills.tools),
    ] {
        if !names.is_empty() {
            let _ = writeln!(out, "{tier}: {}", names.join(", "));
        }
    }

    let summary = &decision.evidence_summary;
    let _ = writeln!(
        out,
        "skills: {} total, {} corroborated, {} conflicts",
        summary.total_skills, summary.corroborated_skills, summary.conflict_flags
    );
    if !summary.missing_signals.is_empty() {
        let missing: Vec<&str> = summary.missing_signals.iter().map(|s| s.as_str()).collect();
        let _ = writeln!(out, "missing sources: {}", missing.join(", "));
    }
}
