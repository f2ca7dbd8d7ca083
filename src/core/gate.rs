//! Batch quality gate
//!
//! The gate is the go/no-go decision between processing and persistence. It
//! observes a *complete* batch: total warnings, total rows, and (for patient
//! batches) the full identifier list. It either admits the batch for
//! writing or rejects it outright. There is no partial commit: a rejected
//! batch writes nothing.
//!
//! Both thresholds are percentages in 0–100 and are compared
//! percentage-to-percentage.

use crate::adapters::store::HistoryStore;
use crate::domain::Result;
use std::fmt;

/// Why a batch was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum GateViolation {
    /// The warning rate reached the configured threshold
    WarningRateExceeded { rate: f64, threshold: f64 },
    /// Too few of the batch's identifiers were seen before
    InsufficientOverlap { rate: f64, threshold: f64 },
}

impl fmt::Display for GateViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateViolation::WarningRateExceeded { rate, threshold } => write!(
                f,
                "warning rate {rate:.1}% is not below threshold {threshold:.1}%"
            ),
            GateViolation::InsufficientOverlap { rate, threshold } => write!(
                f,
                "identifier overlap {rate:.1}% is not above threshold {threshold:.1}%"
            ),
        }
    }
}

/// The gate's decision for one batch
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Pass,
    Reject(Vec<GateViolation>),
}

impl GateDecision {
    pub fn passed(&self) -> bool {
        matches!(self, GateDecision::Pass)
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateDecision::Pass => write!(f, "pass"),
            GateDecision::Reject(violations) => {
                let reasons: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", reasons.join("; "))
            }
        }
    }
}

/// Batch-level quality gate
#[derive(Debug, Clone)]
pub struct QualityGate {
    warning_threshold_pct: f64,
    overlap_threshold_pct: f64,
}

impl QualityGate {
    pub fn new(warning_threshold_pct: f64, overlap_threshold_pct: f64) -> Self {
        Self {
            warning_threshold_pct,
            overlap_threshold_pct,
        }
    }

    /// The warning-rate check: `warnings / rows * 100 < threshold`.
    ///
    /// With zero rows the rate is undefined and the check passes vacuously:
    /// nothing was processed, nothing to flag.
    pub fn warning_rate_ok(&self, total_warnings: usize, total_rows: usize) -> bool {
        if total_rows == 0 {
            return true;
        }
        let rate = total_warnings as f64 / total_rows as f64 * 100.0;
        rate < self.warning_threshold_pct
    }

    fn warning_violation(
        &self,
        total_warnings: usize,
        total_rows: usize,
    ) -> Option<GateViolation> {
        if self.warning_rate_ok(total_warnings, total_rows) {
            return None;
        }
        Some(GateViolation::WarningRateExceeded {
            rate: total_warnings as f64 / total_rows as f64 * 100.0,
            threshold: self.warning_threshold_pct,
        })
    }

    /// Evaluate a claim batch. Claims carry only the warning-rate check.
    pub fn evaluate_claims(&self, total_warnings: usize, total_rows: usize) -> GateDecision {
        match self.warning_violation(total_warnings, total_rows) {
            None => GateDecision::Pass,
            Some(violation) => GateDecision::Reject(vec![violation]),
        }
    }

    /// Evaluate a patient batch: warning rate plus identifier overlap.
    ///
    /// The overlap check asks how many of the batch's identifiers already
    /// exist in the patient history table and requires
    /// `matching / len * 100 > threshold`. An empty history passes
    /// unconditionally (first load; an empty history can never demonstrate
    /// overlap), as does an empty identifier list.
    ///
    /// # Errors
    ///
    /// Propagates store errors from the history queries.
    pub async fn evaluate_patients(
        &self,
        total_warnings: usize,
        total_rows: usize,
        identifiers: &[String],
        store: &dyn HistoryStore,
    ) -> Result<GateDecision> {
        let mut violations = Vec::new();

        if let Some(violation) = self.warning_violation(total_warnings, total_rows) {
            violations.push(violation);
        }

        if !store.patient_history_is_empty().await? && !identifiers.is_empty() {
            let matching = store.count_matching_patient_ids(identifiers).await?;
            let rate = matching as f64 / identifiers.len() as f64 * 100.0;
            if rate <= self.overlap_threshold_pct {
                violations.push(GateViolation::InsufficientOverlap {
                    rate,
                    threshold: self.overlap_threshold_pct,
                });
            }
        }

        if violations.is_empty() {
            Ok(GateDecision::Pass)
        } else {
            Ok(GateDecision::Reject(violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(30, 100, 50.0 => true; "below threshold passes")]
    #[test_case(60, 100, 50.0 => false; "above threshold fails")]
    #[test_case(50, 100, 50.0 => false; "comparison is strict")]
    #[test_case(999, 0, 50.0 => true; "zero rows passes vacuously")]
    #[test_case(0, 100, 50.0 => true; "no warnings passes")]
    fn warning_rate(warnings: usize, rows: usize, threshold: f64) -> bool {
        QualityGate::new(threshold, 20.0).warning_rate_ok(warnings, rows)
    }

    #[test]
    fn test_evaluate_claims_pass() {
        let gate = QualityGate::new(5.0, 20.0);
        assert_eq!(gate.evaluate_claims(0, 100), GateDecision::Pass);
    }

    #[test]
    fn test_evaluate_claims_reject_carries_rate() {
        let gate = QualityGate::new(5.0, 20.0);
        match gate.evaluate_claims(10, 100) {
            GateDecision::Reject(violations) => {
                assert_eq!(violations.len(), 1);
                match &violations[0] {
                    GateViolation::WarningRateExceeded { rate, threshold } => {
                        assert!((rate - 10.0).abs() < f64::EPSILON);
                        assert!((threshold - 5.0).abs() < f64::EPSILON);
                    }
                    other => panic!("unexpected violation: {other:?}"),
                }
            }
            GateDecision::Pass => panic!("expected rejection"),
        }
    }

    #[test]
    fn test_decision_display() {
        let decision = GateDecision::Reject(vec![GateViolation::WarningRateExceeded {
            rate: 60.0,
            threshold: 50.0,
        }]);
        assert_eq!(
            decision.to_string(),
            "warning rate 60.0% is not below threshold 50.0%"
        );
        assert_eq!(GateDecision::Pass.to_string(), "pass");
    }
}
