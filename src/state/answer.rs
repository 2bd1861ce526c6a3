//! Answer grading: exact set equality, no partial credit.

use std::collections::BTreeSet;

/// Decide whether a selection answers a question.
///
/// The selection is correct iff it equals the correct-label set. Two edge
/// cases are deliberate:
///
/// * an empty selection is never correct — this is what makes a TimeAttack
///   timeout grade as a wrong answer;
/// * an empty correct-label set (malformed question data, warned about at
///   bank load) is satisfied by any non-empty selection. This mirrors the
///   original dataset's always-true fallback and is a data-quality issue,
///   not behaviour to quietly change here.
pub fn is_correct(selection: &BTreeSet<String>, correct_labels: &BTreeSet<String>) -> bool {
    if selection.is_empty() {
        return false;
    }
    correct_labels.is_empty() || selection == correct_labels
}
