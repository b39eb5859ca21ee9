//! Filter engine.
//!
//! Pure and deterministic: no I/O, no shared state, inputs untouched.
//! Runs in O(submissions x clauses x entries-per-submission).

use crate::domain::filters::{FilterClause, FilterCondition};
use crate::domain::submissions::{AnswerEntry, Submission};

/// Retain the submissions that satisfy every clause, in their original
/// relative order. An empty clause list keeps everything.
pub fn apply(submissions: &[Submission], clauses: &[FilterClause]) -> Vec<Submission> {
    submissions
        .iter()
        .filter(|submission| clauses.iter().all(|clause| matches(submission, clause)))
        .cloned()
        .collect()
}

fn matches(submission: &Submission, clause: &FilterClause) -> bool {
    submission
        .entries()
        .any(|entry| entry_matches(entry, clause))
}

fn entry_matches(entry: &AnswerEntry, clause: &FilterClause) -> bool {
    if entry.id != clause.id {
        return false;
    }
    match clause.condition {
        FilterCondition::Equals => entry.value == clause.value,
        FilterCondition::DoesNotEqual => entry.value != clause.value,
        FilterCondition::GreaterThan => ordered(entry, clause).is_some_and(|(lhs, rhs)| lhs > rhs),
        FilterCondition::LessThan => ordered(entry, clause).is_some_and(|(lhs, rhs)| lhs < rhs),
        FilterCondition::Unsupported => false,
    }
}

/// Both operands as floats, or `None` when either side refuses to be a
/// number. Ordering against an unparsable operand is simply not a match.
fn ordered(entry: &AnswerEntry, clause: &FilterClause) -> Option<(f64, f64)> {
    Some((entry.value.as_f64()?, clause.value.as_f64()?))
}

#[cfg(test)]
mod tests {
    use crate::domain::submissions::FieldValue;

    use super::*;

    fn submission(json: &str) -> Submission {
        serde_json::from_str(json).expect("submission fixture")
    }

    fn clause(id: &str, condition: FilterCondition, value: FieldValue) -> FilterClause {
        FilterClause {
            id: id.to_string(),
            condition,
            value,
        }
    }

    fn sample() -> Vec<Submission> {
        vec![
            submission(r#"{"questions": [{"id": "q1", "value": "10"}]}"#),
            submission(r#"{"questions": [{"id": "q1", "value": "5"}]}"#),
            submission(r#"{"calculations": [{"id": "q1", "value": 12}]}"#),
            submission(r#"{"urlParameters": [{"id": "ref", "value": "news"}]}"#),
            submission(r#"{}"#),
        ]
    }

    #[test]
    fn empty_clause_list_is_identity() {
        let records = sample();
        assert_eq!(apply(&records, &[]), records);
    }

    #[test]
    fn greater_than_parses_string_operands() {
        let records = sample();
        let clauses = vec![clause(
            "q1",
            FilterCondition::GreaterThan,
            FieldValue::String("7".into()),
        )];
        let kept = apply(&records, &clauses);
        // "10" as a question and 12 as a calculation both clear 7; "5" does not.
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0], records[0]);
        assert_eq!(kept[1], records[2]);
    }

    #[test]
    fn equality_matches_without_coercion() {
        let records = sample();
        let matches_string = apply(
            &records,
            &[clause("q1", FilterCondition::Equals, FieldValue::String("10".into()))],
        );
        assert_eq!(matches_string.len(), 1);

        // The calculation holds the number 12; the string "12" is not equal to it.
        let number_as_string = apply(
            &records,
            &[clause("q1", FilterCondition::Equals, FieldValue::String("12".into()))],
        );
        assert!(number_as_string.is_empty());
    }

    #[test]
    fn does_not_equal_is_the_negation_per_entry() {
        let records = sample();
        let kept = apply(
            &records,
            &[clause(
                "q1",
                FilterCondition::DoesNotEqual,
                FieldValue::String("10".into()),
            )],
        );
        // Matches any submission owning a q1 entry whose value differs.
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0], records[1]);
        assert_eq!(kept[1], records[2]);
    }

    #[test]
    fn clause_matches_across_all_three_collections() {
        let records = sample();
        let kept = apply(
            &records,
            &[clause(
                "ref",
                FilterCondition::Equals,
                FieldValue::String("news".into()),
            )],
        );
        assert_eq!(kept, vec![records[3].clone()]);
    }

    #[test]
    fn unsupported_condition_matches_nothing() {
        let records = sample();
        let kept = apply(
            &records,
            &[clause("q1", FilterCondition::Unsupported, FieldValue::String("10".into()))],
        );
        assert!(kept.is_empty());
    }

    #[test]
    fn unparsable_numeric_operand_never_matches() {
        let records = vec![submission(
            r#"{"questions": [{"id": "q1", "value": "ten"}]}"#,
        )];
        for condition in [FilterCondition::GreaterThan, FilterCondition::LessThan] {
            assert!(apply(&records, &[clause("q1", condition, FieldValue::Number(0.0))]).is_empty());
        }
        // Unparsable on the clause side behaves the same way.
        let numeric = vec![submission(r#"{"questions": [{"id": "q1", "value": 5}]}"#)];
        let kept = apply(
            &numeric,
            &[clause(
                "q1",
                FilterCondition::LessThan,
                FieldValue::String("many".into()),
            )],
        );
        assert!(kept.is_empty());
    }

    #[test]
    fn clauses_are_conjunctive() {
        let records = sample();
        let first = clause("q1", FilterCondition::GreaterThan, FieldValue::Number(7.0));
        let second = clause("q1", FilterCondition::LessThan, FieldValue::Number(11.0));

        let combined = apply(&records, &[first.clone(), second.clone()]);
        let split = apply(&apply(&records, &[first]), &[second]);
        assert_eq!(combined, split);
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0], records[0]);
    }

    #[test]
    fn apply_is_idempotent_and_order_preserving() {
        let records = sample();
        let clauses = vec![clause(
            "q1",
            FilterCondition::GreaterThan,
            FieldValue::Number(0.0),
        )];
        let once = apply(&records, &clauses);
        let twice = apply(&once, &clauses);
        assert_eq!(once, twice);

        let positions: Vec<usize> = once
            .iter()
            .map(|kept| records.iter().position(|r| r == kept).expect("from input"))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn missing_collections_are_empty_not_errors() {
        let records = vec![submission(r#"{}"#)];
        let kept = apply(
            &records,
            &[clause("q1", FilterCondition::Equals, FieldValue::Null)],
        );
        assert!(kept.is_empty());
    }
}
