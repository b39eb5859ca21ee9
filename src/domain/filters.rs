//! Caller-supplied filter clauses.

use serde::{Deserialize, Serialize};

use super::submissions::FieldValue;

/// Comparison applied between an entry value and the clause value.
///
/// Conditions this build does not know about deserialize to
/// [`FilterCondition::Unsupported`], which matches nothing. Filtering is
/// total over arbitrary caller input; it never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    Equals,
    DoesNotEqual,
    GreaterThan,
    LessThan,
    #[serde(other)]
    Unsupported,
}

/// One filter clause from the `filters` query parameter.
///
/// Clauses are conjunctive across the supplied sequence and disjunctive
/// within a submission: a clause matches when any entry in any collection
/// carries its id and satisfies its condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub id: String,
    pub condition: FilterCondition,
    pub value: FieldValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_conditions() {
        let clauses: Vec<FilterClause> = serde_json::from_str(
            r#"[
                {"id": "a", "condition": "equals", "value": "x"},
                {"id": "b", "condition": "does_not_equal", "value": 1},
                {"id": "c", "condition": "greater_than", "value": "7"},
                {"id": "d", "condition": "less_than", "value": 7}
            ]"#,
        )
        .expect("decode clauses");
        assert_eq!(clauses[0].condition, FilterCondition::Equals);
        assert_eq!(clauses[1].condition, FilterCondition::DoesNotEqual);
        assert_eq!(clauses[2].condition, FilterCondition::GreaterThan);
        assert_eq!(clauses[3].condition, FilterCondition::LessThan);
    }

    #[test]
    fn unknown_condition_decodes_to_unsupported() {
        let clause: FilterClause = serde_json::from_str(
            r#"{"id": "a", "condition": "bogus_condition", "value": "x"}"#,
        )
        .expect("decode clause");
        assert_eq!(clause.condition, FilterCondition::Unsupported);
    }

    #[test]
    fn malformed_clause_is_an_error() {
        let result: Result<Vec<FilterClause>, _> = serde_json::from_str(r#"[{"condition": 3}]"#);
        assert!(result.is_err());
    }
}
