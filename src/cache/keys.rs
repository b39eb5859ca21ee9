//! Cache key derivation.

use crate::domain::filters::FilterClause;

/// Byte that cannot appear in either half of the key.
const KEY_SEPARATOR: char = '\u{1f}';

/// Derive the cache key for one request shape.
///
/// The key is the form identifier joined with the canonical JSON encoding
/// of the parsed clause sequence, so two requests that differ only in
/// query-string whitespace collide as they should. Clause order is kept
/// as supplied; logically identical filter sets in different orders key
/// separately and simply expire on their own.
pub fn response_cache_key(
    form_id: &str,
    clauses: &[FilterClause],
) -> Result<String, serde_json::Error> {
    let serialized = serde_json::to_string(clauses)?;
    Ok(format!("{form_id}{KEY_SEPARATOR}{serialized}"))
}
