use num_bigint::BigUint;
use serde_json::Number;

/// Cantor pairing of a parent id and a 1-based child ordinal.
///
/// Injective over non-negative pairs, so child ids derived from one parent never
/// collide, and re-exporting the same data yields the same ids. Ids roughly
/// square at every nesting level, so they are unbounded integers.
pub fn pairing(parent_id: &BigUint, ordinal: u64) -> BigUint {
    let sum = parent_id + ordinal;
    let triangle = &sum * (&sum + 1u32) / 2u32;
    triangle + ordinal
}

/// Exact JSON number for a row id.
pub fn id_number(id: &BigUint) -> serde_json::Result<Number> {
    match u64::try_from(id) {
        Ok(small) => Ok(Number::from(small)),
        Err(_) => serde_json::from_str(&id.to_string()),
    }
}
