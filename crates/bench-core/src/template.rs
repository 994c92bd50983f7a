//! Statement template instantiation.
//!
//! Supports placeholders:
//! - `{index}` - current iteration index
//! - `{rand63}` - random non-negative 63-bit integer, drawn fresh per occurrence

use rand::Rng;

/// Instantiate a statement template for one iteration.
///
/// Every `{index}` occurrence receives the same iteration index; every
/// `{rand63}` occurrence receives an independently drawn value (never a
/// cached one).
pub fn instantiate<R: Rng>(template: &str, index: u64, rng: &mut R) -> String {
    let mut stmt = template.replace("{index}", &index.to_string());

    while stmt.contains("{rand63}") {
        let value: i64 = rng.random_range(0..i64::MAX);
        stmt = stmt.replacen("{rand63}", &value.to_string(), 1);
    }

    stmt
}
