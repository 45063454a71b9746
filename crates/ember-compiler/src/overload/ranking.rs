//! Cost-based ranking for overload resolution.
//!
//! Picks the unique cheapest candidate. Unlike richer languages there are no
//! tie-breakers: two candidates with the same minimum cost are ambiguous.

use super::{OverloadError, OverloadMatch};

/// Find the best match from viable candidates.
///
/// # Returns
///
/// * `Ok(OverloadMatch)` - The unique lowest-cost candidate
/// * `Err(OverloadError::Ambiguous)` - Several candidates share the lowest cost
/// * `Err(OverloadError::NoMatch)` - `viable` was empty
pub fn find_best_match(viable: &[OverloadMatch]) -> Result<OverloadMatch, OverloadError> {
    let Some(best_cost) = viable.iter().map(|m| m.cost).min() else {
        return Err(OverloadError::NoMatch);
    };

    let mut best = viable.iter().filter(|m| m.cost == best_cost);
    match (best.next(), best.next()) {
        (Some(winner), None) => Ok(winner.clone()),
        _ => Err(OverloadError::Ambiguous(
            viable
                .iter()
                .filter(|m| m.cost == best_cost)
                .map(|m| m.method)
                .collect(),
        )),
    }
}
