//! Overload resolution for method and constructor calls.
//!
//! This module selects the best matching method from a set of candidates
//! based on argument types and conversion costs.
//!
//! ## Algorithm
//!
//! 1. Filter candidates by argument count
//! 2. Classify each argument's conversion to its parameter; an explicit-only
//!    or missing conversion disqualifies the candidate
//! 3. Cost = number of implicit (non-identity) conversions
//! 4. The unique minimum-cost candidate wins; a tie is ambiguous

mod ranking;

pub use ranking::find_best_match;

use ember_core::{SymbolId, SymbolTable, Type};
use thiserror::Error;

use crate::conversion::{Conversion, classify};

/// Result of successful overload resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct OverloadMatch {
    /// The selected method.
    pub method: SymbolId,
    /// Conversion needed for each argument.
    pub conversions: Vec<Conversion>,
    /// Number of implicit conversions (lower is better).
    pub cost: u32,
}

/// Why overload resolution failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverloadError {
    /// No candidate takes this many arguments.
    #[error("no candidate takes {arity} argument(s)")]
    NoCandidates { arity: usize },
    /// Candidates exist but every one is disqualified by its conversions.
    #[error("no candidate accepts the argument types")]
    NoMatch,
    /// Two or more candidates share the lowest cost.
    #[error("{} candidates share the lowest cost", .0.len())]
    Ambiguous(Vec<SymbolId>),
}

/// Resolve an overloaded call.
///
/// # Arguments
///
/// * `candidates` - Methods (or constructors) sharing the called name
/// * `arg_types` - Types of the arguments at the call site
/// * `table` - Symbol table holding the candidates' parameters
pub fn resolve_overload(
    candidates: &[SymbolId],
    arg_types: &[Type],
    table: &SymbolTable,
) -> Result<OverloadMatch, OverloadError> {
    let arity_matches: Vec<SymbolId> = candidates
        .iter()
        .copied()
        .filter(|&c| table.parameters(c).len() == arg_types.len())
        .collect();

    if arity_matches.is_empty() {
        return Err(OverloadError::NoCandidates {
            arity: arg_types.len(),
        });
    }

    let viable: Vec<OverloadMatch> = arity_matches
        .iter()
        .filter_map(|&c| try_match_candidate(c, arg_types, table))
        .collect();

    if viable.is_empty() {
        return Err(OverloadError::NoMatch);
    }

    tracing::trace!(
        candidates = arity_matches.len(),
        viable = viable.len(),
        "ranking overloads"
    );
    find_best_match(&viable)
}

/// Try to match arguments against a candidate.
///
/// Returns `None` if any argument needs an explicit conversion or has none.
fn try_match_candidate(
    method: SymbolId,
    arg_types: &[Type],
    table: &SymbolTable,
) -> Option<OverloadMatch> {
    let params = table.parameter_types(method);
    let mut conversions = Vec::with_capacity(arg_types.len());
    let mut cost = 0u32;

    for (arg, param) in arg_types.iter().zip(params.iter()) {
        let conversion = classify(arg, param);
        cost += conversion.cost()?;
        conversions.push(conversion);
    }

    Some(OverloadMatch {
        method,
        conversions,
        cost,
    })
}
