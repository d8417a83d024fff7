//! Best-match selection between candidate descriptors.
//!
//! Specification documents often declare several shapes that could describe
//! one response. The candidate sharing the most compatible properties with
//! the introspected type wins.

use indexmap::IndexMap;

use super::types::{ParameterData, RuntimeTypeData};

/// Count candidate properties that also exist in `reference` with a
/// compatible type.
///
/// A property is compatible when the candidate leaves its type unspecified
/// or declares exactly the reference's native type.
pub fn count_matching_properties(
    candidate: &RuntimeTypeData,
    reference: &IndexMap<String, ParameterData>,
) -> usize {
    candidate
        .properties
        .iter()
        .filter(|(name, declared)| {
            reference.get(*name).is_some_and(|native| match declared.type_tag() {
                None => true,
                Some(tag) => native.type_tag() == Some(tag),
            })
        })
        .count()
}

/// Index of the candidate with the most compatible properties.
///
/// Ties go to the earliest candidate. Returns `None` only when there are no
/// candidates; a candidate with zero matches is still returned otherwise.
pub fn find_best_matching(
    candidates: &[RuntimeTypeData],
    reference: &IndexMap<String, ParameterData>,
) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let score = count_matching_properties(candidate, reference);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}
