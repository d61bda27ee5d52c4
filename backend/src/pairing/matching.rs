use crate::domain::Recurser;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Pair(Recurser, Recurser),
    OddOneOut(Recurser),
}

impl MatchResult {
    pub fn members(&self) -> Vec<&Recurser> {
        match self {
            MatchResult::Pair(first, second) => vec![first, second],
            MatchResult::OddOneOut(recurser) => vec![recurser],
        }
    }
}

/// Shuffles the eligible subscribers and partitions them into pairs. With
/// an odd count, whoever the shuffle puts last is left out and comes back
/// first in the result.
pub fn make_matches<R: Rng + ?Sized>(
    mut recursers: Vec<Recurser>,
    rng: &mut R,
) -> Vec<MatchResult> {
    recursers.shuffle(rng);

    let mut results = Vec::with_capacity((recursers.len() + 1) / 2);
    if recursers.len() % 2 == 1 {
        if let Some(odd_one_out) = recursers.pop() {
            results.push(MatchResult::OddOneOut(odd_one_out));
        }
    }

    let mut remaining = recursers.into_iter();
    while let (Some(first), Some(second)) = (remaining.next(), remaining.next()) {
        results.push(MatchResult::Pair(first, second));
    }

    results
}
