//! Provider selection policy.
//!
//! The router asks a [`ProviderSelector`] to choose one provider out of the
//! discovered candidates. Any `Fn(&[Provider], &CallOptions) -> Result<Provider>`
//! closure is a selector, so callers can swap the ranking without touching the
//! router.

use crate::error::{Result, RouterError};
use crate::types::{CallOptions, DiscoveryRequest, Provider};

const REPUTATION_WEIGHT: f64 = 0.4;
const LATENCY_WEIGHT: f64 = 0.3;
const PRICE_WEIGHT: f64 = 0.3;

/// Chooses exactly one provider from a candidate list.
pub trait ProviderSelector: Send + Sync {
    /// Fails with [`RouterError::NoQualifyingProvider`] when nothing qualifies.
    fn select(&self, candidates: &[Provider], options: &CallOptions) -> Result<Provider>;
}

impl<F> ProviderSelector for F
where
    F: Fn(&[Provider], &CallOptions) -> Result<Provider> + Send + Sync,
{
    fn select(&self, candidates: &[Provider], options: &CallOptions) -> Result<Provider> {
        self(candidates, options)
    }
}

/// The default policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestProvider;

impl ProviderSelector for BestProvider {
    fn select(&self, candidates: &[Provider], options: &CallOptions) -> Result<Provider> {
        select_best_provider(candidates, options)
    }
}

/// Pick the best candidate meeting the call's constraints.
///
/// With `prefer_cheap` the lowest price wins, ties going to the higher
/// reputation. Otherwise candidates are ranked by a weighted score of
/// reputation, latency and price, each normalized over the candidate set.
/// Earlier candidates win exact ties.
pub fn select_best_provider(candidates: &[Provider], options: &CallOptions) -> Result<Provider> {
    let constraints = DiscoveryRequest {
        api: String::new(),
        max_price: options.max_price,
        min_reputation: options.min_reputation,
        max_latency: options.max_latency,
        limit: None,
    };
    let eligible: Vec<&Provider> = candidates
        .iter()
        .filter(|p| constraints.accepts(p))
        .collect();

    let chosen = if options.prefer_cheap {
        cheapest(&eligible)
    } else {
        highest_score(&eligible)
    };

    chosen.cloned().ok_or(RouterError::NoQualifyingProvider)
}

fn cheapest<'a>(eligible: &[&'a Provider]) -> Option<&'a Provider> {
    eligible.iter().copied().reduce(|best, p| {
        if p.price < best.price || (p.price == best.price && p.reputation > best.reputation) {
            p
        } else {
            best
        }
    })
}

fn highest_score<'a>(eligible: &[&'a Provider]) -> Option<&'a Provider> {
    let reputation = Range::over(eligible.iter().map(|p| p.reputation))?;
    let latency = Range::over(eligible.iter().map(|p| p.latency))?;
    let price = Range::over(eligible.iter().map(|p| p.price))?;

    let score = |p: &Provider| {
        REPUTATION_WEIGHT * reputation.higher_is_better(p.reputation)
            + LATENCY_WEIGHT * latency.lower_is_better(p.latency)
            + PRICE_WEIGHT * price.lower_is_better(p.price)
    };

    eligible
        .iter()
        .copied()
        .map(|p| (score(p), p))
        .reduce(|best, next| if next.0 > best.0 { next } else { best })
        .map(|(_, p)| p)
}

#[derive(Debug, Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn over(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |acc, v| match acc {
            None => Some(Range { min: v, max: v }),
            Some(r) => Some(Range {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }

    fn higher_is_better(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            (v - self.min) / span
        } else {
            1.0
        }
    }

    fn lower_is_better(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            (self.max - v) / span
        } else {
            1.0
        }
    }
}
