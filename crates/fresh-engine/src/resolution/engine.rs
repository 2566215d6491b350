//! Descriptor resolution against the live page.
//!
//! Strategies are tried in declared order, most specific first. Each attempt is
//! an independent query; the first strategy with at least one live match wins
//! and later strategies are not consulted. Nothing is merged or unioned, so a
//! failure can always be attributed to a specific strategy.

use super::result::Resolved;
use crate::backend::Backend;
use fresh_common::protocol::ElementDescriptor;
use tracing::debug;

pub struct LocatorResolver;

impl LocatorResolver {
    /// Evaluate `descriptor` now. Returns `None` when no strategy matches.
    ///
    /// Never fails: a strategy whose query errors (bad selector, page mid-navigation)
    /// counts as "no match" and the next strategy is tried.
    pub async fn resolve<B: Backend + ?Sized>(
        descriptor: &ElementDescriptor,
        backend: &mut B,
    ) -> Option<Resolved> {
        for (index, strategy) in descriptor.strategies().iter().enumerate() {
            match backend.count(strategy).await {
                Ok(0) => {
                    debug!(element = descriptor.name(), %strategy, "no match");
                }
                Ok(count) => {
                    debug!(
                        element = descriptor.name(),
                        %strategy,
                        strategy_index = index,
                        count,
                        "resolved"
                    );
                    return Some(Resolved {
                        strategy_index: index,
                        strategy: strategy.clone(),
                        count,
                    });
                }
                Err(e) => {
                    debug!(element = descriptor.name(), %strategy, error = %e, "query failed");
                }
            }
        }
        None
    }

    /// Human-readable list of the strategies tried, for diagnostics.
    pub fn attempted(descriptor: &ElementDescriptor) -> Vec<String> {
        descriptor
            .strategies()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
