use fresh_common::protocol::{ElementRef, Strategy};

/// Outcome of evaluating a descriptor against the live page.
///
/// Only valid for the instant it was produced; the page may change right after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Position of the winning strategy in the descriptor's declared order.
    pub strategy_index: usize,
    pub strategy: Strategy,
    /// How many elements the winning strategy matched.
    pub count: usize,
}

impl Resolved {
    /// First match in document order.
    pub fn first(&self) -> ElementRef {
        self.nth(0)
    }

    pub fn nth(&self, index: usize) -> ElementRef {
        ElementRef {
            strategy: self.strategy.clone(),
            index,
        }
    }
}
