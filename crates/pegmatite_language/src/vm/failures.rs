//! Rightmost-failure tracking.

use pegmatite_foundation::Expectation;

/// Keeps the expectations recorded at the furthest failure position.
#[derive(Debug, Default)]
pub struct FailureTracker {
    max_pos: usize,
    expected: Vec<Expectation>,
}

impl FailureTracker {
    /// Creates an empty tracker at position 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `expectation` at `pos`.
    ///
    /// Earlier positions are ignored; a further position starts a new set.
    pub fn record(&mut self, pos: usize, expectation: &Expectation) {
        if pos < self.max_pos {
            return;
        }
        if pos > self.max_pos {
            self.max_pos = pos;
            self.expected.clear();
        }
        self.expected.push(expectation.clone());
    }

    /// The furthest failure position.
    #[must_use]
    pub fn max_pos(&self) -> usize {
        self.max_pos
    }

    /// Expectations recorded at [`Self::max_pos`], in recording order.
    #[must_use]
    pub fn expected(&self) -> &[Expectation] {
        &self.expected
    }

    /// Moves the expectation set out.
    pub fn take_expected(&mut self) -> Vec<Expectation> {
        std::mem::take(&mut self.expected)
    }
}
