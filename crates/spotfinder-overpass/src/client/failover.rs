/// Position in the ordered endpoint list during one fetch.
///
/// `Trying(i)` moves to `Success` on a good response, or to `Trying(i + 1)`
/// on failure until the list runs out, which ends in `Exhausted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailoverState {
    Trying(usize),
    Success,
    Exhausted,
}

impl FailoverState {
    #[must_use]
    pub fn start(endpoint_count: usize) -> Self {
        if endpoint_count == 0 {
            Self::Exhausted
        } else {
            Self::Trying(0)
        }
    }

    #[must_use]
    pub fn on_success(self) -> Self {
        match self {
            Self::Trying(_) => Self::Success,
            terminal => terminal,
        }
    }

    #[must_use]
    pub fn on_failure(self, endpoint_count: usize) -> Self {
        match self {
            Self::Trying(index) if index + 1 < endpoint_count => Self::Trying(index + 1),
            Self::Trying(_) => Self::Exhausted,
            terminal => terminal,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Exhausted)
    }
}
