//! Parse options: worker count, sequential mode, cancellation,
//! skip-errors, and a composable field filter.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cheaply cloneable handle used to request cooperative cancellation of an
/// in-progress parse. Checked at task boundaries in the parallel
/// orchestrator, never pre-empted mid-decode.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The subset of a message's metadata available before its data section is
/// decoded, used to cheaply filter out unwanted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub message_index: usize,
    pub discipline: u8,
    pub centre_id: u16,
    pub parameter_category: u8,
    pub parameter_number: u8,
}

type Predicate = Arc<dyn Fn(&FieldInfo) -> bool + Send + Sync>;

/// Parse-time configuration. `ParseOptions::default()` matches the
/// single-message fast path: parallel with as many workers as the host
/// offers, no filtering, errors propagate immediately.
#[derive(Clone, Default)]
pub struct ParseOptions {
    pub(crate) worker_count: Option<usize>,
    pub(crate) sequential: bool,
    pub(crate) skip_errors: bool,
    pub(crate) cancellation: Option<CancellationToken>,
    predicates: Vec<Predicate>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the worker pool at `count` threads. Ignored when `sequential`
    /// is set.
    pub fn worker_count(mut self, count: usize) -> Self {
        self.worker_count = Some(count);
        self
    }

    /// Disables the rayon pool entirely, decoding messages one at a time on
    /// the calling thread. Useful for deterministic error ordering and for
    /// embedding in an already-threaded caller.
    pub fn sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    /// When set, a message that fails to parse is dropped from the result
    /// rather than aborting the whole parse.
    pub fn skip_errors(mut self, skip_errors: bool) -> Self {
        self.skip_errors = skip_errors;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Adds an arbitrary field filter. Filters compose with AND semantics.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&FieldInfo) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    pub fn only_discipline(self, discipline: u8) -> Self {
        self.filter(move |info| info.discipline == discipline)
    }

    pub fn only_parameter(self, category: u8, number: u8) -> Self {
        self.filter(move |info| info.parameter_category == category && info.parameter_number == number)
    }

    pub fn only_centre(self, centre_id: u16) -> Self {
        self.filter(move |info| info.centre_id == centre_id)
    }

    pub(crate) fn accepts(&self, info: &FieldInfo) -> bool {
        self.predicates.iter().all(|p| p(info))
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(discipline: u8, category: u8, number: u8, centre: u16) -> FieldInfo {
        FieldInfo {
            message_index: 0,
            discipline,
            centre_id: centre,
            parameter_category: category,
            parameter_number: number,
        }
    }

    #[test]
    fn default_accepts_everything() {
        let opts = ParseOptions::new();
        assert!(opts.accepts(&info(0, 0, 0, 0)));
    }

    #[test]
    fn filters_compose_with_and() {
        let opts = ParseOptions::new().only_discipline(0).only_parameter(0, 0);
        assert!(opts.accepts(&info(0, 0, 0, 7)));
        assert!(!opts.accepts(&info(0, 1, 0, 7)));
        assert!(!opts.accepts(&info(1, 0, 0, 7)));
    }

    #[test]
    fn cancellation_token_round_trip() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }
}
