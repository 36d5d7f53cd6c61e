//! Ordered strategies tried in sequence, stopping at the first success.
//!
//! Used for the two-tier record parser fallback and for the per-field
//! metadata pattern lists.

/// A single way of producing an output from some input.
pub trait Strategy<I: ?Sized> {
    /// What a successful attempt yields.
    type Output;

    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Try to produce an output. `None` means "try the next strategy".
    fn attempt(&self, input: &I) -> Option<Self::Output>;
}

/// Run `strategies` in order and return the first success together with the
/// name of the strategy that produced it.
pub fn first_match<'a, I, O>(
    input: &I,
    strategies: &[&'a dyn Strategy<I, Output = O>],
) -> Option<(&'a str, O)>
where
    I: ?Sized,
{
    strategies.iter().find_map(|strategy| {
        let strategy: &'a dyn Strategy<I, Output = O> = *strategy;
        strategy.attempt(input).map(|output| (strategy.name(), output))
    })
}
