/// Classification for retry policy.
///
/// Used by the price fetcher to decide whether a failed request is worth
/// another attempt before the symbol is recorded as a per-item failure.
///
/// | Class | Retry? |
/// |-------|--------|
/// | `Never` | No, the symbol is reported as failed immediately |
/// | `WithBackoff` | Yes, after an exponentially growing delay |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - bad symbol, validation error, or terminal failure.
    /// The request is fundamentally invalid and retrying won't help.
    Never,

    /// Transient failure (rate limiting, timeout, flaky connection).
    /// Retry after a backoff delay while the retry budget lasts.
    WithBackoff,
}
