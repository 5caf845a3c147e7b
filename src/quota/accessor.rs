use tracing::debug;

use super::{CounterName, NamedCounter, QuotaError};
use crate::authority::AuthorityClient;

/// Resolve a counter by name against the remote store.
///
/// Substring match scoped to the license key; first match wins. The remote
/// id is re-resolved on every call and never cached, so an upstream rename
/// takes effect on the next operation. A name with no remote counter is
/// unrecoverable configuration drift for the caller's operation.
pub async fn lookup(
    authority: &AuthorityClient,
    name: CounterName,
) -> Result<NamedCounter, QuotaError> {
    let counters = authority.list_counters(name.as_str()).await?;
    counters
        .into_iter()
        .next()
        .ok_or(QuotaError::CounterMissing(name))
}

/// Apply a relative increase to a usage counter.
pub async fn increment(
    authority: &AuthorityClient,
    name: CounterName,
    delta: i64,
) -> Result<(), QuotaError> {
    let counter = lookup(authority, name).await?;
    authority.increment_counter(counter.id, delta).await?;
    debug!(counter = %name, delta, "Incremented usage counter");
    Ok(())
}

/// Consume quota units: a relative decrease on the counter.
pub async fn decrement(
    authority: &AuthorityClient,
    name: CounterName,
    delta: i64,
) -> Result<(), QuotaError> {
    let counter = lookup(authority, name).await?;
    authority.decrement_counter(counter.id, delta).await?;
    debug!(counter = %name, delta, "Consumed quota units");
    Ok(())
}

/// Whether the counter has quota left (`value > 0` at resolution time).
///
/// Read-then-decide only: there is no atomic decrement-if-positive, so
/// concurrent consumers that both observe a positive value can drive the
/// counter negative. Callers accept that looseness.
pub async fn is_quota_available(
    authority: &AuthorityClient,
    name: CounterName,
) -> Result<bool, QuotaError> {
    let counter = lookup(authority, name).await?;
    debug!(counter = %name, value = counter.value, "Checked remote quota value");
    Ok(counter.value > 0)
}
