use std::future::Future;
use std::time::Duration;

/// Repeats `probe` until `should_continue` rejects its result, then returns that result.
///
/// Probes never overlap: the next one starts only after the previous resolved and
/// `interval` has elapsed. `should_continue` only ever sees resolved results.
/// A failed probe ends the loop and the error goes to the caller unchanged.
pub async fn poll<T, E, P, Fut, C>(
    mut probe: P,
    mut should_continue: C,
    interval: Duration,
) -> Result<T, E>
where
    P: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: FnMut(&T) -> bool,
{
    let mut result = probe().await?;
    while should_continue(&result) {
        tokio::time::sleep(interval).await;
        result = probe().await?;
    }
    Ok(result)
}
