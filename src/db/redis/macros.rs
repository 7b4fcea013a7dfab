/// Read-through caching around an async computation.
///
/// Returns the cached value for `$key` when present. Otherwise awaits
/// `$block` (propagating its error with `?`), queues the result for a
/// background write with the given TTL in seconds, and returns it.
///
/// # Example
/// ```rust,ignore
/// let tracks: Vec<TrackMatch> = cached!(self.cache, key, SEARCH_CACHE_TTL, async move {
///     fetch_from_api().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Some(hit) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(hit)
            }
            None => {
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
