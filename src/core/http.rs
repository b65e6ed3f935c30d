use once_cell::sync::Lazy;

/// Shared async HTTP client for geocoding and routing requests
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("roamance-map/", env!("CARGO_PKG_VERSION")))
        .tcp_keepalive(std::time::Duration::from_secs(30))
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .build()
        .unwrap_or_else(|err| {
            log::warn!("falling back to default HTTP client: {}", err);
            reqwest::Client::new()
        })
});
