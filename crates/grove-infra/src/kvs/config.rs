use std::time::Duration;

pub const DEFAULT_EXPIRE_SECONDS: u64 = 300;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Key-value store configuration.
#[derive(Debug, Clone)]
pub struct KvsConfig {
    /// `host:port` or a full `redis://` URL. Checked when connecting, not here.
    pub host: Option<String>,
    /// Prefix applied to every key.
    pub namespace: String,
    /// Expiry applied to every write.
    pub expire_seconds: u64,
    pub connect_timeout: Duration,
    /// Pause between background reconnect attempts.
    pub retry_interval: Duration,
}

impl Default for KvsConfig {
    fn default() -> Self {
        Self {
            host: None,
            namespace: String::new(),
            expire_seconds: DEFAULT_EXPIRE_SECONDS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            retry_interval: RETRY_INTERVAL,
        }
    }
}

impl KvsConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let expire_seconds = positive_secs(&lookup, "KVS_EXPIRE_SECOND", DEFAULT_EXPIRE_SECONDS);
        let connect_timeout =
            positive_secs(&lookup, "KVS_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS);

        Self {
            host: lookup("KVS_HOST").filter(|h| !h.trim().is_empty()),
            namespace: lookup("KVS_NAMESPACE").unwrap_or_default(),
            expire_seconds,
            connect_timeout: Duration::from_secs(connect_timeout),
            retry_interval: RETRY_INTERVAL,
        }
    }

    /// Whether the in-process backend was requested instead of a server.
    pub fn is_memory(&self) -> bool {
        self.host.as_deref() == Some("memory")
    }

    pub(crate) fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }
}

/// A whole number of seconds above zero; anything else is logged and replaced by `default`.
fn positive_secs(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: u64) -> u64 {
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => secs,
        _ => {
            tracing::info!(variable = name, value = %raw, default, "invalid value, using default");
            default
        }
    }
}
