use std::env;

/// Runtime configuration, read from `PGCALL_*` environment variables with
/// defaults suitable for a single session-scoped caller.
#[derive(Debug, Clone)]
pub struct Config {
    /// Overrides the schema list consulted for unqualified function names.
    /// When unset the live `SHOW search_path` result is used instead.
    pub search_path: Option<Vec<String>>,

    /// Maximum number of resolved function signatures kept in the LRU cache.
    pub signature_cache_size: usize,
}

impl Config {
    pub fn from_env() -> Self {
        let search_path = env::var("PGCALL_SEARCH_PATH").ok().map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        let signature_cache_size = env::var("PGCALL_SIGNATURE_CACHE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(500);

        Config {
            search_path,
            signature_cache_size,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            search_path: None,
            signature_cache_size: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.search_path.is_none());
        assert_eq!(config.signature_cache_size, 500);
    }
}
