use serde::Deserialize;

/// Argon2 cost parameters, passed explicitly into every hashing call.
#[derive(Debug, Clone, Deserialize)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        // Argon2id defaults from the argon2 crate (19 MiB, t=2, p=1).
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub database_url: String,
    pub hash: HashConfig,
}

impl StoreConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let defaults = HashConfig::default();
        let hash = HashConfig {
            memory_kib: std::env::var("ARGON2_MEMORY_KIB")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(defaults.memory_kib),
            iterations: std::env::var("ARGON2_ITERATIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(defaults.iterations),
            parallelism: std::env::var("ARGON2_PARALLELISM")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(defaults.parallelism),
        };
        Ok(Self { database_url, hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hash_config_matches_argon2_defaults() {
        let cfg = HashConfig::default();
        assert_eq!(cfg.memory_kib, 19 * 1024);
        assert_eq!(cfg.iterations, 2);
        assert_eq!(cfg.parallelism, 1);
    }
}
