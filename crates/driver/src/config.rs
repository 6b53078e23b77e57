use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Process configuration for a driven session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Directory of the file store
    pub data_dir: PathBuf,
    /// Piece roller seed; None derives one from the wall clock
    pub seed: Option<u32>,
    /// Continue a saved game instead of starting fresh
    pub resume: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".tetris"),
            seed: None,
            resume: false,
        }
    }
}

impl DriverConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let data_dir = env::var("TETRIS_DATA_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".tetris"));

        let seed = env::var("TETRIS_SEED").ok().and_then(|s| s.trim().parse().ok());

        let resume = env::var("TETRIS_RESUME")
            .map(|s| parse_flag(&s))
            .unwrap_or(false);

        Self {
            data_dir,
            seed,
            resume,
        }
    }

    pub fn seed_or_clock(&self) -> u32 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_explicit_seed_wins() {
        let config = DriverConfig {
            seed: Some(99),
            ..DriverConfig::default()
        };
        assert_eq!(config.seed_or_clock(), 99);
    }

    #[test]
    fn test_from_env() {
        // Only this test touches these variables.
        std::env::set_var("TETRIS_DATA_DIR", "/tmp/tetris-data");
        std::env::set_var("TETRIS_SEED", "1234");
        std::env::set_var("TETRIS_RESUME", "yes");
        let config = DriverConfig::from_env();
        std::env::remove_var("TETRIS_DATA_DIR");
        std::env::remove_var("TETRIS_SEED");
        std::env::remove_var("TETRIS_RESUME");

        assert_eq!(config.data_dir, PathBuf::from("/tmp/tetris-data"));
        assert_eq!(config.seed, Some(1234));
        assert!(config.resume);
    }
}
