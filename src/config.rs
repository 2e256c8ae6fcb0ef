use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BoothConfig {
    pub content_url: Option<String>,
    pub content_token: Option<String>,
    pub team_id: Option<String>,
    pub game_id: Option<String>,
    pub home: String,
    pub away: String,
    pub toast_ttl: Duration,
    pub copy_confirm_ttl: Duration,
    pub content_timeout: Duration,
    pub fetch_parallelism: usize,
    pub export_dir: PathBuf,
    pub fake_fail_rate: f64,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            content_url: None,
            content_token: None,
            team_id: None,
            game_id: None,
            home: "HOME".to_string(),
            away: "AWAY".to_string(),
            toast_ttl: Duration::from_secs(3),
            copy_confirm_ttl: Duration::from_secs(2),
            content_timeout: Duration::from_secs(20),
            fetch_parallelism: 4,
            export_dir: PathBuf::from("."),
            fake_fail_rate: 0.0,
        }
    }
}

impl BoothConfig {
    /// Reads `BOOTH_*` variables. Call after loading `.env` files.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            content_url: opt_env("BOOTH_CONTENT_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            content_token: opt_env("BOOTH_CONTENT_TOKEN"),
            team_id: opt_env("BOOTH_TEAM_ID"),
            game_id: opt_env("BOOTH_GAME_ID"),
            home: opt_env("BOOTH_HOME").unwrap_or(defaults.home),
            away: opt_env("BOOTH_AWAY").unwrap_or(defaults.away),
            toast_ttl: Duration::from_secs(secs_env("BOOTH_TOAST_SECS", 3, 1, 30)),
            copy_confirm_ttl: Duration::from_secs(secs_env("BOOTH_COPY_FLASH_SECS", 2, 1, 30)),
            content_timeout: Duration::from_secs(secs_env(
                "BOOTH_CONTENT_TIMEOUT_SECS",
                20,
                2,
                120,
            )),
            fetch_parallelism: env::var("BOOTH_FETCH_PARALLELISM")
                .ok()
                .and_then(|val| val.parse::<usize>().ok())
                .unwrap_or(defaults.fetch_parallelism)
                .clamp(1, 16),
            export_dir: opt_env("BOOTH_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            fake_fail_rate: env::var("BOOTH_FAKE_FAIL_RATE")
                .ok()
                .and_then(|val| val.parse::<f64>().ok())
                .filter(|rate| rate.is_finite())
                .unwrap_or(defaults.fake_fail_rate)
                .clamp(0.0, 1.0),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.content_url.is_none()
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn secs_env(key: &str, default: u64, min: u64, max: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
        .clamp(min, max)
}
