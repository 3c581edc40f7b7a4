//! Runtime configuration, read from the environment

use di::inject;
use di::injectable;
use log::warn;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub bind_address: String,
    pub allowed_origins: Vec<String>,
    /// Pause after every model A fragment.
    pub model_a_delay: Duration,
    /// Pause after every model B fragment.
    pub model_b_delay: Duration,
    /// Pause between finishing model A and starting model B.
    pub inter_model_delay: Duration,
    /// Hard deadline for a whole stream. `None` disables it.
    pub stream_timeout: Option<Duration>,
    pub rng_seed: Option<u64>,
    pub seed_demo_data: bool,
    pub secure_cookies: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            bind_address: "0.0.0.0:3000".to_owned(),
            allowed_origins: vec![
                "http://localhost:3000".to_owned(),
                "http://localhost:5173".to_owned(),
            ],
            model_a_delay: Duration::from_millis(80),
            model_b_delay: Duration::from_millis(85),
            inter_model_delay: Duration::from_millis(150),
            stream_timeout: Some(Duration::from_secs(120)),
            rng_seed: None,
            seed_demo_data: false,
            secure_cookies: false,
        }
    }
}

#[injectable]
impl ArenaConfig {
    #[inject]
    pub fn create() -> ArenaConfig {
        dotenvy::dotenv().ok();
        ArenaConfig::from_lookup(|key| env::var(key).ok())
    }
}

impl ArenaConfig {
    /// Builds the config from any key lookup. Unparseable values keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ArenaConfig {
        let defaults = ArenaConfig::default();

        let millis = |key: &str, default: Duration| {
            parse::<u64>(&lookup, key)
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let stream_timeout = match parse::<u64>(&lookup, "ARENA_STREAM_TIMEOUT_SECS") {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.stream_timeout,
        };

        let allowed_origins = lookup("ARENA_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or(defaults.allowed_origins);

        ArenaConfig {
            bind_address: lookup("ARENA_BIND_ADDR").unwrap_or(defaults.bind_address),
            allowed_origins,
            model_a_delay: millis("ARENA_MODEL_A_DELAY_MS", defaults.model_a_delay),
            model_b_delay: millis("ARENA_MODEL_B_DELAY_MS", defaults.model_b_delay),
            inter_model_delay: millis("ARENA_INTER_MODEL_DELAY_MS", defaults.inter_model_delay),
            stream_timeout,
            rng_seed: parse(&lookup, "ARENA_RNG_SEED"),
            seed_demo_data: parse(&lookup, "ARENA_SEED_DEMO").unwrap_or(defaults.seed_demo_data),
            secure_cookies: parse(&lookup, "ARENA_SECURE_COOKIES")
                .unwrap_or(defaults.secure_cookies),
        }
    }

    /// Same config with every streaming pause removed.
    pub fn without_delays(self) -> ArenaConfig {
        ArenaConfig {
            model_a_delay: Duration::ZERO,
            model_b_delay: Duration::ZERO,
            inter_model_delay: Duration::ZERO,
            ..self
        }
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring invalid value `{raw}` for {key}");
            None
        }
    }
}
