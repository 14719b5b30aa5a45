use crate::domain::error::DomainError;
use crate::infrastructure::matchers::euclidean::DEFAULT_TOLERANCE;
use chrono::Duration;
use std::path::PathBuf;

pub const CACHE_PATH_ENV: &str = "FACETIER_CACHE_PATH";
pub const EXPIRATION_ENV: &str = "FACETIER_EXPIRATION";
pub const TOLERANCE_ENV: &str = "FACETIER_TOLERANCE";

#[derive(Debug, Clone)]
pub struct FaceTierConfig {
    /// Detection input: a JSON-lines file, or `-` for stdin.
    pub input: String,
    pub resize_factor: f64,
    pub init_from_cache: bool,
    /// Directory holding the per-tier snapshots.
    pub cache_path: PathBuf,
    pub expiration_time: Duration,
    pub tolerance: f64,
    pub frame_stride: u32,
}

impl Default for FaceTierConfig {
    fn default() -> Self {
        Self {
            input: "-".into(),
            resize_factor: 0.25,
            init_from_cache: false,
            cache_path: PathBuf::from("./face_cache"),
            expiration_time: Duration::hours(1),
            tolerance: DEFAULT_TOLERANCE,
            frame_stride: 2,
        }
    }
}

impl FaceTierConfig {
    /// Defaults overridden by `FACETIER_*` environment variables.
    pub fn from_env() -> Result<Self, DomainError> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var(CACHE_PATH_ENV) {
            config.cache_path = PathBuf::from(path);
        }
        if let Ok(raw) = std::env::var(EXPIRATION_ENV) {
            config.expiration_time = parse_duration(&raw)?;
        }
        if let Ok(raw) = std::env::var(TOLERANCE_ENV) {
            config.tolerance = raw
                .trim()
                .parse()
                .map_err(|e| DomainError::InvalidInput(format!("{TOLERANCE_ENV}: {e}")))?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !(self.resize_factor > 0.0 && self.resize_factor <= 1.0) {
            return Err(DomainError::InvalidInput(format!(
                "Resize factor must be in (0, 1], got {}",
                self.resize_factor
            )));
        }
        if self.expiration_time <= Duration::zero() {
            return Err("Expiration time must be positive".into());
        }
        if self.frame_stride == 0 {
            return Err("Frame stride must be at least 1".into());
        }
        Ok(())
    }
}

/// Parses `30s`, `15m`, `1h`, `7d` or a bare number of seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, DomainError> {
    let s = raw.trim();
    let invalid = || {
        DomainError::InvalidInput(format!(
            "Invalid duration: {raw}. Use e.g. 90, 30s, 15m, 1h or 7d"
        ))
    };
    let (digits, unit) = match s.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&s[..i], Some(c.to_ascii_lowercase())),
        Some(_) => (s, None),
        None => return Err(invalid()),
    };
    let n: i64 = digits.trim().parse().map_err(|_| invalid())?;
    if n < 0 {
        return Err(invalid());
    }
    let duration = match unit {
        None | Some('s') => Duration::try_seconds(n),
        Some('m') => Duration::try_minutes(n),
        Some('h') => Duration::try_hours(n),
        Some('d') => Duration::try_days(n),
        Some(_) => None,
    };
    duration.ok_or_else(invalid)
}
