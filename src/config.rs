//! Runtime configuration from the environment.
//!
//! An optional `.env` file in the working directory is loaded first; real
//! environment variables take precedence over it.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::context::ServiceContext;

/// Store root used when `FOLIO_STORE` is unset.
pub const DEFAULT_STORE: &str = ".folio";
/// Actor used when `FOLIO_ACTOR` is unset.
pub const DEFAULT_ACTOR: &str = "local";

/// Settings for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory of the collection store (`FOLIO_STORE`).
    pub store: PathBuf,
    /// Actor id handed to the permission gate (`FOLIO_ACTOR`).
    pub actor: String,
    /// Pins the clock when set (`FOLIO_FIXED_TIME`, RFC 3339).
    pub fixed_time: Option<DateTime<Utc>>,
}

impl Config {
    /// Reads `.env` and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error string if `FOLIO_FIXED_TIME` is not RFC 3339.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error string if `FOLIO_FIXED_TIME` is not RFC 3339.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let fixed_time = non_empty("FOLIO_FIXED_TIME")
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw.trim())
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| format!("invalid FOLIO_FIXED_TIME {raw:?}: {e}"))
            })
            .transpose()?;
        Ok(Self {
            store: non_empty("FOLIO_STORE").map_or_else(|| PathBuf::from(DEFAULT_STORE), PathBuf::from),
            actor: non_empty("FOLIO_ACTOR").unwrap_or_else(|| DEFAULT_ACTOR.to_string()),
            fixed_time,
        })
    }

    /// Builds the service context this configuration asks for.
    #[must_use]
    pub fn context(&self) -> ServiceContext {
        match self.fixed_time {
            Some(now) => ServiceContext::fixed(now),
            None => ServiceContext::live(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let config = config(&[("FOLIO_ACTOR", "  ")]).unwrap();
        assert_eq!(config.store, PathBuf::from(".folio"));
        assert_eq!(config.actor, "local");
        assert_eq!(config.fixed_time, None);
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("FOLIO_STORE", "/data/folio"),
            ("FOLIO_ACTOR", "ada"),
            ("FOLIO_FIXED_TIME", "2026-02-18T10:00:00Z"),
        ])
        .unwrap();
        assert_eq!(config.store, PathBuf::from("/data/folio"));
        assert_eq!(config.actor, "ada");
        let pinned = Utc.with_ymd_and_hms(2026, 2, 18, 10, 0, 0).unwrap();
        assert_eq!(config.fixed_time, Some(pinned));
        assert_eq!(config.context().clock.now(), pinned);
    }

    #[test]
    fn rejects_malformed_fixed_time() {
        let err = config(&[("FOLIO_FIXED_TIME", "next tuesday")]).unwrap_err();
        assert!(err.contains("FOLIO_FIXED_TIME"));
    }
}
