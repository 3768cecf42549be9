//! Flag-aware configuration resolution.
//!
//! `fleetwatch_config` reads the TOML profiles; this module layers the
//! global CLI flags on top and hands out the runtime types of the core.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use fleetwatch_config::{self as config, Config, Profile};
use fleetwatch_core::{DashboardConfig, KeyValueStore, StoreConfig, TlsVerification, TrackerConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything a command needs, resolved once.
pub struct Resolved {
    pub profile_name: String,
    pub profile: Profile,
    pub config: Config,
}

impl Resolved {
    /// Load the config file and pick the profile named by `--profile`,
    /// the config's default, or `"default"`.
    ///
    /// The implicit default profile may be absent from the file; flags and
    /// env vars then supply everything. An explicitly named profile must
    /// exist.
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let config = config::load_config()?;
        let profile_name = global
            .profile
            .clone()
            .unwrap_or_else(|| config.active_profile_name().to_owned());

        let profile = match config.profiles.get(&profile_name) {
            Some(profile) => profile.clone(),
            None if global.profile.is_none() => Profile::default(),
            None => {
                let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
                available.sort_unstable();
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                    path: config::config_path().display().to_string(),
                });
            }
        };

        Ok(Self {
            profile: apply_flags(profile, global),
            profile_name,
            config,
        })
    }

    /// Tracking API connection. `--api-key` beats every configured source.
    pub fn tracker_config(&self, global: &GlobalOpts) -> Result<TrackerConfig, CliError> {
        let tracker = match global.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            Some(key) => config::tracker_config_with_key(
                &self.profile,
                SecretString::from(key.to_owned()),
                &self.config.defaults,
            )?,
            None => config::profile_to_tracker_config(
                &self.profile,
                &self.profile_name,
                &self.config.defaults,
            )?,
        };
        Ok(tracker)
    }

    pub fn store_config(&self) -> Result<StoreConfig, CliError> {
        Ok(config::profile_to_store_config(
            &self.profile,
            &self.profile_name,
            &self.config.defaults,
        )?)
    }

    /// Build the override/client store for this profile.
    pub fn store(&self) -> Result<Arc<dyn KeyValueStore>, CliError> {
        Ok(self.store_config()?.build()?)
    }

    /// Poll loop tuning; `interval` overrides the configured period.
    pub fn dashboard_config(&self, interval: Option<u64>) -> Result<DashboardConfig, CliError> {
        let mut dashboard = config::defaults_to_dashboard_config(&self.config.defaults)?;
        if let Some(secs) = interval {
            dashboard.poll_interval = Duration::from_secs(secs);
        }
        Ok(dashboard)
    }
}

/// Overlay `--base-url`, `--timeout` and `--insecure` onto a profile.
fn apply_flags(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref url) = global.base_url {
        profile.base_url.clone_from(url);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    profile
}

/// Whether a tracker config skips certificate checks, for a startup warning.
pub fn is_insecure(tracker: &TrackerConfig) -> bool {
    tracker.tls == TlsVerification::DangerAcceptInvalid
}
