//! Config subcommand handlers.

use fleetwatch_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// Copy of `cfg` with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(REDACTED.into());
        }
        if profile.store.token.is_some() {
            profile.store.token = Some(REDACTED.into());
        }
    }
    cfg
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config()?);
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| format!("{c:#?}"),
                |c| c.active_profile_name().to_owned(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use fleetwatch_config::Profile;

    use super::*;

    #[test]
    fn secrets_are_masked() {
        let mut cfg = Config::default();
        let mut profile = Profile {
            api_key: Some("plain-key".into()),
            ..Profile::default()
        };
        profile.store.token = Some("plain-token".into());
        cfg.profiles.insert("default".into(), profile);

        let shown = format!("{:?}", redacted(&cfg));
        assert!(!shown.contains("plain-key"));
        assert!(!shown.contains("plain-token"));
        assert!(shown.contains(REDACTED));
    }
}
