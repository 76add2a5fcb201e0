//! CLI configuration: a thin wrapper around `keenawg_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--url, --login, --password, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use keenawg_core::{ConnectionConfig, RouterEndpoint, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use keenawg_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ConnectionConfig` from the config file, profile, and CLI
/// overrides.
pub fn build_connection_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<ConnectionConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global, &cfg.defaults);
    }

    // An explicitly requested profile must exist.
    if global.profile.is_some() {
        let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }

    // No profile: flags / env alone.
    let url = global.url.clone().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let password = global.password.clone().ok_or(CliError::NoCredentials {
        profile: profile_name,
    })?;

    Ok(ConnectionConfig {
        endpoint: RouterEndpoint::new(
            url,
            global.login.clone().unwrap_or_else(|| "admin".into()),
            SecretString::from(password),
        ),
        tls: if global.insecure || cfg.defaults.insecure {
            TlsVerification::DangerAcceptInvalid
        } else {
            TlsVerification::SystemDefaults
        },
        timeout: Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout)),
    })
}

/// Translate a `Profile` + global flags into a `ConnectionConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    defaults: &Defaults,
) -> Result<ConnectionConfig, CliError> {
    // 1. Router URL (flag > env > profile)
    let url = global.url.as_deref().unwrap_or(&profile.url);
    url::Url::parse(url).map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {url}"),
    })?;

    // 2. Login
    let login = global.login.as_deref().unwrap_or(&profile.login);

    // 3. Password (flag > profile chain)
    let password = match global.password {
        Some(ref pw) => SecretString::from(pw.clone()),
        None => keenawg_config::resolve_password(profile, profile_name)?,
    };

    // 4. TLS verification
    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        keenawg_config::profile_tls(profile, defaults.insecure)
    };

    // 5. Timeout
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(defaults.timeout);

    Ok(ConnectionConfig {
        endpoint: RouterEndpoint::new(url, login, password),
        tls,
        timeout: Duration::from_secs(timeout),
    })
}
