use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use datkit_lib::settings::{SETTING_KEYS, load_settings_string, set_value};
use datkit_lib::{Settings, default_workers, settings_path};

use crate::error::CliError;

/// Show the effective settings and the file they come from.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = settings_path();
    let settings = Settings::load()?;

    log::info!(
        "{}",
        "datkit Settings".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");
    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");

    let dedupe = &settings.dedupe;
    let workers = match dedupe.workers {
        Some(n) => n.to_string(),
        None => format!("{} (one per core)", default_workers()),
    };
    let fields = [
        ("dedupe.key", dedupe.key.to_string()),
        ("dedupe.scope", dedupe.scope.to_string()),
        ("dedupe.workers", workers),
        ("dedupe.soft_delete", dedupe.soft_delete.to_string()),
        ("dedupe.resolve_names", dedupe.resolve_names.to_string()),
    ];
    for (name, value) in fields {
        log::info!(
            "  {} {}",
            format!("{name}:").if_supports_color(Stdout, |t| t.cyan()),
            value,
        );
    }

    if let Some(raw) = load_settings_string() {
        log::debug!("Raw settings file:\n{raw}");
    }
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    log::info!("{}", settings_path().display());
    Ok(())
}

/// Update one setting in the settings file.
pub(crate) fn run_config_set(key: &str, value: &str) -> Result<(), CliError> {
    if !SETTING_KEYS.contains(&key) {
        return Err(CliError::usage(format!(
            "Unknown setting '{key}' (expected one of: {})",
            SETTING_KEYS.join(", ")
        )));
    }
    set_value(key, value)?;
    log::info!(
        "{} Set {} = {} in {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        key.if_supports_color(Stdout, |t| t.cyan()),
        value,
        settings_path().display(),
    );
    Ok(())
}
