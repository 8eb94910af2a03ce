/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML settings file
[POS]:    CLI initialization layer
[UPDATE]: When FileSettings schema changes
*/

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::{Input, Password, theme::ColorfulTheme};
use std::path::PathBuf;

use autoglm_adapter::DEFAULT_ENDPOINT;
use autoglm_cli::FileSettings;
use autoglm_cli::config::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_LOG_DIR};

pub fn run_init(output: PathBuf) -> Result<()> {
    println!("{}", style("Welcome to AutoGLM client setup").bold().cyan());
    println!(
        "{}",
        style("This will guide you through creating a settings file.").dim()
    );

    let theme = ColorfulTheme::default();

    println!("\n{}", style("--- Credentials ---").bold());
    let api_key: String = Password::with_theme(&theme)
        .with_prompt("API key")
        .interact()?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    println!("\n{}", style("--- Connection ---").bold());
    let endpoint: String = Input::with_theme(&theme)
        .with_prompt("WebSocket endpoint")
        .default(DEFAULT_ENDPOINT.to_string())
        .interact_text()?;

    let connect_timeout_secs: u64 = Input::with_theme(&theme)
        .with_prompt("Connect timeout (seconds)")
        .default(DEFAULT_CONNECT_TIMEOUT_SECS)
        .validate_with(|secs: &u64| {
            if *secs == 0 {
                Err("must be at least one second")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    println!("\n{}", style("--- Audit log ---").bold());
    let log_dir: String = Input::with_theme(&theme)
        .with_prompt("Log directory")
        .default(DEFAULT_LOG_DIR.to_string())
        .interact_text()?;

    let settings = FileSettings {
        api_key: Some(api_key.trim().to_string()),
        endpoint: Some(endpoint),
        log_dir: Some(PathBuf::from(log_dir)),
        connect_timeout_secs: Some(connect_timeout_secs),
    };

    let yaml = serde_yaml::to_string(&settings).context("failed to serialize settings to YAML")?;

    std::fs::write(&output, yaml)
        .with_context(|| format!("failed to write settings to {}", output.display()))?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!("Settings written to: {}", style(output.display()).cyan());
    println!(
        "Run a task with: {}",
        style(format!("autoglm task --config {} \"open maps\"", output.display())).dim()
    );

    Ok(())
}
