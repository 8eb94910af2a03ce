/*
[INPUT]:  Operator keystrokes on stdin
[OUTPUT]: Resume signal for a task paused for manual takeover
[POS]:    CLI layer - blocking operator prompt bridged onto the async run loop
[UPDATE]: When the takeover confirmation interaction changes
*/

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use std::io::IsTerminal;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use autoglm_cli::TakeoverPrompt;

/// Waits for ENTER once the operator finished the step on the device
#[derive(Default)]
pub struct OperatorPrompt {
    piped: Option<Lines<BufReader<Stdin>>>,
}

#[async_trait]
impl TakeoverPrompt for OperatorPrompt {
    async fn wait_for_operator(&mut self) -> Result<()> {
        if std::io::stdin().is_terminal() {
            return tokio::task::spawn_blocking(confirm_on_terminal)
                .await
                .context("operator prompt task")?;
        }

        // Piped input: one line per takeover.
        let lines = self
            .piped
            .get_or_insert_with(|| BufReader::new(tokio::io::stdin()).lines());
        match lines
            .next_line()
            .await
            .context("read operator confirmation")?
        {
            Some(_) => Ok(()),
            None => bail!("stdin closed while waiting for manual takeover"),
        }
    }
}

fn confirm_on_terminal() -> Result<()> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("Press ENTER when the manual step is done")
        .allow_empty(true)
        .report(false)
        .interact_text()
        .context("read operator confirmation")?;
    Ok(())
}
