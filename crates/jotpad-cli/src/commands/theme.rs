//! Theme command handlers

use anyhow::Result;

use jotpad_core::{Command, Outcome};

use super::Pad;
use crate::output::Output;

pub fn show(pad: &Pad, output: &Output) -> Result<()> {
    output.print_theme(pad.theme());
    Ok(())
}

/// Switch between light and dark
pub async fn toggle(pad: &mut Pad, output: &Output) -> Result<()> {
    match pad.dispatch(Command::ToggleTheme).await {
        Outcome::Theme(theme) => output.print_theme(theme),
        other => anyhow::bail!("Unexpected result while toggling theme: {:?}", other),
    }
    Ok(())
}
