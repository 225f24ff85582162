//! `dlgedit view` — open the interactive canvas editor.

use std::path::Path;

use anyhow::Result;

use crate::tui::canvas;

pub fn run(file: &Path) -> Result<()> {
    canvas::run(file)
}
