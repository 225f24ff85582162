//! `dlgedit new` — write a fresh empty dialogue document.

use std::path::Path;

use anyhow::Result;

use crate::store;

pub fn run(file: &Path) -> Result<()> {
    store::create_empty(file)?;
    println!("  Created {}", file.display());
    Ok(())
}
