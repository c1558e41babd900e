use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kasuri_core::io::session_file::load_session;

use crate::summary::print_session_summary;

#[derive(Args)]
pub struct InfoArgs {
    /// Session file
    pub session: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let session = load_session(&args.session)
        .with_context(|| format!("Failed to load session {}", args.session.display()))?;
    print_session_summary(&session, &args.session);
    Ok(())
}
