use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::session::Session;

/// Serialize a session as pretty-printed JSON.
pub fn session_to_json(session: &Session) -> Result<String> {
    Ok(serde_json::to_string_pretty(session)?)
}

/// Parse and validate a JSON session.
pub fn session_from_json(json: &str) -> Result<Session> {
    let session: Session = serde_json::from_str(json)?;
    session.validate()?;
    Ok(session)
}

pub fn save_session(session: &Session, path: &Path) -> Result<()> {
    fs::write(path, session_to_json(session)?)?;
    info!(
        path = %path.display(),
        markers = session.markers.len(),
        "Session saved"
    );
    Ok(())
}

pub fn load_session(path: &Path) -> Result<Session> {
    let contents = fs::read_to_string(path)?;
    let session = session_from_json(&contents)?;
    info!(
        path = %path.display(),
        markers = session.markers.len(),
        "Session loaded"
    );
    Ok(session)
}
