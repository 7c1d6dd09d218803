//! UI preferences remembered between runs. Study progress lives in
//! [`crate::progress`], not here.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct ViewState {
    pub theme_name: Option<String>,
    pub selected_index: Option<usize>,
}

pub fn load_state(path: &Path) -> ViewState {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn save_state(path: &Path, state: &ViewState) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match serde_json::to_string_pretty(state) {
        Ok(json) => {
            if let Err(e) = fs::write(path, json) {
                tracing::warn!(error = %e, "Could not save view state");
            }
        }
        Err(e) => tracing::warn!(error = %e, "Could not encode view state"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_and_restores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.json");
        let state = ViewState {
            theme_name: Some("gruvbox".to_string()),
            selected_index: Some(4),
        };
        save_state(&path, &state);
        assert_eq!(load_state(&path), state);
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.json");
        fs::write(&path, "{{{").unwrap();
        assert_eq!(load_state(&path), ViewState::default());
        assert_eq!(load_state(&dir.path().join("missing.json")), ViewState::default());
    }
}
