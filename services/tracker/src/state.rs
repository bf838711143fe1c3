//! Application state shared across handlers

use std::path::PathBuf;

use crate::service::TrackerService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: TrackerService,
    pub views_dir: PathBuf,
    pub public_dir: PathBuf,
}
