//! Board description loaded from RON

use serde::Deserialize;
use trellis_core::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    /// Percent complete, 0 to 100
    pub progress: u32,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.progress >= 100
    }
}

/// A board title plus successive snapshots of its tasks
#[derive(Debug, Clone, Deserialize)]
pub struct Board {
    pub title: String,
    pub rounds: Vec<Vec<Task>>,
}

impl Board {
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Look up the task a card is bound to
pub fn find(tasks: &[Task], id: Option<i64>) -> Option<&Task> {
    let id = id?;
    tasks.iter().find(|t| t.id == id)
}
