//! Selection state for the editable overlays

use serde::{Deserialize, Serialize};

/// Which overlay is active
///
/// Only affects decorations and gesture routing.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    None,
    Image,
    Text,
}

/// Overlay addressed by a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Image,
    Text,
}

impl From<Target> for Selection {
    fn from(target: Target) -> Self {
        match target {
            Target::Image => Selection::Image,
            Target::Text => Selection::Text,
        }
    }
}
