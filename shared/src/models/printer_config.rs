//! Printer configuration model (one per restaurant)

use serde::{Deserialize, Serialize};

/// Characters per line on 80mm paper
pub const DEFAULT_PAPER_WIDTH: u8 = 48;
pub const MIN_PAPER_WIDTH: u8 = 32;
pub const MAX_PAPER_WIDTH: u8 = 64;

/// Printer settings shared by every device of a restaurant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterConfig {
    pub restaurant_id: String,
    /// Characters per line
    pub paper_width: u8,
    /// Receipt template, opaque to the bridge
    #[serde(default)]
    pub template: Option<String>,
    pub updated_at: i64,
}

/// Upsert payload for a restaurant's printer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterConfigUpdate {
    #[serde(default = "default_paper_width")]
    pub paper_width: u8,
    #[serde(default)]
    pub template: Option<String>,
}

fn default_paper_width() -> u8 {
    DEFAULT_PAPER_WIDTH
}
