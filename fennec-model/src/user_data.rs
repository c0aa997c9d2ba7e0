use crate::ids::{ElementId, deserialize_optional_id};
use crate::ticks::Ticks;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user playback state attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserItemData {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub item_id: Option<ElementId>,
    #[serde(default)]
    pub played: bool,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub play_count: u32,
    #[serde(default)]
    pub playback_position_ticks: Ticks,
    #[serde(default)]
    pub played_percentage: Option<f64>,
    #[serde(default)]
    pub last_played_date: Option<DateTime<Utc>>,
}
