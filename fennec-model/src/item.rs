//! Server item DTOs.
//!
//! These mirror the subset of the Jellyfin `BaseItemDto` family the client
//! renders and pages through. Unknown fields are ignored on decode.

use crate::error::ModelError;
use crate::ids::{ElementId, deserialize_optional_id};
use crate::ticks::Ticks;
use crate::user_data::UserItemData;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    AggregateFolder,
    Audio,
    BoxSet,
    CollectionFolder,
    Episode,
    Folder,
    Genre,
    Movie,
    MusicVideo,
    Person,
    Playlist,
    Season,
    Series,
    Studio,
    TvChannel,
    UserView,
    Video,
    #[serde(other)]
    Unknown,
}

impl ItemKind {
    pub fn api_name(&self) -> &'static str {
        match self {
            ItemKind::AggregateFolder => "AggregateFolder",
            ItemKind::Audio => "Audio",
            ItemKind::BoxSet => "BoxSet",
            ItemKind::CollectionFolder => "CollectionFolder",
            ItemKind::Episode => "Episode",
            ItemKind::Folder => "Folder",
            ItemKind::Genre => "Genre",
            ItemKind::Movie => "Movie",
            ItemKind::MusicVideo => "MusicVideo",
            ItemKind::Person => "Person",
            ItemKind::Playlist => "Playlist",
            ItemKind::Season => "Season",
            ItemKind::Series => "Series",
            ItemKind::Studio => "Studio",
            ItemKind::TvChannel => "TvChannel",
            ItemKind::UserView => "UserView",
            ItemKind::Video => "Video",
            ItemKind::Unknown => "Unknown",
        }
    }

    /// Kinds a library grid can show.
    pub fn supported() -> &'static [ItemKind] {
        &[
            ItemKind::BoxSet,
            ItemKind::Episode,
            ItemKind::Movie,
            ItemKind::MusicVideo,
            ItemKind::Series,
            ItemKind::Video,
        ]
    }

    pub fn is_playable(&self) -> bool {
        matches!(
            self,
            ItemKind::Episode
                | ItemKind::Movie
                | ItemKind::MusicVideo
                | ItemKind::Video
                | ItemKind::TvChannel
                | ItemKind::Audio
        )
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ItemKind::AggregateFolder
                | ItemKind::BoxSet
                | ItemKind::CollectionFolder
                | ItemKind::Folder
                | ItemKind::Playlist
                | ItemKind::UserView
        )
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

impl FromStr for ItemKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "AggregateFolder" => ItemKind::AggregateFolder,
            "Audio" => ItemKind::Audio,
            "BoxSet" => ItemKind::BoxSet,
            "CollectionFolder" => ItemKind::CollectionFolder,
            "Episode" => ItemKind::Episode,
            "Folder" => ItemKind::Folder,
            "Genre" => ItemKind::Genre,
            "Movie" => ItemKind::Movie,
            "MusicVideo" => ItemKind::MusicVideo,
            "Person" => ItemKind::Person,
            "Playlist" => ItemKind::Playlist,
            "Season" => ItemKind::Season,
            "Series" => ItemKind::Series,
            "Studio" => ItemKind::Studio,
            "TvChannel" => ItemKind::TvChannel,
            "UserView" => ItemKind::UserView,
            "Video" => ItemKind::Video,
            other => {
                return Err(ModelError::UnknownVariant {
                    kind: "item kind",
                    value: other.to_string(),
                });
            }
        };
        Ok(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    Movies,
    TvShows,
    Music,
    MusicVideos,
    HomeVideos,
    BoxSets,
    Playlists,
    Folders,
    LiveTv,
    Mixed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChapterInfo {
    #[serde(default)]
    pub name: Option<String>,
    pub start_position_ticks: Ticks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BaseItem {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<ElementId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "Type", default)]
    pub kind: Option<ItemKind>,
    #[serde(default)]
    pub collection_type: Option<CollectionType>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub parent_id: Option<ElementId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub series_id: Option<ElementId>,
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub index_number: Option<u32>,
    #[serde(default)]
    pub parent_index_number: Option<u32>,
    #[serde(default)]
    pub production_year: Option<i32>,
    #[serde(default)]
    pub run_time_ticks: Option<Ticks>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub is_folder: Option<bool>,
    #[serde(default)]
    pub user_data: Option<UserItemData>,
    #[serde(default)]
    pub chapters: Vec<ChapterInfo>,
}

impl BaseItem {
    pub fn new(id: Option<ElementId>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id,
            name: Some(name.into()),
            kind: Some(kind),
            collection_type: None,
            parent_id: None,
            series_id: None,
            series_name: None,
            index_number: None,
            parent_index_number: None,
            production_year: None,
            run_time_ticks: None,
            overview: None,
            is_folder: None,
            user_data: None,
            chapters: Vec::new(),
        }
    }

    pub fn display_title(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn kind(&self) -> ItemKind {
        self.kind.unwrap_or(ItemKind::Unknown)
    }
}

/// A cast or crew member as listed by `/Persons`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<ElementId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
}

/// Name/id pair used for genres, studios and tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NamedItem {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<ElementId>,
    #[serde(default)]
    pub name: Option<String>,
}
