//! Filter and sort selections applied to library queries.

use crate::item::ItemKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemSortBy {
    SortName,
    DateCreated,
    DatePlayed,
    PremiereDate,
    ProductionYear,
    CommunityRating,
    CriticRating,
    Runtime,
    PlayCount,
    Random,
}

impl ItemSortBy {
    pub fn api_name(&self) -> &'static str {
        match self {
            ItemSortBy::SortName => "SortName",
            ItemSortBy::DateCreated => "DateCreated",
            ItemSortBy::DatePlayed => "DatePlayed",
            ItemSortBy::PremiereDate => "PremiereDate",
            ItemSortBy::ProductionYear => "ProductionYear",
            ItemSortBy::CommunityRating => "CommunityRating",
            ItemSortBy::CriticRating => "CriticRating",
            ItemSortBy::Runtime => "Runtime",
            ItemSortBy::PlayCount => "PlayCount",
            ItemSortBy::Random => "Random",
        }
    }
}

impl fmt::Display for ItemSortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn api_name(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "Ascending",
            SortOrder::Descending => "Descending",
        }
    }
}

/// Boolean item traits the server can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemTrait {
    IsFavorite,
    IsPlayed,
    IsUnplayed,
    IsResumable,
    Likes,
    Dislikes,
}

impl ItemTrait {
    pub fn api_name(&self) -> &'static str {
        match self {
            ItemTrait::IsFavorite => "IsFavorite",
            ItemTrait::IsPlayed => "IsPlayed",
            ItemTrait::IsUnplayed => "IsUnplayed",
            ItemTrait::IsResumable => "IsResumable",
            ItemTrait::Likes => "Likes",
            ItemTrait::Dislikes => "Dislikes",
        }
    }
}

/// The active filter set of a library surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemFilterCollection {
    pub query: Option<String>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub years: Vec<i32>,
    pub traits: Vec<ItemTrait>,
    pub item_kinds: Vec<ItemKind>,
    /// First-letter jump. `#` selects names sorting before `A`.
    pub letter: Option<char>,
    pub sort_by: Vec<ItemSortBy>,
    pub sort_order: Vec<SortOrder>,
}

impl Default for ItemFilterCollection {
    fn default() -> Self {
        Self {
            query: None,
            genres: Vec::new(),
            tags: Vec::new(),
            years: Vec::new(),
            traits: Vec::new(),
            item_kinds: Vec::new(),
            letter: None,
            sort_by: vec![ItemSortBy::SortName],
            sort_order: vec![SortOrder::Ascending],
        }
    }
}

impl ItemFilterCollection {
    /// Pages of a random ordering are not stable across requests, so
    /// callers must exclude what they already hold.
    pub fn is_random_sort(&self) -> bool {
        self.sort_by.first() == Some(&ItemSortBy::Random)
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = if query.trim().is_empty() {
            None
        } else {
            Some(query)
        };
        self
    }

    pub fn with_sort(mut self, sort_by: ItemSortBy, order: SortOrder) -> Self {
        self.sort_by = vec![sort_by];
        self.sort_order = vec![order];
        self
    }

    pub fn has_active_filters(&self) -> bool {
        self.query.is_some()
            || !self.genres.is_empty()
            || !self.tags.is_empty()
            || !self.years.is_empty()
            || !self.traits.is_empty()
            || !self.item_kinds.is_empty()
            || self.letter.is_some()
    }
}
