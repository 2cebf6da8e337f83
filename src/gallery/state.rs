use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Photo identifier as the backend spells it: a kind prefix and a numeric
/// suffix joined by `#`, e.g. `image#42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(String);

impl PhotoId {
    pub fn image(suffix: &str) -> Self {
        PhotoId(format!("image#{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Suffix after the kind prefix; the likes endpoint addresses photos by it.
    pub fn suffix(&self) -> &str {
        self.0.split_once('#').map(|(_, rest)| rest).unwrap_or(&self.0)
    }
}

impl From<String> for PhotoId {
    fn from(raw: String) -> Self {
        PhotoId(raw)
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: PhotoId,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    #[serde(rename = "web")]
    pub full_url: String,
    #[serde(rename = "likes", default)]
    pub like_count: u32,
}

/// One photo as the rendering shell sees it, liked flag folded in.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoView {
    pub id: PhotoId,
    pub thumbnail_url: String,
    pub full_url: String,
    pub like_count: u32,
    pub liked: bool,
}

/// Append-only photo sequence plus the device's liked set. Ordering is
/// arrival order; records never move or drop once appended.
#[derive(Debug, Default)]
pub struct PhotoCollection {
    records: Vec<PhotoRecord>,
    ids: HashSet<PhotoId>,
    liked: HashSet<PhotoId>,
}

impl PhotoCollection {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &PhotoId) -> bool {
        self.ids.contains(id)
    }

    pub fn is_liked(&self, id: &PhotoId) -> bool {
        self.liked.contains(id)
    }

    pub fn like_count(&self, id: &PhotoId) -> Option<u32> {
        self.record(id).map(|record| record.like_count)
    }

    /// Append a fetched page in arrival order, dropping records whose id is
    /// already present. Returns how many records were actually added.
    pub fn append(&mut self, records: Vec<PhotoRecord>) -> usize {
        let mut appended = 0;
        for record in records {
            if !self.ids.insert(record.id.clone()) {
                continue;
            }
            self.records.push(record);
            appended += 1;
        }
        appended
    }

    /// Swap in the reconciled liked set wholesale.
    pub fn replace_likes(&mut self, liked: HashSet<PhotoId>) {
        self.liked = liked;
    }

    /// Set the liked flag for one photo, moving its count in the same step.
    /// A call that matches the current flag changes nothing.
    pub fn set_like_state(&mut self, id: &PhotoId, liked: bool) -> bool {
        if self.liked.contains(id) == liked {
            return false;
        }
        if liked {
            self.liked.insert(id.clone());
        } else {
            self.liked.remove(id);
        }
        if let Some(record) = self.record_mut(id) {
            record.like_count = if liked {
                record.like_count.saturating_add(1)
            } else {
                record.like_count.saturating_sub(1)
            };
        }
        true
    }

    pub fn view(&self, index: usize) -> Option<PhotoView> {
        self.records.get(index).map(|record| PhotoView {
            id: record.id.clone(),
            thumbnail_url: record.thumbnail_url.clone(),
            full_url: record.full_url.clone(),
            like_count: record.like_count,
            liked: self.liked.contains(&record.id),
        })
    }

    pub fn snapshot(&self) -> Vec<PhotoView> {
        self.records
            .iter()
            .map(|record| PhotoView {
                id: record.id.clone(),
                thumbnail_url: record.thumbnail_url.clone(),
                full_url: record.full_url.clone(),
                like_count: record.like_count,
                liked: self.liked.contains(&record.id),
            })
            .collect()
    }

    fn record(&self, id: &PhotoId) -> Option<&PhotoRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    fn record_mut(&mut self, id: &PhotoId) -> Option<&mut PhotoRecord> {
        self.records.iter_mut().find(|record| &record.id == id)
    }
}

/// In-progress optimistic like flip. `apply` mutates the collection right
/// away; the caller settles the flip with exactly one of `commit` or
/// `rollback` once the remote update resolves.
#[derive(Debug)]
pub struct LikeToggle {
    id: PhotoId,
    has_liked: bool,
    count_delta: i64,
}

impl LikeToggle {
    pub fn apply(photos: &mut PhotoCollection, id: &PhotoId) -> LikeToggle {
        let has_liked = !photos.is_liked(id);
        let before = photos.like_count(id);
        photos.set_like_state(id, has_liked);
        let after = photos.like_count(id);
        let count_delta = match (before, after) {
            (Some(before), Some(after)) => i64::from(after) - i64::from(before),
            _ => 0,
        };
        LikeToggle {
            id: id.clone(),
            has_liked,
            count_delta,
        }
    }

    /// State the flip moved the photo into.
    pub fn has_liked(&self) -> bool {
        self.has_liked
    }

    pub fn commit(self) {}

    /// Undo exactly what `apply` did: the flag flip, and the count change as
    /// it was actually applied, so a flip clamped at zero rolls back to zero.
    pub fn rollback(self, photos: &mut PhotoCollection) {
        if self.has_liked {
            photos.liked.remove(&self.id);
        } else {
            photos.liked.insert(self.id.clone());
        }
        if self.count_delta != 0 {
            if let Some(record) = photos.record_mut(&self.id) {
                let restored = i64::from(record.like_count) - self.count_delta;
                record.like_count = restored.max(0) as u32;
            }
        }
    }
}

/// Modal viewer position over the photo sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lightbox {
    #[default]
    Closed,
    Open(usize),
}

impl Lightbox {
    pub fn index(&self) -> Option<usize> {
        match self {
            Lightbox::Open(index) => Some(*index),
            Lightbox::Closed => None,
        }
    }
}

/// Outcome of a forward step in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxAdvance {
    Advanced(usize),
    Wrapped(WrapCause),
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapCause {
    /// Every photo is loaded and the last one was showing.
    EndOfFeed,
    /// More photos exist but the next page could not be fetched; the link is
    /// kept so a later step can retry.
    FetchFailed,
}
