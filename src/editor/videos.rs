use crate::editor::id::EntityId;
use crate::models::{Video, VideoPayload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSlot {
    pub id: EntityId,
    pub url: String,
    pub is_current: bool,
}

/// One exercise's video list. Holds the invariant that a non-empty list has
/// exactly one current video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSlots {
    slots: Vec<VideoSlot>,
}

impl VideoSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalises stored data: the first flagged video stays current, or the
    /// first video if none was flagged.
    pub fn from_videos(videos: &[Video]) -> Self {
        let current = videos
            .iter()
            .position(|v| v.is_current)
            .unwrap_or(0);
        let slots = videos
            .iter()
            .enumerate()
            .map(|(index, video)| VideoSlot {
                id: EntityId::persisted(video.id.clone()),
                url: video.url.clone(),
                is_current: index == current,
            })
            .collect();
        Self { slots }
    }

    pub fn add(&mut self, url: impl Into<String>) -> EntityId {
        let id = EntityId::new_draft();
        let is_current = self.slots.is_empty();
        self.slots.push(VideoSlot {
            id: id.clone(),
            url: url.into(),
            is_current,
        });
        id
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<VideoSlot> {
        let index = self.slots.iter().position(|slot| &slot.id == id)?;
        let removed = self.slots.remove(index);
        if removed.is_current {
            if let Some(first) = self.slots.first_mut() {
                first.is_current = true;
            }
        }
        Some(removed)
    }

    /// The only way to switch the current video.
    pub fn set_current(&mut self, id: &EntityId) -> bool {
        if !self.slots.iter().any(|slot| &slot.id == id) {
            return false;
        }
        for slot in self.slots.iter_mut() {
            slot.is_current = &slot.id == id;
        }
        true
    }

    pub fn current(&self) -> Option<&VideoSlot> {
        self.slots.iter().find(|slot| slot.is_current)
    }

    pub fn slots(&self) -> &[VideoSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn to_payload(&self) -> Vec<VideoPayload> {
        self.slots
            .iter()
            .map(|slot| VideoPayload {
                id: slot.id.as_persisted().map(str::to_string),
                url: slot.url.clone(),
                is_current: slot.is_current,
            })
            .collect()
    }
}
