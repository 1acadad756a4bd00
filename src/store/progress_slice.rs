use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::models::{ProgressEntry, Routine};
use crate::store::{Lifecycle, Slice, SliceError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressState {
    pub entries: Vec<ProgressEntry>,
    pub loading: bool,
    pub error: Option<SliceError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressAction {
    Fetch(Lifecycle<Vec<ProgressEntry>>),
    Add(Lifecycle<ProgressEntry>),
    Edit(Lifecycle<ProgressEntry>),
    /// Carries the deleted entry's id.
    Delete(Lifecycle<String>),
    Reset,
}

impl ProgressState {
    pub fn reduce(&mut self, action: ProgressAction) {
        match action {
            ProgressAction::Fetch(lifecycle) => {
                self.settle(lifecycle, |state, entries| state.entries = entries)
            }
            ProgressAction::Add(lifecycle) => {
                self.settle(lifecycle, |state, entry| state.entries.push(entry))
            }
            ProgressAction::Edit(lifecycle) => self.settle(lifecycle, |state, entry| {
                if let Some(existing) = state.entries.iter_mut().find(|e| e.id == entry.id) {
                    *existing = entry;
                }
            }),
            ProgressAction::Delete(lifecycle) => {
                self.settle(lifecycle, |state, id| state.entries.retain(|e| e.id != id))
            }
            ProgressAction::Reset => *self = ProgressState::default(),
        }
    }
}

impl Slice for ProgressState {
    fn status_mut(&mut self) -> (&mut bool, &mut Option<SliceError>) {
        (&mut self.loading, &mut self.error)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProgressSort {
    #[default]
    Date,
    Name,
    Weight,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filters and ordering for the progress screen. Every filter left `None` lets
/// all entries through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressQuery {
    /// Case-insensitive substring of the exercise name.
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Muscle group, matched through the exercises of the loaded routines.
    pub muscle: Option<String>,
    pub sort: ProgressSort,
    pub order: SortOrder,
}

impl ProgressQuery {
    pub fn apply<'a>(
        &self,
        entries: &'a [ProgressEntry],
        routines: &[Routine],
    ) -> Vec<&'a ProgressEntry> {
        let search = self.search.as_ref().map(|s| s.to_lowercase());
        let muscle = self.muscle.as_ref().map(|m| m.to_lowercase());

        let mut selected: Vec<&ProgressEntry> = entries
            .iter()
            .filter(|entry| match &search {
                Some(term) => entry.name.to_lowercase().contains(term.as_str()),
                None => true,
            })
            .filter(|entry| self.from.map_or(true, |from| entry.date >= from))
            .filter(|entry| self.to.map_or(true, |to| entry.date <= to))
            .filter(|entry| match &muscle {
                Some(muscle) => muscles_for(&entry.name, routines).contains(muscle),
                None => true,
            })
            .collect();

        selected.sort_by(|a, b| {
            let ordering = match self.sort {
                ProgressSort::Date => a.date.cmp(&b.date),
                ProgressSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                ProgressSort::Weight => a.weight.partial_cmp(&b.weight).unwrap_or(Ordering::Equal),
            };
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        selected
    }
}

/// Lower-cased muscle groups of every routine exercise with this name.
fn muscles_for(exercise_name: &str, routines: &[Routine]) -> Vec<String> {
    let name = exercise_name.to_lowercase();
    routines
        .iter()
        .flat_map(|r| r.days.iter())
        .flat_map(|d| d.exercises.iter())
        .filter(|e| e.name.to_lowercase() == name)
        .flat_map(|e| e.muscle_group.iter().map(|m| m.to_lowercase()))
        .collect()
}
