// Copyright 2025 the Valance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazily-populated per-feature storage of panel records.

use smallvec::SmallVec;

use crate::state::PanelState;
use crate::types::FeatureId;

/// Feature-indexed storage of [`PanelState`] records.
///
/// Slots are created only when a feature is first touched, and existing
/// records are never moved or dropped by growth.
#[derive(Clone, Debug, Default)]
pub struct PanelRegistry<V> {
    panels: SmallVec<[Option<PanelState<V>>; 2]>,
}

impl<V> PanelRegistry<V> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            panels: SmallVec::new(),
        }
    }

    /// The record for `feature`, if one has been created.
    pub fn get(&self, feature: FeatureId) -> Option<&PanelState<V>> {
        self.panels.get(feature.index()).and_then(Option::as_ref)
    }

    /// Mutable access to the record for `feature`, if one has been created.
    pub fn get_mut(&mut self, feature: FeatureId) -> Option<&mut PanelState<V>> {
        self.panels
            .get_mut(feature.index())
            .and_then(Option::as_mut)
    }

    /// The record for `feature`, creating a fresh one on first touch.
    pub fn get_or_create(&mut self, feature: FeatureId) -> &mut PanelState<V> {
        let idx = feature.index();
        if self.panels.len() <= idx {
            self.panels.resize_with(idx + 1, || None);
        }
        self.panels[idx].get_or_insert_with(|| PanelState::new(feature))
    }

    /// Iterate over every created record.
    pub fn iter(&self) -> impl Iterator<Item = &PanelState<V>> {
        self.panels.iter().filter_map(Option::as_ref)
    }

    /// Iterate mutably over every created record.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PanelState<V>> {
        self.panels.iter_mut().filter_map(Option::as_mut)
    }
}
