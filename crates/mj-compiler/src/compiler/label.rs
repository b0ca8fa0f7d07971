// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Jump targets and backpatching.
//!
//! A label starts out pending. Every jump to a pending label writes a
//! placeholder and records the placeholder's position. Defining the label
//! patches all recorded positions and resolves it; jumps emitted later
//! encode the final address right away.

/// Handle to a label in [`Labels`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(usize);

/// State of one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// Not yet defined; positions of the 2-byte placeholders to patch
    Pending(Vec<usize>),
    /// Defined at this code address
    Resolved(usize),
}

/// Arena of labels.
#[derive(Debug, Default)]
pub struct Labels {
    labels: Vec<Label>,
}

impl Labels {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a pending label.
    pub fn create(&mut self) -> LabelId {
        self.labels.push(Label::Pending(Vec::new()));
        LabelId(self.labels.len() - 1)
    }

    /// Current state of a label.
    pub fn get(&self, id: LabelId) -> &Label {
        &self.labels[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: LabelId) -> &mut Label {
        &mut self.labels[id.0]
    }

    /// Number of placeholders still waiting for their label.
    pub fn unpatched(&self) -> usize {
        self.labels
            .iter()
            .map(|label| match label {
                Label::Pending(fixups) => fixups.len(),
                Label::Resolved(_) => 0,
            })
            .sum()
    }
}
