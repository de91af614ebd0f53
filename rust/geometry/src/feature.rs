// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stable per-feature identifiers embedded in finished meshes for picking

/// Kind of the source map object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FeatureKind {
    Node,
    Way,
    Relation,
}

/// Reference to the map object a mesh was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureReference {
    pub kind: FeatureKind,
    pub id: u64,
}

/// Bit position of the kind flag in the second id word
const KIND_SHIFT: u32 = 19;

impl FeatureReference {
    pub fn new(kind: FeatureKind, id: u64) -> Self {
        Self { kind, id }
    }

    pub fn way(id: u64) -> Self {
        Self::new(FeatureKind::Way, id)
    }

    pub fn relation(id: u64) -> Self {
        Self::new(FeatureKind::Relation, id)
    }

    /// Two-word id buffer: the id clamped to 32 bits, then the kind flag.
    /// Nodes and untyped references encode as `[0, 0]`.
    pub fn id_buffer(&self) -> [u32; 2] {
        let kind_bit: u32 = match self.kind {
            FeatureKind::Way => 0,
            FeatureKind::Relation => 1,
            FeatureKind::Node => return [0, 0],
        };

        let id = self.id.min(u32::MAX as u64) as u32;
        [id, kind_bit << KIND_SHIFT]
    }
}
