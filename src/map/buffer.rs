use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::geo::world_offset;
use crate::map::polygon::{BoundingBox, Feature, Geometry};
use crate::map::spatial::FeatureGrid;

/// One world width in degrees
pub const WORLD_WIDTH: f64 = 360.0;

/// Grid cell size for slot indices, in degrees
const GRID_CELL_DEG: f64 = 10.0;

/// The five horizontal copies of the world, west to east
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Leftmost,
    Left,
    Center,
    Right,
    Rightmost,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::Leftmost,
        Slot::Left,
        Slot::Center,
        Slot::Right,
        Slot::Rightmost,
    ];

    /// Number of world widths east of the center slot
    pub fn k(self) -> i32 {
        match self {
            Slot::Leftmost => -2,
            Slot::Left => -1,
            Slot::Center => 0,
            Slot::Right => 1,
            Slot::Rightmost => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Slot::Leftmost => "leftmost",
            Slot::Left => "left",
            Slot::Center => "center",
            Slot::Right => "right",
            Slot::Rightmost => "rightmost",
        }
    }
}

/// A base feature translated into one buffer slot
#[derive(Clone, Debug)]
pub struct OffsetFeature {
    /// Slot-qualified id, e.g. `FRA@+360`
    pub id: String,
    /// Identifier of the base feature / country
    pub original_id: String,
    pub offset: f64,
    pub geometry: Geometry,
    pub bbox: BoundingBox,
}

/// Full translated copy of the feature set plus its bbox index
pub struct SlotLayer {
    pub slot: Slot,
    pub offset: f64,
    pub features: Vec<OffsetFeature>,
    pub grid: FeatureGrid,
    pub bounds: BoundingBox,
}

impl SlotLayer {
    fn build(slot: Slot, offset: f64, base: &[Feature]) -> Self {
        let features: Vec<OffsetFeature> = base
            .iter()
            .map(|f| OffsetFeature {
                id: format!("{}@{:+}", f.id, offset),
                original_id: f.id.clone(),
                offset,
                geometry: f.geometry.translated(offset),
                bbox: f.bbox.translated(offset),
            })
            .collect();

        let grid = FeatureGrid::build(features.iter().map(|f| &f.bbox), GRID_CELL_DEG);
        let bounds = features.iter().fold(BoundingBox::empty(), |mut acc, f| {
            if !f.bbox.is_empty() {
                acc.extend(f.bbox.min);
                acc.extend(f.bbox.max);
            }
            acc
        });

        Self {
            slot,
            offset,
            features,
            grid,
            bounds,
        }
    }
}

/// Buffer tunables
#[derive(Clone, Debug)]
pub struct BufferConfig {
    /// Viewport drift from the center offset that triggers a rebuild
    pub recenter_threshold_deg: f64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            recenter_threshold_deg: 120.0,
        }
    }
}

/// Five translated copies of the country outlines at
/// `center_offset + k * 360` for k in -2..=2, so panning east or west never
/// runs off the edge of the drawn world. Rebuilt wholesale on recenter.
pub struct WorldBuffer {
    base: Arc<[Feature]>,
    center_offset: f64,
    slots: Vec<SlotLayer>,
    config: BufferConfig,
}

impl WorldBuffer {
    pub fn new(base: Arc<[Feature]>, config: BufferConfig) -> Self {
        let mut buffer = Self {
            base,
            center_offset: 0.0,
            slots: Vec::new(),
            config,
        };
        buffer.build(0.0);
        buffer
    }

    /// Rebuild every slot around `center_offset` (a multiple of 360)
    pub fn build(&mut self, center_offset: f64) {
        let base = &self.base;
        self.slots = Slot::ALL
            .par_iter()
            .map(|&slot| {
                let offset = center_offset + slot.k() as f64 * WORLD_WIDTH;
                SlotLayer::build(slot, offset, base)
            })
            .collect();
        self.center_offset = center_offset;
        debug!(center_offset, features = self.base.len(), "world buffer rebuilt");
    }

    /// Rebuild around the viewport's world copy once it has drifted past the
    /// threshold. Returns true when a rebuild happened.
    pub fn maybe_recenter(&mut self, viewport_center_lon: f64) -> bool {
        if !viewport_center_lon.is_finite() {
            return false;
        }
        if (viewport_center_lon - self.center_offset).abs() <= self.config.recenter_threshold_deg {
            return false;
        }
        let target = world_offset(viewport_center_lon);
        if target == self.center_offset {
            return false;
        }
        self.build(target);
        true
    }

    #[inline]
    pub fn center_offset(&self) -> f64 {
        self.center_offset
    }

    /// Slots in west-to-east order
    pub fn slots(&self) -> &[SlotLayer] {
        &self.slots
    }

    pub fn slot(&self, slot: Slot) -> Option<&SlotLayer> {
        self.slots.iter().find(|layer| layer.slot == slot)
    }

    pub fn base(&self) -> &[Feature] {
        &self.base
    }
}
