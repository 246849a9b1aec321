use glam::DVec2;

use crate::braille::BrailleCanvas;
use crate::map::buffer::{OffsetFeature, WorldBuffer};
use crate::map::geometry::{draw_line, draw_marker, fill_ring};
use crate::map::projection::Viewport;
use crate::quiz::Feedback;

/// Fill a country gets on a non-border layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fill {
    Transparent,
    Highlight,
    Correct,
    Incorrect,
}

/// Countries painted by the validation layer while feedback is up
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationMarks {
    pub correct: Option<String>,
    /// Only set when the answer was wrong
    pub incorrect: Option<String>,
}

impl From<&Feedback> for ValidationMarks {
    fn from(feedback: &Feedback) -> Self {
        Self {
            correct: feedback.correct_country_id.clone(),
            incorrect: if feedback.is_correct {
                None
            } else {
                feedback.user_country_id.clone()
            },
        }
    }
}

/// Styling state for the hover and validation layers. The border layer has
/// no state at all, so nothing about the current question can reach it.
#[derive(Clone, Debug, Default)]
pub struct LayerState {
    hovered: Option<String>,
    marks: Option<ValidationMarks>,
    /// Set for the whole feedback window, including kinds with no marks
    feedback_pending: bool,
}

impl LayerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the hover target changed
    pub fn set_hover(&mut self, id: Option<&str>) -> bool {
        if self.hovered.as_deref() == id {
            return false;
        }
        self.hovered = id.map(str::to_string);
        true
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn show_feedback(&mut self, feedback: &Feedback) {
        self.marks = Some(ValidationMarks::from(feedback));
    }

    pub fn clear_feedback(&mut self) {
        self.marks = None;
        self.feedback_pending = false;
    }

    pub fn set_feedback_pending(&mut self, pending: bool) {
        self.feedback_pending = pending;
    }

    pub fn feedback_active(&self) -> bool {
        self.feedback_pending || self.marks.is_some()
    }

    /// Highlight only the hovered country, and never while feedback shows
    pub fn hover_fill(&self, id: &str) -> Fill {
        match &self.hovered {
            Some(h) if h == id && !self.feedback_active() => Fill::Highlight,
            _ => Fill::Transparent,
        }
    }

    pub fn validation_fill(&self, id: &str) -> Fill {
        let Some(marks) = &self.marks else {
            return Fill::Transparent;
        };
        if marks.correct.as_deref() == Some(id) {
            Fill::Correct
        } else if marks.incorrect.as_deref() == Some(id) {
            Fill::Incorrect
        } else {
            Fill::Transparent
        }
    }
}

/// Rendered layers, bottom to top
#[derive(Clone, Debug)]
pub struct MapLayers {
    pub borders: BrailleCanvas,
    pub hover: BrailleCanvas,
    pub correct: BrailleCanvas,
    pub incorrect: BrailleCanvas,
}

impl MapLayers {
    pub fn new(width: usize, height: usize) -> Self {
        let blank = BrailleCanvas::new(width, height);
        Self {
            borders: blank.clone(),
            hover: blank.clone(),
            correct: blank.clone(),
            incorrect: blank,
        }
    }
}

/// Draws every visible buffer slot into the four layers
#[derive(Clone, Debug)]
pub struct MapRenderer {
    /// Outlines smaller than this many pixels across are drawn as a marker
    pub marker_threshold_px: f64,
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            marker_threshold_px: 3.0,
        }
    }

    /// Render into canvases sized for `viewport` (2x4 pixels per cell)
    pub fn render(&self, buffer: &WorldBuffer, state: &LayerState, viewport: &Viewport) -> MapLayers {
        let mut layers = MapLayers::new(viewport.width.div_ceil(2), viewport.height.div_ceil(4));
        let visible = viewport.visible_bounds();
        let mut candidates = Vec::new();

        for slot in buffer.slots() {
            if !slot.bounds.intersects(&visible) {
                continue;
            }
            candidates.clear();
            slot.grid.query_into(&visible, &mut candidates);
            candidates.sort_unstable();
            candidates.dedup();

            for &idx in &candidates {
                let Some(feature) = slot.features.get(idx) else {
                    continue;
                };
                if feature.bbox.intersects(&visible) {
                    self.draw_feature(&mut layers, feature, state, viewport);
                }
            }
        }

        layers
    }

    fn draw_feature(&self, layers: &mut MapLayers, feature: &OffsetFeature, state: &LayerState, viewport: &Viewport) {
        let id = feature.original_id.as_str();
        let mut fill_target = match (state.validation_fill(id), state.hover_fill(id)) {
            (Fill::Correct, _) => Some(&mut layers.correct),
            (Fill::Incorrect, _) => Some(&mut layers.incorrect),
            (_, Fill::Highlight) => Some(&mut layers.hover),
            _ => None,
        };

        let min = viewport.project_f(feature.bbox.min.x, feature.bbox.max.y);
        let max = viewport.project_f(feature.bbox.max.x, feature.bbox.min.y);
        let extent = max - min;
        if extent.x.abs().max(extent.y.abs()) < self.marker_threshold_px {
            let c = (min + max) / 2.0;
            let (x, y) = (c.x.floor() as i32, c.y.floor() as i32);
            draw_marker(&mut layers.borders, x, y, 1);
            if let Some(canvas) = fill_target.as_deref_mut() {
                draw_marker(canvas, x, y, 1);
            }
            return;
        }

        let mut projected: Vec<DVec2> = Vec::new();
        for polygon in feature.geometry.polygons() {
            let Some(outer) = polygon.outer() else {
                continue;
            };
            projected.clear();
            projected.extend(outer.iter().map(|p| viewport.project_f(p.x, p.y)));

            draw_outline(&mut layers.borders, &projected, viewport);
            if let Some(canvas) = fill_target.as_deref_mut() {
                let points: Vec<(f64, f64)> = projected.iter().map(|p| (p.x, p.y)).collect();
                fill_ring(canvas, &points);
            }
        }
    }
}

/// Closed outline with per-segment culling
fn draw_outline(canvas: &mut BrailleCanvas, ring: &[DVec2], viewport: &Viewport) {
    if ring.len() < 2 {
        return;
    }
    let pixel = |p: &DVec2| (p.x.floor() as i32, p.y.floor() as i32);
    let mut prev = pixel(&ring[ring.len() - 1]);
    for p in ring {
        let cur = pixel(p);
        if viewport.line_might_be_visible(prev, cur) {
            draw_line(canvas, prev.0, prev.1, cur.0, cur.1);
        }
        prev = cur;
    }
}
