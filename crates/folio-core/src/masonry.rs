use std::collections::BTreeSet;

use crate::config::LayoutConfig;

/// Row span for one child: hidden children take no rows, visible ones take
/// `ceil((height + gap) / quantum)` rows and never fewer than one.
pub fn row_span(height: f64, hidden: bool, config: &LayoutConfig) -> u32 {
    if hidden {
        return 0;
    }
    let height = if height.is_finite() && height > 0.0 {
        height
    } else {
        0.0
    };
    let gap = if config.gap_px.is_finite() && config.gap_px > 0.0 {
        config.gap_px
    } else {
        0.0
    };
    let quantum = if config.row_quantum_px.is_finite() && config.row_quantum_px > 0.0 {
        config.row_quantum_px
    } else {
        1.0
    };
    let rows = ((height + gap) / quantum).ceil();
    if rows >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    (rows as u32).max(1)
}

/// The render target as seen by the layout pass. Children are visited in
/// their existing order and are never reordered.
pub trait LayoutContainer {
    fn child_count(&self) -> usize;
    fn is_hidden(&self, index: usize) -> bool;
    fn measured_height(&self, index: usize) -> f64;
    fn set_row_span(&mut self, index: usize, span: u32);
}

/// Assigns a span to every child and returns how many are visible.
pub fn layout<C: LayoutContainer + ?Sized>(container: &mut C, config: &LayoutConfig) -> usize {
    let mut visible = 0;
    for index in 0..container.child_count() {
        let hidden = container.is_hidden(index);
        let span = row_span(container.measured_height(index), hidden, config);
        container.set_row_span(index, span);
        if !hidden {
            visible += 1;
        }
    }
    visible
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredChild {
    pub id: String,
    pub hidden: bool,
    pub height: f64,
    pub span: u32,
}

impl MeasuredChild {
    pub fn new(id: impl Into<String>, hidden: bool, height: f64) -> Self {
        Self {
            id: id.into(),
            hidden,
            height,
            span: 0,
        }
    }
}

impl LayoutContainer for [MeasuredChild] {
    fn child_count(&self) -> usize {
        self.len()
    }

    fn is_hidden(&self, index: usize) -> bool {
        self[index].hidden
    }

    fn measured_height(&self, index: usize) -> f64 {
        self[index].height
    }

    fn set_row_span(&mut self, index: usize, span: u32) {
        self[index].span = span;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    Loaded,
    Failed,
}

/// Holds the first layout pass until every image has either loaded or failed.
#[derive(Debug, Clone, Default)]
pub struct ImageGate {
    pending: BTreeSet<String>,
    failed: Vec<String>,
}

impl ImageGate {
    pub fn new<I, S>(image_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pending: image_ids.into_iter().map(Into::into).collect(),
            failed: Vec::new(),
        }
    }

    /// Load and error both settle the image. Returns whether the gate is open.
    pub fn resolve(&mut self, image_id: &str, outcome: ImageOutcome) -> bool {
        if self.pending.remove(image_id) && outcome == ImageOutcome::Failed {
            self.failed.push(image_id.to_string());
        }
        self.is_ready()
    }

    pub fn is_ready(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn failed(&self) -> &[String] {
        &self.failed
    }
}
