//! Column resizing by dragging a header handle.
//!
//! A gesture runs as an explicit [`ResizeSession`]: pointer-down arms it,
//! movement past [`DRAG_THRESHOLD`] starts resizing, pointer-up commits. Live
//! widths stay inside the session until commit, so the declarative width map
//! only ever sees settled values.

use std::collections::HashMap;
use std::fmt;

use crate::store::{Aspect, TableStateStore};

use super::column::WidthSpec;

/// Pointer travel (px) before a press on the handle counts as a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;

/// Cursor and text-selection style applied to the host while resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragStyle {
    pub cursor: &'static str,
    pub user_select: &'static str,
}

pub const RESIZE_DRAG_STYLE: DragStyle = DragStyle {
    cursor: "col-resize",
    user_select: "none",
};

/// Host hooks for an active gesture.
///
/// Listeners are document-wide so the pointer may leave the handle without
/// losing the gesture. Every `attach_listeners` is paired with exactly one
/// `detach_listeners`.
pub trait PointerSurface: Send {
    fn attach_listeners(&mut self);
    fn detach_listeners(&mut self);
    /// Apply a drag style, or restore the original one with `None`.
    fn set_drag_style(&mut self, style: Option<DragStyle>);
}

/// Surface for hosts without global pointer capture.
#[derive(Debug, Default)]
pub struct NoopSurface;

impl PointerSurface for NoopSurface {
    fn attach_listeners(&mut self) {}
    fn detach_listeners(&mut self) {}
    fn set_drag_style(&mut self, _style: Option<DragStyle>) {}
}

/// Phase of the resize state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizePhase {
    #[default]
    Idle,
    Armed,
    Resizing,
}

/// One in-flight resize gesture.
#[derive(Debug, Clone)]
pub struct ResizeSession {
    column_id: String,
    spec: WidthSpec,
    start_x: f64,
    start_width: u32,
    width: u32,
    phase: ResizePhase,
}

impl ResizeSession {
    /// Arm a gesture on `column_id` at pointer position `x`.
    pub fn begin(column_id: impl Into<String>, spec: WidthSpec, start_width: u32, x: f64) -> Self {
        Self {
            column_id: column_id.into(),
            spec,
            start_x: x,
            start_width,
            width: start_width,
            phase: ResizePhase::Armed,
        }
    }

    pub fn column_id(&self) -> &str {
        &self.column_id
    }

    pub fn phase(&self) -> ResizePhase {
        self.phase
    }

    /// Live width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Feed a pointer position. Returns `true` when this call crossed the
    /// threshold and the session switched to resizing.
    pub fn update(&mut self, x: f64) -> bool {
        let delta = x - self.start_x;
        let started = self.phase == ResizePhase::Armed && delta.abs() > DRAG_THRESHOLD;
        if started {
            self.phase = ResizePhase::Resizing;
        }
        if self.phase == ResizePhase::Resizing {
            self.width = self
                .spec
                .clamp((self.start_width as i64).saturating_add(delta.round() as i64));
        }
        started
    }

    /// End the gesture. Yields the settled width if a resize happened.
    pub fn commit(self) -> Option<(String, u32)> {
        (self.phase == ResizePhase::Resizing).then_some((self.column_id, self.width))
    }
}

/// Column width controller.
pub struct ColumnResize {
    specs: HashMap<String, WidthSpec>,
    widths: HashMap<String, u32>,
    session: Option<ResizeSession>,
    surface: Box<dyn PointerSurface>,
    store: TableStateStore,
}

impl fmt::Debug for ColumnResize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnResize")
            .field("widths", &self.widths)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ColumnResize {
    /// Create a controller, restoring stored widths.
    ///
    /// Stored widths are clamped against the current specs; columns without
    /// a stored width get their default.
    pub fn new(
        specs: impl IntoIterator<Item = (String, WidthSpec)>,
        store: TableStateStore,
        surface: Box<dyn PointerSurface>,
    ) -> Self {
        let specs: HashMap<String, WidthSpec> = specs.into_iter().collect();
        let stored = store
            .load::<HashMap<String, u32>>(Aspect::Widths)
            .unwrap_or_default();
        let widths = Self::merge(&specs, &stored);
        Self {
            specs,
            widths,
            session: None,
            surface,
            store,
        }
    }

    fn merge(specs: &HashMap<String, WidthSpec>, stored: &HashMap<String, u32>) -> HashMap<String, u32> {
        specs
            .iter()
            .map(|(id, spec)| {
                let width = match stored.get(id) {
                    Some(w) => spec.clamp(*w as i64),
                    None => spec.initial(),
                };
                (id.clone(), width)
            })
            .collect()
    }

    fn spec(&self, id: &str) -> WidthSpec {
        self.specs.get(id).copied().unwrap_or_default()
    }

    /// Current width of a column, including a live resize.
    pub fn width(&self, id: &str) -> u32 {
        if let Some(session) = &self.session
            && session.phase() == ResizePhase::Resizing
            && session.column_id() == id
        {
            return session.width();
        }
        self.widths
            .get(id)
            .copied()
            .unwrap_or_else(|| self.spec(id).initial())
    }

    /// Settled widths.
    pub fn widths(&self) -> &HashMap<String, u32> {
        &self.widths
    }

    pub fn phase(&self) -> ResizePhase {
        self.session.as_ref().map_or(ResizePhase::Idle, |s| s.phase())
    }

    /// Column being resized, once past the threshold.
    pub fn resizing_column(&self) -> Option<&str> {
        self.session
            .as_ref()
            .filter(|s| s.phase() == ResizePhase::Resizing)
            .map(|s| s.column_id())
    }

    /// Pointer pressed on a column's resize handle.
    pub fn pointer_down(&mut self, id: &str, x: f64) {
        if self.session.is_some() {
            self.finish();
        }
        let session = ResizeSession::begin(id, self.spec(id), self.width(id), x);
        self.session = Some(session);
        self.surface.attach_listeners();
    }

    /// Pointer moved anywhere in the document.
    pub fn pointer_move(&mut self, x: f64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.update(x) {
            log::debug!("[resize] resizing {}", session.column_id());
            self.surface.set_drag_style(Some(RESIZE_DRAG_STYLE));
        }
    }

    /// Pointer released. Commits and persists a resize; a click changes nothing.
    pub fn pointer_up(&mut self) {
        self.finish();
    }

    /// Pointer capture lost. Settles like a release.
    pub fn pointer_cancel(&mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if session.phase() == ResizePhase::Resizing {
            self.surface.set_drag_style(None);
        }
        self.surface.detach_listeners();

        if let Some((id, width)) = session.commit() {
            self.widths.insert(id, width);
            self.persist();
        }
    }

    /// Set a width directly (clamped) and persist.
    pub fn set_width(&mut self, id: &str, width: u32) {
        let width = self.spec(id).clamp(width as i64);
        self.widths.insert(id.to_string(), width);
        self.persist();
    }

    /// Back to default widths.
    pub fn reset_widths(&mut self) {
        self.widths = Self::merge(&self.specs, &HashMap::new());
        self.persist();
    }

    /// Swap the host surface. Any gesture in flight is settled first.
    pub fn set_surface(&mut self, surface: Box<dyn PointerSurface>) {
        self.finish();
        self.surface = surface;
    }

    /// Replace the width specs, keeping widths of surviving columns.
    pub fn set_specs(&mut self, specs: impl IntoIterator<Item = (String, WidthSpec)>) {
        self.specs = specs.into_iter().collect();
        self.widths = Self::merge(&self.specs, &self.widths);
    }

    fn persist(&self) {
        self.store.save(Aspect::Widths, &self.widths);
    }
}

impl Drop for ColumnResize {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            if session.phase() == ResizePhase::Resizing {
                self.surface.set_drag_style(None);
            }
            self.surface.detach_listeners();
        }
    }
}
