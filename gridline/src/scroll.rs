//! Scroll state for line-oriented views.
//!
//! Views queue a [`ScrollRequest`]; the renderer resolves it against the
//! viewport on its next pass with [`ScrollState::resolve`].

// =============================================================================
// ScrollRequest
// =============================================================================

/// Actions that can be requested on scroll state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    /// Scroll by relative amount (positive = down).
    Delta(isize),
    /// Scroll to an absolute line offset.
    ToOffset(usize),
    /// Scroll so the line at index is visible.
    IntoView(usize),
    PageUp,
    PageDown,
    Home,
    End,
}

// =============================================================================
// ScrollState
// =============================================================================

/// Scroll position over `content_len` lines shown `viewport` at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollState {
    /// First visible line.
    pub offset: usize,
    /// Visible line count, reported by the renderer.
    pub viewport: usize,
    pub content_len: usize,
    request: Option<ScrollRequest>,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_offset(&self) -> usize {
        self.content_len.saturating_sub(self.viewport)
    }

    /// Whether the last line is visible.
    pub fn is_at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    /// Queue a request, replacing any pending one.
    pub fn request(&mut self, request: ScrollRequest) {
        self.request = Some(request);
    }

    pub fn pending(&self) -> Option<ScrollRequest> {
        self.request
    }

    /// Take the pending request without applying it.
    pub fn take_request(&mut self) -> Option<ScrollRequest> {
        self.request.take()
    }

    /// Update the geometry and apply the pending request.
    ///
    /// Returns the resulting offset.
    pub fn resolve(&mut self, viewport: usize, content_len: usize) -> usize {
        self.viewport = viewport;
        self.content_len = content_len;

        let max = self.max_offset();
        let page = viewport.max(1);
        self.offset = match self.request.take() {
            None => self.offset,
            Some(ScrollRequest::Delta(d)) => self.offset.saturating_add_signed(d),
            Some(ScrollRequest::ToOffset(o)) => o,
            Some(ScrollRequest::IntoView(index)) => {
                if index < self.offset {
                    index
                } else if index >= self.offset + page {
                    index + 1 - page
                } else {
                    self.offset
                }
            }
            Some(ScrollRequest::PageUp) => self.offset.saturating_sub(page),
            Some(ScrollRequest::PageDown) => self.offset.saturating_add(page),
            Some(ScrollRequest::Home) => 0,
            Some(ScrollRequest::End) => max,
        }
        .min(max);
        self.offset
    }
}
