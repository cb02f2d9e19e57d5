//! Drag-to-select state machine.
//!
//! Toolkit independent: a host translates its press/move/release callbacks
//! into [`PointerEvent`]s and repaints when asked to.

use snapocr_types::SelectionRect;

/// Pointer input in logical coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down { x: i32, y: i32 },
    Move { x: i32, y: i32 },
    Up { x: i32, y: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorState {
    #[default]
    Idle,
    Dragging {
        origin: (i32, i32),
        current: SelectionRect,
    },
    Released,
}

/// What the host should do after feeding an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorOutput {
    /// Nothing changed
    Ignored,
    /// Selection changed, repaint the overlay
    Repaint(SelectionRect),
    /// Gesture finished with a usable selection, close the overlay
    Selected(SelectionRect),
    /// Gesture discarded, close the overlay without starting OCR
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct RegionSelector {
    state: SelectorState,
    min_size: i32,
}

impl RegionSelector {
    pub fn new(min_size: i32) -> Self {
        Self {
            state: SelectorState::Idle,
            min_size,
        }
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    /// Rectangle to draw the hole and border for, if dragging
    pub fn current(&self) -> Option<SelectionRect> {
        match self.state {
            SelectorState::Dragging { current, .. } => Some(current),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: PointerEvent) -> SelectorOutput {
        match (self.state, event) {
            (SelectorState::Idle, PointerEvent::Down { x, y }) => {
                let current = SelectionRect::from_points(x, y, x, y);
                self.state = SelectorState::Dragging {
                    origin: (x, y),
                    current,
                };
                SelectorOutput::Repaint(current)
            }
            (SelectorState::Dragging { origin, current }, PointerEvent::Move { x, y }) => {
                let next = SelectionRect::from_points(origin.0, origin.1, x, y);
                if next == current {
                    return SelectorOutput::Ignored;
                }
                self.state = SelectorState::Dragging {
                    origin,
                    current: next,
                };
                SelectorOutput::Repaint(next)
            }
            (SelectorState::Dragging { origin, .. }, PointerEvent::Up { x, y }) => {
                self.state = SelectorState::Released;
                let selection = SelectionRect::from_points(origin.0, origin.1, x, y);
                if selection.exceeds(self.min_size) {
                    SelectorOutput::Selected(selection)
                } else {
                    tracing::debug!("Discarding accidental selection {:?}", selection);
                    SelectorOutput::Cancelled
                }
            }
            _ => SelectorOutput::Ignored,
        }
    }

    /// Abort the gesture (escape key, focus loss)
    pub fn cancel(&mut self) -> SelectorOutput {
        if self.state == SelectorState::Released {
            return SelectorOutput::Ignored;
        }
        self.state = SelectorState::Released;
        SelectorOutput::Cancelled
    }

    /// Feed a whole gesture and return the emitted selection, if any
    pub fn run<I>(mut self, events: I) -> Option<SelectionRect>
    where
        I: IntoIterator<Item = PointerEvent>,
    {
        for event in events {
            match self.handle(event) {
                SelectorOutput::Selected(rect) => return Some(rect),
                SelectorOutput::Cancelled => return None,
                _ => {}
            }
        }
        None
    }
}
