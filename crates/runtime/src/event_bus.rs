use crate::frame::Frame;

/// What happened, for consumers that react to state changes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A batch of viewport tiles finished loading.
    ViewportLoaded,
    /// The known elevation interval widened; projection clip planes need updating.
    DepthRangeChanged,
    /// Camera moved (controller input or fly-to).
    ViewStateChanged,
    /// Layer configuration changed (mesh algorithm, texture overlay).
    LayerChanged,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ViewportLoaded => "viewport_loaded",
            EventKind::DepthRangeChanged => "z_range",
            EventKind::ViewStateChanged => "view_state",
            EventKind::LayerChanged => "layer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: EventKind,
    pub message: String,
}

/// Per-frame event log, drained by its owner when the frame ends.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, frame: Frame, kind: EventKind, message: impl Into<String>) {
        self.events.push(Event {
            frame_index: frame.index,
            kind,
            message: message.into(),
        });
    }

    /// Like [`emit`](Self::emit), but overwrites an event of the same kind
    /// already recorded for `frame`. High-rate inputs keep one entry per frame.
    pub fn emit_latest(&mut self, frame: Frame, kind: EventKind, message: impl Into<String>) {
        let existing = self
            .events
            .iter_mut()
            .rev()
            .find(|e| e.kind == kind && e.frame_index == frame.index);
        match existing {
            Some(event) => event.message = message.into(),
            None => self.emit(frame, kind, message),
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
