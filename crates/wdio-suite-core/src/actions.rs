//! W3C pointer action sequences.
//!
//! Gestures are expressed as scripted pointer-down/move/up events with timing,
//! serialised to the `POST /session/{id}/actions` payload. Only linear moves are
//! modelled; there is no velocity or inertia.

use std::time::Duration;

use serde::{Serialize, Serializer};

/// Default id of the touch pointer input source.
pub const TOUCH_POINTER_ID: &str = "finger";

/// Left mouse button / primary touch contact.
const PRIMARY_BUTTON: u8 = 0;

/// The kind of pointer device a sequence models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Touch,
    Mouse,
    Pen,
}

/// A single tick of a pointer sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum PointerAction {
    /// Move to an absolute viewport position over `duration`.
    #[serde(rename = "pointerMove")]
    Move {
        #[serde(serialize_with = "as_millis")]
        duration: Duration,
        x: i32,
        y: i32,
        origin: &'static str,
    },
    #[serde(rename = "pointerDown")]
    Down { button: u8 },
    #[serde(rename = "pointerUp")]
    Up { button: u8 },
    #[serde(rename = "pause")]
    Pause {
        #[serde(serialize_with = "as_millis")]
        duration: Duration,
    },
}

impl PointerAction {
    pub fn move_to(x: i32, y: i32, duration: Duration) -> Self {
        PointerAction::Move {
            duration,
            x,
            y,
            origin: "viewport",
        }
    }

    pub fn down() -> Self {
        PointerAction::Down { button: PRIMARY_BUTTON }
    }

    pub fn up() -> Self {
        PointerAction::Up { button: PRIMARY_BUTTON }
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct PointerParameters {
    pointer_type: PointerKind,
}

/// One input source and its ordered actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointerSequence {
    #[serde(rename = "type")]
    source_type: &'static str,
    pub id: String,
    parameters: PointerParameters,
    pub actions: Vec<PointerAction>,
}

impl PointerSequence {
    pub fn new(id: impl Into<String>, kind: PointerKind) -> Self {
        Self {
            source_type: "pointer",
            id: id.into(),
            parameters: PointerParameters { pointer_type: kind },
            actions: Vec::new(),
        }
    }

    /// A touch pointer with the default id.
    pub fn touch() -> Self {
        Self::new(TOUCH_POINTER_ID, PointerKind::Touch)
    }

    pub fn kind(&self) -> PointerKind {
        self.parameters.pointer_type
    }

    pub fn then(mut self, action: PointerAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Press at `from`, move linearly to `to` over `duration`, release.
    pub fn drag(from: (i32, i32), to: (i32, i32), duration: Duration) -> Self {
        Self::touch()
            .then(PointerAction::move_to(from.0, from.1, Duration::ZERO))
            .then(PointerAction::down())
            .then(PointerAction::move_to(to.0, to.1, duration))
            .then(PointerAction::up())
    }

    /// The position the pointer ends at, if the sequence moves at all.
    pub fn end_point(&self) -> Option<(i32, i32)> {
        self.actions.iter().rev().find_map(|action| match action {
            PointerAction::Move { x, y, .. } => Some((*x, *y)),
            _ => None,
        })
    }

    /// The position of the first pointer-down, if any.
    pub fn press_point(&self) -> Option<(i32, i32)> {
        let mut last = None;
        for action in &self.actions {
            match action {
                PointerAction::Move { x, y, .. } => last = Some((*x, *y)),
                PointerAction::Down { .. } => return last,
                _ => {}
            }
        }
        None
    }
}

/// Body of a W3C `Perform Actions` command.
#[derive(Debug, Serialize)]
pub(crate) struct ActionsRequest<'a> {
    pub actions: &'a [PointerSequence],
}
