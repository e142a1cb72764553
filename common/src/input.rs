//! Pointer/touch input normalization
//!
//! Mouse and touch streams are both reduced to begin/extend/end commands in
//! surface-relative coordinates. Only the first touch point is tracked.

use crate::signature::{Point, SignatureSurface, SurfaceId};

/// Viewport (client) coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClientPoint {
    pub x: f64,
    pub y: f64,
}

impl ClientPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// On-screen position of a surface's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceOffset {
    pub left: f64,
    pub top: f64,
}

impl SurfaceOffset {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }

    pub fn to_surface(&self, client: ClientPoint) -> Point {
        Point::new((client.x - self.left) as f32, (client.y - self.top) as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Raw input as delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Pointer { phase: PointerPhase, client: ClientPoint },
    Touch { phase: TouchPhase, touches: Vec<ClientPoint> },
}

impl InputEvent {
    pub fn pointer(phase: PointerPhase, x: f64, y: f64) -> Self {
        InputEvent::Pointer {
            phase,
            client: ClientPoint::new(x, y),
        }
    }

    pub fn touch(phase: TouchPhase, touches: &[(f64, f64)]) -> Self {
        InputEvent::Touch {
            phase,
            touches: touches.iter().map(|&(x, y)| ClientPoint::new(x, y)).collect(),
        }
    }
}

/// Normalized three-phase drawing command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeCommand {
    Begin(Point),
    Extend(Point),
    End,
}

/// Translate an input event into a stroke command.
///
/// Returns `None` for touch start/move events that carry no touch point.
pub fn normalize(event: &InputEvent, offset: SurfaceOffset) -> Option<StrokeCommand> {
    match event {
        InputEvent::Pointer { phase, client } => Some(match phase {
            PointerPhase::Down => StrokeCommand::Begin(offset.to_surface(*client)),
            PointerPhase::Move => StrokeCommand::Extend(offset.to_surface(*client)),
            PointerPhase::Up | PointerPhase::Leave => StrokeCommand::End,
        }),
        InputEvent::Touch { phase, touches } => match phase {
            TouchPhase::End | TouchPhase::Cancel => Some(StrokeCommand::End),
            TouchPhase::Start => touches
                .first()
                .map(|t| StrokeCommand::Begin(offset.to_surface(*t))),
            TouchPhase::Move => touches
                .first()
                .map(|t| StrokeCommand::Extend(offset.to_surface(*t))),
        },
    }
}

impl SignatureSurface {
    /// Apply an input event delivered to the surface identified by `target`.
    ///
    /// Returns true when the event ended a stroke.
    pub fn handle_input(&mut self, target: SurfaceId, event: &InputEvent, offset: SurfaceOffset) -> bool {
        if target != self.id() {
            return false;
        }
        match normalize(event, offset) {
            Some(StrokeCommand::Begin(point)) => {
                self.begin_stroke(point);
                false
            }
            Some(StrokeCommand::Extend(point)) => {
                self.extend_stroke(target, point);
                false
            }
            Some(StrokeCommand::End) => {
                let was_drawing = self.is_drawing();
                self.end_stroke();
                was_drawing
            }
            None => false,
        }
    }
}
