//! DOM mouse/touch events to pad input

use jurnal_common::input::{InputEvent, PointerPhase, SurfaceOffset, TouchPhase};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, MouseEvent, TouchEvent};

pub fn pointer_phase(event_type: &str) -> Option<PointerPhase> {
    match event_type {
        "mousedown" => Some(PointerPhase::Down),
        "mousemove" => Some(PointerPhase::Move),
        "mouseup" => Some(PointerPhase::Up),
        "mouseleave" | "mouseout" => Some(PointerPhase::Leave),
        _ => None,
    }
}

pub fn touch_phase(event_type: &str) -> Option<TouchPhase> {
    match event_type {
        "touchstart" => Some(TouchPhase::Start),
        "touchmove" => Some(TouchPhase::Move),
        "touchend" => Some(TouchPhase::End),
        "touchcancel" => Some(TouchPhase::Cancel),
        _ => None,
    }
}

/// Where `element` currently sits in the viewport
pub fn surface_offset(element: &Element) -> SurfaceOffset {
    let rect = element.get_bounding_client_rect();
    SurfaceOffset::new(rect.left(), rect.top())
}

pub fn from_mouse(event: &MouseEvent) -> Option<InputEvent> {
    let phase = pointer_phase(&event.type_())?;
    Some(InputEvent::pointer(
        phase,
        event.client_x() as f64,
        event.client_y() as f64,
    ))
}

/// Touch input, first touch only. Stops the page from scrolling under the pen.
pub fn from_touch(event: &TouchEvent) -> Option<InputEvent> {
    let phase = touch_phase(&event.type_())?;
    event.prevent_default();

    let touches = event.touches();
    let first = touches
        .get(0)
        .map(|t| (t.client_x() as f64, t.client_y() as f64));
    Some(InputEvent::touch(phase, first.as_slice()))
}

/// Any mouse or touch event; others are `None`.
pub fn translate(event: &Event) -> Option<InputEvent> {
    if let Some(touch) = event.dyn_ref::<TouchEvent>() {
        return from_touch(touch);
    }
    event.dyn_ref::<MouseEvent>().and_then(from_mouse)
}
