//! Pointer input -> mirror selection and steering
//!
//! Each event is applied as a whole: the handler takes the current state and
//! returns the next one. Only one mirror can be selected or dragged at a time,
//! and nothing happens unless the level is running.

use glam::Vec2;

use super::geometry::facing_angle;
use super::state::{GamePhase, GameState, Selection};
use super::vector::distance;
use crate::consts::INTERACTION_RADIUS;

/// Pointer/touch event in canvas-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
    Leave,
}

/// Index of the mirror a press at `pointer` picks
///
/// When radii overlap the last mirror within `INTERACTION_RADIUS` wins,
/// regardless of which one is closer.
pub fn pick_mirror(state: &GameState, pointer: Vec2) -> Option<usize> {
    let mut picked = None;
    for (i, mirror) in state.mirrors.iter().enumerate() {
        if distance(pointer, mirror.position) < INTERACTION_RADIUS {
            picked = Some(i);
        }
    }
    picked
}

/// Apply one pointer event
pub fn handle_pointer(state: &GameState, event: PointerEvent) -> GameState {
    if state.phase != GamePhase::Running {
        return state.clone();
    }

    let mut next = state.clone();
    match event {
        PointerEvent::Down(pointer) => {
            let picked = pick_mirror(state, pointer);
            if picked != state.selection.index {
                log::debug!("Mirror selection {:?} -> {:?}", state.selection.index, picked);
            }
            next.selection = Selection {
                index: picked,
                dragging: picked.is_some(),
            };
            for (i, mirror) in next.mirrors.iter_mut().enumerate() {
                mirror.is_selected = Some(i) == picked;
            }
        }
        PointerEvent::Move(pointer) => {
            if !next.selection.dragging {
                return next;
            }
            if let Some(mirror) = next
                .selection
                .index
                .and_then(|i| next.mirrors.get_mut(i))
            {
                mirror.angle = facing_angle(mirror.position, pointer);
            }
        }
        PointerEvent::Up | PointerEvent::Leave => {
            next.selection.dragging = false;
        }
    }
    next
}
