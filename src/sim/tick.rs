//! Per-frame simulation step
//!
//! One call per rendered frame, in a fixed order: evaluate optics, integrate
//! energy, advance the day cycle, move the sun. `step` never mutates its input
//! state; it returns the next state alongside the frame's optics report.

use glam::Vec2;
use std::f32::consts::PI;

use super::autopilot::aim_mirrors;
use super::optics::{FieldReport, Receiver, evaluate};
use super::state::{GamePhase, GameState, Viewport};
use crate::consts::*;
use crate::tuning::{Layout, Tuning};

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start the day (Idle -> Running)
    pub start: bool,
    /// Current canvas size, if it changed
    pub viewport: Option<Viewport>,
    /// Demo mode - aim every mirror at the receiver before evaluating
    pub autopilot: bool,
}

/// Output of one step
#[derive(Debug, Clone)]
pub struct Frame {
    pub state: GameState,
    /// Optics evaluated against the pre-step sun and mirrors
    pub report: FieldReport,
}

/// Sun position for a point in the day
///
/// Sweeps left to right across the viewport and follows a sine arc that peaks
/// at midday.
pub fn sun_position(time_of_day: f32, viewport: Viewport, layout: &Layout) -> Vec2 {
    let amplitude = viewport.height * layout.sun_amplitude;
    Vec2::new(
        viewport.width * time_of_day,
        viewport.height - amplitude * (PI * time_of_day).sin(),
    )
}

/// Receiver used for hit testing in `state`
pub fn receiver(state: &GameState) -> Receiver {
    Receiver {
        center: state.tower.receiver_center(),
        radius: state.tower.receiver_radius,
    }
}

/// Negative or NaN deltas advance nothing; long frames are applied in full
fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_nan() || dt < 0.0 {
        log::debug!("Ignoring invalid frame delta {}", dt);
        return 0.0;
    }
    dt
}

/// Advance the level by one frame
pub fn step(prev: &GameState, input: &TickInput, dt: f32) -> Frame {
    let mut state = prev.clone();

    // Finished levels are frozen until re-initialized
    if state.phase.is_terminal() {
        let report = evaluate(state.sun, &receiver(&state), &state.mirrors);
        return Frame { state, report };
    }

    if let Some(viewport) = input.viewport {
        state.viewport = viewport;
    }

    if input.start && state.phase == GamePhase::Idle {
        state.phase = GamePhase::Running;
        log::info!("Level {} started", state.level);
    }

    if input.autopilot && state.phase == GamePhase::Running {
        state.mirrors = aim_mirrors(&state.mirrors, state.sun, state.tower.receiver_center());
    }

    let report = evaluate(state.sun, &receiver(&state), &state.mirrors);

    if state.phase != GamePhase::Running {
        return Frame { state, report };
    }

    for (mirror, ray) in state.mirrors.iter_mut().zip(&report.rays) {
        mirror.efficiency = ray.efficiency();
    }
    state.frames += 1;

    // Integrate energy (never decreases, capped with some headroom)
    let cap = state.max_energy * ENERGY_HEADROOM;
    let energy = (state.energy + report.total_energy).min(cap).max(state.energy);
    state.score += energy - state.energy;
    state.energy = energy;

    if state.energy >= state.max_energy {
        state.phase = GamePhase::Victory;
        state.selection.dragging = false;
        log::info!(
            "Level {} complete: {:.0}/{:.0} energy at {:.0}% of the day",
            state.level,
            state.energy,
            state.max_energy,
            state.time_of_day * 100.0
        );
        return Frame { state, report };
    }

    // Advance the day
    let dt = sanitize_dt(dt);
    state.time_of_day += dt * state.time_scale / DAY_DURATION_SECONDS;
    if state.time_of_day >= 1.0 {
        state.time_of_day = 1.0;
        state.phase = GamePhase::Defeat;
        state.selection.dragging = false;
        log::info!(
            "Level {} failed: sunset with {:.0}/{:.0} energy",
            state.level,
            state.energy,
            state.max_energy
        );
        return Frame { state, report };
    }

    state.sun = sun_position(state.time_of_day, state.viewport, &state.layout);

    Frame { state, report }
}

/// Lay out the next level, keeping the run score
pub fn advance_level(state: &GameState, tuning: &Tuning) -> GameState {
    GameState::for_level(state.level + 1, state.score, state.viewport, tuning)
}

/// Lay out the current level again, dropping the energy it had collected
pub fn restart_level(state: &GameState, tuning: &Tuning) -> GameState {
    let score = (state.score - state.energy).max(0.0);
    GameState::for_level(state.level, score, state.viewport, tuning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Selection;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn running(tuning: &Tuning) -> GameState {
        let state = GameState::new(viewport(), tuning);
        let input = TickInput {
            start: true,
            ..Default::default()
        };
        step(&state, &input, 0.0).state
    }

    #[test]
    fn test_idle_does_not_advance() {
        let state = GameState::new(viewport(), &Tuning::default());
        let frame = step(&state, &TickInput::default(), FRAME_DT);
        assert_eq!(frame.state.phase, GamePhase::Idle);
        assert_eq!(frame.state.time_of_day, 0.0);
        assert_eq!(frame.state.energy, 0.0);
        // Rays are still reported for drawing
        assert_eq!(frame.report.rays.len(), state.mirrors.len());
    }

    #[test]
    fn test_start_enters_running() {
        let state = running(&Tuning::default());
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.is_playing());
    }

    #[test]
    fn test_step_does_not_mutate_input() {
        let state = running(&Tuning::default());
        let before = state.time_of_day;
        let frame = step(&state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.time_of_day, before);
        assert!(frame.state.time_of_day > before);
    }

    #[test]
    fn test_time_advances_with_time_scale() {
        let tuning = Tuning::default();
        let mut state = running(&tuning);
        state.time_scale = 2.0;
        let frame = step(&state, &TickInput::default(), 0.05);
        let expected = 0.05 * 2.0 / DAY_DURATION_SECONDS;
        assert!((frame.state.time_of_day - expected).abs() < 1e-7);
        assert_eq!(
            frame.state.sun,
            sun_position(frame.state.time_of_day, viewport(), &state.layout)
        );
    }

    #[test]
    fn test_sun_arc() {
        let layout = Layout::default();
        let start = sun_position(0.0, viewport(), &layout);
        let noon = sun_position(0.5, viewport(), &layout);
        let dusk = sun_position(1.0, viewport(), &layout);

        assert_eq!(start, Vec2::new(0.0, 600.0));
        assert!((noon.x - 400.0).abs() < 1e-4);
        assert!((noon.y - (600.0 - 600.0 * layout.sun_amplitude)).abs() < 1e-3);
        assert!((dusk.x - 800.0).abs() < 1e-4);
        assert!((dusk.y - 600.0).abs() < 1e-3);
        // Noon is the highest point (smallest screen y)
        assert!(noon.y < sun_position(0.3, viewport(), &layout).y);
        assert!(noon.y < sun_position(0.7, viewport(), &layout).y);
    }

    #[test]
    fn test_long_frame_advances_in_full() {
        let state = running(&Tuning::default());
        let frame = step(&state, &TickInput::default(), 0.5);
        let expected = 0.5 / DAY_DURATION_SECONDS;
        assert!((frame.state.time_of_day - expected).abs() < 1e-7);
        assert!(frame.state.time_of_day > MAX_FRAME_DT / DAY_DURATION_SECONDS);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let state = running(&Tuning::default());

        let frame = step(&state, &TickInput::default(), -1.0);
        assert_eq!(frame.state.time_of_day, 0.0);

        let frame = step(&state, &TickInput::default(), f32::NAN);
        assert_eq!(frame.state.time_of_day, 0.0);
    }

    #[test]
    fn test_reaching_sunset_is_defeat() {
        let mut state = running(&Tuning::default());
        state.time_of_day = 0.999;
        let frame = step(&state, &TickInput::default(), MAX_FRAME_DT);

        assert_eq!(frame.state.time_of_day, 1.0);
        assert_eq!(frame.state.phase, GamePhase::Defeat);
        assert!(frame.state.game_over());
        assert!(!frame.state.victory());
        assert!(!frame.state.is_playing());
    }

    #[test]
    fn test_energy_target_is_victory_and_freezes() {
        let tuning = Tuning::default();
        let mut state = running(&tuning);
        state.max_energy = 1.0;
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let frame = step(&state, &input, FRAME_DT);

        assert!(frame.state.victory());
        assert!(!frame.state.game_over());
        // Headroom cap: 2.0 collected, capped at 1.1 x target
        assert!((frame.state.energy - 1.1).abs() < 1e-6);
        // Time does not advance on the winning frame
        assert_eq!(frame.state.time_of_day, state.time_of_day);

        let later = step(&frame.state, &input, FRAME_DT);
        assert_eq!(later.state.time_of_day, frame.state.time_of_day);
        assert_eq!(later.state.energy, frame.state.energy);
        assert_eq!(later.state.frames, frame.state.frames);
        assert!(later.state.victory());
    }

    #[test]
    fn test_victory_wins_over_sunset_in_same_frame() {
        let tuning = Tuning::default();
        let mut state = running(&tuning);
        state.max_energy = 1.0;
        state.time_of_day = 0.9999;
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        // This frame's dt alone would carry the day past sunset
        let frame = step(&state, &input, 1.0);

        assert_eq!(frame.state.phase, GamePhase::Victory);
        assert_eq!(frame.state.time_of_day, 0.9999);
        assert!(frame.state.energy >= frame.state.max_energy);
    }

    #[test]
    fn test_energy_never_decreases() {
        let tuning = Tuning::default();
        let mut state = running(&tuning);
        let mut last = state.energy;
        for i in 0..600 {
            // Alternate between aimed and flat mirrors
            let input = TickInput {
                autopilot: i % 3 == 0,
                ..Default::default()
            };
            state = step(&state, &input, FRAME_DT).state;
            assert!(state.energy >= last);
            last = state.energy;
            if !state.is_playing() {
                break;
            }
        }
    }

    #[test]
    fn test_single_mirror_perfect_aim_wins_in_about_four_seconds() {
        let tuning = Tuning::default();
        let mut state = running(&tuning);
        assert_eq!(state.mirrors.len(), 1);
        assert_eq!(state.max_energy, 500.0);

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut frames = 0;
        while state.is_playing() && frames < 10_000 {
            let frame = step(&state, &input, FRAME_DT);
            assert_eq!(frame.report.total_energy, PERFECT_ENERGY);
            state = frame.state;
            frames += 1;
        }

        assert!(state.victory());
        assert_eq!(frames, 250);
        let seconds = state.time_of_day * DAY_DURATION_SECONDS / state.time_scale;
        assert!((seconds - 4.15).abs() < 0.05, "won after {}s", seconds);
        assert!((state.mirrors[0].efficiency - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_unsteered_mirror_loses_at_sunset() {
        let tuning = Tuning::default();
        let mut state = running(&tuning);
        let mut frames = 0;
        while state.is_playing() && frames < 10_000 {
            state = step(&state, &TickInput::default(), FRAME_DT).state;
            frames += 1;
        }

        assert!(state.game_over());
        assert_eq!(state.time_of_day, 1.0);
        assert!(state.energy < state.max_energy);
        // One 30 second day at 60 fps
        assert!((1795..=1805).contains(&frames), "lost after {} frames", frames);
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let start = advance_level(&running(&tuning), &tuning);
        let start = step(
            &start,
            &TickInput {
                start: true,
                ..Default::default()
            },
            0.0,
        )
        .state;

        let run = |mut state: GameState| {
            let mut energies = Vec::new();
            for i in 0..300 {
                let input = TickInput {
                    autopilot: i % 4 != 0,
                    ..Default::default()
                };
                let frame = step(&state, &input, FRAME_DT);
                energies.push(frame.report.total_energy);
                state = frame.state;
            }
            (state, energies)
        };

        let (a, energies_a) = run(start.clone());
        let (b, energies_b) = run(start);
        assert_eq!(energies_a, energies_b);
        assert_eq!(a.energy, b.energy);
        assert_eq!(a.time_of_day, b.time_of_day);
        assert_eq!(a.sun, b.sun);
        assert_eq!(a.phase, b.phase);
        for (ma, mb) in a.mirrors.iter().zip(&b.mirrors) {
            assert_eq!(ma.angle, mb.angle);
        }
    }

    #[test]
    fn test_score_tracks_energy() {
        let tuning = Tuning::default();
        let mut state = running(&tuning);
        state.score = 100.0;
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..10 {
            state = step(&state, &input, FRAME_DT).state;
        }
        assert_eq!(state.energy, 20.0);
        assert_eq!(state.score, 120.0);
    }

    #[test]
    fn test_advance_level_resets_and_keeps_score() {
        let tuning = Tuning::default();
        let mut state = running(&tuning);
        state.phase = GamePhase::Victory;
        state.energy = 520.0;
        state.score = 700.0;
        state.time_of_day = 0.4;
        state.selection = Selection {
            index: Some(0),
            dragging: false,
        };
        state.mirrors[0].is_selected = true;

        let next = advance_level(&state, &tuning);
        assert_eq!(next.level, 2);
        assert_eq!(next.phase, GamePhase::Idle);
        assert_eq!(next.energy, 0.0);
        assert_eq!(next.time_of_day, 0.0);
        assert_eq!(next.score, 700.0);
        assert_eq!(next.mirrors.len(), 2);
        assert_eq!(next.max_energy, tuning.level(2).energy_target);
        assert_eq!(next.selection, Selection::default());
        assert!(next.mirrors.iter().all(|m| !m.is_selected && m.angle == 0.0));
    }

    #[test]
    fn test_restart_level_drops_level_energy() {
        let tuning = Tuning::default();
        let mut state = running(&tuning);
        state.phase = GamePhase::Defeat;
        state.energy = 120.0;
        state.score = 300.0;
        state.time_of_day = 1.0;

        let again = restart_level(&state, &tuning);
        assert_eq!(again.level, 1);
        assert_eq!(again.phase, GamePhase::Idle);
        assert_eq!(again.score, 180.0);
        assert_eq!(again.time_of_day, 0.0);
        assert_eq!(again.energy, 0.0);
    }

    #[test]
    fn test_reinit_uses_new_viewport() {
        let tuning = Tuning::default();
        let state = running(&tuning);
        let resized = step(
            &state,
            &TickInput {
                viewport: Some(Viewport::new(1600.0, 1200.0)),
                ..Default::default()
            },
            FRAME_DT,
        )
        .state;
        // Tower stays put until the level is laid out again
        assert_eq!(resized.tower, state.tower);

        let next = advance_level(&resized, &tuning);
        assert!(next.tower.position.x > state.tower.position.x);
    }
}
