//! Heliostat entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use heliostat::Tuning;
    use heliostat::consts::*;
    use heliostat::sim::{
        self, FieldReport, GamePhase, GameState, HitTier, TickInput, Viewport, advance_level,
        handle_pointer, restart_level, step,
    };

    /// Game instance holding all state
    struct Game {
        state: GameState,
        report: FieldReport,
        tuning: Tuning,
        input: TickInput,
        last_time: f64,
        /// Whether an animation frame is pending
        looping: bool,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
    }

    impl Game {
        fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
            let tuning = Tuning::default();
            let state = GameState::new(canvas_viewport(&canvas), &tuning);
            Self {
                state,
                report: FieldReport::default(),
                tuning,
                input: TickInput::default(),
                last_time: 0.0,
                looping: false,
                canvas,
                ctx,
            }
        }

        /// Run one simulation step
        fn update(&mut self, dt: f32) {
            self.input.viewport = Some(canvas_viewport(&self.canvas));
            let frame = step(&self.state, &self.input, dt);
            self.state = frame.state;
            self.report = frame.report;

            // Clear one-shot inputs after processing
            self.input.start = false;
        }

        fn pointer(&mut self, event: sim::PointerEvent) {
            self.state = handle_pointer(&self.state, event);
        }

        /// Primary action: start, continue or retry depending on phase
        fn advance(&mut self) {
            match self.state.phase {
                GamePhase::Idle => self.input.start = true,
                GamePhase::Running => {}
                GamePhase::Victory => self.next_level(),
                GamePhase::Defeat => self.restart(),
            }
        }

        fn next_level(&mut self) {
            self.resize();
            self.state = advance_level(&self.state, &self.tuning);
        }

        fn restart(&mut self) {
            self.resize();
            self.state = restart_level(&self.state, &self.tuning);
        }

        /// Match the canvas backing store to its displayed size
        fn resize(&mut self) {
            let w = self.canvas.client_width().max(1) as u32;
            let h = self.canvas.client_height().max(1) as u32;
            if self.canvas.width() != w || self.canvas.height() != h {
                self.canvas.set_width(w);
                self.canvas.set_height(h);
            }
            self.state.viewport = canvas_viewport(&self.canvas);
        }

        /// Render the current frame
        fn render(&self) {
            let ctx = &self.ctx;
            let vp = self.state.viewport;
            let tower = &self.state.tower;
            let receiver = tower.receiver_center();

            ctx.set_fill_style_str("#0b1020");
            ctx.fill_rect(0.0, 0.0, vp.width as f64, vp.height as f64);

            // Ground
            let ground = (vp.height * self.state.layout.ground) as f64;
            ctx.set_fill_style_str("#1d2a1a");
            ctx.fill_rect(0.0, ground, vp.width as f64, vp.height as f64 - ground);

            // Sun
            fill_circle(ctx, self.state.sun, 18.0, "#ffd75e");

            // Tower and receiver
            ctx.set_stroke_style_str("#8a8f99");
            ctx.set_line_width(8.0);
            line(ctx, tower.position, receiver);
            let glowing = self.report.hits() > 0;
            fill_circle(
                ctx,
                receiver,
                tower.receiver_radius,
                if glowing { "#ff9f40" } else { "#5a5f6a" },
            );

            // Rays
            ctx.set_line_width(1.5);
            for ray in &self.report.rays {
                ctx.set_stroke_style_str("rgba(255, 215, 94, 0.25)");
                line(ctx, self.state.sun, ray.origin);

                let color = match ray.tier {
                    HitTier::Perfect => "rgba(255, 240, 120, 0.9)",
                    HitTier::Partial => "rgba(255, 180, 80, 0.7)",
                    HitTier::Misaligned => "rgba(255, 120, 80, 0.5)",
                    HitTier::Miss => "rgba(255, 255, 255, 0.15)",
                };
                ctx.set_stroke_style_str(color);
                line(ctx, ray.origin, ray.ray_end);
            }

            // Mirrors
            for mirror in &self.state.mirrors {
                let half = sim::vector::from_angle(mirror.angle) * (mirror.width / 2.0);
                ctx.set_line_width(if mirror.is_selected { 6.0 } else { 4.0 });
                ctx.set_stroke_style_str(if mirror.is_selected { "#7fe3ff" } else { "#cfd8e3" });
                line(ctx, mirror.position - half, mirror.position + half);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let s = &self.state;

            let texts = [
                ("hud-level", s.level.to_string()),
                ("hud-energy", format!("{:.0} / {:.0}", s.energy, s.max_energy)),
                ("hud-time", format!("{:.0}s", s.remaining_seconds())),
                ("hud-score", format!("{:.0}", s.score)),
            ];
            for (id, text) in texts {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(&text));
                }
            }

            let panels = [
                ("start-prompt", s.phase == GamePhase::Idle),
                ("level-complete", s.phase == GamePhase::Victory),
                ("level-failed", s.phase == GamePhase::Defeat),
            ];
            for (id, visible) in panels {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            }
        }
    }

    fn canvas_viewport(canvas: &HtmlCanvasElement) -> Viewport {
        Viewport::new(canvas.width() as f32, canvas.height() as f32)
    }

    fn line(ctx: &CanvasRenderingContext2d, from: Vec2, to: Vec2) {
        ctx.begin_path();
        ctx.move_to(from.x as f64, from.y as f64);
        ctx.line_to(to.x as f64, to.y as f64);
        ctx.stroke();
    }

    fn fill_circle(ctx: &CanvasRenderingContext2d, center: Vec2, radius: f32, color: &str) {
        ctx.set_fill_style_str(color);
        ctx.begin_path();
        let _ = ctx.arc(
            center.x as f64,
            center.y as f64,
            radius as f64,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();
    }

    fn pointer_pos(event: &PointerEvent) -> Vec2 {
        Vec2::new(event.offset_x() as f32, event.offset_y() as f32)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Heliostat starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(canvas.client_width().max(1) as u32);
        canvas.set_height(canvas.client_height().max(1) as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let game = Rc::new(RefCell::new(Game::new(canvas.clone(), ctx)));

        setup_input_handlers(&canvas, game.clone());
        setup_button("start-btn", game.clone(), |g| g.input.start = true);
        setup_button("next-btn", game.clone(), Game::next_level);
        setup_button("restart-btn", game.clone(), Game::restart);

        // Start game loop
        resume(&game);

        log::info!("Heliostat running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let pointer_events: [(&str, fn(&PointerEvent) -> sim::PointerEvent); 4] = [
            ("pointerdown", |e| sim::PointerEvent::Down(pointer_pos(e))),
            ("pointermove", |e| sim::PointerEvent::Move(pointer_pos(e))),
            ("pointerup", |_| sim::PointerEvent::Up),
            ("pointerleave", |_| sim::PointerEvent::Leave),
        ];

        for (name, to_event) in pointer_events {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                game.borrow_mut().pointer(to_event(&event));
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                {
                    let mut g = game.borrow_mut();
                    match event.key().as_str() {
                        " " | "Enter" => g.advance(),
                        "a" | "A" => {
                            g.input.autopilot = !g.input.autopilot;
                            log::info!("Autopilot: {}", g.input.autopilot);
                        }
                        _ => {}
                    }
                }
                resume(&game);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_button(id: &str, game: Rc<RefCell<Game>>, action: fn(&mut Game)) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            action(&mut game.borrow_mut());
            resume(&game);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Restart the frame loop after a level was laid out again
    fn resume(game: &Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if g.looping || g.state.phase.is_terminal() {
                return;
            }
            g.looping = true;
            g.last_time = 0.0;
        }
        request_animation_frame(game.clone());
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let keep_running = {
            let mut g = game.borrow_mut();

            // Calculate delta time, capped at MAX_FRAME_DT
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                FRAME_DT
            };
            let dt = dt.min(MAX_FRAME_DT);
            g.last_time = time;

            g.resize();
            g.update(dt);
            g.render();
            g.update_hud();

            // Finished levels stop ticking until the next level or a retry
            if g.state.phase.is_terminal() {
                g.looping = false;
                log::debug!("Frame loop paused in {:?}", g.state.phase);
            }
            g.looping
        };

        if keep_running {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use heliostat::Tuning;

    env_logger::init();
    log::info!("Heliostat (native) starting...");
    log::info!("Native mode runs a headless autopilot demo - run with `trunk serve` to play");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{}", e);
                return std::process::ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    run_demo(&tuning);
    std::process::ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> Result<heliostat::Tuning, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(heliostat::Tuning::from_json(&json)?)
}

/// Play every configured level at 60 fps with all mirrors on autopilot
#[cfg(not(target_arch = "wasm32"))]
fn run_demo(tuning: &heliostat::Tuning) {
    use heliostat::consts::{DAY_DURATION_SECONDS, FRAME_DT};
    use heliostat::sim::{GameState, TickInput, Viewport, advance_level, step};

    let mut state = GameState::new(Viewport::new(800.0, 600.0), tuning);

    for _ in 0..tuning.level_count() {
        let mut input = TickInput {
            start: true,
            autopilot: true,
            ..Default::default()
        };
        while !state.phase.is_terminal() {
            state = step(&state, &input, FRAME_DT).state;
            input.start = false;
        }

        let seconds = state.time_of_day * DAY_DURATION_SECONDS / state.time_scale;
        if state.victory() {
            println!(
                "✓ Level {}: {} mirrors, {:.0}/{:.0} energy in {:.1}s",
                state.level,
                state.mirrors.len(),
                state.energy,
                state.max_energy,
                seconds
            );
            state = advance_level(&state, tuning);
        } else {
            println!(
                "✗ Level {}: sunset with {:.0}/{:.0} energy",
                state.level, state.energy, state.max_energy
            );
            break;
        }
    }

    println!("Final score: {:.0}", state.score);
}
