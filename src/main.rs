//! Neon Breakout entry point
//!
//! In the browser this wires the canvas, DOM and Web Audio into the game loop.
//! Natively it runs a headless autoplay session and prints a summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use neon_breakout::audio::AudioManager;
    use neon_breakout::color::Rgba;
    use neon_breakout::persistence::{KeyValueStore, LocalStore, MemoryStore, StorageError};
    use neon_breakout::platform::{Hud, InputState, Key, Screen, Surface, TextAlign};
    use neon_breakout::sim::{Rect, Viewport};
    use neon_breakout::{Game, LoopControl, Tuning};

    /// LocalStorage when the browser allows it, otherwise an in-memory map
    enum BrowserStore {
        Local(LocalStore),
        Memory(MemoryStore),
    }

    impl BrowserStore {
        fn open() -> Self {
            match LocalStore::open() {
                Ok(store) => BrowserStore::Local(store),
                Err(e) => {
                    log::warn!("{}; high score will not persist", e);
                    BrowserStore::Memory(MemoryStore::new())
                }
            }
        }
    }

    impl KeyValueStore for BrowserStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            match self {
                BrowserStore::Local(store) => store.get(key),
                BrowserStore::Memory(store) => store.get(key),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            match self {
                BrowserStore::Local(store) => store.set(key, value),
                BrowserStore::Memory(store) => store.set(key, value),
            }
        }
    }

    /// 2D canvas drawing surface
    struct CanvasSurface {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
    }

    impl CanvasSurface {
        fn rounded_path(&self, rect: Rect, radius: f32) {
            let (x, y) = (rect.min.x as f64, rect.min.y as f64);
            let (w, h) = (rect.size.x as f64, rect.size.y as f64);
            let r = (radius as f64).min(w / 2.0).min(h / 2.0).max(0.0);

            self.ctx.begin_path();
            self.ctx.move_to(x + r, y);
            self.ctx.arc_to(x + w, y, x + w, y + h, r).ok();
            self.ctx.arc_to(x + w, y + h, x, y + h, r).ok();
            self.ctx.arc_to(x, y + h, x, y, r).ok();
            self.ctx.arc_to(x, y, x + w, y, r).ok();
            self.ctx.close_path();
        }
    }

    impl Surface for CanvasSurface {
        fn size(&self) -> Viewport {
            Viewport::new(self.canvas.width() as f32, self.canvas.height() as f32)
        }

        fn fill_rect(&mut self, rect: Rect, color: Rgba) {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill_rect(
                rect.min.x as f64,
                rect.min.y as f64,
                rect.size.x as f64,
                rect.size.y as f64,
            );
        }

        fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Rgba) {
            self.rounded_path(rect, radius);
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill();
        }

        fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, color: Rgba, line_width: f32) {
            self.rounded_path(rect, radius);
            self.ctx.set_stroke_style_str(&color.to_css());
            self.ctx.set_line_width(line_width as f64);
            self.ctx.stroke();
        }

        fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
            self.ctx.begin_path();
            self.ctx
                .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
                .ok();
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill();
        }

        fn fill_text(&mut self, text: &str, at: Vec2, size: f32, align: TextAlign, color: Rgba) {
            self.ctx.set_font(&format!("bold {}px sans-serif", size));
            self.ctx.set_text_align(match align {
                TextAlign::Left => "left",
                TextAlign::Center => "center",
            });
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill_text(text, at.x as f64, at.y as f64).ok();
        }

        fn set_global_alpha(&mut self, alpha: f32) {
            self.ctx.set_global_alpha(alpha as f64);
        }

        fn set_glow(&mut self, blur: f32, color: Rgba) {
            self.ctx.set_shadow_blur(blur as f64);
            self.ctx.set_shadow_color(&color.to_css());
        }
    }

    /// Score/level/lives readouts and overlay screens in the page
    struct DomHud {
        document: Document,
    }

    impl DomHud {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let classes = el.class_list();
                if hidden {
                    classes.add_1("hidden").ok();
                } else {
                    classes.remove_1("hidden").ok();
                }
            }
        }
    }

    impl Hud for DomHud {
        fn set_score(&mut self, score: u64) {
            self.set_text("score", &score.to_string());
        }

        fn set_level(&mut self, level: u32) {
            self.set_text("level", &level.to_string());
        }

        fn set_lives(&mut self, lives: u32) {
            self.set_text("lives", &lives.to_string());
        }

        fn set_high_score(&mut self, best: u64) {
            self.set_text("high-score", &best.to_string());
        }

        fn show_final(&mut self, score: u64, level: u32) {
            self.set_text("final-score", &score.to_string());
            self.set_text("final-level", &level.to_string());
        }

        fn show_screen(&mut self, screen: Screen) {
            self.set_hidden("start-screen", screen != Screen::Start);
            self.set_hidden("game-over-screen", screen != Screen::GameOver);
        }
    }

    struct App {
        game: Game<BrowserStore>,
        input: InputState,
        surface: CanvasSurface,
        audio: AudioManager,
        hud: DomHud,
    }

    fn window_viewport(window: &web_sys::Window) -> Viewport {
        let width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(800.0);
        let height = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(600.0);
        Viewport::new(width as f32, height as f32)
    }

    fn fit_canvas(canvas: &HtmlCanvasElement, viewport: Viewport) {
        canvas.set_width(viewport.width as u32);
        canvas.set_height(viewport.height as u32);
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Neon Breakout starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let viewport = window_viewport(&window);
        fit_canvas(&canvas, viewport);

        let seed = js_sys::Date::now() as u64;
        let game = Game::new(seed, viewport, Tuning::default(), BrowserStore::open());

        let mut audio = AudioManager::new();
        audio.apply_settings(game.settings());

        let mut hud = DomHud {
            document: document.clone(),
        };
        hud.set_high_score(game.high_score());
        hud.show_screen(Screen::Start);

        let app = Rc::new(RefCell::new(App {
            game,
            input: InputState::new(),
            surface: CanvasSurface {
                canvas: canvas.clone(),
                ctx,
            },
            audio,
            hud,
        }));

        {
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            a.game.draw(&mut a.surface);
        }

        setup_input_handlers(&document, &canvas, app.clone())?;
        setup_buttons(&document, app.clone())?;
        setup_resize(&window, canvas, app)?;

        log::info!("Neon Breakout ready");
        Ok(())
    }

    fn setup_input_handlers(
        document: &Document,
        canvas: &HtmlCanvasElement,
        app: Rc<RefCell<App>>,
    ) -> Result<(), JsValue> {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_name(&event.key()) {
                    app.borrow_mut().input.press(key);
                }
            });
            document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_name(&event.key()) {
                    app.borrow_mut().input.release(key);
                }
            });
            document.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let x = event.client_x() - canvas.offset_left();
                app.borrow_mut().input.pointer_moved(x as f32);
            });
            document
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        for id in ["start-btn", "restart-btn"] {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("Missing #{}", id);
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let generation = {
                    let mut guard = app.borrow_mut();
                    let a = &mut *guard;
                    a.audio.resume();
                    a.audio.apply_settings(a.game.settings());
                    a.game.start(&mut a.hud)
                };
                request_animation_frame(app.clone(), generation);
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_resize(
        window: &web_sys::Window,
        canvas: HtmlCanvasElement,
        app: Rc<RefCell<App>>,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let viewport = window_viewport(&window);
            fit_canvas(&canvas, viewport);

            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            a.game.resize(viewport);
            if !a.game.is_running() {
                a.game.draw(&mut a.surface);
            }
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>, generation: u64) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, generation, time);
        });
        window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok();
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, generation: u64, time: f64) {
        let control = {
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            // A restart since this frame was scheduled owns the loop now
            if !a.game.is_current(generation) {
                return;
            }
            a.game
                .frame(time, &mut a.input, &mut a.surface, &mut a.audio, &mut a.hud)
        };

        if control == LoopControl::Continue {
            request_animation_frame(app, generation);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::PathBuf;

    use clap::Parser;

    use neon_breakout::persistence::{FileStore, KeyValueStore, MemoryStore, StorageError};
    use neon_breakout::platform::InputState;
    use neon_breakout::platform::headless::{
        RecordingAudio, RecordingHud, RecordingSurface, autopilot,
    };
    use neon_breakout::sim::Viewport;
    use neon_breakout::{Game, LoopControl, Tuning};

    #[derive(Parser, Debug)]
    #[command(author, version, about = "Headless autoplay run of Neon Breakout", long_about = None)]
    pub struct Args {
        /// RNG seed for the session
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Display frames to simulate at 60 Hz
        #[arg(long, default_value_t = 3600)]
        frames: u32,
        #[arg(long, default_value_t = 1000.0)]
        width: f32,
        #[arg(long, default_value_t = 700.0)]
        height: f32,
        /// Tuning overrides as JSON
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// JSON file holding the high score and settings; in-memory when absent
        #[arg(long)]
        store: Option<PathBuf>,
    }

    pub fn run(args: Args) -> Result<(), StorageError> {
        let tuning = match &args.tuning {
            Some(path) => {
                let tuning = Tuning::from_json(&fs::read_to_string(path)?)?;
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            None => Tuning::default(),
        };

        match &args.store {
            Some(path) => {
                let store = FileStore::open(path)?;
                log::info!("Persisting to {}", store.path().display());
                autoplay(&args, tuning, store)
            }
            None => autoplay(&args, tuning, MemoryStore::new()),
        }
        Ok(())
    }

    fn autoplay<K: KeyValueStore>(args: &Args, tuning: Tuning, store: K) {
        let viewport = Viewport::new(args.width, args.height);
        let mut game = Game::new(args.seed, viewport, tuning, store);
        let mut input = InputState::new();
        let mut surface = RecordingSurface::new(viewport);
        let mut audio = RecordingAudio::default();
        let mut hud = RecordingHud::default();

        game.start(&mut hud);
        let mut frames_run = 0;
        for frame in 0..args.frames {
            let now_ms = f64::from(frame) * 1000.0 / 60.0;
            if let Some(x) = autopilot(game.state(), now_ms).pointer_x {
                input.pointer_moved(x);
            }
            surface.clear();
            frames_run += 1;
            if game.frame(now_ms, &mut input, &mut surface, &mut audio, &mut hud)
                == LoopControl::Stop
            {
                break;
            }
        }

        let state = game.state();
        println!("Neon Breakout headless run");
        println!("  seed:        {}", state.seed);
        println!("  frames:      {} ({} steps)", frames_run, state.steps);
        println!("  phase:       {:?}", state.phase);
        println!("  score:       {}", state.score);
        println!("  level:       {} ({} pattern)", state.level, state.grid.pattern.name());
        println!("  lives:       {}", state.lives);
        println!("  high score:  {}", game.high_score());
        println!("  sound cues:  {}", audio.played.len());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();
    let args = native::Args::parse();
    log::info!("Neon Breakout (native) starting...");

    match native::run(args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
