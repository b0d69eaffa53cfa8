//! Frame driver
//!
//! Owns the session, the high score and settings, and the store they persist
//! to. Each display frame feeds elapsed time into a fixed-step accumulator,
//! renders, then flushes simulation events to the audio and HUD sinks.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::highscores::HighScore;
use crate::persistence::KeyValueStore;
use crate::platform::{AudioSink, Hud, InputState, Screen, Surface};
use crate::renderer;
use crate::settings::Settings;
use crate::sim::{self, GameEvent, GamePhase, GameState, Viewport};
use crate::tuning::Tuning;

/// Whether the front end should schedule another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Game instance holding all state
pub struct Game<K: KeyValueStore> {
    state: GameState,
    settings: Settings,
    high_score: HighScore,
    store: K,
    running: bool,
    /// Bumped on every start so frames scheduled by an earlier session can be dropped
    generation: u64,
    accumulator: f32,
    last_time: Option<f64>,
}

impl<K: KeyValueStore> Game<K> {
    /// Create a game on the start screen, reading persisted data from `store`
    pub fn new(seed: u64, viewport: Viewport, tuning: Tuning, store: K) -> Self {
        let high_score = HighScore::load(&store);
        let settings = Settings::load(&store);
        log::info!("Game initialized with seed: {}", seed);
        Self {
            state: GameState::new(seed, viewport, tuning),
            settings,
            high_score,
            store,
            running: false,
            generation: 0,
            accumulator: 0.0,
            last_time: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether a frame scheduled under `generation` should still run
    pub fn is_current(&self, generation: u64) -> bool {
        self.running && generation == self.generation
    }

    /// Begin a fresh session; returns the new loop generation
    pub fn start(&mut self, hud: &mut dyn Hud) -> u64 {
        sim::start_session(&mut self.state);
        self.running = true;
        self.generation += 1;
        self.accumulator = 0.0;
        self.last_time = None;

        hud.show_screen(Screen::Playing);
        hud.set_high_score(self.high_score.best());
        self.update_hud(hud);
        self.generation
    }

    /// Restart after game over; same transition as `start`
    pub fn restart(&mut self, hud: &mut dyn Hud) -> u64 {
        self.start(hud)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        sim::resize(&mut self.state, viewport);
    }

    /// Render without stepping, for the start screen and resizes
    pub fn draw(&self, surface: &mut dyn Surface) {
        renderer::render(&self.state, surface, &self.settings);
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        if let Err(e) = self.settings.save(&mut self.store) {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    /// Run one display frame at `time_ms`
    pub fn frame(
        &mut self,
        time_ms: f64,
        input: &mut InputState,
        surface: &mut dyn Surface,
        audio: &mut dyn AudioSink,
        hud: &mut dyn Hud,
    ) -> LoopControl {
        if !self.running {
            return LoopControl::Stop;
        }

        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_time = Some(time_ms);
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let step_input = input.take_tick_input(time_ms);
            sim::tick(&mut self.state, &step_input);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop backlog the substep cap could not absorb
        self.accumulator = self.accumulator.min(SIM_DT);

        renderer::render(&self.state, surface, &self.settings);

        self.flush_events(audio);
        if self.high_score.submit(self.state.score) {
            hud.set_high_score(self.high_score.best());
            if let Err(e) = self.high_score.save(&mut self.store) {
                log::warn!("Failed to save high score: {}", e);
            }
        }
        self.update_hud(hud);

        if self.state.phase == GamePhase::GameOver {
            self.running = false;
            hud.show_final(self.state.score, self.state.level);
            hud.show_screen(Screen::GameOver);
            return LoopControl::Stop;
        }
        LoopControl::Continue
    }

    fn flush_events(&mut self, audio: &mut dyn AudioSink) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Sound(cue) => {
                    if !self.settings.muted {
                        audio.play(cue);
                    }
                }
                GameEvent::GameOver { score, level } => {
                    log::info!(
                        "Final score {} on level {} (best {})",
                        score,
                        level,
                        self.high_score.best().max(score)
                    );
                }
                other => log::trace!("{:?}", other),
            }
        }
    }

    fn update_hud(&self, hud: &mut dyn Hud) {
        hud.set_score(self.state.score);
        hud.set_level(self.state.level);
        hud.set_lives(self.state.lives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::platform::headless::{RecordingAudio, RecordingHud, RecordingSurface};
    use crate::sim::SoundCue;
    use glam::Vec2;

    struct Sinks {
        input: InputState,
        surface: RecordingSurface,
        audio: RecordingAudio,
        hud: RecordingHud,
    }

    impl Sinks {
        fn new() -> Self {
            Self {
                input: InputState::new(),
                surface: RecordingSurface::new(viewport()),
                audio: RecordingAudio::default(),
                hud: RecordingHud::default(),
            }
        }

        fn frame(&mut self, game: &mut Game<MemoryStore>, time_ms: f64) -> LoopControl {
            game.frame(
                time_ms,
                &mut self.input,
                &mut self.surface,
                &mut self.audio,
                &mut self.hud,
            )
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 700.0)
    }

    fn new_game(store: MemoryStore) -> Game<MemoryStore> {
        Game::new(17, viewport(), Tuning::default(), store)
    }

    fn send_ball_out(game: &mut Game<MemoryStore>) {
        let ball = &mut game.state_mut().balls[0];
        ball.pos = Vec2::new(50.0, 690.0);
        ball.vel = Vec2::new(0.0, 6.0);
    }

    #[test]
    fn test_frames_do_nothing_before_start() {
        let mut game = new_game(MemoryStore::new());
        let mut sinks = Sinks::new();
        assert_eq!(sinks.frame(&mut game, 0.0), LoopControl::Stop);
        assert_eq!(game.state().phase, GamePhase::Idle);
        assert!(sinks.surface.commands.is_empty());
    }

    #[test]
    fn test_start_shows_playing_screen_and_steps() {
        let mut game = new_game(MemoryStore::new());
        let mut sinks = Sinks::new();
        let generation = game.start(&mut sinks.hud);

        assert_eq!(sinks.hud.screen, Screen::Playing);
        assert_eq!((sinks.hud.level, sinks.hud.lives), (1, 3));
        assert!(game.is_current(generation));

        assert_eq!(sinks.frame(&mut game, 1_000.0), LoopControl::Continue);
        assert_eq!(game.state().steps, 1);
        // 60 ms later: three more steps, remainder carried
        sinks.frame(&mut game, 1_060.0);
        assert_eq!(game.state().steps, 4);
        assert!(!sinks.surface.commands.is_empty());
    }

    #[test]
    fn test_long_stall_is_capped() {
        let mut game = new_game(MemoryStore::new());
        let mut sinks = Sinks::new();
        game.start(&mut sinks.hud);
        sinks.frame(&mut game, 0.0);
        sinks.frame(&mut game, 5_000.0);
        assert!(game.state().steps <= 1 + u64::from(MAX_SUBSTEPS));
    }

    #[test]
    fn test_game_over_stops_loop_and_reports() {
        let mut game = new_game(MemoryStore::new());
        let mut sinks = Sinks::new();
        game.start(&mut sinks.hud);
        game.state_mut().lives = 1;
        game.state_mut().score = 70;
        send_ball_out(&mut game);

        assert_eq!(sinks.frame(&mut game, 0.0), LoopControl::Stop);
        assert!(!game.is_running());
        assert_eq!(sinks.hud.final_result, Some((70, 1)));
        assert_eq!(sinks.hud.screen, Screen::GameOver);
        assert!(sinks.audio.played.contains(&SoundCue::Life));

        // A frame arriving after game over does not step
        let steps = game.state().steps;
        assert_eq!(sinks.frame(&mut game, 16.0), LoopControl::Stop);
        assert_eq!(game.state().steps, steps);
    }

    #[test]
    fn test_high_score_persists_across_instances() {
        let mut game = new_game(MemoryStore::new());
        let mut sinks = Sinks::new();
        game.start(&mut sinks.hud);
        game.state_mut().score = 130;
        sinks.frame(&mut game, 0.0);

        assert_eq!(game.high_score(), 130);
        assert_eq!(sinks.hud.high_score, 130);
        assert_eq!(
            game.store().get(HighScore::STORAGE_KEY).unwrap().as_deref(),
            Some("130")
        );

        let reloaded = new_game(game.store().clone());
        assert_eq!(reloaded.high_score(), 130);
    }

    #[test]
    fn test_lower_score_leaves_high_score_alone() {
        let mut store = MemoryStore::new();
        HighScore::new(500).save(&mut store).unwrap();
        let mut game = new_game(store);
        let mut sinks = Sinks::new();
        game.start(&mut sinks.hud);
        game.state_mut().score = 20;
        sinks.frame(&mut game, 0.0);
        assert_eq!(game.high_score(), 500);
    }

    #[test]
    fn test_restart_invalidates_earlier_frames() {
        let mut game = new_game(MemoryStore::new());
        let mut sinks = Sinks::new();
        let first = game.start(&mut sinks.hud);
        game.state_mut().lives = 1;
        send_ball_out(&mut game);
        sinks.frame(&mut game, 0.0);
        assert!(!game.is_current(first));

        let second = game.restart(&mut sinks.hud);
        assert_ne!(first, second);
        assert!(!game.is_current(first));
        assert!(game.is_current(second));
        assert_eq!(game.state().phase, GamePhase::Playing);
        assert_eq!((game.state().score, game.state().lives), (0, 3));
    }

    #[test]
    fn test_mute_silences_cues() {
        let mut game = new_game(MemoryStore::new());
        let mut sinks = Sinks::new();
        game.set_settings(Settings {
            muted: true,
            ..Default::default()
        });
        game.start(&mut sinks.hud);
        game.state_mut().lives = 2;
        send_ball_out(&mut game);
        sinks.frame(&mut game, 0.0);

        assert_eq!(game.state().lives, 1);
        assert!(sinks.audio.played.is_empty());
        assert!(new_game(game.store().clone()).settings().muted);
    }
}
