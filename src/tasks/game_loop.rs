// Action GBA: Frame Loop
//
// Single-threaded, fixed-delay loop. Each frame: measure dt, poll gestures,
// advance the state machine, forward its commands, tick the indicator.

use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::{ConfigError, GameConfig, FRAME_INTERVAL_MS};
use crate::events::{GestureEvents, IndicatorMode, Tick, UiCommand};
use crate::game::GameStateMachine;
use crate::hal::{Indicator, Screen, SensorSource};
use crate::input::GestureInterpreter;

pub struct GameLoop<'c, R> {
    interpreter: GestureInterpreter<'c>,
    game: GameStateMachine<'c, R>,
    last_frame: Instant,
}

impl<'c, R: Rng> GameLoop<'c, R> {
    pub fn new<S: SensorSource>(
        config: &'c GameConfig,
        sensors: &mut S,
        rng: R,
        now: Instant,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            game: GameStateMachine::new(config, rng, now)?,
            interpreter: GestureInterpreter::new(config, sensors, now),
            last_frame: now,
        })
    }

    pub fn game(&self) -> &GameStateMachine<'c, R> {
        &self.game
    }

    /// One-time blocking intro. Leaves the splash on screen and the rainbow running.
    pub fn boot<Sc: Screen, I: Indicator>(
        &mut self,
        screen: &mut Sc,
        indicator: &mut I,
    ) -> anyhow::Result<()> {
        indicator.set_mode(IndicatorMode::Splash)?;
        screen.play_intro_animation()?;
        // First frame's dt starts when the intro ends.
        self.last_frame = Instant::now();
        Ok(())
    }

    /// Run one frame at time `now`. Screen and indicator failures are logged
    /// and do not stop the game.
    pub fn frame<S, Sc, I>(
        &mut self,
        now: Instant,
        sensors: &mut S,
        screen: &mut Sc,
        indicator: &mut I,
    ) -> GestureEvents
    where
        S: SensorSource,
        Sc: Screen,
        I: Indicator,
    {
        let dt = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;

        let events = self.interpreter.poll(sensors, now);
        for command in self.game.update(&events, Tick { now, dt }) {
            if let Err(e) = dispatch(command, screen, indicator) {
                log::warn!("{:?} failed: {}", command, e);
            }
        }
        if let Err(e) = indicator.tick(dt) {
            log::warn!("Indicator tick failed: {}", e);
        }

        events
    }

    /// Drive frames forever at roughly [`FRAME_INTERVAL_MS`].
    pub fn run<S, Sc, I>(&mut self, sensors: &mut S, screen: &mut Sc, indicator: &mut I) -> !
    where
        S: SensorSource,
        Sc: Screen,
        I: Indicator,
    {
        let interval = Duration::from_millis(FRAME_INTERVAL_MS);
        loop {
            let frame_start = Instant::now();
            self.frame(frame_start, sensors, screen, indicator);

            let elapsed = frame_start.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
    }
}

fn dispatch<Sc: Screen, I: Indicator>(
    command: UiCommand,
    screen: &mut Sc,
    indicator: &mut I,
) -> anyhow::Result<()> {
    match command {
        UiCommand::ShowMenu(difficulty) => screen.show_menu(difficulty),
        UiCommand::ShowLevel(hud) => screen.show_level(&hud),
        UiCommand::ShowGameOver => screen.show_game_over(),
        UiCommand::ShowGameWin => screen.show_game_win(),
        UiCommand::SetIndicator(mode) => indicator.set_mode(mode),
    }
}
