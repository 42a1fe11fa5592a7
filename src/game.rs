// Action GBA: Game State Machine
//
// Splash -> Menu -> LevelStart -> WaitInput -> (LevelStart | GameOver | GameWin)
//
// Consumes one frame of gesture flags per `update` and returns the screen and
// indicator commands that frame produced. All deadlines are plain monotonic
// timestamp comparisons.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::{ConfigError, GameConfig};
use crate::events::{Difficulty, GestureEvents, IndicatorMode, LevelHud, Move, Tick, UiCommand};
use crate::sequence::SequenceGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Splash,
    Menu,
    LevelStart,
    WaitInput,
    GameOver,
    GameWin,
}

pub struct GameStateMachine<'c, R> {
    config: &'c GameConfig,
    generator: SequenceGenerator<'c, R>,

    state: State,
    difficulty: Difficulty,
    level: u32,

    // Current level
    sequence: Vec<Move>,
    seq_index: usize,
    current_move: Move,
    per_move_time: Duration,
    move_deadline: Instant,
    action_cooldown_until: Option<Instant>,

    // Menu
    menu_needs_redraw: bool,
    menu_press_start: Option<Instant>,
}

impl<'c, R: Rng> GameStateMachine<'c, R> {
    /// Starts on the splash screen at EASY, level 1. Fails on an invalid table.
    pub fn new(config: &'c GameConfig, rng: R, now: Instant) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            generator: SequenceGenerator::new(config, rng),
            state: State::Splash,
            difficulty: Difficulty::Easy,
            level: 1,
            sequence: Vec::new(),
            seq_index: 0,
            current_move: Move::Press,
            per_move_time: Duration::ZERO,
            move_deadline: now,
            action_cooldown_until: None,
            menu_needs_redraw: true,
            menu_press_start: None,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn sequence(&self) -> &[Move] {
        &self.sequence
    }

    pub fn seq_index(&self) -> usize {
        self.seq_index
    }

    pub fn current_move(&self) -> Move {
        self.current_move
    }

    pub fn per_move_time(&self) -> Duration {
        self.per_move_time
    }

    pub fn move_deadline(&self) -> Instant {
        self.move_deadline
    }

    /// Advance one frame.
    pub fn update(&mut self, events: &GestureEvents, tick: Tick) -> Vec<UiCommand> {
        let mut out = Vec::new();
        match self.state {
            State::Splash => self.on_splash(events, &mut out),
            State::Menu => self.on_menu(events, tick.now, &mut out),
            State::LevelStart => self.start_level(tick.now, &mut out),
            State::WaitInput => self.on_wait_input(events, tick.now, &mut out),
            State::GameOver | State::GameWin => self.on_finished(events, &mut out),
        }
        out
    }

    // ---- Splash -----------------------------------------------------------

    fn on_splash(&mut self, events: &GestureEvents, out: &mut Vec<UiCommand>) {
        if events.button_pressed_edge {
            log::info!("SPLASH: button pressed, go to MENU");
            self.state = State::Menu;
            self.menu_needs_redraw = true;
            self.menu_press_start = None;
            out.push(UiCommand::SetIndicator(IndicatorMode::Menu));
        }
    }

    // ---- Menu (difficulty select) -----------------------------------------

    fn on_menu(&mut self, events: &GestureEvents, now: Instant, out: &mut Vec<UiCommand>) {
        if events.rotated_cw {
            self.difficulty = self.difficulty.next();
            self.menu_needs_redraw = true;
            log::info!("MENU: rotate CW, difficulty = {}", self.difficulty);
        } else if events.rotated_ccw {
            self.difficulty = self.difficulty.prev();
            self.menu_needs_redraw = true;
            log::info!("MENU: rotate CCW, difficulty = {}", self.difficulty);
        }

        if self.menu_needs_redraw {
            out.push(UiCommand::ShowMenu(self.difficulty));
            self.menu_needs_redraw = false;
        }

        if !events.button_held {
            self.menu_press_start = None;
            return;
        }

        match self.menu_press_start {
            None => self.menu_press_start = Some(now),
            Some(start) => {
                let held = now.saturating_duration_since(start);
                if held >= self.config.menu_press_hold {
                    log::info!("MENU: long press to start game, held = {:?}", held);
                    self.menu_press_start = None;
                    self.level = 1;
                    self.start_level(now, out);
                }
            }
        }
    }

    // ---- Level start (runs in the same frame it is entered) --------------

    fn start_level(&mut self, now: Instant, out: &mut Vec<UiCommand>) {
        self.state = State::LevelStart;
        out.push(UiCommand::SetIndicator(IndicatorMode::Playing));

        let spec = match self.generator.build(self.difficulty, self.level) {
            Ok(spec) => spec,
            Err(e) => {
                log::error!("LEVEL_START: cannot build level {}: {}", self.level, e);
                self.game_over(out);
                return;
            }
        };
        let Some(&first) = spec.sequence.first() else {
            log::error!("LEVEL_START: level {} has no moves", self.level);
            self.game_over(out);
            return;
        };

        self.sequence = spec.sequence;
        self.seq_index = 0;
        self.current_move = first;
        self.per_move_time = spec.per_move_time;
        self.move_deadline = now + self.per_move_time;
        // A new level never waits on the previous level's cooldown.
        self.action_cooldown_until = None;

        log::info!(
            "LEVEL_START: difficulty = {} level = {} seq_len = {} per_move_time = {:?}",
            self.difficulty,
            self.level,
            self.sequence.len(),
            self.per_move_time
        );

        out.push(UiCommand::ShowLevel(self.hud()));
        self.state = State::WaitInput;
        out.push(UiCommand::SetIndicator(IndicatorMode::Move(self.current_move)));
    }

    // ---- Waiting for the expected gesture ---------------------------------

    fn on_wait_input(&mut self, events: &GestureEvents, now: Instant, out: &mut Vec<UiCommand>) {
        if now > self.move_deadline {
            log::info!("WAIT_INPUT: time up, game over");
            self.game_over(out);
            return;
        }

        if self.action_cooldown_until.is_some_and(|until| now < until) {
            return;
        }

        if !events.satisfies(self.current_move) {
            return;
        }

        log::info!("WAIT_INPUT: correct move {}", self.current_move);
        self.action_cooldown_until = Some(now + self.config.action_cooldown);
        self.seq_index += 1;

        if self.seq_index >= self.sequence.len() {
            self.level += 1;
            if self.level > self.config.total_levels {
                log::info!("GAME_WIN: passed all levels");
                self.state = State::GameWin;
                out.push(UiCommand::ShowGameWin);
                out.push(UiCommand::SetIndicator(IndicatorMode::GameWin));
            } else {
                self.start_level(now, out);
            }
            return;
        }

        self.current_move = self.sequence[self.seq_index];
        // Every move gets a fresh budget.
        self.move_deadline = now + self.per_move_time;
        out.push(UiCommand::ShowLevel(self.hud()));
        out.push(UiCommand::SetIndicator(IndicatorMode::Move(self.current_move)));
    }

    // ---- Game over / win ----------------------------------------------------

    fn on_finished(&mut self, events: &GestureEvents, out: &mut Vec<UiCommand>) {
        if events.button_pressed_edge {
            log::info!("{:?}: button pressed, back to MENU", self.state);
            self.state = State::Menu;
            self.menu_needs_redraw = false;
            self.menu_press_start = None;
            out.push(UiCommand::ShowMenu(self.difficulty));
            out.push(UiCommand::SetIndicator(IndicatorMode::Menu));
        }
    }

    fn game_over(&mut self, out: &mut Vec<UiCommand>) {
        self.state = State::GameOver;
        out.push(UiCommand::ShowGameOver);
        out.push(UiCommand::SetIndicator(IndicatorMode::GameOver));
    }

    fn hud(&self) -> LevelHud {
        LevelHud {
            level: self.level,
            difficulty: self.difficulty,
            sequence_len: self.sequence.len(),
            index: self.seq_index,
            current_move: self.current_move,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    struct Clock {
        base: Instant,
        elapsed: Duration,
    }

    impl Clock {
        fn new() -> Self {
            Self {
                base: Instant::now(),
                elapsed: Duration::ZERO,
            }
        }

        fn advance(&mut self, by: Duration) -> Tick {
            self.elapsed += by;
            Tick {
                now: self.base + self.elapsed,
                dt: by,
            }
        }

        fn now(&self) -> Instant {
            self.base + self.elapsed
        }
    }

    fn machine<'c>(config: &'c GameConfig, clock: &Clock) -> GameStateMachine<'c, StdRng> {
        GameStateMachine::new(config, StdRng::seed_from_u64(42), clock.now()).unwrap()
    }

    fn idle() -> GestureEvents {
        GestureEvents::default()
    }

    fn press() -> GestureEvents {
        GestureEvents {
            button_pressed_edge: true,
            button_held: true,
            ..GestureEvents::default()
        }
    }

    fn held() -> GestureEvents {
        GestureEvents {
            button_held: true,
            ..GestureEvents::default()
        }
    }

    fn cw() -> GestureEvents {
        GestureEvents {
            rotated_cw: true,
            ..GestureEvents::default()
        }
    }

    fn ccw() -> GestureEvents {
        GestureEvents {
            rotated_ccw: true,
            ..GestureEvents::default()
        }
    }

    fn gesture_for(mv: Move) -> GestureEvents {
        match mv {
            Move::RotateRight => cw(),
            Move::RotateLeft => ccw(),
            Move::Press => press(),
            Move::Shake => GestureEvents {
                shake_detected: true,
                ..GestureEvents::default()
            },
        }
    }

    /// Wrong for every move except `mv`.
    fn wrong_gesture_for(mv: Move) -> GestureEvents {
        match mv {
            Move::RotateRight => ccw(),
            _ => cw(),
        }
    }

    /// Splash -> Menu -> hold -> WaitInput at the current difficulty.
    fn start_game(game: &mut GameStateMachine<'_, StdRng>, clock: &mut Clock) {
        game.update(&press(), clock.advance(Duration::from_millis(10)));
        game.update(&idle(), clock.advance(Duration::from_millis(10)));
        game.update(&held(), clock.advance(Duration::from_millis(10)));
        game.update(&held(), clock.advance(Duration::from_millis(200)));
        assert_eq!(game.state(), State::WaitInput);
    }

    /// Feed every move of the current level, spaced past the action cooldown.
    fn clear_level(game: &mut GameStateMachine<'_, StdRng>, clock: &mut Clock) {
        let moves = game.sequence().to_vec();
        for mv in moves {
            game.update(&gesture_for(mv), clock.advance(Duration::from_millis(300)));
        }
    }

    #[test]
    fn boots_on_splash_at_easy_level_one() {
        let config = GameConfig::default();
        let clock = Clock::new();
        let game = machine(&config, &clock);
        assert_eq!(game.state(), State::Splash);
        assert_eq!(game.difficulty(), Difficulty::Easy);
        assert_eq!(game.level(), 1);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = GameConfig {
            total_levels: 0,
            ..GameConfig::default()
        };
        let result = GameStateMachine::new(&config, StdRng::seed_from_u64(1), Instant::now());
        assert!(matches!(result, Err(ConfigError::NoLevels)));
    }

    #[test]
    fn splash_ignores_everything_but_a_press() {
        let config = GameConfig::default();
        let mut clock = Clock::new();
        let mut game = machine(&config, &clock);

        assert!(game.update(&cw(), clock.advance(Duration::from_millis(10))).is_empty());
        assert!(game.update(&held(), clock.advance(Duration::from_millis(10))).is_empty());
        assert_eq!(game.state(), State::Splash);

        let out = game.update(&press(), clock.advance(Duration::from_millis(10)));
        assert_eq!(game.state(), State::Menu);
        assert_eq!(out, vec![UiCommand::SetIndicator(IndicatorMode::Menu)]);

        // The menu draws itself on its first frame.
        let out = game.update(&idle(), clock.advance(Duration::from_millis(10)));
        assert_eq!(out, vec![UiCommand::ShowMenu(Difficulty::Easy)]);
        assert!(game.update(&idle(), clock.advance(Duration::from_millis(10))).is_empty());
    }

    #[test]
    fn menu_rotation_cycles_difficulty_and_redraws() {
        let config = GameConfig::default();
        let mut clock = Clock::new();
        let mut game = machine(&config, &clock);
        game.update(&press(), clock.advance(Duration::from_millis(10)));
        game.update(&idle(), clock.advance(Duration::from_millis(10)));

        let out = game.update(&cw(), clock.advance(Duration::from_millis(10)));
        assert_eq!(game.difficulty(), Difficulty::Medium);
        assert_eq!(out, vec![UiCommand::ShowMenu(Difficulty::Medium)]);

        game.update(&cw(), clock.advance(Duration::from_millis(10)));
        game.update(&cw(), clock.advance(Duration::from_millis(10)));
        assert_eq!(game.difficulty(), Difficulty::Easy);

        let out = game.update(&ccw(), clock.advance(Duration::from_millis(10)));
        assert_eq!(game.difficulty(), Difficulty::Hard);
        assert_eq!(out, vec![UiCommand::ShowMenu(Difficulty::Hard)]);
        assert_eq!(game.state(), State::Menu);
    }

    #[test]
    fn holding_for_exactly_the_hold_time_starts_level_one() {
        let config = GameConfig::default();
        let mut clock = Clock::new();
        let mut game = machine(&config, &clock);
        game.update(&press(), clock.advance(Duration::from_millis(10)));
        game.update(&idle(), clock.advance(Duration::from_millis(10)));

        game.update(&held(), clock.advance(Duration::from_millis(10)));
        game.update(&held(), clock.advance(Duration::from_millis(150)));
        assert_eq!(game.state(), State::Menu);

        let out = game.update(&held(), clock.advance(Duration::from_millis(50)));
        assert_eq!(game.state(), State::WaitInput);
        assert_eq!(game.level(), 1);
        assert_eq!(game.seq_index(), 0);
        assert_eq!(out.first(), Some(&UiCommand::SetIndicator(IndicatorMode::Playing)));
        assert_eq!(
            out.last(),
            Some(&UiCommand::SetIndicator(IndicatorMode::Move(game.current_move())))
        );
        assert!(out.contains(&UiCommand::ShowLevel(LevelHud {
            level: 1,
            difficulty: Difficulty::Easy,
            sequence_len: 2,
            index: 0,
            current_move: game.current_move(),
        })));
    }

    #[test]
    fn releasing_the_button_restarts_the_hold_timer() {
        let config = GameConfig::default();
        let mut clock = Clock::new();
        let mut game = machine(&config, &clock);
        game.update(&press(), clock.advance(Duration::from_millis(10)));
        game.update(&idle(), clock.advance(Duration::from_millis(10)));

        game.update(&held(), clock.advance(Duration::from_millis(10)));
        game.update(&held(), clock.advance(Duration::from_millis(150)));
        game.update(&idle(), clock.advance(Duration::from_millis(10)));

        // New hold starts here; 190 ms later is still too short.
        game.update(&held(), clock.advance(Duration::from_millis(10)));
        game.update(&held(), clock.advance(Duration::from_millis(190)));
        assert_eq!(game.state(), State::Menu);

        game.update(&held(), clock.advance(Duration::from_millis(10)));
        assert_eq!(game.state(), State::WaitInput);
    }

    #[test]
    fn easy_level_one_completes_into_level_two() {
        let config = GameConfig::default();
        let mut clock = Clock::new();
        let mut game = machine(&config, &clock);
        start_game(&mut game, &mut clock);

        assert_eq!(game.sequence().len(), 2);
        assert_eq!(game.per_move_time(), Duration::from_secs(30));

        let first = game.current_move();
        game.update(&gesture_for(first), clock.advance(Duration::from_secs(5)));
        assert_eq!(game.seq_index(), 1);
        assert_eq!(game.state(), State::WaitInput);

        let second = game.current_move();
        game.update(&gesture_for(second), clock.advance(Duration::from_secs(20)));

        // No idle frame between levels.
        assert_eq!(game.level(), 2);
        assert_eq!(game.state(), State::WaitInput);
        assert_eq!(game.seq_index(), 0);
        assert_eq!(game.sequence().len(), 3);
    }

    #[test]
    fn correct_move_resets_the_deadline() {
        let config = GameConfig::default();
        let mut clock = Clock::new();
        let mut game = machine(&config, &clock);
        start_game(&mut game, &mut clock);

        let mv = game.current_move();
        let tick = clock.advance(Duration::from_secs(29));
        game.update(&gesture_for(mv), tick);
        assert_eq!(game.move_deadline(), tick.now + Duration::from_secs(30));

        // 29 s into the second move is still fine even though 58 s have passed.
        game.update(&idle(), clock.advance(Duration::from_secs(29)));
        assert_eq!(game.state(), State::WaitInput);
    }

    #[test]
    fn missing_the_deadline_ends_the_game() {
        let config = GameConfig {
            easy: crate::config::DifficultyProfile {
                base_moves: 2,
                level_time: Duration::from_secs(2),
            },
            ..GameConfig::default()
        };
        let mut clock = Clock::new();
        let mut game = machine(&config, &clock);
        start_game(&mut game, &mut clock);
        assert_eq!(game.per_move_time(), Duration::from_secs(1));

        game.update(&idle(), clock.advance(Duration::from_millis(1000)));
        assert_eq!(game.state(), State::WaitInput);

        let out = game.update(&idle(), clock.advance(Duration::from_millis(10)));
        assert_eq!(game.state(), State::GameOver);
        assert_eq!(
            out,
            vec![
                UiCommand::ShowGameOver,
                UiCommand::SetIndicator(IndicatorMode::GameOver)
            ]
        );
    }

    #[test]
    fn wrong_gesture_is_ignored() {
        let config = GameConfig::default();
        let mut clock = Clock::new();
        let mut game = machine(&config, &clock);
        start_game(&mut game, &mut clock);

        let mv = game.current_move();
        let out = game.update(&wrong_gesture_for(mv), clock.advance(Duration::from_secs(1)));
        assert!(out.is_empty());
        assert_eq!(game.seq_index(), 0);
        assert_eq!(game.state(), State::WaitInput);
    }

    #[test]
    fn held_button_does_not_count_as_press() {
        let config = GameConfig::default();
        let mut clock = Clock::new();
        // Find a seed whose first move is a press.
        let mut game = (0..200)
            .find_map(|seed| {
                let rng = StdRng::seed_from_u64(seed);
                let mut game = GameStateMachine::new(&config, rng, clock.now()).unwrap();
                let mut local = Clock { base: clock.base, elapsed: clock.elapsed };
                start_game(&mut game, &mut local);
                (game.current_move() == Move::Press).then(|| {
                    clock.elapsed = local.elapsed;
                    game
                })
            })
            .unwrap();

        game.update(&held(), clock.advance(Duration::from_secs(1)));
        assert_eq!(game.seq_index(), 0);

        game.update(&press(), clock.advance(Duration::from_secs(1)));
        assert_eq!(game.seq_index(), 1);
    }

    #[test]
    fn input_inside_action_cooldown_is_ignored() {
        let config = GameConfig::default();
        let mut clock = Clock::new();
        let mut game = machine(&config, &clock);
        start_game(&mut game, &mut clock);

        let first = game.current_move();
        game.update(&gesture_for(first), clock.advance(Duration::from_secs(1)));
        assert_eq!(game.seq_index(), 1);

        let second = game.current_move();
        game.update(&gesture_for(second), clock.advance(Duration::from_millis(100)));
        assert_eq!(game.seq_index(), 1);
        assert_eq!(game.level(), 1);

        game.update(&gesture_for(second), clock.advance(Duration::from_millis(150)));
        assert_eq!(game.level(), 2);
    }

    #[test]
    fn correct_move_always_makes_progress() {
        let config = GameConfig::default();
        let mut clock = Clock::new();
        let mut game = machine(&config, &clock);
        start_game(&mut game, &mut clock);

        for _ in 0..20 {
            let before = (game.level(), game.seq_index());
            let mv = game.current_move();
            game.update(&gesture_for(mv), clock.advance(Duration::from_millis(300)));
            let after = (game.level(), game.seq_index());
            assert!(after.0 > before.0 || after.1 > before.1);
        }
    }

    #[test]
    fn clearing_level_ten_wins() {
        let config = GameConfig::default();
        let mut clock = Clock::new();
        let mut game = machine(&config, &clock);
        start_game(&mut game, &mut clock);

        for level in 1..config.total_levels {
            clear_level(&mut game, &mut clock);
            assert_eq!(game.level(), level + 1);
            assert_eq!(game.state(), State::WaitInput);
        }
        assert_eq!(game.sequence().len(), 11);

        let moves = game.sequence().to_vec();
        let (last, rest) = moves.split_last().unwrap();
        for mv in rest {
            game.update(&gesture_for(*mv), clock.advance(Duration::from_millis(300)));
        }
        let out = game.update(&gesture_for(*last), clock.advance(Duration::from_millis(300)));
        assert_eq!(game.state(), State::GameWin);
        assert_eq!(
            out,
            vec![
                UiCommand::ShowGameWin,
                UiCommand::SetIndicator(IndicatorMode::GameWin)
            ]
        );
    }

    #[test]
    fn press_after_winning_returns_to_menu_and_replays_from_level_one() {
        let config = GameConfig {
            total_levels: 1,
            ..GameConfig::default()
        };
        let mut clock = Clock::new();
        let mut game = machine(&config, &clock);
        start_game(&mut game, &mut clock);
        clear_level(&mut game, &mut clock);
        assert_eq!(game.state(), State::GameWin);
        assert_eq!(game.level(), 2);

        game.update(&idle(), clock.advance(Duration::from_millis(10)));
        let out = game.update(&press(), clock.advance(Duration::from_millis(10)));
        assert_eq!(game.state(), State::Menu);
        assert_eq!(
            out,
            vec![
                UiCommand::ShowMenu(Difficulty::Easy),
                UiCommand::SetIndicator(IndicatorMode::Menu)
            ]
        );

        game.update(&held(), clock.advance(Duration::from_millis(10)));
        game.update(&held(), clock.advance(config.menu_press_hold));
        assert_eq!(game.state(), State::WaitInput);
        assert_eq!(game.level(), 1);
        assert_eq!(game.seq_index(), 0);
        assert_eq!(game.sequence().len(), 2);
    }

    #[test]
    fn press_after_game_over_returns_to_menu_keeping_difficulty() {
        let config = GameConfig::default();
        let mut clock = Clock::new();
        let mut game = machine(&config, &clock);
        game.update(&press(), clock.advance(Duration::from_millis(10)));
        game.update(&idle(), clock.advance(Duration::from_millis(10)));
        game.update(&cw(), clock.advance(Duration::from_millis(10)));
        game.update(&held(), clock.advance(Duration::from_millis(10)));
        game.update(&held(), clock.advance(Duration::from_millis(200)));
        assert_eq!(game.state(), State::WaitInput);
        assert_eq!(game.sequence().len(), 4);

        game.update(&idle(), clock.advance(Duration::from_secs(16)));
        assert_eq!(game.state(), State::GameOver);

        assert!(game.update(&held(), clock.advance(Duration::from_millis(10))).is_empty());
        game.update(&idle(), clock.advance(Duration::from_millis(10)));
        let out = game.update(&press(), clock.advance(Duration::from_millis(10)));
        assert_eq!(game.state(), State::Menu);
        assert_eq!(
            out,
            vec![
                UiCommand::ShowMenu(Difficulty::Medium),
                UiCommand::SetIndicator(IndicatorMode::Menu)
            ]
        );
    }
}
