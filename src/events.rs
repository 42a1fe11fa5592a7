// Action GBA: Game Events & Data Types

use std::fmt;
use std::time::{Duration, Instant};

use rand::distr::{Distribution, StandardUniform};
use rand::Rng;

// ---------------------------------------------------------------------------
// Moves (what the sequence asks the player to do)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    RotateRight,
    RotateLeft,
    Press,
    Shake,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::RotateRight, Move::RotateLeft, Move::Press, Move::Shake];

    /// Label shown on the level HUD.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RotateRight => "ROTATE_RIGHT",
            Self::RotateLeft  => "ROTATE_LEFT",
            Self::Press       => "PRESS",
            Self::Shake       => "SHAKE",
        }
    }

    /// Parse a HUD label back into a move. Unknown labels map to `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ROTATE_RIGHT" => Some(Self::RotateRight),
            "ROTATE_LEFT"  => Some(Self::RotateLeft),
            "PRESS"        => Some(Self::Press),
            "SHAKE"        => Some(Self::Shake),
            _              => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Uniform over the four moves, so `rng.random::<Move>()` works.
impl Distribution<Move> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Move {
        Move::ALL[rng.random_range(0..Move::ALL.len())]
    }
}

// ---------------------------------------------------------------------------
// Difficulty (cycled with the knob in the menu)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Easy   => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard   => "HARD",
        }
    }

    /// EASY -> MEDIUM -> HARD -> EASY
    pub fn next(self) -> Self {
        match self {
            Self::Easy   => Self::Medium,
            Self::Medium => Self::Hard,
            Self::Hard   => Self::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Easy   => Self::Hard,
            Self::Medium => Self::Easy,
            Self::Hard   => Self::Medium,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Gesture flags, recomputed every frame by the interpreter
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureEvents {
    pub rotated_cw: bool,
    pub rotated_ccw: bool,
    /// High -> low transition of the button line this frame.
    pub button_pressed_edge: bool,
    /// Button line is low this frame.
    pub button_held: bool,
    pub shake_detected: bool,
}

impl GestureEvents {
    /// Whether this frame contains the gesture that satisfies `expected`.
    /// A held button never satisfies `Press`; it needs a fresh edge.
    pub fn satisfies(&self, expected: Move) -> bool {
        match expected {
            Move::RotateRight => self.rotated_cw,
            Move::RotateLeft  => self.rotated_ccw,
            Move::Press       => self.button_pressed_edge,
            Move::Shake       => self.shake_detected,
        }
    }
}

// ---------------------------------------------------------------------------
// Accelerometer sample (m/s^2)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Acceleration {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Acceleration {
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Output side: what the state machine asks the collaborators to show
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorMode {
    #[default]
    Idle,
    Splash,
    Menu,
    Playing,
    Move(Move),
    GameOver,
    GameWin,
}

impl IndicatorMode {
    /// Modes that need per-frame work in `tick`.
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Splash | Self::Menu)
    }
}

/// Everything the level screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelHud {
    pub level: u32,
    pub difficulty: Difficulty,
    pub sequence_len: usize,
    /// Zero-based index of the move being asked for.
    pub index: usize,
    pub current_move: Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    ShowMenu(Difficulty),
    ShowLevel(LevelHud),
    ShowGameOver,
    ShowGameWin,
    SetIndicator(IndicatorMode),
}

/// Timing of the frame being processed. `now` comes from a monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    pub now: Instant,
    pub dt: Duration,
}
