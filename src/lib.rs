// Action GBA: handheld reflex game
//
// Rotate, press or shake the device when the screen says so, before the
// per-move timer runs out. Ten levels, three difficulties.
//
// Everything except `drivers` is hardware independent and runs on the host.

pub mod config;
pub mod events;
pub mod game;
pub mod hal;
pub mod input;
pub mod lights;
pub mod sequence;
pub mod tasks;
pub mod ui;

#[cfg(target_os = "espidf")]
pub mod drivers;
