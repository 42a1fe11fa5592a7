// Action GBA: Gesture Interpreter
//
// Turns raw encoder, button and accelerometer signals into one-frame gesture
// flags. Polled once per frame (~100 Hz) regardless of game state, so the menu
// and the gameplay screens see the same events.

use std::time::Instant;

use crate::config::GameConfig;
use crate::events::GestureEvents;
use crate::hal::SensorSource;

struct EncoderState {
    last_a: bool,
    last_rotation: Instant,
}

struct ButtonState {
    last_level: bool, // pull-up -> idle HIGH
}

struct AccelState {
    // None until the first successful read.
    last_magnitude: Option<f32>,
    last_shake: Instant,
    // Set while reads keep failing; only the first failure is a warning.
    failing: bool,
}

pub struct GestureInterpreter<'c> {
    config: &'c GameConfig,
    encoder: EncoderState,
    button: ButtonState,
    accel: AccelState,
}

impl<'c> GestureInterpreter<'c> {
    /// Samples the current signal levels so the first poll only reports real edges.
    /// Both cooldown clocks start at `now`.
    pub fn new<S: SensorSource>(config: &'c GameConfig, sensors: &mut S, now: Instant) -> Self {
        let (last_magnitude, failing) = match sensors.read_acceleration() {
            Ok(sample) => (Some(sample.magnitude()), false),
            Err(e) => {
                log::warn!("Initial accelerometer read failed: {}", e);
                (None, true)
            }
        };

        Self {
            config,
            encoder: EncoderState {
                last_a: sensors.encoder_a(),
                last_rotation: now,
            },
            button: ButtonState {
                last_level: sensors.button_level(),
            },
            accel: AccelState {
                last_magnitude,
                last_shake: now,
                failing,
            },
        }
    }

    /// Call exactly once per frame.
    pub fn poll<S: SensorSource>(&mut self, sensors: &mut S, now: Instant) -> GestureEvents {
        let mut events = GestureEvents::default();

        self.poll_encoder(sensors, now, &mut events);
        self.poll_button(sensors, &mut events);
        self.poll_accel(sensors, now, &mut events);

        events
    }

    fn poll_encoder<S: SensorSource>(
        &mut self,
        sensors: &mut S,
        now: Instant,
        events: &mut GestureEvents,
    ) {
        let a = sensors.encoder_a();
        let b = sensors.encoder_b();

        let since_last = now.saturating_duration_since(self.encoder.last_rotation);
        if a != self.encoder.last_a && since_last >= self.config.rotate_cooldown {
            if b == a {
                events.rotated_cw = true;
            } else {
                events.rotated_ccw = true;
            }
            self.encoder.last_rotation = now;
            log::debug!("Encoder: {}", if events.rotated_cw { "CW" } else { "CCW" });
        }
        // Saved every frame, accepted or not, so the next edge is measured from here.
        self.encoder.last_a = a;
    }

    fn poll_button<S: SensorSource>(&mut self, sensors: &mut S, events: &mut GestureEvents) {
        let level = sensors.button_level(); // true = released (pull-up)
        events.button_held = !level;

        if self.button.last_level && !level {
            events.button_pressed_edge = true;
            log::debug!("Button: pressed edge");
        }
        self.button.last_level = level;
    }

    fn poll_accel<S: SensorSource>(
        &mut self,
        sensors: &mut S,
        now: Instant,
        events: &mut GestureEvents,
    ) {
        let sample = match sensors.read_acceleration() {
            Ok(sample) => sample,
            Err(e) => {
                // Keep the previous magnitude and skip shake detection this frame.
                if self.accel.failing {
                    log::debug!("Accelerometer read error: {}", e);
                } else {
                    log::warn!("Accelerometer read error: {}", e);
                    self.accel.failing = true;
                }
                return;
            }
        };
        if self.accel.failing {
            log::info!("Accelerometer reads recovered");
            self.accel.failing = false;
        }

        let magnitude = sample.magnitude();
        let Some(previous) = self.accel.last_magnitude.replace(magnitude) else {
            return;
        };
        let delta = (magnitude - previous).abs();
        log::trace!("Accel delta = {:.3}", delta);

        // Only the lower bound applies; `shake_max_delta` is not enforced.
        if delta >= self.config.shake_delta_threshold
            && now.saturating_duration_since(self.accel.last_shake) >= self.config.shake_cooldown
        {
            events.shake_detected = true;
            self.accel.last_shake = now;
            log::debug!("Shake detected, delta = {:.3}", delta);
        }
    }
}
