use std::fmt;

/// Stick magnitudes strictly below this are treated as centred
pub const DEADZONE: i32 = 3000;

/// Offset that moves the native trigger range onto zero
pub const TRIGGER_OFFSET: i32 = 32767;

/// Full span of the native axis range
pub const TRIGGER_SPAN: f64 = 65535.0;

/// Corrected trigger values below this yield a speed of exactly zero
pub const TRIGGER_ACTIVATION: i32 = 10000;

pub const SPEED_FLOOR: f64 = 0.4;
pub const SPEED_SCALE: f64 = 0.6;

/// Processed values of one sampling pass
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reading {
    pub x: i32,
    pub y: i32,
    pub speed: f64,
}

impl Reading {
    /// Builds a reading from the raw stick and trigger axes
    pub fn from_raw(x_axis: i16, y_axis: i16, trigger_axis: i16) -> Self {
        Self {
            x: apply_deadzone(x_axis),
            y: apply_deadzone(y_axis),
            speed: trigger_speed(trigger_axis),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Joystick Position: ({}, {}), Trigger Position: {}",
            self.x, self.y, self.speed
        )
    }
}

/// Forces stick values near centre to zero
///
/// Widened to `i32` first so that `i16::MIN` has a magnitude.
pub fn apply_deadzone(raw: i16) -> i32 {
    let value = i32::from(raw);
    if value.abs() < DEADZONE {
        0
    } else {
        value
    }
}

/// Trigger position shifted onto `0..=32767`, truncating like integer division does
pub fn corrected_trigger(raw: i16) -> i32 {
    (i32::from(raw) + TRIGGER_OFFSET) / 2
}

/// Maps the trigger onto a speed of 0 or `[0.4, 1.0]`
///
/// The activation check uses the corrected value while the scaled speed is
/// computed from the raw axis over the full native span.
pub fn trigger_speed(raw: i16) -> f64 {
    if corrected_trigger(raw) < TRIGGER_ACTIVATION {
        return 0.0;
    }
    let shifted = f64::from(i32::from(raw) + TRIGGER_OFFSET);
    SPEED_FLOOR + (shifted / TRIGGER_SPAN) * SPEED_SCALE
}
