use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs, GilrsBuilder};
use tracing::{debug, error, info, warn};

use super::backend::{AxisIndex, DeviceInfo, InputBackend};
use super::error::SamplerError;

/// Largest magnitude of the native signed 16-bit axis range
const NATIVE_MAX: f32 = 32767.0;

/// Native level of a released analog trigger
const TRIGGER_REST: i16 = -32767;

/// gilrs' jitter and radial deadzone filters rewrite cached axis levels; keep them raw
const DEFAULT_FILTERS: bool = false;

/// Stick Y axes, reported by gilrs with up positive and natively with down positive
const Y_AXES: [AxisIndex; 2] = [AxisIndex::Y, AxisIndex(4)];

/// Input backend on top of gilrs
///
/// gilrs reports axes normalised to `[-1.0, 1.0]`; values are scaled back to
/// the native signed 16-bit range so the sampler sees the same levels a raw
/// joystick API would report.
#[derive(Debug, Default)]
pub struct GilrsBackend {
    gilrs: Option<Gilrs>,
    active_gamepad: Option<GamepadId>,
}

impl GilrsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&self) -> Result<(&Gilrs, GamepadId), SamplerError> {
        match (&self.gilrs, self.active_gamepad) {
            (Some(gilrs), Some(id)) => Ok((gilrs, id)),
            (None, _) => Err(SamplerError::DeviceReadError(
                "input subsystem is not running".to_string(),
            )),
            (_, None) => Err(SamplerError::DeviceReadError(
                "no gamepad is open".to_string(),
            )),
        }
    }
}

impl InputBackend for GilrsBackend {
    fn initialize(&mut self) -> Result<(), SamplerError> {
        info!("Initializing gilrs controller interface");
        match build_gilrs() {
            Ok(gilrs) => {
                info!("Successfully initialized gilrs");
                self.gilrs = Some(gilrs);
                Ok(())
            }
            Err(gilrs::Error::NotImplemented(_)) => {
                error!("gilrs has no backend for this platform");
                Err(SamplerError::SubsystemInitError(
                    "gamepad input is not supported on this platform".to_string(),
                ))
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                Err(SamplerError::SubsystemInitError(e.to_string()))
            }
        }
    }

    fn open_first_device(&mut self) -> Result<DeviceInfo, SamplerError> {
        let gilrs = self.gilrs.as_ref().ok_or_else(|| {
            SamplerError::DeviceUnavailable("input subsystem is not running".to_string())
        })?;

        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = gilrs.gamepads().collect();
        if gamepads.is_empty() {
            return Err(SamplerError::DeviceUnavailable(
                "no gamepad connected".to_string(),
            ));
        }

        info!("Found {} gamepads:", gamepads.len());
        for (idx, (id, gamepad)) in gamepads.iter().enumerate() {
            info!(
                "  [{}] ID: {}, Name: {}, UUID: {:?}",
                idx,
                id,
                gamepad.name(),
                gamepad.uuid()
            );
        }

        let (id, gamepad) = &gamepads[0];
        let device = DeviceInfo {
            name: gamepad.name().to_string(),
            id: id.to_string(),
        };
        self.active_gamepad = Some(*id);
        info!("Selected gamepad: {} ({})", device.name, device.id);
        Ok(device)
    }

    fn refresh_state(&mut self) -> Result<(), SamplerError> {
        let active = self
            .active_gamepad
            .ok_or_else(|| SamplerError::DeviceReadError("no gamepad is open".to_string()))?;
        let gilrs = self.gilrs.as_mut().ok_or_else(|| {
            SamplerError::DeviceReadError("input subsystem is not running".to_string())
        })?;

        // Draining the queue is what updates gilrs' cached gamepad state
        while let Some(Event { id, event, .. }) = gilrs.next_event() {
            match event {
                EventType::Disconnected if id == active => {
                    warn!("Active gamepad {} disconnected", id);
                }
                EventType::Connected => {
                    info!("Gamepad {} connected, staying on {}", id, active);
                }
                _ => {}
            }
        }
        gilrs.inc();

        if gilrs.connected_gamepad(active).is_none() {
            return Err(SamplerError::DeviceReadError(format!(
                "gamepad {} is no longer connected",
                active
            )));
        }
        Ok(())
    }

    fn read_axis(&self, axis: AxisIndex) -> Result<i16, SamplerError> {
        let (gilrs, id) = self.active()?;
        let gamepad = gilrs.connected_gamepad(id).ok_or_else(|| {
            SamplerError::DeviceReadError(format!("gamepad {} is no longer connected", id))
        })?;
        let (gilrs_axis, trigger_button) = map_axis(axis).ok_or_else(|| {
            SamplerError::DeviceReadError(format!("{} is not mapped on this backend", axis))
        })?;

        if let Some(data) = gamepad.axis_data(gilrs_axis) {
            return Ok(to_native_for(axis, data.value()));
        }

        // Trigger mapped as an analog button, or never moved yet
        match trigger_button {
            Some(button) => Ok(gamepad
                .button_data(button)
                .map(|data| trigger_button_to_native(data.value()))
                .unwrap_or(TRIGGER_REST)),
            None => {
                debug!("No data yet for {:?}, reading centre", gilrs_axis);
                Ok(0)
            }
        }
    }

    fn close(&mut self) {
        if let Some(id) = self.active_gamepad.take() {
            info!("Released gamepad {}", id);
        }
    }

    fn shutdown_subsystem(&mut self) {
        if self.gilrs.take().is_some() {
            info!("gilrs context dropped");
        }
    }
}

/// Native joystick axis layout onto gilrs axes
///
/// Triggers also name the button gilrs uses when a mapping exposes them as
/// analog buttons instead of axes.
fn map_axis(axis: AxisIndex) -> Option<(Axis, Option<Button>)> {
    match axis.0 {
        0 => Some((Axis::LeftStickX, None)),
        1 => Some((Axis::LeftStickY, None)),
        2 => Some((Axis::LeftZ, Some(Button::LeftTrigger2))),
        3 => Some((Axis::RightStickX, None)),
        4 => Some((Axis::RightStickY, None)),
        5 => Some((Axis::RightZ, Some(Button::RightTrigger2))),
        _ => None,
    }
}

fn build_gilrs() -> Result<Gilrs, gilrs::Error> {
    GilrsBuilder::new()
        .with_default_filters(DEFAULT_FILTERS)
        .build()
}

fn to_native(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * NATIVE_MAX).round() as i16
}

/// Scales a gilrs axis value back to the native level of `axis`
fn to_native_for(axis: AxisIndex, value: f32) -> i16 {
    if Y_AXES.contains(&axis) {
        to_native(-value)
    } else {
        to_native(value)
    }
}

// Analog buttons report 0..=1; stretch onto the full axis range
fn trigger_button_to_native(value: f32) -> i16 {
    to_native(value * 2.0 - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalised_values_scale_to_native_range() {
        assert_eq!(to_native(0.0), 0);
        assert_eq!(to_native(1.0), 32767);
        assert_eq!(to_native(-1.0), -32767);
        assert_eq!(to_native(0.5), 16384);
        assert_eq!(to_native(-0.5), -16384);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(to_native(1.5), 32767);
        assert_eq!(to_native(-3.0), -32767);
    }

    #[test]
    fn sampled_axes_are_mapped() {
        assert_eq!(map_axis(AxisIndex::X), Some((Axis::LeftStickX, None)));
        assert_eq!(map_axis(AxisIndex::Y), Some((Axis::LeftStickY, None)));
        assert_eq!(
            map_axis(AxisIndex::TRIGGER),
            Some((Axis::RightZ, Some(Button::RightTrigger2)))
        );
        assert_eq!(map_axis(AxisIndex(6)), None);
    }

    #[test]
    fn gilrs_is_built_without_default_filters() {
        assert!(!DEFAULT_FILTERS);
    }

    #[test]
    fn stick_y_axes_read_down_positive() {
        assert_eq!(to_native_for(AxisIndex::Y, 0.5), -16384);
        assert_eq!(to_native_for(AxisIndex::Y, -1.0), 32767);
        assert_eq!(to_native_for(AxisIndex(4), 1.0), -32767);
    }

    #[test]
    fn other_axes_keep_gilrs_sign() {
        assert_eq!(to_native_for(AxisIndex::X, 0.5), 16384);
        assert_eq!(to_native_for(AxisIndex(3), -1.0), -32767);
        assert_eq!(to_native_for(AxisIndex::TRIGGER, 1.0), 32767);
        assert_eq!(to_native_for(AxisIndex(2), -1.0), TRIGGER_REST);
    }

    #[test]
    fn unfiltered_levels_pass_the_sampler_deadzone_unchanged() {
        let value = 5000.0 / NATIVE_MAX;
        let x = to_native_for(AxisIndex::X, value);
        assert_eq!(x, 5000);
        assert_eq!(crate::sampler::reading::apply_deadzone(x), 5000);
    }

    #[test]
    fn trigger_buttons_stretch_to_axis_range() {
        assert_eq!(trigger_button_to_native(0.0), TRIGGER_REST);
        assert_eq!(trigger_button_to_native(0.5), 0);
        assert_eq!(trigger_button_to_native(1.0), 32767);
    }

    #[test]
    fn unopened_backend_refuses_reads() {
        let mut backend = GilrsBackend::new();
        assert!(matches!(
            backend.refresh_state(),
            Err(SamplerError::DeviceReadError(_))
        ));
        assert!(matches!(
            backend.read_axis(AxisIndex::X),
            Err(SamplerError::DeviceReadError(_))
        ));
        assert!(matches!(
            backend.open_first_device(),
            Err(SamplerError::DeviceUnavailable(_))
        ));
        backend.close();
        backend.shutdown_subsystem();
    }
}
