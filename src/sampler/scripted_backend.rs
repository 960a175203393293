//! Test backend replaying scripted axis frames

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use super::backend::{AxisIndex, DeviceInfo, InputBackend};
use super::error::SamplerError;

/// Raw levels for axis indices 0..=5
pub type Frame = [i16; 6];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallLog {
    pub initialized: usize,
    pub opened: usize,
    pub closed: usize,
    pub shut_down: usize,
}

/// Replays one frame per `refresh_state`; an exhausted script reads as an unplug
#[derive(Debug)]
pub struct ScriptedBackend {
    frames: VecDeque<Frame>,
    current: Option<Frame>,
    has_device: bool,
    fail_init: bool,
    refreshes: usize,
    cancel_after: Option<(usize, CancellationToken)>,
    log: Rc<Cell<CallLog>>,
}

impl ScriptedBackend {
    pub fn with_frames(frames: Vec<Frame>) -> (Self, Rc<Cell<CallLog>>) {
        let log = Rc::new(Cell::new(CallLog::default()));
        let backend = Self {
            frames: frames.into(),
            current: None,
            has_device: true,
            fail_init: false,
            refreshes: 0,
            cancel_after: None,
            log: log.clone(),
        };
        (backend, log)
    }

    pub fn without_device() -> (Self, Rc<Cell<CallLog>>) {
        let (mut backend, log) = Self::with_frames(Vec::new());
        backend.has_device = false;
        (backend, log)
    }

    pub fn failing_subsystem() -> (Self, Rc<Cell<CallLog>>) {
        let (mut backend, log) = Self::with_frames(Vec::new());
        backend.fail_init = true;
        (backend, log)
    }

    /// Cancel `token` on the given refresh, counting from one
    pub fn cancel_on_refresh(mut self, refresh: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((refresh, token));
        self
    }

    fn record(&self, update: impl FnOnce(&mut CallLog)) {
        let mut calls = self.log.get();
        update(&mut calls);
        self.log.set(calls);
    }
}

impl InputBackend for ScriptedBackend {
    fn initialize(&mut self) -> Result<(), SamplerError> {
        self.record(|c| c.initialized += 1);
        if self.fail_init {
            return Err(SamplerError::SubsystemInitError(
                "scripted subsystem failure".to_string(),
            ));
        }
        Ok(())
    }

    fn open_first_device(&mut self) -> Result<DeviceInfo, SamplerError> {
        if !self.has_device {
            return Err(SamplerError::DeviceUnavailable(
                "no scripted device".to_string(),
            ));
        }
        self.record(|c| c.opened += 1);
        Ok(DeviceInfo {
            name: "Scripted Pad".to_string(),
            id: "0".to_string(),
        })
    }

    fn refresh_state(&mut self) -> Result<(), SamplerError> {
        self.refreshes += 1;
        if let Some((refresh, token)) = &self.cancel_after {
            if self.refreshes >= *refresh {
                token.cancel();
            }
        }
        match self.frames.pop_front() {
            Some(frame) => {
                self.current = Some(frame);
                Ok(())
            }
            None => {
                self.current = None;
                Err(SamplerError::DeviceReadError(
                    "scripted device unplugged".to_string(),
                ))
            }
        }
    }

    fn read_axis(&self, axis: AxisIndex) -> Result<i16, SamplerError> {
        let frame = self.current.ok_or_else(|| {
            SamplerError::DeviceReadError("no frame available".to_string())
        })?;
        frame
            .get(axis.0)
            .copied()
            .ok_or_else(|| SamplerError::DeviceReadError(format!("unknown {}", axis)))
    }

    fn close(&mut self) {
        self.record(|c| c.closed += 1);
    }

    fn shutdown_subsystem(&mut self) {
        self.record(|c| c.shut_down += 1);
    }
}
