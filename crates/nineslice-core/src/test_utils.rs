//! Shared test utilities for nineslice-core tests.
//!
//! Provides a [`MockDevice`] that records every device call, a
//! [`MockSource`] with adjustable dimensions, and a [`FixedScaleQuery`]
//! standing in for the host's scene tree.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use nineslice_types::color::Color;
use nineslice_types::error::{NineSliceError, Result};
use nineslice_types::geometry::ScaleVector;
use nineslice_types::image::RgbaImage;

use crate::gpu::{
    GraphicsDevice, PARAM_BORDER, PARAM_OUTPUT_SIZE, PARAM_SHOW_UVS, PARAM_SOURCE_SIZE,
    PARAM_USE_LINEAR_FILTERING, ParamId, ProgramId,
};
use crate::host::{FilterSource, SceneScaleQuery};

const ALL_PARAMS: [&str; 5] = [
    PARAM_BORDER,
    PARAM_SOURCE_SIZE,
    PARAM_OUTPUT_SIZE,
    PARAM_SHOW_UVS,
    PARAM_USE_LINEAR_FILTERING,
];

/// A recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CreateProgram { path: String },
    DestroyProgram { program: ProgramId },
    SetVec2 { name: &'static str, value: [f32; 2] },
    SetVec4 { name: &'static str, value: [f32; 4] },
    SetBool { name: &'static str, value: bool },
    BeginPass { source: String },
    EndPass { program: ProgramId, width: u32, height: u32 },
}

/// Call log shared between a device and the test that owns it.
pub type CallLog = Arc<Mutex<Vec<DeviceCall>>>;

/// A device that records calls instead of drawing.
pub struct MockDevice {
    log: CallLog,
    params: Vec<&'static str>,
    fail_load: Arc<AtomicBool>,
    accept_pass: bool,
    next_id: u64,
    live: Vec<ProgramId>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            params: ALL_PARAMS.to_vec(),
            fail_load: Arc::new(AtomicBool::new(false)),
            accept_pass: true,
            next_id: 1,
            live: Vec::new(),
        }
    }

    /// Every `create_program` fails.
    pub fn failing_load(self) -> Self {
        self.fail_load.store(true, Ordering::Relaxed);
        self
    }

    /// Programs lack the named parameters.
    pub fn without_params(mut self, names: &[&str]) -> Self {
        self.params.retain(|p| !names.contains(p));
        self
    }

    /// `begin_filter_pass` refuses to start.
    pub fn rejecting_passes(mut self) -> Self {
        self.accept_pass = false;
        self
    }

    /// Switch controlling load failures after the device is boxed.
    pub fn fail_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail_load)
    }

    pub fn log(&self) -> CallLog {
        Arc::clone(&self.log)
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, call: DeviceCall) {
        self.log.lock().unwrap().push(call);
    }

    fn name_of(&self, param: ParamId) -> &'static str {
        self.params[param.index]
    }
}

impl GraphicsDevice for MockDevice {
    fn create_program(&mut self, path: &Path) -> Result<ProgramId> {
        self.record(DeviceCall::CreateProgram {
            path: path.display().to_string(),
        });
        if self.fail_load.load(Ordering::Relaxed) {
            return Err(NineSliceError::ProgramLoad(format!(
                "{}: mock load failure",
                path.display()
            )));
        }
        let id = ProgramId(self.next_id);
        self.next_id += 1;
        self.live.push(id);
        Ok(id)
    }

    fn destroy_program(&mut self, program: ProgramId) {
        self.record(DeviceCall::DestroyProgram { program });
        self.live.retain(|p| *p != program);
    }

    fn param_by_name(&self, program: ProgramId, name: &str) -> Option<ParamId> {
        if !self.live.contains(&program) {
            return None;
        }
        self.params
            .iter()
            .position(|p| *p == name)
            .map(|index| ParamId { program, index })
    }

    fn set_vec2(&mut self, param: ParamId, value: [f32; 2]) {
        let name = self.name_of(param);
        self.record(DeviceCall::SetVec2 { name, value });
    }

    fn set_vec4(&mut self, param: ParamId, value: [f32; 4]) {
        let name = self.name_of(param);
        self.record(DeviceCall::SetVec4 { name, value });
    }

    fn set_bool(&mut self, param: ParamId, value: bool) {
        let name = self.name_of(param);
        self.record(DeviceCall::SetBool { name, value });
    }

    fn begin_filter_pass(&mut self, source: &dyn FilterSource) -> bool {
        self.record(DeviceCall::BeginPass {
            source: source.name().to_string(),
        });
        self.accept_pass
    }

    fn end_filter_pass(&mut self, program: ProgramId, width: u32, height: u32) -> Result<()> {
        self.record(DeviceCall::EndPass {
            program,
            width,
            height,
        });
        Ok(())
    }
}

/// A source with adjustable dimensions and a flat gray frame.
pub struct MockSource {
    name: String,
    width: AtomicU32,
    height: AtomicU32,
}

impl MockSource {
    pub fn new(name: &str, width: u32, height: u32) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            width: AtomicU32::new(width),
            height: AtomicU32::new(height),
        })
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.width.store(width, Ordering::Relaxed);
        self.height.store(height, Ordering::Relaxed);
    }
}

impl FilterSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> u32 {
        self.width.load(Ordering::Relaxed)
    }

    fn height(&self) -> u32 {
        self.height.load(Ordering::Relaxed)
    }

    fn frame(&self) -> Option<RgbaImage> {
        let mut img = RgbaImage::new(self.width(), self.height());
        img.fill(Color::rgb(128, 128, 128));
        Some(img)
    }
}

/// Scene lookup answering with one fixed placement.
pub struct FixedScaleQuery {
    pub source_name: String,
    pub scale: ScaleVector,
}

impl SceneScaleQuery for FixedScaleQuery {
    fn find_scale_for(&self, source_name: &str) -> Option<ScaleVector> {
        (source_name == self.source_name).then_some(self.scale)
    }
}

/// Last value written to a named vec2 slot.
pub fn last_vec2(calls: &[DeviceCall], slot: &str) -> Option<[f32; 2]> {
    calls.iter().rev().find_map(|c| match c {
        DeviceCall::SetVec2 { name, value } if *name == slot => Some(*value),
        _ => None,
    })
}

/// Last value written to a named bool slot.
pub fn last_bool(calls: &[DeviceCall], slot: &str) -> Option<bool> {
    calls.iter().rev().find_map(|c| match c {
        DeviceCall::SetBool { name, value } if *name == slot => Some(*value),
        _ => None,
    })
}
