//! GPU boundary: the device trait, the exclusive graphics context and the
//! named parameter slots of the nine-slice program.
//!
//! Program lifetime (create, destroy, reload) is only ever touched inside
//! a [`GraphicsContext::enter`] section. The returned [`GraphicsGuard`]
//! releases the context when dropped, so every exit path (including early
//! returns on failure) leaves the context available again.
//!
//! The section is re-entrant on the thread that holds it, so a host that
//! destroys or reloads an instance from inside its own section does not
//! block on itself. The device is handed out through
//! [`GraphicsGuard::device`]; only one such borrow may be live at a time.
//!
//! Rendering is different: the host calls `render` on its graphics thread
//! while it already holds the context, and passes the device in directly.

use std::cell::{RefCell, RefMut};
use std::path::Path;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use nineslice_types::error::{NineSliceError, Result};
use nineslice_types::image::RgbaImage;

use crate::host::FilterSource;

/// Opaque handle to a compiled program owned by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u64);

/// A resolved named parameter of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId {
    pub program: ProgramId,
    pub index: usize,
}

/// The graphics surface a filter drives.
///
/// Setters take resolved slots only; a slot that failed to resolve is never
/// written, so the program keeps whatever default it declares.
pub trait GraphicsDevice: Send {
    /// Compile/load a program from an effect file.
    fn create_program(&mut self, path: &Path) -> Result<ProgramId>;

    /// Release a program. Unknown ids are ignored.
    fn destroy_program(&mut self, program: ProgramId);

    /// Resolve a named parameter slot.
    fn param_by_name(&self, program: ProgramId, name: &str) -> Option<ParamId>;

    fn set_vec2(&mut self, param: ParamId, value: [f32; 2]);

    fn set_vec4(&mut self, param: ParamId, value: [f32; 4]);

    fn set_bool(&mut self, param: ParamId, value: bool);

    /// Bind the filtered source's current image as the pass input.
    ///
    /// Returns `false` when the pass cannot start this frame (for example
    /// the source has nothing to show); the caller then skips the frame.
    fn begin_filter_pass(&mut self, source: &dyn FilterSource) -> bool;

    /// Run `program` over the bound input into a `width x height` target.
    fn end_filter_pass(&mut self, program: ProgramId, width: u32, height: u32) -> Result<()>;

    /// Read back the target of the last completed pass.
    fn read_pixels(&self) -> Result<RgbaImage> {
        Err(NineSliceError::Device("read_pixels not supported".into()))
    }
}

// ---------------------------------------------------------------------------
// Exclusive graphics context
// ---------------------------------------------------------------------------

/// Host-wide mutual exclusion around GPU object lifetime.
pub struct GraphicsContext {
    device: ReentrantMutex<RefCell<Box<dyn GraphicsDevice>>>,
}

impl GraphicsContext {
    pub fn new(device: Box<dyn GraphicsDevice>) -> Self {
        Self {
            device: ReentrantMutex::new(RefCell::new(device)),
        }
    }

    /// Enter the exclusive graphics section.
    ///
    /// Blocks while another thread holds the context. Entering again on the
    /// holding thread nests and returns immediately.
    pub fn enter(&self) -> GraphicsGuard<'_> {
        let inner = self.device.lock();
        log::trace!("entered graphics context");
        GraphicsGuard { inner }
    }

    /// Whether some caller currently holds the context.
    pub fn is_entered(&self) -> bool {
        self.device.is_locked()
    }
}

/// Scoped ownership of the graphics context. Leaves it on drop.
pub struct GraphicsGuard<'a> {
    inner: ReentrantMutexGuard<'a, RefCell<Box<dyn GraphicsDevice>>>,
}

impl GraphicsGuard<'_> {
    /// Borrow the device.
    ///
    /// # Panics
    ///
    /// If a device borrow from an enclosing section on this thread is still
    /// live. Use [`try_device`](Self::try_device) where that can happen.
    pub fn device(&self) -> RefMut<'_, dyn GraphicsDevice> {
        RefMut::map(self.inner.borrow_mut(), |d| &mut **d)
    }

    /// Borrow the device, or `None` while an enclosing borrow is live.
    pub fn try_device(&self) -> Option<RefMut<'_, dyn GraphicsDevice>> {
        self.inner
            .try_borrow_mut()
            .ok()
            .map(|d| RefMut::map(d, |d| -> &mut dyn GraphicsDevice { &mut **d }))
    }
}

impl Drop for GraphicsGuard<'_> {
    fn drop(&mut self) {
        log::trace!("left graphics context");
    }
}

// ---------------------------------------------------------------------------
// Program slots
// ---------------------------------------------------------------------------

pub const PARAM_BORDER: &str = "border";
pub const PARAM_SOURCE_SIZE: &str = "source_size";
pub const PARAM_OUTPUT_SIZE: &str = "output_size";
pub const PARAM_SHOW_UVS: &str = "show_uvs";
pub const PARAM_USE_LINEAR_FILTERING: &str = "use_linear_filtering";

/// Resolved parameter slots of the nine-slice program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgramSlots {
    pub border: Option<ParamId>,
    pub source_size: Option<ParamId>,
    pub output_size: Option<ParamId>,
    pub show_uvs: Option<ParamId>,
    pub use_linear_filtering: Option<ParamId>,
}

impl ProgramSlots {
    /// Resolve every slot, returning the slots and the names that were
    /// missing from the program.
    pub fn resolve(device: &dyn GraphicsDevice, program: ProgramId) -> (Self, Vec<&'static str>) {
        let mut missing = Vec::new();
        let mut lookup = |name: &'static str| {
            let slot = device.param_by_name(program, name);
            if slot.is_none() {
                missing.push(name);
            }
            slot
        };
        let slots = Self {
            use_linear_filtering: lookup(PARAM_USE_LINEAR_FILTERING),
            show_uvs: lookup(PARAM_SHOW_UVS),
            border: lookup(PARAM_BORDER),
            output_size: lookup(PARAM_OUTPUT_SIZE),
            source_size: lookup(PARAM_SOURCE_SIZE),
        };
        (slots, missing)
    }

    pub fn is_complete(&self) -> bool {
        self.border.is_some()
            && self.source_size.is_some()
            && self.output_size.is_some()
            && self.show_uvs.is_some()
            && self.use_linear_filtering.is_some()
    }
}
