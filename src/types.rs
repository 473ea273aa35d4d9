//! Base types shared by every subsystem
//!
//! Author: Moroya Sakamoto

use core::ffi::c_void;

/// Tick counter type. Wraps at `u32::MAX`; all elapsed-time math uses
/// wrapping subtraction.
pub type Tick = u32;

/// Caller-supplied identifier for tasks, delays and events
pub type Id = u8;

/// Callback invoked for a due task or a triggered event.
///
/// C-ABI so the same table can be populated from C firmware.
pub type Callback = extern "C" fn(UserData);

/// Opaque user pointer handed back to a callback.
///
/// The kernel only stores and returns it; it is never dereferenced or
/// freed here. Layout is identical to `void *`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserData(*mut c_void);

// SAFETY: the kernel never dereferences the pointer, it only moves it
// between the registering context and the callback.
unsafe impl Send for UserData {}

impl UserData {
    /// No user data
    pub const fn null() -> Self {
        Self(core::ptr::null_mut())
    }

    /// Wrap a raw pointer
    pub const fn from_ptr<T>(ptr: *mut T) -> Self {
        Self(ptr.cast())
    }

    /// Point at a caller-owned value. The caller keeps it alive for as
    /// long as the registration exists.
    pub const fn from_ref<T>(value: &T) -> Self {
        Self((value as *const T).cast_mut().cast())
    }

    /// The raw pointer
    pub const fn as_ptr(self) -> *mut c_void {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl Default for UserData {
    fn default() -> Self {
        Self::null()
    }
}
