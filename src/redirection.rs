//! Scoped suppression of WOW64 filesystem path redirection.
//!
//! 32-bit processes on 64-bit Windows see `System32` transparently remapped.
//! [`FsRedirectionGuard`] disables that remapping for the current thread and
//! unconditionally reverts it when the guard leaves scope, on every exit
//! path, including early returns and errors.

use std::marker::PhantomData;

use crate::error::FsError;

/// RAII guard: native filesystem view while alive.
///
/// Redirection state is per-thread, so the guard is neither `Send` nor
/// `Sync`; it must be dropped on the thread that created it.
///
/// On non-Windows platforms there is no redirection to suppress and the guard
/// is a no-op.
pub struct FsRedirectionGuard {
    #[cfg(windows)]
    context: *mut core::ffi::c_void,
    /// Pins the guard to its creating thread on every platform.
    _not_send: PhantomData<*const ()>,
}

impl FsRedirectionGuard {
    /// Disable filesystem redirection for the current thread.
    ///
    /// # Errors
    ///
    /// Fails with the OS error if the redirection toggle is rejected.
    #[cfg(windows)]
    pub fn disable() -> Result<Self, FsError> {
        use windows::Win32::Storage::FileSystem::Wow64DisableWow64FsRedirection;

        let mut context: *mut core::ffi::c_void = std::ptr::null_mut();

        // SAFETY: the OS writes an opaque per-thread token through the pointer;
        // it stays untouched until handed back to the revert call in Drop.
        unsafe {
            Wow64DisableWow64FsRedirection(&mut context).map_err(|e| FsError::Redirection {
                action: "disable",
                reason: e.to_string(),
            })?;
        }

        tracing::debug!("file system redirection disabled for current thread");
        Ok(Self {
            context,
            _not_send: PhantomData,
        })
    }

    /// Disable filesystem redirection for the current thread.
    ///
    /// No-op on this platform.
    #[cfg(not(windows))]
    pub fn disable() -> Result<Self, FsError> {
        Ok(Self {
            _not_send: PhantomData,
        })
    }
}

impl Drop for FsRedirectionGuard {
    fn drop(&mut self) {
        #[cfg(windows)]
        {
            use windows::Win32::Storage::FileSystem::Wow64RevertWow64FsRedirection;

            // SAFETY: `context` is the token produced by the disable call and
            // has not been reverted before.
            let reverted = unsafe { Wow64RevertWow64FsRedirection(self.context) };
            if let Err(e) = reverted {
                // Drop cannot propagate; leave a record instead.
                tracing::error!(error = %e, "failed to revert file system redirection");
            } else {
                tracing::debug!("file system redirection reverted");
            }
        }
    }
}
