//! Known-folder resolution.
//!
//! An OS-defined special directory is addressed by identifier and resolved to
//! an absolute path at runtime. On Windows this goes through
//! `SHGetKnownFolderPath`; other platforms map the common identifiers through
//! the `dirs` conventions and report the rest as unsupported.

use std::path::PathBuf;

use crate::error::FsError;

/// OS-defined special directories this crate resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownFolder {
    /// The user's profile directory (home).
    Profile,
    /// The user's desktop.
    Desktop,
    /// The user's documents.
    Documents,
    /// The user's downloads.
    Downloads,
    /// Per-user local (non-roaming) application data.
    LocalAppData,
    /// Per-user roaming application data.
    RoamingAppData,
    /// Machine-wide application data. Windows-only.
    ProgramData,
    /// The OS system directory. Windows-only.
    System,
}

/// Resolve `folder` to its absolute path with default resolution behavior.
///
/// # Errors
///
/// Fails if the OS does not report a successful resolution, or (on
/// non-Windows platforms) if the folder has no equivalent there.
pub fn known_folder_path(folder: KnownFolder) -> Result<PathBuf, FsError> {
    #[cfg(windows)]
    {
        use windows::Win32::UI::Shell::KF_FLAG_DEFAULT;
        known_folder_path_with(folder, KF_FLAG_DEFAULT, None)
    }

    #[cfg(unix)]
    {
        let resolved = match folder {
            KnownFolder::Profile => dirs::home_dir(),
            KnownFolder::Desktop => dirs::desktop_dir(),
            KnownFolder::Documents => dirs::document_dir(),
            KnownFolder::Downloads => dirs::download_dir(),
            KnownFolder::LocalAppData => dirs::data_local_dir(),
            KnownFolder::RoamingAppData => dirs::data_dir(),
            KnownFolder::ProgramData | KnownFolder::System => {
                return Err(FsError::KnownFolderUnsupported { folder });
            }
        };
        resolved.ok_or(FsError::KnownFolder {
            folder,
            reason: "no directory configured for the current user".to_string(),
        })
    }

    #[cfg(not(any(unix, windows)))]
    {
        Err(FsError::KnownFolderUnsupported { folder })
    }
}

/// Resolve `folder` with explicit resolution `flags` and an optional user
/// `token` selecting another security context.
///
/// # Errors
///
/// Fails if `SHGetKnownFolderPath` does not report success, with the OS
/// status in the message.
#[cfg(windows)]
pub fn known_folder_path_with(
    folder: KnownFolder,
    flags: windows::Win32::UI::Shell::KNOWN_FOLDER_FLAG,
    token: Option<windows::Win32::Foundation::HANDLE>,
) -> Result<PathBuf, FsError> {
    use windows::Win32::System::Com::CoTaskMemFree;
    use windows::Win32::UI::Shell::SHGetKnownFolderPath;

    let folder_id = folder_id(folder);

    // SAFETY: the returned PWSTR is a valid, NUL-terminated buffer that we
    // free exactly once with CoTaskMemFree after copying it out.
    unsafe {
        let raw = SHGetKnownFolderPath(&folder_id, flags, token).map_err(|e| {
            FsError::KnownFolder {
                folder,
                reason: e.to_string(),
            }
        })?;
        let path = raw.to_string().map(PathBuf::from);
        CoTaskMemFree(Some(raw.as_ptr() as *const _));
        path.map_err(|e| FsError::KnownFolder {
            folder,
            reason: format!("path is not valid UTF-16: {e}"),
        })
    }
}

#[cfg(windows)]
fn folder_id(folder: KnownFolder) -> windows::core::GUID {
    use windows::Win32::UI::Shell::{
        FOLDERID_Desktop, FOLDERID_Documents, FOLDERID_Downloads, FOLDERID_LocalAppData,
        FOLDERID_Profile, FOLDERID_ProgramData, FOLDERID_RoamingAppData, FOLDERID_System,
    };

    match folder {
        KnownFolder::Profile => FOLDERID_Profile,
        KnownFolder::Desktop => FOLDERID_Desktop,
        KnownFolder::Documents => FOLDERID_Documents,
        KnownFolder::Downloads => FOLDERID_Downloads,
        KnownFolder::LocalAppData => FOLDERID_LocalAppData,
        KnownFolder::RoamingAppData => FOLDERID_RoamingAppData,
        KnownFolder::ProgramData => FOLDERID_ProgramData,
        KnownFolder::System => FOLDERID_System,
    }
}
