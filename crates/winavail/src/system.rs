//! The live system's version: queried from the kernel once, cached for the
//! process lifetime, and compared against parsed version requests.

use tracing::trace;

use crate::parse::is_windows_request;

#[cfg(windows)]
use crate::error::{DetectError, Result};
#[cfg(windows)]
use crate::parse::parse_version_request;
#[cfg(windows)]
use crate::version::WindowsVersion;

/// Reported build numbers carry vendor tag bits in the top nibble; strip
/// them before comparing.
#[cfg(windows)]
const BUILD_NUMBER_MASK: u32 = 0x0FFF_FFFF;

#[cfg(windows)]
static SYSTEM_VERSION: std::sync::OnceLock<WindowsVersion> = std::sync::OnceLock::new();

/// Returns whether the running system satisfies the version named by
/// `request`, e.g. `"Windows 10 21H2"`.
///
/// Strings naming another platform, and Windows strings whose version part
/// cannot be read, are never satisfied. On non-Windows targets this always
/// returns false without querying anything.
pub fn is_version_available(request: &str) -> bool {
    if !is_windows_request(request) {
        trace!(request, "not a Windows version request");
        return false;
    }
    check_live_version(request)
}

/// Returns whether the running system satisfies at least one of the listed
/// version requests. Requests are checked in order and the scan stops at
/// the first satisfied one.
pub fn any_version_available(requests: &[&str]) -> bool {
    requests.iter().any(|request| is_version_available(request))
}

/// Query the running kernel's version. The first call performs the OS query
/// and caches the normalized triple; later calls return the cached value.
#[cfg(windows)]
pub fn try_system_version() -> Result<WindowsVersion> {
    if let Some(version) = SYSTEM_VERSION.get() {
        return Ok(*version);
    }
    let queried = query_nt_version()?;
    let version = *SYSTEM_VERSION.get_or_init(|| {
        tracing::debug!(version = %queried, "detected Windows version");
        queried
    });
    Ok(version)
}

#[cfg(windows)]
fn check_live_version(request: &str) -> bool {
    let requested = parse_version_request(request);
    let live = match try_system_version() {
        Ok(version) => version,
        // The environment cannot answer version checks at all; that is a
        // broken precondition, not a recoverable condition.
        Err(e) => panic!("cannot determine Windows version: {e}"),
    };
    let available = requested <= live;
    trace!(request, %requested, %live, available, "version check");
    available
}

#[cfg(not(windows))]
fn check_live_version(request: &str) -> bool {
    trace!(request, "not running on Windows");
    false
}

#[cfg(windows)]
fn query_nt_version() -> Result<WindowsVersion> {
    use windows::Wdk::System::SystemServices::RtlGetVersion;
    use windows::Win32::System::SystemInformation::OSVERSIONINFOW;

    let mut info = OSVERSIONINFOW {
        dwOSVersionInfoSize: std::mem::size_of::<OSVERSIONINFOW>() as u32,
        ..Default::default()
    };
    // SAFETY: `info` is a properly initialized OSVERSIONINFOW with its size
    // field set, and outlives the call.
    let status = unsafe { RtlGetVersion(&mut info) };
    if status.is_err() {
        return Err(DetectError::VersionQueryFailed { status: status.0 });
    }
    Ok(WindowsVersion::new(
        info.dwMajorVersion,
        info.dwMinorVersion,
        info.dwBuildNumber & BUILD_NUMBER_MASK,
    ))
}
