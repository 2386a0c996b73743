/// Whether the process runs with elevated rights (root / administrator)
///
/// Some hotkey backends need elevation to observe keys globally, so a
/// `false` here is worth a warning at startup.
#[cfg(unix)]
pub fn is_elevated() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(windows)]
pub fn is_elevated() -> bool {
    unsafe { windows::Win32::UI::Shell::IsUserAnAdmin().as_bool() }
}

#[cfg(not(any(unix, windows)))]
pub fn is_elevated() -> bool {
    false
}
