/// File names tried, in order, when no explicit engine library path is configured.
pub fn engine_library_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    { &["lib_lightgbm.dll", "lightgbm.dll"] }
    #[cfg(target_os = "macos")]
    { &["lib_lightgbm.dylib", "liblightgbm.dylib"] }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    { &["lib_lightgbm.so", "liblightgbm.so"] }
}

/// Returns the platform name string.
pub fn platform_name() -> &'static str {
    #[cfg(target_os = "windows")]
    { "windows" }
    #[cfg(target_os = "linux")]
    { "linux" }
    #[cfg(target_os = "macos")]
    { "macos" }
    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    { "unknown" }
}
