//! Engine configuration

/// How the swap chain picks its presentation mode
///
/// Every policy falls back to FIFO, which a conforming device always offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentModePreference {
    /// Mailbox when available (no tearing, lowest latency), otherwise FIFO
    #[default]
    LowLatency,
    /// Immediate when available (may tear), then mailbox, then FIFO
    NoVsync,
    /// Always FIFO
    Vsync,
}

/// Validation message severity filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    /// Only errors
    ErrorsOnly,
    /// Errors and warnings
    ErrorsAndWarnings,
    /// Everything, including info and verbose messages
    All,
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Presentation mode policy used by every swap chain generation
    pub present_mode: PresentModePreference,

    /// Color attachment clear value (RGBA)
    pub clear_color: [f32; 4],

    /// Depth attachment clear value
    pub clear_depth: f32,

    /// Stencil attachment clear value
    pub clear_stencil: u32,

    /// Enable the validation layers and debug messenger
    pub enable_validation: bool,

    /// Which validation messages reach the logger
    pub debug_severity: DebugSeverity,

    /// Panic when the validation layers report an error
    pub panic_on_validation_error: bool,

    /// Application name passed to the graphics API
    pub app_name: String,

    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            present_mode: PresentModePreference::LowLatency,
            clear_color: [0.01, 0.01, 0.01, 1.0],
            clear_depth: 1.0,
            clear_stencil: 0,
            enable_validation: cfg!(debug_assertions),
            debug_severity: DebugSeverity::ErrorsAndWarnings,
            panic_on_validation_error: false,
            app_name: "Vesta Application".to_string(),
            app_version: (1, 0, 0),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
