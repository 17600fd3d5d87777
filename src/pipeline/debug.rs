//! Classification of device diagnostic messages.
//!
//! Devices deliver asynchronous diagnostics (API misuse, performance hints,
//! markers). [`classify`] routes each message to the matching log level and
//! converts hard errors into [`RenderError::DeviceFault`].

use std::backtrace::Backtrace;
use std::fmt;

use crate::error::{RenderError, RenderResult};

/// Subsystem that produced a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugSource {
    Api,
    WindowSystem,
    ShaderCompiler,
    ThirdParty,
    Application,
    Other,
}

impl fmt::Display for DebugSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DebugSource::Api => "API",
            DebugSource::WindowSystem => "window system",
            DebugSource::ShaderCompiler => "shader compiler",
            DebugSource::ThirdParty => "third party",
            DebugSource::Application => "application",
            DebugSource::Other => "other",
        };
        f.write_str(name)
    }
}

/// Category of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugKind {
    Error,
    DeprecatedBehavior,
    UndefinedBehavior,
    Portability,
    Performance,
    Marker,
    Other,
}

impl fmt::Display for DebugKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DebugKind::Error => "error",
            DebugKind::DeprecatedBehavior => "deprecated behavior",
            DebugKind::UndefinedBehavior => "undefined behavior",
            DebugKind::Portability => "portability",
            DebugKind::Performance => "performance",
            DebugKind::Marker => "marker",
            DebugKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Severity reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugSeverity {
    High,
    Medium,
    Low,
    Notification,
}

/// One diagnostic message delivered by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugMessage {
    pub source: DebugSource,
    pub kind: DebugKind,
    pub severity: DebugSeverity,
    pub id: u32,
    pub message: String,
}

impl fmt::Display for DebugMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "device {} message {:#x} from {}: {}",
            self.kind, self.id, self.source, self.message
        )
    }
}

/// Routes a diagnostic to the log and promotes hard errors to faults.
///
/// Error-kind messages capture a backtrace at the point of classification so
/// the offending pipeline call can be located, then surface as
/// [`RenderError::DeviceFault`]. Everything else is logged and discarded:
/// deprecated or undefined behavior at error level, portability and
/// performance at warn, markers and uncategorized chatter at trace.
pub fn classify(message: &DebugMessage) -> RenderResult<()> {
    match message.kind {
        DebugKind::Error => {
            let backtrace = Backtrace::force_capture();
            log::error!("{message}\n{backtrace}");
            Err(RenderError::device_fault(message.to_string()))
        }
        DebugKind::DeprecatedBehavior | DebugKind::UndefinedBehavior => {
            log::error!("{message}");
            Ok(())
        }
        DebugKind::Portability | DebugKind::Performance => {
            log::warn!("{message}");
            Ok(())
        }
        DebugKind::Marker | DebugKind::Other => {
            log::trace!("{message}");
            Ok(())
        }
    }
}
