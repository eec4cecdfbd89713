//! Subscriber setup for the loaded module.
//!
//! Inside the template process stdout and stderr are discarded, so on
//! Android every formatted event is handed to the system log buffer under
//! the module's tag. Other targets write to stderr.

use std::ffi::CString;

use libc::c_int;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use unshare_common::constants::DEFAULT_LOG_FILTER;

// Priorities from <android/log.h>.
const ANDROID_LOG_VERBOSE: c_int = 2;
const ANDROID_LOG_DEBUG: c_int = 3;
const ANDROID_LOG_INFO: c_int = 4;
const ANDROID_LOG_WARN: c_int = 5;
const ANDROID_LOG_ERROR: c_int = 6;

/// Installs a global `tracing` subscriber with the given filter directive.
///
/// Best effort: an invalid directive falls back to the default filter, and
/// an already-installed subscriber (e.g. the embedding binary's) is kept.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        tracing::warn!(filter, error = %e, "invalid log filter, using default");
        EnvFilter::new(DEFAULT_LOG_FILTER)
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    #[cfg(target_os = "android")]
    let installed = builder
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_writer(logcat::Logcat)
        .try_init();
    #[cfg(not(target_os = "android"))]
    let installed = builder.with_writer(std::io::stderr).try_init();

    if installed.is_err() {
        tracing::trace!("subscriber already installed");
    }
}

/// Maps a `tracing` level to a system log priority.
#[cfg_attr(not(target_os = "android"), allow(dead_code))]
fn priority(level: Level) -> c_int {
    match level {
        Level::TRACE => ANDROID_LOG_VERBOSE,
        Level::DEBUG => ANDROID_LOG_DEBUG,
        Level::INFO => ANDROID_LOG_INFO,
        Level::WARN => ANDROID_LOG_WARN,
        _ => ANDROID_LOG_ERROR,
    }
}

/// One formatted event as a C string: trailing newline dropped, interior
/// NULs replaced so nothing is cut short.
#[cfg_attr(not(target_os = "android"), allow(dead_code))]
fn log_line(buf: &[u8]) -> CString {
    let text = String::from_utf8_lossy(buf);
    let bytes: Vec<u8> = text
        .trim_end_matches('\n')
        .bytes()
        .map(|b| if b == 0 { b' ' } else { b })
        .collect();
    CString::new(bytes).unwrap_or_default()
}

#[cfg(target_os = "android")]
mod logcat {
    use std::ffi::{CString, c_char};
    use std::io;

    use libc::c_int;
    use tracing::Metadata;
    use tracing_subscriber::fmt::MakeWriter;
    use unshare_common::constants::MODULE_NAME;

    #[link(name = "log")]
    unsafe extern "C" {
        fn __android_log_write(prio: c_int, tag: *const c_char, text: *const c_char) -> c_int;
    }

    /// Hands out one writer per event, carrying the event's priority.
    #[derive(Debug, Clone, Copy)]
    pub(super) struct Logcat;

    impl<'a> MakeWriter<'a> for Logcat {
        type Writer = LogcatWriter;

        fn make_writer(&'a self) -> Self::Writer {
            LogcatWriter {
                priority: super::ANDROID_LOG_INFO,
            }
        }

        fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
            LogcatWriter {
                priority: super::priority(*meta.level()),
            }
        }
    }

    pub(super) struct LogcatWriter {
        priority: c_int,
    }

    impl io::Write for LogcatWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let text = super::log_line(buf);
            let tag = CString::new(MODULE_NAME).unwrap_or_default();
            // SAFETY: `tag` and `text` are NUL-terminated and outlive the
            // call; liblog copies them before returning.
            let _ = unsafe { __android_log_write(self.priority, tag.as_ptr(), text.as_ptr()) };
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_system_priorities() {
        assert_eq!(priority(Level::TRACE), ANDROID_LOG_VERBOSE);
        assert_eq!(priority(Level::DEBUG), ANDROID_LOG_DEBUG);
        assert_eq!(priority(Level::INFO), ANDROID_LOG_INFO);
        assert_eq!(priority(Level::WARN), ANDROID_LOG_WARN);
        assert_eq!(priority(Level::ERROR), ANDROID_LOG_ERROR);
    }

    #[test]
    fn log_line_drops_newline_and_replaces_interior_nul() {
        let line = log_line(b"unshare scheduled uid=10234\0x\n");
        assert_eq!(line.to_str().expect("utf8"), "unshare scheduled uid=10234 x");
    }

    #[test]
    fn init_twice_keeps_first_subscriber() {
        init("debug");
        init("not a [valid filter");
    }
}
