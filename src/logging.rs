//! Leveled text output over the `log` facade.
//!
//! The library never installs a logger. Output is gated by a `DebugLevel`,
//! and higher levels escalate informational and warning messages to the error
//! stream so they remain visible on consoles that filter by severity.

use std::fmt;

/// How verbose the library is. `Level0` is silent; `Level3` reports
/// everything as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum DebugLevel {
    Level0,
    Level1,
    Level2,
    Level3,
}

impl DebugLevel {
    pub const MAX: DebugLevel = DebugLevel::Level3;
}

impl Default for DebugLevel {
    fn default() -> Self {
        DebugLevel::Level0
    }
}

impl From<u8> for DebugLevel {
    fn from(v: u8) -> Self {
        match v {
            0 => DebugLevel::Level0,
            1 => DebugLevel::Level1,
            2 => DebugLevel::Level2,
            _ => DebugLevel::Level3,
        }
    }
}

impl From<DebugLevel> for u8 {
    fn from(v: DebugLevel) -> u8 {
        match v {
            DebugLevel::Level0 => 0,
            DebugLevel::Level1 => 1,
            DebugLevel::Level2 => 2,
            DebugLevel::Level3 => 3,
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

pub fn log_info(level: DebugLevel, args: fmt::Arguments) {
    if level == DebugLevel::Level0 {
        return;
    }

    if level >= DebugLevel::Level3 {
        error!("{}", args);
    } else {
        info!("{}", args);
    }
}

pub fn log_warning(level: DebugLevel, args: fmt::Arguments) {
    if level == DebugLevel::Level0 {
        return;
    }

    if level >= DebugLevel::Level2 {
        error!("{}", args);
    } else {
        warn!("{}", args);
    }
}

pub fn log_error(_: DebugLevel, args: fmt::Arguments) {
    error!("{}", args);
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::sync::Once;

    thread_local! {
        static RECORDS: RefCell<Vec<(log::Level, String)>> = RefCell::new(Vec::new());
    }

    struct Capture;

    impl log::Log for Capture {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            RECORDS.with(|v| {
                v.borrow_mut()
                    .push((record.level(), format!("{}", record.args())))
            });
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture;
    static INIT: Once = Once::new();

    fn captured<F: FnOnce()>(func: F) -> Vec<(log::Level, String)> {
        INIT.call_once(|| {
            let _ = log::set_logger(&CAPTURE);
            log::set_max_level(log::LevelFilter::Trace);
        });

        RECORDS.with(|v| v.borrow_mut().clear());
        func();
        RECORDS.with(|v| v.borrow_mut().drain(..).collect())
    }

    #[test]
    fn silent() {
        let records = captured(|| {
            log_info(DebugLevel::Level0, format_args!("info"));
            log_warning(DebugLevel::Level0, format_args!("warning"));
        });

        assert!(records.is_empty());
    }

    #[test]
    fn escalation() {
        let records = captured(|| {
            log_info(DebugLevel::Level1, format_args!("a"));
            log_warning(DebugLevel::Level1, format_args!("b"));
            log_warning(DebugLevel::Level2, format_args!("c"));
            log_info(DebugLevel::Level3, format_args!("d"));
        });

        let levels: Vec<_> = records.iter().map(|v| v.0).collect();
        assert_eq!(
            levels,
            vec![
                log::Level::Info,
                log::Level::Warn,
                log::Level::Error,
                log::Level::Error
            ]
        );

        assert_eq!(records[3].1, "d");
    }

    #[test]
    fn clamp() {
        assert_eq!(DebugLevel::from(0), DebugLevel::Level0);
        assert_eq!(DebugLevel::from(2), DebugLevel::Level2);
        assert_eq!(DebugLevel::from(3), DebugLevel::MAX);
        assert_eq!(DebugLevel::from(200), DebugLevel::MAX);
        assert!(DebugLevel::Level1 > DebugLevel::Level0);
    }

    #[test]
    fn serialization() {
        let v: DebugLevel = serde_json::from_str("7").unwrap();
        assert_eq!(v, DebugLevel::Level3);
        assert_eq!(serde_json::to_string(&DebugLevel::Level2).unwrap(), "2");
    }
}
