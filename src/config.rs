//! Build-time configuration, resolved exactly once at startup.
//!
//! Every axis the build surface exposes collapses into one `BuildConfig`
//! that the boot path validates before any other component is touched.
//! A bad combination is a configuration defect, not a runtime condition,
//! so validation only ever rejects; nothing here is re-evaluated later.

use core::fmt;

use crate::registry::MAX_CPUS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    CortexM,
    CortexAr,
    LegacyArm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpuMode {
    /// No floating-point unit configured.
    Disabled,
    /// FP registers saved on every capture.
    Eager,
    /// FP registers left in hardware until an exception forces a flush.
    Lazy,
}

/// Raw console selection switches, as the board configuration sets them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleFlags {
    /// A console device exists at all.
    pub dev_console: bool,
    /// Route the console through the lightweight-link driver.
    pub lwl_console: bool,
    /// Route the console through syslog.
    pub syslog_console: bool,
    /// An upper-half serial driver is built regardless of console choice.
    pub standard_serial: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleChoice {
    None,
    Serial,
    Syslog,
    LowLevel,
}

/// What boot actually wires up: which console, whether the serial driver
/// is initialized at all, and whether it is initialized early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleWiring {
    pub choice: ConsoleChoice,
    pub serial_driver: bool,
    pub early_serial: bool,
}

/// Resolve the console switches with the historical precedence: no
/// console device wins, then the lightweight link, then syslog, then a
/// serial console. A serial driver built for other reasons comes along
/// without the early initialization.
pub fn resolve_console(flags: &ConsoleFlags) -> ConsoleWiring {
    let (choice, serial_driver, early_serial) = if !flags.dev_console {
        (ConsoleChoice::None, false, false)
    } else if flags.lwl_console {
        (ConsoleChoice::LowLevel, false, false)
    } else if flags.syslog_console {
        (ConsoleChoice::Syslog, false, false)
    } else {
        (ConsoleChoice::Serial, true, true)
    };

    let serial_driver = serial_driver || flags.standard_serial;

    ConsoleWiring {
        choice,
        serial_driver,
        early_serial,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Eager FP save selected on Cortex-A/R, which only saves lazily.
    EagerFpuOnCortexAr,
    /// Lazy FP save selected on ARM7/ARM9, which always copies in full.
    LazyFpuOnLegacy,
    /// Processor count outside `1..=MAX_CPUS`.
    BadCpuCount(usize),
    /// A dedicated interrupt stack was requested but is too small to use.
    InterruptStackTooSmall(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EagerFpuOnCortexAr => {
                write!(f, "cortex-a/r supports only lazy floating-point save")
            }
            Self::LazyFpuOnLegacy => {
                write!(f, "arm7/arm9 does not support lazy floating-point save")
            }
            Self::BadCpuCount(n) => write!(f, "cpu count {} not in 1..={}", n, MAX_CPUS),
            Self::InterruptStackTooSmall(n) => {
                write!(f, "interrupt stack of {} bytes is unusable", n)
            }
        }
    }
}

/// The one-shot configuration record. Construct it from the Cargo feature
/// surface with `from_build`, override what the board knows better
/// (processor count, interrupt stack, console switches), then `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildConfig {
    pub family: Family,
    pub fpu: FpuMode,
    pub ncpus: usize,
    pub paging: bool,
    pub ramfuncs: bool,
    /// Dedicated interrupt-stack size in bytes; zero means exceptions run
    /// on the interrupted task's stack.
    pub interrupt_stack: usize,
    pub console: ConsoleFlags,
}

impl BuildConfig {
    pub fn from_build() -> Self {
        let family = if cfg!(feature = "cortex-ar") {
            Family::CortexAr
        } else if cfg!(feature = "legacy-arm") {
            Family::LegacyArm
        } else {
            Family::CortexM
        };
        let fpu = if !cfg!(feature = "fpu") {
            FpuMode::Disabled
        } else if cfg!(feature = "lazy-fpu") || family == Family::CortexAr {
            FpuMode::Lazy
        } else {
            FpuMode::Eager
        };
        Self {
            family,
            fpu,
            ncpus: 1,
            paging: cfg!(feature = "paging"),
            ramfuncs: cfg!(feature = "ramfuncs"),
            interrupt_stack: 0,
            console: ConsoleFlags::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ncpus < 1 || self.ncpus > MAX_CPUS {
            return Err(ConfigError::BadCpuCount(self.ncpus));
        }
        match (self.family, self.fpu) {
            (Family::CortexAr, FpuMode::Eager) => return Err(ConfigError::EagerFpuOnCortexAr),
            (Family::LegacyArm, FpuMode::Lazy) => return Err(ConfigError::LazyFpuOnLegacy),
            _ => {}
        }
        // A stack this small cannot hold even one frame; zero means "use
        // the interrupted task's stack" and is fine.
        if self.interrupt_stack != 0 && self.interrupt_stack <= 3 {
            return Err(ConfigError::InterruptStackTooSmall(self.interrupt_stack));
        }
        Ok(())
    }

    pub fn has_interrupt_stack(&self) -> bool {
        self.interrupt_stack > 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BuildConfig {
        BuildConfig {
            family: Family::CortexM,
            fpu: FpuMode::Disabled,
            ncpus: 1,
            paging: false,
            ramfuncs: false,
            interrupt_stack: 0,
            console: ConsoleFlags::default(),
        }
    }

    #[test]
    fn from_build_validates() {
        assert_eq!(BuildConfig::from_build().validate(), Ok(()));
    }

    #[test]
    fn eager_fpu_rejected_on_cortex_ar() {
        let cfg = BuildConfig {
            family: Family::CortexAr,
            fpu: FpuMode::Eager,
            ..base()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EagerFpuOnCortexAr));
    }

    #[test]
    fn lazy_fpu_rejected_on_legacy() {
        let cfg = BuildConfig {
            family: Family::LegacyArm,
            fpu: FpuMode::Lazy,
            ..base()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::LazyFpuOnLegacy));
    }

    #[test]
    fn cpu_count_bounds() {
        assert_eq!(
            BuildConfig { ncpus: 0, ..base() }.validate(),
            Err(ConfigError::BadCpuCount(0))
        );
        assert_eq!(
            BuildConfig { ncpus: MAX_CPUS + 1, ..base() }.validate(),
            Err(ConfigError::BadCpuCount(MAX_CPUS + 1))
        );
        assert_eq!(BuildConfig { ncpus: MAX_CPUS, ..base() }.validate(), Ok(()));
    }

    #[test]
    fn undersized_interrupt_stack_rejected() {
        let cfg = BuildConfig {
            interrupt_stack: 2,
            ..base()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InterruptStackTooSmall(2)));
        assert!(!base().has_interrupt_stack());
        assert!(BuildConfig { interrupt_stack: 2048, ..base() }
            .has_interrupt_stack());
    }

    #[test]
    fn console_resolution_precedence() {
        // No console device at all.
        let off = ConsoleFlags::default();
        assert_eq!(
            resolve_console(&off),
            ConsoleWiring {
                choice: ConsoleChoice::None,
                serial_driver: false,
                early_serial: false
            }
        );

        // Plain serial console: driver plus early init.
        let serial = ConsoleFlags {
            dev_console: true,
            ..off
        };
        assert_eq!(
            resolve_console(&serial),
            ConsoleWiring {
                choice: ConsoleChoice::Serial,
                serial_driver: true,
                early_serial: true
            }
        );

        // The lightweight link takes precedence over syslog.
        let lwl = ConsoleFlags {
            dev_console: true,
            lwl_console: true,
            syslog_console: true,
            ..off
        };
        assert_eq!(resolve_console(&lwl).choice, ConsoleChoice::LowLevel);

        let syslog = ConsoleFlags {
            dev_console: true,
            syslog_console: true,
            ..off
        };
        assert_eq!(resolve_console(&syslog).choice, ConsoleChoice::Syslog);
    }

    #[test]
    fn standard_serial_brings_the_driver_without_early_init() {
        let flags = ConsoleFlags {
            dev_console: true,
            syslog_console: true,
            standard_serial: true,
            ..ConsoleFlags::default()
        };
        let wiring = resolve_console(&flags);
        assert_eq!(wiring.choice, ConsoleChoice::Syslog);
        assert!(wiring.serial_driver);
        assert!(!wiring.early_serial);
    }
}
