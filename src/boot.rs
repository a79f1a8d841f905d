//! Boot sequence: section setup, relocation, then peripheral hooks.
//!
//! Everything device-shaped is an external collaborator reached through
//! `BoardHooks`; this module only fixes the order. Relocation in
//! particular must complete here, before any code that was moved to fast
//! memory can be called.

use log::{debug, info};

use crate::config::{resolve_console, BuildConfig, ConfigError, ConsoleChoice};
use crate::mem::ramfunc::RamFuncRelocator;
use crate::mem::MemoryLayoutDescriptor;
use crate::ArchState;

/// Board-level initialization hooks, called in a fixed order from
/// `arch_boot`. Every hook defaults to a no-op so a board only writes
/// the ones it has hardware for.
pub trait BoardHooks {
    fn early_serial_init(&mut self) {}
    fn serial_init(&mut self) {}
    fn lwl_console_init(&mut self) {}
    fn syslog_console_init(&mut self) {}
    fn pm_init(&mut self) {}
    fn dma_init(&mut self) {}
    fn l2cc_init(&mut self) {}
    fn net_init(&mut self) {}
    fn usb_init(&mut self) {}
    fn wdt_init(&mut self) {}
}

/// Bring the architecture layer up. Runs once, on the boot processor,
/// before interrupts are enabled anywhere.
///
/// # Safety
/// The layout must describe this image's real sections, no relocated
/// function may have run yet, and nothing may be executing concurrently.
pub unsafe fn arch_boot(
    config: &BuildConfig,
    layout: &MemoryLayoutDescriptor,
    hooks: &mut dyn BoardHooks,
) -> Result<ArchState, ConfigError> {
    config.validate()?;

    unsafe {
        layout.clean_bss();
        layout.init_data();
    }

    if config.ramfuncs {
        if let Some(reloc) = RamFuncRelocator::from_layout(layout) {
            unsafe { reloc.relocate() };
            debug!("relocated {} bytes of ram functions", reloc.size());
        }
    }

    let wiring = resolve_console(&config.console);
    if wiring.early_serial {
        hooks.early_serial_init();
    }

    hooks.pm_init();
    hooks.dma_init();
    hooks.l2cc_init();

    match wiring.choice {
        ConsoleChoice::LowLevel => hooks.lwl_console_init(),
        ConsoleChoice::Syslog => hooks.syslog_console_init(),
        ConsoleChoice::Serial | ConsoleChoice::None => {}
    }
    if wiring.serial_driver {
        hooks.serial_init();
    }

    hooks.net_init();
    hooks.usb_init();
    hooks.wdt_init();

    info!(
        "arch up: {:?}, {} cpu(s), fpu {:?}",
        config.family, config.ncpus, config.fpu
    );
    Ok(ArchState::new(config))
}
