//! UART console and `log` backend for the firmware.
//!
//! Everything printed by the control programs goes to the QEMU UART at
//! `yqe_common::mmio::UART0`: the `println!` macro for plain text and the
//! `log` macros for leveled diagnostics. A spinlock serializes whole lines
//! so that output from different harts never interleaves mid-record.

use core::cell::UnsafeCell;
use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, Ordering};

use log::{LevelFilter, Log, Metadata, Record};
use yqe_common::mmio::UART0;

/// Busy-waiting mutual exclusion for `no_std`.
///
/// The firmware has no scheduler to park a waiting hart on, so acquisition
/// spins on an atomic flag. The protected value is reachable only through
/// the guard returned by [`SpinLock::lock`], which releases the flag when
/// dropped.
pub struct SpinLock<T> {
    /// Held flag: `false` while free, `true` while a guard is alive.
    ///
    /// Only ever set through compare-and-swap so that two harts cannot both
    /// observe the lock as free.
    lock: AtomicBool,

    /// Value guarded by the flag.
    data: UnsafeCell<T>,
}

/// Sharing a `SpinLock` across harts is sound when `T` may move between
/// them.
///
/// The flag admits one guard at a time, and the guard is the only path to
/// the inner value.
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    /// Wraps `data` in an unlocked spinlock.
    ///
    /// `const` so the console can live in a `static` without lazy
    /// initialization.
    pub const fn new(data: T) -> Self {
        Self {
            lock: AtomicBool::new(false),
            data: UnsafeCell::new(data),
        }
    }

    /// Spins until the lock is free and returns a guard releasing it on drop.
    ///
    /// Acquire ordering on success makes every write published by the
    /// previous holder visible through the guard.
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        while self
            .lock
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }
        SpinLockGuard {
            lock: &self.lock,
            data: &self.data,
        }
    }
}

/// Exclusive access to the value inside a [`SpinLock`].
///
/// Dereferences to the protected value. Dropping the guard clears the held
/// flag; a guard that is leaked keeps the console locked for good.
pub struct SpinLockGuard<'a, T> {
    /// Flag of the owning lock, cleared on drop.
    lock: &'a AtomicBool,

    /// Value of the owning lock.
    data: &'a UnsafeCell<T>,
}

impl<T> core::ops::Deref for SpinLockGuard<'_, T> {
    type Target = T;

    /// Shared view of the protected value, valid while the guard lives.
    fn deref(&self) -> &T {
        unsafe { &*self.data.get() }
    }
}

impl<T> core::ops::DerefMut for SpinLockGuard<'_, T> {
    /// Mutable view of the protected value.
    ///
    /// Sound because the held flag admits no second guard until this one is
    /// dropped.
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.data.get() }
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    /// Clears the held flag.
    ///
    /// Release ordering publishes the writes made through this guard to the
    /// next hart that acquires the lock.
    fn drop(&mut self) {
        self.lock.store(false, Ordering::Release);
    }
}

/// Transmit side of the UART.
///
/// Implements `fmt::Write` so `write!` and `writeln!` can format straight
/// into the device. Line feeds go out as CR LF for serial terminals. Every
/// byte is a volatile store to the transmit register.
pub struct Uart;

impl fmt::Write for Uart {
    /// Sends `s` byte by byte, inserting a carriage return before each
    /// line feed.
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let tx = UART0 as *mut u8;
        for c in s.bytes() {
            unsafe {
                if c == b'\n' {
                    tx.write_volatile(b'\r');
                }
                tx.write_volatile(c);
            }
        }
        Ok(())
    }
}

/// The single console shared by `println!` and the logger.
///
/// Each formatted record is written under one lock acquisition.
static CONSOLE: SpinLock<Uart> = SpinLock::new(Uart);

/// Formats `args` to the console under the lock.
///
/// Backs the `println!` macro; call the macro instead.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    let _ = CONSOLE.lock().write_fmt(args);
}

/// Prints a line to the UART console.
///
/// The text and its trailing newline are written under a single lock
/// acquisition, so concurrent harts print whole lines.
///
/// ```ignore
/// println!("rb seed {}", seed);
/// ```
#[macro_export]
macro_rules! println {
    ($($arg:tt)*) => ({
        $crate::console::_print(format_args!("{}\n", format_args!($($arg)*)));
    });
}
pub use println;

/// `log` backend writing one `[LEVEL target] message` line per record.
struct UartLogger;

impl Log for UartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut uart = CONSOLE.lock();
            let _ = writeln!(uart, "[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: UartLogger = UartLogger;

/// Routes the `log` macros to the UART.
///
/// The UART itself needs no setup under QEMU; this only installs the
/// logger. `YQE_LOG` at build time selects the level (`off`, `error` to
/// `trace`), `info` otherwise. A second call leaves the first logger and
/// level in place.
pub fn init() {
    let level = match option_env!("YQE_LOG") {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
