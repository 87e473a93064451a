#![no_std]
#![no_main]

use core::arch::global_asm;

use panic_halt as _;
use riscv::register::mhartid;
use yqe_core::programs::ProgramKind;

use crate::drivers::pulse::PulseDevice;

mod console;
mod drivers;

global_asm!(include_str!("entry.S"));

/// Program flashed into this image, chosen with `YQE_PROGRAM` at build time.
const PROGRAM: &str = match option_env!("YQE_PROGRAM") {
    Some(name) => name,
    None => "rb",
};

/// QEMU `sifive_test` finisher.
const QEMU_EXIT: usize = 0x10_0000;
const EXIT_PASS: u32 = 0x5555;
const EXIT_FAIL: u32 = 0x3333;

#[unsafe(no_mangle)]
pub extern "C" fn kmain() -> ! {
    // Only hart 0 talks to the pulse device.
    if mhartid::read() != 0 {
        park();
    }

    console::init();
    console::println!("[BOOT] pulse control unit online");

    let code = match PROGRAM.parse::<ProgramKind>() {
        Err(err) => {
            log::error!("{}: `{}`", err, PROGRAM);
            EXIT_FAIL
        }
        Ok(kind) => {
            let device = unsafe { PulseDevice::take() };
            match kind.execute(device) {
                Ok(_) => {
                    log::info!("{} done", kind);
                    EXIT_PASS
                }
                Err(err) => {
                    log::error!("{} aborted: {}", kind, err);
                    EXIT_FAIL | (1 << 16)
                }
            }
        }
    };

    unsafe { (QEMU_EXIT as *mut u32).write_volatile(code) };
    park();
}

fn park() -> ! {
    loop {
        unsafe { riscv::asm::wfi() };
    }
}
