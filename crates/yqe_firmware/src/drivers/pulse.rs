//! Register interface bound to the physical pulse-generation electronics.
//!
//! Every register access is a single volatile load or store at the address
//! given by the memory map. Array registers are indexed by channel offset
//! or by sample index from their base address.

use core::sync::atomic::{Ordering, fence};

use yqe_common::mmio::{
    ENVELOPE_CAPACITY, FMR, FMR_IQ, FMR_OFFSET, FMR_READY, PARAMS, PCIE, PLAY, SRAM, TRIGGER,
    TRIGGER_BITMASK, TRIGGER_INTERVAL, WAIT, WAVE_CHANNEL, WAVE_INDEX, WAVE_LEN, envelope_sample,
};
use yqe_core::channel::Channel;
use yqe_core::regs::{Iq, ParamSlot, Registers};
use yqe_core::waveform::Waveform;

const PARAM_SLOTS: usize = ParamSlot::ALL.len();

#[inline(always)]
unsafe fn store<T>(addr: usize, value: T) {
    unsafe { (addr as *mut T).write_volatile(value) }
}

#[inline(always)]
unsafe fn load<T>(addr: usize) -> T {
    unsafe { (addr as *const T).read_volatile() }
}

/// Handle to the memory-mapped pulse device.
///
/// Only one handle may exist at a time; the sequencer assumes it owns the
/// timeline being compiled.
pub struct PulseDevice {
    _private: (),
}

impl PulseDevice {
    /// # Safety
    ///
    /// The pulse electronics must be mapped at the addresses of
    /// `yqe_common::mmio` and no other handle may be alive.
    pub unsafe fn take() -> Self {
        Self { _private: () }
    }
}

impl Registers for PulseDevice {
    fn write_trigger_count(&mut self, repeat: u32) {
        // Timeline, parameters and envelope must land before the start.
        fence(Ordering::Release);
        unsafe { store(TRIGGER, repeat as i32) }
    }

    fn write_trigger_interval(&mut self, interval: u32) {
        unsafe { store(TRIGGER_INTERVAL, interval as i32) }
    }

    fn write_trigger_bitmask(&mut self, bitmask: u32) {
        unsafe { store(TRIGGER_BITMASK, bitmask as i32) }
    }

    fn write_fmr_offset(&mut self, offset: u32) {
        unsafe { store(FMR_OFFSET, offset as i32) }
    }

    fn write_wait(&mut self, duration: u32) {
        unsafe { store(WAIT, duration as i32) }
    }

    fn write_play(&mut self, channel: Channel, waveform: Waveform) {
        unsafe { store(PLAY + channel.index(), waveform.index()) }
    }

    fn write_param(&mut self, channel: Channel, slot: ParamSlot, value: f64) {
        let addr = PARAMS + (channel.index() * PARAM_SLOTS + slot.index()) * 8;
        unsafe { store(addr, value) }
    }

    fn read_fmr(&mut self, channel: Channel) -> i32 {
        unsafe { load(FMR + channel.index() * 4) }
    }

    fn read_fmr_iq(&mut self, channel: Channel) -> Iq {
        let base = FMR_IQ + channel.index() * 16;
        unsafe {
            Iq {
                i: load(base),
                q: load(base + 8),
            }
        }
    }

    fn fmr_ready(&mut self) -> bool {
        let ready = unsafe { load::<u8>(FMR_READY) } != 0;
        if ready {
            fence(Ordering::Acquire);
        }
        ready
    }

    fn write_pcie_word(&mut self, value: i32) {
        unsafe { store(PCIE, value) }
    }

    fn write_pcie_f64(&mut self, value: f64) {
        unsafe { store(PCIE, value) }
    }

    fn read_sram(&mut self, index: usize) -> f64 {
        unsafe { load(SRAM + index * 8) }
    }

    fn write_envelope(&mut self, sample_index: usize, sample: u16) {
        // Upload checks the length first; past the table lies FMR_READY.
        let Some(addr) = envelope_sample(sample_index) else {
            debug_assert!(false, "envelope sample {sample_index} beyond {ENVELOPE_CAPACITY}");
            log::error!("dropped envelope sample {} beyond {}", sample_index, ENVELOPE_CAPACITY);
            return;
        };
        unsafe { store(addr, sample) }
    }

    fn write_wave_len(&mut self, len: u32) {
        fence(Ordering::Release);
        unsafe { store(WAVE_LEN, len as i32) }
    }

    fn write_wave_channel(&mut self, channel: Channel) {
        unsafe { store(WAVE_CHANNEL, channel.offset()) }
    }

    fn write_wave_index(&mut self, index: Waveform) {
        unsafe { store(WAVE_INDEX, index.index()) }
    }
}
