//! Simulated register backends.
//!
//! No real hardware is assumed anywhere in this crate's tests, and the
//! bridge's backends are the only code that touches live registers. These
//! types stand in for the hardware: [`MockBank`] is a dumb register file for
//! exercising configuration accessors, [`CaptureSim`] scripts the producer
//! side of the double-buffer capture handshake.

use std::cell::{Cell, RefCell, UnsafeCell};
use std::collections::{BTreeMap, VecDeque};
use std::ptr::NonNull;

use crate::bus::RegisterBus;
use crate::regs::RegisterMap;

/// Plain in-memory register file. Reads return the last written value
/// (zero initially); every write is recorded in order.
#[derive(Debug, Default)]
pub struct MockBank {
    regs: RefCell<BTreeMap<usize, u32>>,
    writes: RefCell<Vec<(usize, u32)>>,
}

impl MockBank {
    pub fn new() -> MockBank {
        MockBank::default()
    }

    /// All writes seen so far, in order.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.writes.borrow().clone()
    }

    /// The values written to one offset, in order.
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.writes
            .borrow()
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl RegisterBus for MockBank {
    fn read32(&self, offset: usize) -> u32 {
        *self.regs.borrow().get(&offset).unwrap_or(&0)
    }

    fn write32(&self, offset: usize, value: u32) {
        self.writes.borrow_mut().push((offset, value));
        self.regs.borrow_mut().insert(offset, value);
    }
}

/// Scripted capture component.
///
/// Behaves like the hardware side of the handshake: a start pulse arms it,
/// and each queued line payload then lands in the buffer the component is
/// currently filling, raising that buffer's full flag. Buffers alternate
/// strictly, starting with buffer 0. Delivery is driven by software's own
/// polling — each read of the pending buffer's full flag counts as one poll
/// tick, and the line completes after [`CaptureSim::set_line_latency`] ticks
/// (default 1, so the overrun check in `get_line` sees an empty buffer and
/// the wait loop sees the completion).
///
/// The simulation owns the line-buffer window; hand
/// [`CaptureSim::window_ptr`] to the controller's buffer setup.
pub struct CaptureSim {
    map: RegisterMap,
    transfer_bytes: usize,
    window: Box<[UnsafeCell<u8>]>,
    regs: RefCell<[u32; 64]>,
    standby: Cell<bool>,
    armed: Cell<bool>,
    hw_target: Cell<usize>,
    polls_remaining: Cell<u32>,
    line_latency: Cell<u32>,
    pending_lines: RefCell<VecDeque<Vec<u8>>>,
    lines_delivered: Cell<u32>,
    start_pulses: Cell<u32>,
    full_flag_clears: Cell<u32>,
}

impl CaptureSim {
    /// Creates a simulation whose window holds two transfers of
    /// `transfer_bytes` each. Standby reads as set until changed.
    pub fn new(map: RegisterMap, transfer_bytes: usize) -> CaptureSim {
        let window = (0..transfer_bytes * 2)
            .map(|_| UnsafeCell::new(0u8))
            .collect();
        CaptureSim {
            map,
            transfer_bytes,
            window,
            regs: RefCell::new([0; 64]),
            standby: Cell::new(true),
            armed: Cell::new(false),
            hw_target: Cell::new(0),
            polls_remaining: Cell::new(1),
            line_latency: Cell::new(1),
            pending_lines: RefCell::new(VecDeque::new()),
            lines_delivered: Cell::new(0),
            start_pulses: Cell::new(0),
            full_flag_clears: Cell::new(0),
        }
    }

    /// Software view of the simulated buffer window.
    pub fn window_ptr(&self) -> NonNull<u8> {
        NonNull::new(self.window[0].get()).expect("window allocation is never null")
    }

    /// Queues one line payload for delivery. Must be exactly one transfer
    /// long.
    pub fn push_line(&self, payload: Vec<u8>) {
        assert_eq!(
            payload.len(),
            self.transfer_bytes,
            "queued line has wrong size"
        );
        self.pending_lines.borrow_mut().push_back(payload);
    }

    /// Number of poll ticks a line takes to complete once it is the
    /// component's turn to deliver it.
    pub fn set_line_latency(&self, polls: u32) {
        self.line_latency.set(polls);
        self.polls_remaining.set(polls);
    }

    /// Controls the standby flag; clear it to simulate a component held in
    /// reset.
    pub fn set_standby(&self, standby: bool) {
        self.standby.set(standby);
    }

    /// Latches a buffer-full flag directly, as if a line completed behind
    /// software's back.
    pub fn force_full(&self, buffer: usize) {
        let offset = self.full_flag_offset(buffer);
        self.regs.borrow_mut()[offset / 4] = 1;
    }

    /// Current value of a buffer-full flag, without a poll tick.
    pub fn full_flag(&self, buffer: usize) -> u32 {
        self.regs.borrow()[self.full_flag_offset(buffer) / 4]
    }

    pub fn lines_delivered(&self) -> u32 {
        self.lines_delivered.get()
    }

    pub fn start_pulses(&self) -> u32 {
        self.start_pulses.get()
    }

    /// Number of zero-writes to either full flag (software acknowledgements
    /// and the re-arm in `start_capture`).
    pub fn full_flag_clears(&self) -> u32 {
        self.full_flag_clears.get()
    }

    fn full_flag_offset(&self, buffer: usize) -> usize {
        match buffer {
            0 => self.map.buff0_full,
            1 => self.map.buff1_full,
            _ => panic!("no such buffer: {}", buffer),
        }
    }

    /// One poll of a full flag. Delivers the next queued line when the
    /// polled buffer is the component's current target and its latency has
    /// elapsed.
    fn poll_full(&self, buffer: usize) -> u32 {
        let offset = self.full_flag_offset(buffer);
        if self.regs.borrow()[offset / 4] != 0 {
            return 1;
        }
        if !self.armed.get() || self.hw_target.get() != buffer {
            return 0;
        }
        if self.pending_lines.borrow().is_empty() {
            return 0;
        }
        if self.polls_remaining.get() > 0 {
            self.polls_remaining.set(self.polls_remaining.get() - 1);
            return 0;
        }

        // line tick: the payload lands in this buffer and the flag latches
        let payload = self
            .pending_lines
            .borrow_mut()
            .pop_front()
            .expect("checked non-empty above");
        let dst = self.window[buffer * self.transfer_bytes].get();
        // SAFETY: the window holds two transfers and push_line checked the
        // payload length, so the copy stays inside the UnsafeCell block.
        unsafe { std::ptr::copy_nonoverlapping(payload.as_ptr(), dst, payload.len()) };
        self.regs.borrow_mut()[offset / 4] = 1;
        self.hw_target.set(1 - buffer);
        self.polls_remaining.set(self.line_latency.get());
        self.lines_delivered.set(self.lines_delivered.get() + 1);
        1
    }
}

impl RegisterBus for CaptureSim {
    fn read32(&self, offset: usize) -> u32 {
        if offset == self.map.standby {
            return self.standby.get() as u32;
        }
        if offset == self.map.buff0_full {
            return self.poll_full(0);
        }
        if offset == self.map.buff1_full {
            return self.poll_full(1);
        }
        self.regs.borrow()[offset / 4]
    }

    fn write32(&self, offset: usize, value: u32) {
        if offset == self.map.start_capture && value == 1 {
            self.start_pulses.set(self.start_pulses.get() + 1);
            self.armed.set(true);
            self.hw_target.set(0);
            self.polls_remaining.set(self.line_latency.get());
        }
        if (offset == self.map.buff0_full || offset == self.map.buff1_full) && value == 0 {
            self.full_flag_clears.set(self.full_flag_clears.get() + 1);
        }
        self.regs.borrow_mut()[offset / 4] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::{CaptureSim, MockBank};
    use crate::bus::RegisterBus;
    use crate::regs::RegisterMap;

    #[test]
    fn mock_bank_records_writes() {
        let bank = MockBank::new();
        bank.write32(0x20, 640);
        bank.write32(0x20, 800);
        assert_eq!(bank.read32(0x20), 800);
        assert_eq!(bank.read32(0x24), 0);
        assert_eq!(bank.writes_to(0x20), vec![640, 800]);
    }

    #[test]
    fn sim_delivers_lines_alternately() {
        let map = RegisterMap::default();
        let sim = CaptureSim::new(map.clone(), 4);
        sim.set_line_latency(0);
        sim.push_line(vec![1, 2, 3, 4]);
        sim.push_line(vec![5, 6, 7, 8]);

        sim.write32(map.start_capture, 1);
        assert_eq!(sim.read32(map.buff0_full), 1);
        // buffer 1 is now the target; buffer 0 stays latched until cleared
        assert_eq!(sim.full_flag(0), 1);
        sim.write32(map.buff0_full, 0);
        assert_eq!(sim.read32(map.buff1_full), 1);

        let window = sim.window_ptr().as_ptr();
        let contents = unsafe { std::slice::from_raw_parts(window, 8) };
        assert_eq!(contents, &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn sim_does_not_deliver_before_start() {
        let map = RegisterMap::default();
        let sim = CaptureSim::new(map.clone(), 4);
        sim.push_line(vec![1, 2, 3, 4]);
        assert_eq!(sim.read32(map.buff0_full), 0);
    }
}
