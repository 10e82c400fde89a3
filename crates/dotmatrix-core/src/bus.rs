use crate::cartridge::Cartridge;
use crate::clock::{Clock, Subscriber};
use crate::error::CoreError;
use crate::joypad::Joypad;
use crate::memory::Memory;
use crate::ppu::Graphics;
use crate::timer::Timer;

/// Everything the CPU talks to: the address space and every peripheral
/// behind it.
///
/// The bus is the dispatch context for io hooks, so a hook can reach any
/// peer subsystem through plain field access, and it is the single
/// scheduling point: [`Bus::add_cycles`] forwards an instruction's cycle
/// count to each clock subscriber in registration order.
pub struct Bus {
    pub mem: Memory,
    pub clock: Clock,
    pub timer: Timer,
    pub gfx: Graphics,
    pub joypad: Joypad,
    pub cart: Cartridge,
}

impl Bus {
    pub fn new() -> Self {
        Self {
            mem: Memory::new(),
            clock: Clock::new(),
            timer: Timer::new(),
            gfx: Graphics::new(),
            joypad: Joypad::new(),
            cart: Cartridge::new(),
        }
    }

    /// Byte read with io hook dispatch.
    pub fn read_byte(&mut self, addr: u16) -> Result<u8, CoreError> {
        if let Some(hook) = self.mem.hook_at(addr) {
            return hook(self, addr, 0, false);
        }
        Ok(self.mem.read_byte(addr))
    }

    /// Byte write with io hook dispatch and bank-controller interception of
    /// rom writes.
    pub fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), CoreError> {
        if let Some(hook) = self.mem.hook_at(addr) {
            hook(self, addr, value, true)?;
            return Ok(());
        }
        if addr < 0x8000 && !Memory::is_io(addr) && !self.mem.debug_mode() {
            return match self.mem.bank_controller() {
                Some(hook) => {
                    // Return value is discarded on writes.
                    hook(self, addr, value, true)?;
                    Ok(())
                }
                None => Err(CoreError::IllegalRomWrite { addr, value }),
            };
        }
        self.mem.write_byte(addr, value)
    }

    pub fn read_word(&mut self, addr: u16) -> Result<u16, CoreError> {
        self.mem.read_word(addr)
    }

    pub fn write_word(&mut self, addr: u16, value: u16) -> Result<(), CoreError> {
        self.mem.write_word(addr, value)
    }

    /// Distribute a cycle increment to every subscriber in registration
    /// order. DMA copies, sprite scans and pixel emissions all happen
    /// inside this call before control returns to the CPU.
    pub fn add_cycles(&mut self, cycles: u8) -> Result<(), CoreError> {
        self.clock.add(cycles);
        for i in 0..self.clock.subscriber_count() {
            match self.clock.subscriber_at(i) {
                Subscriber::Timer => self.timer.tick(cycles, &mut self.mem),
                Subscriber::Graphics => self.gfx.step(cycles, &mut self.mem)?,
            }
        }
        Ok(())
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
