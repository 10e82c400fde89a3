use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, trace};

use crate::bus::Bus;
use crate::cartridge::{self, BOOT_SLOT};
use crate::clock::Subscriber;
use crate::cpu::Cpu;
use crate::error::CoreError;
use crate::interrupts::{IE_SLOT, IF_SLOT};
use crate::joypad::{self, Key, JOYP_SLOT};
use crate::opcodes;
use crate::ppu::{self, Graphics};
use crate::timer::Timer;

/// The whole machine: CPU plus the bus that owns every peripheral.
///
/// Construction wires all io register slots and subscribes the timer and
/// the display controller to the clock, in that order. `run` drives the
/// fetch-decode-execute loop until STOP, a fatal error, or the stop flag.
pub struct Machine {
    pub cpu: Cpu,
    pub bus: Bus,
    stop: Arc<AtomicBool>,
}

impl Machine {
    pub fn new() -> Result<Self, CoreError> {
        let mut bus = Bus::new();

        bus.mem.register_direct(IF_SLOT)?;
        bus.mem.register_direct(IE_SLOT)?;
        Timer::register(&mut bus.mem)?;
        Graphics::register(&mut bus.mem)?;
        bus.mem.register_hook(JOYP_SLOT, joypad::joyp_access)?;
        bus.mem.register_hook(BOOT_SLOT, cartridge::boot_unmap)?;

        bus.clock.subscribe(Subscriber::Timer);
        bus.clock.subscribe(Subscriber::Graphics);

        let mut machine = Machine {
            cpu: Cpu::new(),
            bus,
            stop: Arc::new(AtomicBool::new(false)),
        };
        machine.apply_power_on_state();
        Ok(machine)
    }

    /// A machine positioned at the first cartridge instruction, as if the
    /// boot rom had already run.
    pub fn new_post_boot() -> Result<Self, CoreError> {
        let mut machine = Self::new()?;
        machine.cpu.regs.pc = 0x0100;
        Ok(machine)
    }

    /// Register and io defaults; the register values match the state a
    /// completed boot rom leaves behind.
    fn apply_power_on_state(&mut self) {
        let regs = &mut self.cpu.regs;
        regs.set_af(0x01B0);
        regs.set_bc(0x0013);
        regs.set_de(0x00D8);
        regs.set_hl(0x014D);
        regs.pc = 0x0000;
        regs.sp = 0xFFFE;

        let mem = &mut self.bus.mem;
        mem.set_io(ppu::LCDC_SLOT, 0x91);
        mem.set_io(ppu::STAT_SLOT, 0x02); // OAM mode
        mem.set_io(ppu::BGP_SLOT, 0xFC);
        mem.set_io(ppu::OBP0_SLOT, 0xFF);
        mem.set_io(ppu::OBP1_SLOT, 0xFF);
        self.bus.gfx.reset_palettes(&self.bus.mem);
    }

    /// Load and map a boot rom image file.
    pub fn load_boot_image(&mut self, path: &Path) -> Result<(), CoreError> {
        let data = crate::cartridge::Cartridge::read_image(path)?;
        self.load_boot_bytes(data)
    }

    pub fn load_boot_bytes(&mut self, data: Vec<u8>) -> Result<(), CoreError> {
        let Bus { cart, mem, .. } = &mut self.bus;
        cart.set_boot(data);
        cart.map_boot(mem)
    }

    /// Load and map a cartridge image file; installs the plain-rom bank
    /// controller.
    pub fn load_cartridge_image(&mut self, path: &Path) -> Result<(), CoreError> {
        let data = crate::cartridge::Cartridge::read_image(path)?;
        self.load_cartridge_bytes(data)
    }

    pub fn load_cartridge_bytes(&mut self, data: Vec<u8>) -> Result<(), CoreError> {
        let Bus { cart, mem, .. } = &mut self.bus;
        cart.set_rom(data);
        cart.map_rom(mem)?;
        mem.install_bank_controller(cartridge::rom_write);
        Ok(())
    }

    /// Copy the boot rom logo into the cartridge header mirror.
    pub fn copy_logo(&mut self) -> Result<(), CoreError> {
        let Bus { cart, mem, .. } = &mut self.bus;
        cart.copy_logo(mem)
    }

    /// Reset to the power-on state while preserving the loaded boot and
    /// cartridge images and any handed-out stop handle.
    pub fn reset(&mut self) -> Result<(), CoreError> {
        let stop = Arc::clone(&self.stop);
        let cart = std::mem::take(&mut self.bus.cart);
        *self = Machine::new()?;
        self.stop = stop;
        if !cart.rom().is_empty() {
            self.load_cartridge_bytes(cart.rom().to_vec())?;
        }
        if !cart.boot().is_empty() {
            self.load_boot_bytes(cart.boot().to_vec())?;
        }
        Ok(())
    }

    /// Shared flag a host signal handler can set to end `run` cleanly.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Queue a host key transition for the next joypad read.
    pub fn queue_key(&mut self, key: Key, pressed: bool) {
        self.bus.joypad.queue_key(key, pressed);
    }

    /// Rendered 160x144 frame, BGR555.
    pub fn frame(&self) -> &[u16] {
        self.bus.gfx.frame()
    }

    pub fn frames_presented(&self) -> u64 {
        self.bus.gfx.frames()
    }

    /// Execute until a STOP instruction or the stop flag. Fatal errors
    /// propagate to the caller.
    pub fn run(&mut self) -> Result<(), CoreError> {
        info!("starting execution at {:#06x}", self.cpu.regs.pc);
        while self.cpu.on && !self.stop.load(Ordering::Relaxed) {
            self.step()?;
        }
        info!("execution stopped at {:#06x}", self.cpu.regs.pc);
        Ok(())
    }

    /// One iteration of the CPU loop: service interrupts, fetch, decode
    /// through the active table, execute, distribute the cycles. Returns
    /// the cycle count consumed.
    pub fn step(&mut self) -> Result<u8, CoreError> {
        self.bus.clock.cycle_start();
        self.cpu.service_interrupts(&mut self.bus)?;

        if self.cpu.halted {
            self.bus.add_cycles(4)?;
            return Ok(4);
        }

        let pc = self.cpu.regs.pc;
        let opcode = self.bus.read_byte(pc)?;
        self.cpu.regs.pc = pc.wrapping_add(1);

        // The CB prefix only arms the secondary table for a single fetch.
        let set = self.cpu.table;
        self.cpu.table = 0;

        trace!("{pc:04X} {opcode:02X} {}", opcodes::mnemonic(set, opcode));

        let entry = opcodes::table(set)[opcode as usize];
        let cycles = (entry.handler)(&mut self.cpu, &mut self.bus, entry.operand)?;

        self.bus.add_cycles(cycles)?;
        self.bus.clock.cycle_end();

        debug_assert!(
            self.cpu.regs.guard_intact(),
            "guard register clobbered by opcode {opcode:#04x}"
        );
        Ok(cycles)
    }
}
