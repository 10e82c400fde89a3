use std::fs;
use std::path::Path;

use log::{info, trace};

use crate::bus::Bus;
use crate::error::CoreError;
use crate::memory::Memory;

/// Io slot of the boot-rom unmap trigger (0xFF50).
pub const BOOT_SLOT: u8 = 0x50;

const BOOT_LEN: usize = 0x100;
const ROM_END: usize = 0x8000;

// Logo bitmap inside the boot image and its header mirror address.
const LOGO_SRC: usize = 0xA8;
const LOGO_DST: u16 = 0x0104;
const LOGO_LEN: usize = 0x31;

/// Boot and cartridge image blobs plus their mapping into the address
/// space.
///
/// Only plain rom mapping lives here; bank switching belongs to the bank
/// controller hook this module installs.
#[derive(Default)]
pub struct Cartridge {
    boot: Vec<u8>,
    rom: Vec<u8>,
}

impl Cartridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a raw image file.
    pub fn read_image(path: &Path) -> Result<Vec<u8>, CoreError> {
        fs::read(path).map_err(|source| CoreError::RomRead {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn set_boot(&mut self, data: Vec<u8>) {
        self.boot = data;
    }

    pub fn set_rom(&mut self, data: Vec<u8>) {
        self.rom = data;
    }

    pub fn boot(&self) -> &[u8] {
        &self.boot
    }

    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    /// First page of the cartridge image; written back over the boot region
    /// by the 0xFF50 hook.
    pub(crate) fn first_page(&self) -> &[u8] {
        &self.rom[..self.rom.len().min(BOOT_LEN)]
    }

    /// Map the boot image over 0x0000..0x00FF.
    pub(crate) fn map_boot(&self, mem: &mut Memory) -> Result<(), CoreError> {
        let n = self.boot.len().min(BOOT_LEN);
        mem.copy(0x0000, &self.boot[..n])
    }

    /// Map the cartridge image into 0x0000..0x7FFF, leaving the boot region
    /// alone. Images shorter than one page map whole at zero.
    pub(crate) fn map_rom(&self, mem: &mut Memory) -> Result<(), CoreError> {
        if self.rom.len() <= BOOT_LEN {
            return mem.copy(0x0000, &self.rom);
        }
        let n = self.rom.len().min(ROM_END);
        mem.copy(BOOT_LEN as u16, &self.rom[BOOT_LEN..n])
    }

    /// Copy the logo bitmap from the boot image into the cartridge header
    /// mirror. Testing aid behind the CLI's `-l` flag.
    pub(crate) fn copy_logo(&self, mem: &mut Memory) -> Result<(), CoreError> {
        let end = LOGO_SRC + LOGO_LEN;
        if self.boot.len() < end {
            return Ok(());
        }
        mem.copy(LOGO_DST, &self.boot[LOGO_SRC..end])
    }
}

/// 0xFF50 hook: a non-zero write permanently unmaps the boot rom by
/// restoring the cartridge's first page.
pub(crate) fn boot_unmap(
    bus: &mut Bus,
    _addr: u16,
    value: u8,
    is_write: bool,
) -> Result<u8, CoreError> {
    if is_write && value != 0 {
        info!("boot rom unmapped");
        let Bus { mem, cart, .. } = bus;
        mem.copy(0x0000, cart.first_page())?;
    }
    Ok(value)
}

/// Default bank controller for plain cartridges: rom writes are bank-select
/// traffic with nothing to select, so they are ignored.
pub(crate) fn rom_write(
    _bus: &mut Bus,
    addr: u16,
    value: u8,
    is_write: bool,
) -> Result<u8, CoreError> {
    if is_write {
        trace!("rom write ignored: {value:#04x} -> {addr:#06x}");
    }
    Ok(0xFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_maps_over_the_first_page() {
        let mut mem = Memory::new();
        let mut cart = Cartridge::new();
        cart.set_boot(vec![0xAA; 0x100]);
        cart.set_rom(vec![0xBB; 0x200]);
        cart.map_rom(&mut mem).unwrap();
        cart.map_boot(&mut mem).unwrap();
        assert_eq!(mem.read_byte(0x0000), 0xAA);
        assert_eq!(mem.read_byte(0x00FF), 0xAA);
        assert_eq!(mem.read_byte(0x0100), 0xBB);
    }

    #[test]
    fn short_images_map_at_zero() {
        let mut mem = Memory::new();
        let mut cart = Cartridge::new();
        cart.set_rom(vec![0xCC; 0x40]);
        cart.map_rom(&mut mem).unwrap();
        assert_eq!(mem.read_byte(0x0000), 0xCC);
        assert_eq!(mem.read_byte(0x003F), 0xCC);
        assert_eq!(mem.read_byte(0x0040), 0x00);
    }

    #[test]
    fn oversized_images_clamp_to_the_rom_region() {
        let mut mem = Memory::new();
        let mut cart = Cartridge::new();
        cart.set_rom(vec![0xDD; 0x9000]);
        cart.map_rom(&mut mem).unwrap();
        assert_eq!(mem.read_byte(0x7FFF), 0xDD);
        assert_eq!(mem.read_byte(0x8000), 0x00);
    }

    #[test]
    fn logo_copies_into_the_header_mirror() {
        let mut mem = Memory::new();
        let mut cart = Cartridge::new();
        let mut boot = vec![0u8; 0x100];
        for (i, b) in boot[LOGO_SRC..LOGO_SRC + LOGO_LEN].iter_mut().enumerate() {
            *b = i as u8;
        }
        cart.set_boot(boot);
        cart.copy_logo(&mut mem).unwrap();
        assert_eq!(mem.read_byte(LOGO_DST), 0x00);
        assert_eq!(mem.read_byte(LOGO_DST + 0x30), 0x30);
    }

    #[test]
    fn missing_image_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent.gb");
        match Cartridge::read_image(&path) {
            Err(CoreError::RomRead { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected RomRead, got {other:?}"),
        }
    }
}
