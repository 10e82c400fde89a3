use dotmatrix_core::error::CoreError;
use dotmatrix_core::joypad::Key;
use dotmatrix_core::machine::Machine;

#[test]
fn uninitialized_io_reads_ff_through_the_bus() {
    let mut m = Machine::new().unwrap();
    // 0xFF03 has no owner on this machine.
    assert_eq!(m.bus.read_byte(0xFF03).unwrap(), 0xFF);
    m.bus.write_byte(0xFF03, 0x55).unwrap();
    assert_eq!(m.bus.read_byte(0xFF03).unwrap(), 0xFF);
}

#[test]
fn rom_write_fails_without_a_cartridge() {
    let mut m = Machine::new().unwrap();
    match m.bus.write_byte(0x1000, 0x01) {
        Err(CoreError::IllegalRomWrite { addr, value }) => {
            assert_eq!(addr, 0x1000);
            assert_eq!(value, 0x01);
        }
        other => panic!("expected IllegalRomWrite, got {other:?}"),
    }
}

#[test]
fn rom_write_is_ignored_once_a_cartridge_is_attached() {
    let mut m = Machine::new().unwrap();
    m.load_cartridge_bytes(vec![0xBB; 0x4000]).unwrap();
    m.bus.write_byte(0x2000, 0x01).unwrap();
    assert_eq!(m.bus.read_byte(0x2000).unwrap(), 0xBB);
}

#[test]
fn debug_mode_permits_rom_pokes() {
    let mut m = Machine::new().unwrap();
    m.bus.mem.set_debug_mode(true);
    m.bus.write_byte(0x2000, 0x42).unwrap();
    assert_eq!(m.bus.read_byte(0x2000).unwrap(), 0x42);
}

#[test]
fn boot_rom_unmaps_on_ff50_write() {
    let mut m = Machine::new().unwrap();
    m.load_cartridge_bytes(vec![0xBB; 0x200]).unwrap();
    m.load_boot_bytes(vec![0xAA; 0x100]).unwrap();

    assert_eq!(m.bus.read_byte(0x0000).unwrap(), 0xAA);
    m.bus.write_byte(0xFF50, 0x01).unwrap();
    assert_eq!(m.bus.read_byte(0x0000).unwrap(), 0xBB);
    assert_eq!(m.bus.read_byte(0x00FF).unwrap(), 0xBB);

    // Writing zero afterwards changes nothing.
    m.bus.write_byte(0xFF50, 0x00).unwrap();
    assert_eq!(m.bus.read_byte(0x0000).unwrap(), 0xBB);
}

#[test]
fn work_ram_round_trips_words_little_endian() {
    let mut m = Machine::new().unwrap();
    m.bus.write_word(0xC800, 0x1234).unwrap();
    assert_eq!(m.bus.read_byte(0xC800).unwrap(), 0x34);
    assert_eq!(m.bus.read_byte(0xC801).unwrap(), 0x12);
    assert_eq!(m.bus.read_word(0xC800).unwrap(), 0x1234);
}

#[test]
fn word_access_on_the_io_bank_fails() {
    let mut m = Machine::new().unwrap();
    assert!(matches!(
        m.bus.read_word(0xFF40),
        Err(CoreError::WordOnIoRegister { addr: 0xFF40 })
    ));
    assert!(matches!(
        m.bus.write_word(0xFFFF, 0x0101),
        Err(CoreError::WordOnIoRegister { .. })
    ));
}

#[test]
fn div_reads_the_counter_and_resets_on_write() {
    let mut m = Machine::new().unwrap();
    for _ in 0..0x80 {
        m.bus.add_cycles(4).unwrap();
    }
    assert_eq!(m.bus.read_byte(0xFF04).unwrap(), 0x02);

    m.bus.write_byte(0xFF04, 0x77).unwrap();
    assert_eq!(m.bus.read_byte(0xFF04).unwrap(), 0x00);
    assert_eq!(m.bus.timer.counter(), 0);
}

#[test]
fn joypad_matrix_reads_selected_rows_active_low() {
    let mut m = Machine::new().unwrap();
    m.queue_key(Key::A, true);
    m.queue_key(Key::Down, true);

    // Select the button row (bit 5 low).
    m.bus.write_byte(0xFF00, 0x10).unwrap();
    assert_eq!(m.bus.read_byte(0xFF00).unwrap(), 0x1E);

    // Select the direction row (bit 4 low).
    m.bus.write_byte(0xFF00, 0x20).unwrap();
    assert_eq!(m.bus.read_byte(0xFF00).unwrap(), 0x27);

    // Nothing selected: idle nibble.
    m.bus.write_byte(0xFF00, 0x30).unwrap();
    assert_eq!(m.bus.read_byte(0xFF00).unwrap(), 0x3F);

    // Releasing the keys restores the idle rows.
    m.queue_key(Key::A, false);
    m.queue_key(Key::Down, false);
    m.bus.write_byte(0xFF00, 0x10).unwrap();
    assert_eq!(m.bus.read_byte(0xFF00).unwrap(), 0x1F);
}

#[test]
fn joypad_press_raises_the_interrupt_on_read() {
    let mut m = Machine::new().unwrap();
    m.queue_key(Key::Start, true);
    assert_eq!(m.bus.mem.io(0x0F) & 0x10, 0);
    m.bus.read_byte(0xFF00).unwrap();
    assert_ne!(m.bus.mem.io(0x0F) & 0x10, 0);
}

#[test]
fn logo_copy_lands_in_the_header_mirror() {
    let mut m = Machine::new().unwrap();
    let mut boot = vec![0u8; 0x100];
    for (i, byte) in boot.iter_mut().enumerate().skip(0xA8).take(0x31) {
        *byte = (i - 0xA8) as u8;
    }
    m.load_boot_bytes(boot).unwrap();
    m.copy_logo().unwrap();
    assert_eq!(m.bus.read_byte(0x0104).unwrap(), 0x00);
    assert_eq!(m.bus.read_byte(0x0134).unwrap(), 0x30);
}
