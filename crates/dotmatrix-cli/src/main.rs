use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use dotmatrix_core::error::CoreError;
use dotmatrix_core::machine::Machine;

/// DMG-style handheld console emulator.
#[derive(Parser)]
#[command(name = "dotmatrix", version)]
struct Args {
    /// Boot rom image
    #[arg(short = 'b', value_name = "PATH", default_value = "boot.gb")]
    boot: PathBuf,

    /// Cartridge image
    #[arg(short = 'c', value_name = "PATH", default_value = "cart.gb")]
    cart: PathBuf,

    /// Copy the boot rom logo into the cartridge header mirror (testing aid)
    #[arg(short = 'l')]
    logo: bool,

    /// Stop after this many presented frames
    #[arg(long, value_name = "N")]
    frames: Option<u64>,

    /// Stop after this many clock cycles
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,
}

fn run(args: &Args) -> Result<(), CoreError> {
    let mut machine = Machine::new()?;
    // Capped runs go as fast as the host allows.
    let capped = args.frames.is_some() || args.cycles.is_some();
    machine.bus.clock.set_limiter(!capped);

    machine.load_boot_image(&args.boot)?;
    machine.load_cartridge_image(&args.cart)?;
    if args.logo {
        machine.copy_logo()?;
    }
    info!(
        "boot: {} cart: {}",
        args.boot.display(),
        args.cart.display()
    );

    if capped {
        while machine.cpu.on
            && args.frames.map_or(true, |n| machine.frames_presented() < n)
            && args.cycles.map_or(true, |n| machine.bus.clock.total_cycles() < n)
        {
            machine.step()?;
        }
    } else {
        machine.run()?;
    }
    info!("clean stop after {} frames", machine.frames_presented());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
