#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(ember_os::test_runner)]
#![reexport_test_harness_main = "test_main"]

use bootloader::{entry_point, BootInfo};
use core::panic::PanicInfo;
use ember_os::time;
use ember_os::vga::{Color, ColorCode, WRITER};

const STATUS: ColorCode = ColorCode::new(Color::White, Color::Black);
const BANNER: ColorCode = ColorCode::new(Color::Green, Color::Black);

// The heartbeat line is redrawn in place on this row, below the boot output
const HEARTBEAT_ROW: usize = 20;

entry_point!(kernel_main);

fn kernel_main(_boot_info: &'static BootInfo) -> ! {
    {
        let mut writer = WRITER.lock();
        writer.clear();

        writer.write_line("================================================", BANNER);
        writer.write_line("    Welcome to EmberOS v0.1", BANNER);
        writer.write_line("================================================", BANNER);
        writer.write_line("", STATUS);

        writer.write_line("Kernel loaded successfully!", STATUS);
        writer.write_line("Running in 64-bit long mode", STATUS);
        writer.write_line("", STATUS);

        writer.write_string("Video memory base: ", STATUS);
        writer.write_hex(0xB8000);
        writer.write_line("", STATUS);
        writer.write_line("", STATUS);

        writer.write_line("System information:", BANNER);
        writer.write_line("- CPU: x86_64", STATUS);
        writer.write_line("- Display: VGA text mode (80x25)", STATUS);
        writer.write_line("", STATUS);

        writer.write_line("Kernel is now running...", STATUS);
    }

    #[cfg(test)]
    test_main();

    heartbeat()
}

// Redraws the heartbeat line once. The trailing blanks wipe any stray glyphs
// left on the row
fn heartbeat_tick(counter: u32) {
    let mut writer = WRITER.lock();
    writer.set_position(0, HEARTBEAT_ROW);
    writer.write_string("Heartbeat counter: ", STATUS);
    writer.write_hex(counter);
    writer.write_string("  ", STATUS);
}

// Redraw, wait, repeat. Never returns and cannot be cancelled; the writer
// lock is released before each delay so the tick stays self-contained
fn heartbeat() -> ! {
    let mut counter: u32 = 0;
    loop {
        heartbeat_tick(counter);
        counter = counter.wrapping_add(1);
        time::delay(1);
    }
}

#[cfg(not(test))]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    use ember_os::println;

    println!("{}", info);
    ember_os::hlt_loop()
}

#[cfg(test)]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    ember_os::test_panic_handler(info)
}

#[test_case]
fn heartbeat_line_has_fixed_shape() {
    // A bounded number of ticks stands in for the endless production loop
    for counter in 0..3 {
        heartbeat_tick(counter);
    }
    // "Heartbeat counter: " is 19 glyphs, the hex value 10, the tail 2
    let writer = WRITER.lock();
    assert_eq!(writer.position(), (31, HEARTBEAT_ROW));
}
