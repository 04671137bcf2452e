#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(ember_os::test_runner)]
#![reexport_test_harness_main = "test_main"]

use bootloader::{entry_point, BootInfo};
use core::panic::PanicInfo;
use ember_os::println;
use ember_os::vga::{Color, ColorCode, WRITER};

entry_point!(main);

fn main(_boot_info: &'static BootInfo) -> ! {
    test_main();
    ember_os::hlt_loop()
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    ember_os::test_panic_handler(info)
}

#[test_case]
fn println_works_after_boot() {
    println!("println output right after boot");
}

#[test_case]
fn writer_operations_compose() {
    let mut writer = WRITER.lock();
    writer.clear();
    writer.write_line("boot check", ColorCode::new(Color::Green, Color::Black));
    writer.write_hex(0xB8000);
    // "boot check" plus newline lands on row 1, the hex output is 10 glyphs
    assert_eq!(writer.position(), (10, 1));
}
