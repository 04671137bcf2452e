use x86_64::instructions::port::Port;

// Byte-wide port I/O. No console operation touches these; they are the hooks
// future device work (keyboard controller, PIT) plugs into

// Reads one byte from `port`
//
// Unsafe: a port read can have device side effects, the caller must know
// which port it is talking to
pub unsafe fn read_u8(port: u16) -> u8 {
    let mut port: Port<u8> = Port::new(port);
    port.read()
}

// Writes one byte to `port`
//
// Unsafe: same contract as `read_u8`
pub unsafe fn write_u8(port: u16, value: u8) {
    let mut port: Port<u8> = Port::new(port);
    port.write(value);
}
