// Iterations burned per delay unit
const SPINS_PER_UNIT: u64 = 1_000_000;

// Burns CPU for `units` delay units. This is a deliberate busy wait: no hlt,
// no timer, nothing that could suspend the caller. How long a unit takes in
// wall-clock terms depends entirely on the clock speed of the machine
pub fn delay(units: u32) {
    for _ in 0..u64::from(units) * SPINS_PER_UNIT {
        core::hint::spin_loop();
    }
}

#[test_case]
fn delay_returns() {
    delay(0);
    delay(1);
}
