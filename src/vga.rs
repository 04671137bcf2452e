// VGA Text Mode:
//
// In text mode the display adapter renders an 80x25 grid of character cells
// straight out of a buffer the hardware maps at physical address 0xB8000
// Each cell occupies 16 bits: the low byte holds the character code and the
// high byte holds the attribute that selects its colors
// The attribute byte packs the background color into its upper 4 bits and the
// foreground color into its lower 4 bits, so white-on-black is 0x0F,
// green-on-black is 0x02 and red-on-black is 0x04
// The adapter only ever reads this memory, which means a cell shows up on
// screen the moment it is written, with no further signalling required
//
// The cursor model here wraps in both directions: a line that runs past the
// last column continues on the next row, and a row that runs past the bottom
// of the grid continues at the top again, overwriting whatever was there
// The grid itself never moves

use core::fmt;
use lazy_static::lazy_static;
use spin::Mutex;
use volatile::Volatile;

const BUFFER_HEIGHT: usize = 25;
const BUFFER_WIDTH: usize = 80;

// Tab stops sit every 4 columns, not the usual 8
const TAB_WIDTH: usize = 4;

lazy_static! {
    // The one writer for the whole kernel. Everything that reaches the screen
    // goes through this instance; the raw buffer is never handed out
    pub static ref WRITER: Mutex<Writer> = Mutex::new(Writer {
        column_position: 0,
        row_position: 0,
        color_code: ColorCode::new(Color::White, Color::Black),
        buffer: unsafe { &mut *(0xb8000 as *mut Buffer) },
    });
}

// The standard 16-color VGA palette
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

// The packed attribute byte: background in the upper 4 bits, foreground in the
// lower 4. The bits are carried as-is; the hardware interprets them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    pub const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }
}

// One cell of the buffer, laid out exactly as the hardware reads it:
// character in the low byte, attribute in the high byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
struct ScreenChar {
    ascii_character: u8,
    color_code: ColorCode,
}

#[repr(transparent)]
struct Buffer {
    chars: [[Volatile<ScreenChar>; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

// Owns the cursor and mediates every write into the buffer
//
// Invariant: between calls the cursor always satisfies
// column_position < BUFFER_WIDTH and row_position < BUFFER_HEIGHT,
// so cell writes can index the grid without further checks
pub struct Writer {
    column_position: usize,
    row_position: usize,
    color_code: ColorCode, // default attribute, used by the macros and write_hex
    buffer: &'static mut Buffer,
}

impl Writer {
    // Blanks the whole grid and puts the cursor back in the top left corner
    pub fn clear(&mut self) {
        let blank = ScreenChar {
            ascii_character: b' ',
            color_code: self.color_code,
        };
        for row in 0..BUFFER_HEIGHT {
            for col in 0..BUFFER_WIDTH {
                self.buffer.chars[row][col].write(blank);
            }
        }
        self.column_position = 0;
        self.row_position = 0;
    }

    // Writes one byte at the cursor and advances it
    //
    // Control bytes move the cursor without storing a cell: newline starts the
    // next row, carriage return restarts the current one and tab advances to
    // the next tab stop. Every other byte is stored verbatim with the given
    // attribute, whatever its value
    pub fn write_byte(&mut self, byte: u8, color: ColorCode) {
        match byte {
            b'\n' => {
                self.column_position = 0;
                self.row_position += 1;
            }
            b'\r' => self.column_position = 0,
            b'\t' => {
                self.column_position =
                    (self.column_position + TAB_WIDTH) & !(TAB_WIDTH - 1);
            }
            byte => {
                self.buffer.chars[self.row_position][self.column_position].write(ScreenChar {
                    ascii_character: byte,
                    color_code: color,
                });
                self.column_position += 1;
            }
        }

        // Past the last column the cursor continues on the next row
        if self.column_position >= BUFFER_WIDTH {
            self.column_position = 0;
            self.row_position += 1;
        }

        // Past the last row it continues at the top, reusing rows in place
        // rather than scrolling the grid
        if self.row_position >= BUFFER_HEIGHT {
            self.row_position = 0;
        }
    }

    pub fn write_string(&mut self, s: &str, color: ColorCode) {
        for byte in s.bytes() {
            self.write_byte(byte, color);
        }
    }

    pub fn write_line(&mut self, s: &str, color: ColorCode) {
        self.write_string(s, color);
        self.write_byte(b'\n', color);
    }

    // Prints `value` as "0x" followed by exactly eight uppercase hex digits,
    // most significant nibble first, zero-padded
    pub fn write_hex(&mut self, value: u32) {
        const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";
        let color = self.color_code;
        self.write_string("0x", color);
        for shift in (0..=28).rev().step_by(4) {
            let nibble = ((value >> shift) & 0xF) as usize;
            self.write_byte(HEX_DIGITS[nibble], color);
        }
    }

    // Moves the cursor. Both coordinates wrap at the grid edge, keeping the
    // cursor inside it
    pub fn set_position(&mut self, column: usize, row: usize) {
        self.column_position = column % BUFFER_WIDTH;
        self.row_position = row % BUFFER_HEIGHT;
    }

    pub fn position(&self) -> (usize, usize) {
        (self.column_position, self.row_position)
    }
}

// Hooks the writer into Rust's formatting machinery, so format_args! output
// (and with it the print! macros) lands on screen in the default color
impl fmt::Write for Writer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let color = self.color_code;
        self.write_string(s, color);
        Ok(())
    }
}

// Like the `print!` macro in the standard library, but prints to the VGA text buffer
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::vga::_print(format_args!($($arg)*)));
}

// Like the `println!` macro in the standard library, but prints to the VGA text buffer
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}

// Prints the given formatted string through the global `WRITER` instance
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;
    use x86_64::instructions::interrupts;

    interrupts::without_interrupts(|| {
        WRITER.lock().write_fmt(args).unwrap();
    });
}

#[test_case]
fn clear_blanks_every_cell() {
    let mut writer = WRITER.lock();
    writer.write_string("residue", ColorCode::new(Color::Green, Color::Black));
    writer.clear();

    assert_eq!(writer.position(), (0, 0));
    let blank = ScreenChar {
        ascii_character: b' ',
        color_code: ColorCode::new(Color::White, Color::Black),
    };
    for row in 0..BUFFER_HEIGHT {
        for col in 0..BUFFER_WIDTH {
            assert_eq!(writer.buffer.chars[row][col].read(), blank);
        }
    }
}

#[test_case]
fn glyphs_advance_the_cursor() {
    let mut writer = WRITER.lock();
    writer.clear();
    writer.write_string("abcde", ColorCode::new(Color::White, Color::Black));

    assert_eq!(writer.position(), (5, 0));
    assert_eq!(writer.buffer.chars[0][0].read().ascii_character, b'a');
    assert_eq!(writer.buffer.chars[0][4].read().ascii_character, b'e');
}

#[test_case]
fn long_output_wraps_columns_into_rows() {
    let mut writer = WRITER.lock();
    writer.clear();

    // 200 glyphs from the origin: 200 = 2 * 80 + 40
    let color = ColorCode::new(Color::White, Color::Black);
    for _ in 0..200 {
        writer.write_byte(b'x', color);
    }
    assert_eq!(writer.position(), (40, 2));
}

#[test_case]
fn newline_and_carriage_return_restart_the_column() {
    let mut writer = WRITER.lock();
    writer.clear();
    let color = ColorCode::new(Color::White, Color::Black);

    writer.set_position(12, 3);
    writer.write_byte(b'\n', color);
    assert_eq!(writer.position(), (0, 4));

    writer.write_string("ab", color);
    writer.write_byte(b'\r', color);
    assert_eq!(writer.position(), (0, 4));
    assert_eq!(writer.buffer.chars[4][0].read().ascii_character, b'a');
}

#[test_case]
fn tab_stops_every_four_columns() {
    let mut writer = WRITER.lock();
    writer.clear();
    let color = ColorCode::new(Color::White, Color::Black);

    writer.write_byte(b'\t', color);
    assert_eq!(writer.position(), (4, 0));
    writer.write_byte(b'\t', color);
    assert_eq!(writer.position(), (8, 0));

    writer.set_position(5, 0);
    writer.write_byte(b'\t', color);
    assert_eq!(writer.position(), (8, 0));
}

#[test_case]
fn last_column_wraps_to_the_next_row() {
    let mut writer = WRITER.lock();
    writer.clear();
    let color = ColorCode::new(Color::White, Color::Black);

    writer.set_position(BUFFER_WIDTH - 1, 3);
    writer.write_byte(b'x', color);
    assert_eq!(writer.position(), (0, 4));
    assert_eq!(writer.buffer.chars[3][BUFFER_WIDTH - 1].read().ascii_character, b'x');
}

#[test_case]
fn last_row_wraps_back_to_the_top() {
    let mut writer = WRITER.lock();
    writer.clear();
    let color = ColorCode::new(Color::White, Color::Black);

    writer.set_position(BUFFER_WIDTH - 1, BUFFER_HEIGHT - 1);
    writer.write_byte(b'x', color);
    assert_eq!(writer.position(), (0, 0));

    // A newline on the last row lands at the top as well, and the top row is
    // then overwritten in place
    writer.set_position(7, BUFFER_HEIGHT - 1);
    writer.write_byte(b'\n', color);
    assert_eq!(writer.position(), (0, 0));
    writer.write_byte(b'y', color);
    assert_eq!(writer.buffer.chars[0][0].read().ascii_character, b'y');
}

#[test_case]
fn hex_output_is_always_ten_glyphs() {
    let mut writer = WRITER.lock();
    let cases: [(u32, &[u8; 10]); 3] = [
        (0x00000000, b"0x00000000"),
        (0xFFFFFFFF, b"0xFFFFFFFF"),
        (0x0000002A, b"0x0000002A"),
    ];
    for (value, expected) in cases {
        writer.clear();
        writer.write_hex(value);
        assert_eq!(writer.position(), (10, 0));
        for (col, &byte) in expected.iter().enumerate() {
            assert_eq!(writer.buffer.chars[0][col].read().ascii_character, byte);
        }
    }
}

#[test_case]
fn empty_line_is_a_single_newline() {
    let mut writer = WRITER.lock();
    writer.clear();

    writer.set_position(7, 2);
    writer.write_line("", ColorCode::new(Color::White, Color::Black));
    assert_eq!(writer.position(), (0, 3));
    // No glyph was stored on the way
    assert_eq!(writer.buffer.chars[2][7].read().ascii_character, b' ');
}

#[test_case]
fn attribute_bits_are_stored_verbatim() {
    let mut writer = WRITER.lock();
    writer.clear();

    // Pink background sets the top bit, which real hardware treats as blink;
    // the writer stores it untouched either way
    let loud = ColorCode::new(Color::White, Color::Pink);
    writer.write_byte(b'!', loud);
    assert_eq!(writer.buffer.chars[0][0].read().color_code, loud);
}
