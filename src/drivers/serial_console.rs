use core::convert::Infallible;

use ufmt::uWrite;

use crate::hal::Uart;

/// Line-oriented console on USART0. `\n` goes out as `\r\n`.
pub struct SerialConsole {
    uart: Uart,
}

impl SerialConsole {
    pub fn new() -> Self {
        Self { uart: Uart::new() }
    }

    pub fn write_line(&mut self, s: &str) {
        self.uart.write_str(s);
        self.uart.write_str("\r\n");
    }
}

impl Default for SerialConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl uWrite for SerialConsole {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.uart.write_byte(b'\r');
            }
            self.uart.write_byte(byte);
        }
        Ok(())
    }
}
