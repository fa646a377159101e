//! Register access to the STMPE811

use crate::{Error, Result};

/// Default I2C device address for STMPE811 devices (ADDR0 low)
pub const DEFAULT_I2C_ADDR: u8 = 0x41;
/// Alternate I2C device address for STMPE811 devices (ADDR0 high)
pub const ALT_I2C_ADDR: u8 = 0x44;

/// Width of a register transfer
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Width {
    One,
    Two,
}

/// Raw register access to the touch controller
///
/// Implementations carry the bus transport. Faults are reported as
/// `Error::I2CError` and are not retried by the driver.
pub trait RegisterAccess {
    /// Read a 1 or 2 byte register
    fn read_register(&mut self, reg: u8, width: Width) -> Result<u16>;

    /// Write a 1 or 2 byte register
    fn write_register(&mut self, reg: u8, width: Width, value: u16) -> Result<()>;

    /// Read a `u8` register
    fn read_reg_u8(&mut self, reg: u8) -> Result<u8> {
        self.read_register(reg, Width::One).map(|v| v as u8)
    }

    /// Read a `u16` register
    fn read_reg_u16(&mut self, reg: u8) -> Result<u16> {
        self.read_register(reg, Width::Two)
    }

    /// Write a `u8` register
    fn write_reg_u8(&mut self, reg: u8, value: u8) -> Result<()> {
        self.write_register(reg, Width::One, value as u16)
    }

    /// Write a `u16` register
    fn write_reg_u16(&mut self, reg: u8, value: u16) -> Result<()> {
        self.write_register(reg, Width::Two, value)
    }
}

/// STMPE811 register access over I2C
///
/// Registers are addressed with a single byte; 16-bit registers are
/// transferred most significant byte first using address auto-increment.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Create a new I2C interface
    ///
    /// `addr` is normally `DEFAULT_I2C_ADDR` or `ALT_I2C_ADDR`
    pub fn new(i2c: I2C, addr: u8) -> Self {
        I2cInterface { i2c, addr }
    }

    /// Return the underlying I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> RegisterAccess for I2cInterface<I2C>
where
    I2C: embedded_hal::blocking::i2c::Write + embedded_hal::blocking::i2c::WriteRead,
{
    fn read_register(&mut self, reg: u8, width: Width) -> Result<u16> {
        let mut rd_buf = [0u8; 2];
        let rd = match width {
            Width::One => &mut rd_buf[..1],
            Width::Two => &mut rd_buf[..],
        };
        self.i2c
            .write_read(self.addr, &[reg], rd)
            .map_err(|_| Error::I2CError)?;
        let r = match width {
            Width::One => rd_buf[0] as u16,
            Width::Two => u16::from_be_bytes(rd_buf),
        };
        Ok(r)
    }

    fn write_register(&mut self, reg: u8, width: Width, value: u16) -> Result<()> {
        let mut msg = [0u8; 3];
        msg[0] = reg;
        let len = match width {
            Width::One => {
                msg[1] = value as u8;
                2
            }
            Width::Two => {
                msg[1..3].copy_from_slice(&value.to_be_bytes());
                3
            }
        };
        self.i2c
            .write(self.addr, &msg[..len])
            .map_err(|_| Error::I2CError)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;

    /// I2C bus recording transfers and answering reads from a fixed buffer
    struct Bus {
        addr: u8,
        written: Vec<Vec<u8>>,
        reply: [u8; 2],
        fail: bool,
    }

    impl Bus {
        fn new(addr: u8) -> Bus {
            Bus {
                addr,
                written: Vec::new(),
                reply: [0x0A, 0xBC],
                fail: false,
            }
        }
    }

    #[derive(Debug)]
    struct Nack;

    impl embedded_hal::blocking::i2c::Write for Bus {
        type Error = Nack;

        fn write(&mut self, address: u8, bytes: &[u8]) -> core::result::Result<(), Nack> {
            if self.fail || address != self.addr {
                return Err(Nack);
            }
            self.written.push(bytes.to_vec());
            Ok(())
        }
    }

    impl embedded_hal::blocking::i2c::WriteRead for Bus {
        type Error = Nack;

        fn write_read(
            &mut self,
            address: u8,
            bytes: &[u8],
            buffer: &mut [u8],
        ) -> core::result::Result<(), Nack> {
            if self.fail || address != self.addr {
                return Err(Nack);
            }
            self.written.push(bytes.to_vec());
            buffer.copy_from_slice(&self.reply[..buffer.len()]);
            Ok(())
        }
    }

    #[test]
    fn writes_are_big_endian() {
        let mut iface = I2cInterface::new(Bus::new(DEFAULT_I2C_ADDR), DEFAULT_I2C_ADDR);
        iface.write_reg_u8(0x40, 0x01).unwrap();
        iface.write_reg_u16(0x42, 0x0FA0).unwrap();

        let bus = iface.release();
        assert_eq!(bus.written, [vec_of(&[0x40, 0x01]), vec_of(&[0x42, 0x0F, 0xA0])]);
    }

    #[test]
    fn reads_are_big_endian() {
        let mut iface = I2cInterface::new(Bus::new(ALT_I2C_ADDR), ALT_I2C_ADDR);
        assert_eq!(iface.read_reg_u8(0x4B), Ok(0x0A));
        assert_eq!(iface.read_reg_u16(0x4D), Ok(0x0ABC));
        assert_eq!(iface.release().written, [vec_of(&[0x4B]), vec_of(&[0x4D])]);
    }

    #[test]
    fn bus_errors_map_to_i2c_error() {
        let mut bus = Bus::new(DEFAULT_I2C_ADDR);
        bus.fail = true;
        let mut iface = I2cInterface::new(bus, DEFAULT_I2C_ADDR);
        assert_eq!(iface.read_reg_u8(0x00), Err(Error::I2CError));
        assert_eq!(iface.write_reg_u16(0x42, 1), Err(Error::I2CError));

        // wrong address is NACKed
        let mut iface = I2cInterface::new(Bus::new(DEFAULT_I2C_ADDR), ALT_I2C_ADDR);
        assert_eq!(iface.read_reg_u16(0x00), Err(Error::I2CError));
    }

    fn vec_of(bytes: &[u8]) -> Vec<u8> {
        bytes.to_vec()
    }
}
