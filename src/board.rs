//! Board level collaborators: IRQ line, settle delays, display geometry and
//! the resample hook

use core::convert::Infallible;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::InputPin;

use crate::{Error, Result};

/// Board services used by the driver
pub trait Board {
    /// Test if the controller's INT line is asserted
    ///
    /// Only called when the driver is configured with `irq_pin`
    fn irq_asserted(&mut self) -> Result<bool>;

    /// Display width in pixels
    fn display_width(&self) -> u16;

    /// Display height in pixels
    fn display_height(&self) -> u16;

    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// Notification that buffered samples are waiting in the FIFO
///
/// The input task should call `get_reading()` again soon. Implementations
/// must not call back into the driver.
pub trait Resample {
    fn request_resample(&mut self);
}

impl<F: FnMut()> Resample for F {
    fn request_resample(&mut self) {
        self()
    }
}

/// Resample hook that ignores requests, for callers that poll at a fixed rate
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResample;

impl Resample for NoResample {
    fn request_resample(&mut self) {}
}

/// `Board` built from an embedded-hal INT pin, a delay provider and a fixed
/// display size
///
/// The STMPE811 drives INT low while an interrupt is pending.
pub struct PinBoard<IRQ, D> {
    irq_pin: IRQ,
    delay: D,
    width: u16,
    height: u16,
}

impl<IRQ, D> PinBoard<IRQ, D> {
    /// Create a new board adapter
    ///
    /// `irq_pin` is a floating or pulled-up input connected to INT; use
    /// `NoIrqPin` if INT is not wired
    pub fn new(irq_pin: IRQ, delay: D, width: u16, height: u16) -> Self {
        PinBoard {
            irq_pin,
            delay,
            width,
            height,
        }
    }

    /// Access the INT pin, e.g. to clear an MCU pin interrupt
    pub fn irq_pin(&mut self) -> &mut IRQ {
        &mut self.irq_pin
    }

    /// Change the display size, e.g. after rotating the screen
    pub fn set_display_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Return the pin and delay provider
    pub fn release(self) -> (IRQ, D) {
        (self.irq_pin, self.delay)
    }
}

impl<IRQ, D> Board for PinBoard<IRQ, D>
where
    IRQ: InputPin,
    D: DelayMs<u32>,
{
    fn irq_asserted(&mut self) -> Result<bool> {
        self.irq_pin.is_low().map_err(|_| Error::GPIOError)
    }

    fn display_width(&self) -> u16 {
        self.width
    }

    fn display_height(&self) -> u16 {
        self.height
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

/// Placeholder for boards without the INT line connected
///
/// Reads as permanently deasserted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIrqPin;

impl InputPin for NoIrqPin {
    type Error = Infallible;

    fn is_high(&self) -> core::result::Result<bool, Self::Error> {
        Ok(true)
    }

    fn is_low(&self) -> core::result::Result<bool, Self::Error> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    struct Pin {
        level_high: bool,
        broken: bool,
    }

    impl InputPin for Pin {
        type Error = ();

        fn is_high(&self) -> core::result::Result<bool, ()> {
            if self.broken {
                return Err(());
            }
            Ok(self.level_high)
        }

        fn is_low(&self) -> core::result::Result<bool, ()> {
            self.is_high().map(|h| !h)
        }
    }

    #[derive(Default)]
    struct Delay {
        total_ms: u32,
    }

    impl DelayMs<u32> for Delay {
        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += ms;
        }
    }

    #[test]
    fn irq_is_active_low() {
        let pin = Pin {
            level_high: true,
            broken: false,
        };
        let mut board = PinBoard::new(pin, Delay::default(), 320, 240);
        assert_eq!(board.irq_asserted(), Ok(false));

        board.irq_pin().level_high = false;
        assert_eq!(board.irq_asserted(), Ok(true));

        board.irq_pin().broken = true;
        assert_eq!(board.irq_asserted(), Err(Error::GPIOError));
    }

    #[test]
    fn geometry_and_delay() {
        let mut board = PinBoard::new(NoIrqPin, Delay::default(), 320, 240);
        assert_eq!((board.display_width(), board.display_height()), (320, 240));
        assert_eq!(board.irq_asserted(), Ok(false));

        board.set_display_size(240, 320);
        assert_eq!((board.display_width(), board.display_height()), (240, 320));

        board.delay_ms(10);
        board.delay_ms(2);
        let (_, delay) = board.release();
        assert_eq!(delay.total_ms, 12);
    }

    #[test]
    fn closures_receive_resample_requests() {
        let count = Cell::new(0);
        let mut hook = || count.set(count.get() + 1);
        hook.request_resample();
        hook.request_resample();
        NoResample.request_resample();
        assert_eq!(count.get(), 2);
    }
}
