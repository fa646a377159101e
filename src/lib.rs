//! STMPE811 resistive touchscreen controller device driver
//!
//! This crate provides a device driver for the ST STMPE811 touchscreen
//! controller, producing pointer samples `(x, y, pressure, buttons)` for a
//! GUI input layer.
//!
//! The STMPE811 buffers touch samples in a hardware FIFO and signals touch
//! changes on its INT line. The driver's job is to reconcile the touched
//! status with the FIFO contents so that a reading never reports stale data:
//! the FIFO is drained on every touch edge (or IRQ, or FIFO overflow) so only
//! the freshest sample is returned, and the caller is asked to sample again
//! when more data is buffered.
//!
//! Register access, board services and the resample notification are
//! supplied by the caller through the [`RegisterAccess`], [`Board`] and
//! [`Resample`] traits. [`I2cInterface`] and [`PinBoard`] implement these
//! over the [`embedded_hal`](https://docs.rs/embedded-hal) `blocking::i2c`,
//! `blocking::delay` and `digital::v2` interfaces.
//!
//! # Examples
//!
//! ```rust,ignore
//!     let iface = stmpe811::I2cInterface::new(i2c, stmpe811::DEFAULT_I2C_ADDR);
//!     let board = stmpe811::PinBoard::new(int_pin, delay, 320, 240);
//!     let config = stmpe811::Config::default().with_irq_pin(true);
//!     let mut touch = stmpe811::Stmpe811::new(iface, board, stmpe811::NoResample, config)?;
//!     touch.initialize()?;
//!
//!     loop {
//!         let sample = touch.get_reading()?;
//!         if sample.is_pressed() {
//!             info!("{},{} : {}", sample.x, sample.y, sample.z);
//!         }
//!     }
//! ```
//!
//! The driver is not reentrant. `get_reading()` takes `&mut self`, so a
//! driver shared between an interrupt handler and the main loop must be
//! wrapped by the caller, e.g. in a `critical_section::Mutex`.

#![no_std]

use paste;

mod board;
mod interface;
pub mod registers;

pub use board::{Board, NoIrqPin, NoResample, PinBoard, Resample};
pub use interface::{I2cInterface, RegisterAccess, Width, ALT_I2C_ADDR, DEFAULT_I2C_ADDR};

/// Errors produced by the STMPE811 driver
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error {
    /// An error accessing the GPIO pins
    GPIOError,
    /// An error accessing the I2C interface
    I2CError,
    /// The FIFO did not report empty while being drained
    FifoTimeout,
    /// Display size can't be used to rescale ADC coordinates
    InvalidDisplaySize,
    /// Inconsistent driver configuration
    InvalidConfig,
    /// Device on the bus is not an STMPE811
    InvalidChipId(u16),
    /// `get_reading()` called before `initialize()`
    NotInitialized,
}

pub type Result<T> = core::result::Result<T, Error>;

/// Button bit reported while the panel is touched
pub const BUTTON_TOUCH_PRESSED: u8 = 1 << 0;

/// Full scale of the 12-bit touch ADC
const ADC_RANGE: u16 = 4096;

/// Settle time after soft reset
const RESET_SETTLE_MS: u32 = 10;
/// Settle time after ADC configuration
const ADC_SETTLE_MS: u32 = 2;

/// Driver configuration
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Config {
    /// INT is wired and touch status is only re-read when it is asserted.
    /// Otherwise the status is polled on every reading.
    pub irq_pin: bool,
    /// Skip the FIFO status check and drain the FIFO on every touched reading
    pub slow_cpu: bool,
    /// Report raw ADC coordinates for an external calibration layer instead
    /// of rescaling to display pixels
    pub calibrated: bool,
    /// Maximum number of samples read while draining the FIFO
    pub max_drain: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            irq_pin: false,
            slow_cpu: false,
            calibrated: false,
            max_drain: registers::FIFO_DEPTH,
        }
    }
}

impl Config {
    pub fn with_irq_pin(mut self, irq_pin: bool) -> Self {
        self.irq_pin = irq_pin;
        self
    }

    pub fn with_slow_cpu(mut self, slow_cpu: bool) -> Self {
        self.slow_cpu = slow_cpu;
        self
    }

    pub fn with_calibrated(mut self, calibrated: bool) -> Self {
        self.calibrated = calibrated;
        self
    }

    pub fn with_max_drain(mut self, max_drain: u16) -> Self {
        self.max_drain = max_drain;
        self
    }
}

/// Last known touch position
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct Position {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// Pointer sample
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct Sample {
    /// X coordinate, display pixels or raw ADC when calibrated
    pub x: i16,
    /// Y coordinate, display pixels or raw ADC when calibrated
    pub y: i16,
    /// Pressure in 1..=100 while touched, 0 when not touched
    pub z: i16,
    /// Button bits (see `BUTTON_TOUCH_PRESSED`)
    pub buttons: u8,
}

impl Sample {
    /// Sample reported while the panel is not touched
    fn released(pos: Position) -> Self {
        Sample {
            x: pos.x,
            y: pos.y,
            z: 0,
            buttons: 0,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.buttons & BUTTON_TOUCH_PRESSED != 0
    }
}

/// Product and version information of the STMPE811 device
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DeviceInfo {
    /// Contents of the CHIP_ID register
    pub chip_id: u16,
    /// Contents of the ID_VER register
    pub version: u8,
}

/// Display geometry used to map ADC values to pixels
#[derive(Debug, Clone, Copy)]
struct Scale {
    width: u16,
    height: u16,
    x_div: u16,
    y_div: u16,
}

impl Scale {
    fn new(width: u16, height: u16) -> Result<Scale> {
        if width == 0 || height == 0 || width > ADC_RANGE || height > ADC_RANGE {
            return Err(Error::InvalidDisplaySize);
        }
        Ok(Scale {
            width,
            height,
            x_div: ADC_RANGE / width,
            y_div: ADC_RANGE / height,
        })
    }

    /// Map raw ADC values to pixels. The panel's X axis is mirrored
    /// relative to the display.
    fn apply(&self, raw_x: u16, raw_y: u16) -> (i16, i16) {
        let w = self.width as i32;
        let h = self.height as i32;
        let x = w - (raw_x as i32) / (self.x_div as i32);
        let y = (raw_y as i32) / (self.y_div as i32);
        (x.clamp(0, w) as i16, y.clamp(0, h) as i16)
    }
}

/// Convert the fractional Z register to a pressure in 1..=100
///
/// 0 is kept for the not touched case.
fn pressure(raw_z: u8) -> i16 {
    (((raw_z as i16 & 0xFF) * 100) >> 8) + 1
}

/// STMPE811 driver
///
/// Owns the register interface, the board adapter and the resample hook,
/// and keeps the last stable position and the touched status between
/// readings.
pub struct Stmpe811<IF, B, W> {
    iface: IF,
    board: B,
    resample: W,
    config: Config,
    scale: Option<Scale>,
    stable: Position,
    touched: bool,
    /// A requested drain did not complete
    pending_flush: bool,
    initialized: bool,
}

impl<IF, B, W> Stmpe811<IF, B, W>
where
    B: Board,
{
    /// Create a new STMPE811 driver
    ///
    /// `iface` provides register access
    /// `board` provides the INT line, delays and display size
    /// `resample` is notified when samples remain in the FIFO
    ///
    /// Unless `config.calibrated` is set the board's display size must be in
    /// `1..=4096` pixels in each direction.
    pub fn new(iface: IF, board: B, resample: W, config: Config) -> Result<Self> {
        if config.max_drain == 0 {
            return Err(Error::InvalidConfig);
        }
        let scale = if config.calibrated {
            None
        } else {
            Some(Scale::new(board.display_width(), board.display_height())?)
        };
        Ok(Stmpe811 {
            iface,
            board,
            resample,
            config,
            scale,
            stable: Position::default(),
            touched: false,
            pending_flush: false,
            initialized: false,
        })
    }

    /// Re-read the display size from the board, e.g. after a rotation
    ///
    /// The previous size is kept if the new one is invalid.
    pub fn update_display_size(&mut self) -> Result<()> {
        if !self.config.calibrated {
            self.scale = Some(Scale::new(
                self.board.display_width(),
                self.board.display_height(),
            )?);
        }
        Ok(())
    }
}

impl<IF, B, W> Stmpe811<IF, B, W> {
    /// Current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Last position reported while touched
    pub fn stable_position(&self) -> Position {
        self.stable
    }

    /// Call platform specific function on the board adapter, e.g. to clear
    /// an interrupt on the INT pin
    ///
    /// This wrapper is needed as the driver owns the board, so the platform
    /// can't maintain a mutable reference to it
    pub fn clear_irq<F: FnMut(&mut B)>(&mut self, mut f: F) {
        f(&mut self.board)
    }

    /// Return the register interface, board adapter and resample hook
    pub fn release(self) -> (IF, B, W) {
        (self.iface, self.board, self.resample)
    }
}

impl<IF, B, W> Stmpe811<IF, B, W>
where
    IF: RegisterAccess,
    B: Board,
    W: Resample,
{
    /// Reset and configure the STMPE811
    ///
    /// Must be called before `get_reading()`.
    pub fn initialize(&mut self) -> Result<()> {
        self.initialized = false;
        self.pending_flush = false;

        let chip_id = self.read_chip_id()?;
        if chip_id != registers::CHIP_ID_STMPE811 {
            return Err(Error::InvalidChipId(chip_id));
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("STMPE811 found, chip id {=u16:#x}", chip_id);

        self.write_sys_ctrl1(registers::SYS_CTRL1_SOFT_RESET)?;
        self.board.delay_ms(RESET_SETTLE_MS);

        self.write_sys_ctrl2(registers::SYS_CTRL2_TSC_ADC_ON)?;
        self.write_int_en(if self.config.irq_pin {
            registers::INT_EN_TOUCH_DET
        } else {
            0
        })?;
        self.write_adc_ctrl1(registers::ADC_CTRL1_CONFIG)?;
        self.board.delay_ms(ADC_SETTLE_MS);

        self.write_adc_ctrl2(registers::ADC_CTRL2_CONFIG)?;
        self.write_gpio_af(0)?;
        self.write_tsc_cfg(registers::TSC_CFG_CONFIG)?;
        self.write_fifo_th(registers::FIFO_TH_CONFIG)?;
        self.write_fifo_sta(registers::FIFO_STA_RESET)?;
        self.write_fifo_sta(0)?;
        self.write_tsc_fract_xyz(registers::TSC_FRACT_XYZ_CONFIG)?;
        self.write_tsc_i_drive(registers::TSC_I_DRIVE_50MA)?;
        self.write_tsc_ctrl(0)?;
        self.write_tsc_ctrl(registers::TSC_CTRL_EN)?;
        self.write_int_sta(registers::INT_STA_CLEAR_ALL)?;

        // with an INT pin this is the only status read until the next IRQ
        self.touched = self.read_touched()?;
        self.write_int_ctrl(registers::INT_CTRL_LEVEL_ENABLE)?;

        self.initialized = true;
        #[cfg(feature = "defmt")]
        defmt::debug!("STMPE811 initialized, touched {}", self.touched);
        Ok(())
    }

    /// Read the next pointer sample
    ///
    /// When not touched the last touched position is returned with zero
    /// pressure and no buttons. When touched the FIFO is drained as needed
    /// and the freshest sample is returned; if samples remain buffered the
    /// resample hook is notified once.
    pub fn get_reading(&mut self) -> Result<Sample> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }

        // the edge or IRQ that asked for a drain is consumed once seen, so a
        // failed drain is retried on the next touched reading
        let mut clear_fifo = self.update_touched()? || self.pending_flush;
        if !self.touched {
            return Ok(Sample::released(self.stable));
        }

        if self.config.slow_cpu
            || (!clear_fifo && self.read_fifo_sta()? & registers::FIFO_STA_STALE != 0)
        {
            clear_fifo = true;
        }

        self.pending_flush = clear_fifo;
        let (raw_x, raw_y, raw_z) = self.drain_fifo(clear_fifo)?;
        self.pending_flush = false;

        let (x, y) = match &self.scale {
            Some(scale) => scale.apply(raw_x, raw_y),
            None => (raw_x as i16, raw_y as i16),
        };
        let z = pressure(raw_z);
        self.stable = Position { x, y, z };

        if !clear_fifo && self.read_fifo_sta()? & registers::FIFO_STA_EMPTY == 0 {
            self.resample.request_resample();
        }

        Ok(Sample {
            x,
            y,
            z,
            buttons: BUTTON_TOUCH_PRESSED,
        })
    }

    /// Restrict touch detection to a window of the panel, in raw ADC units
    ///
    /// `bl` is the bottom left corner and `tr` the top right corner
    pub fn set_active_window(&mut self, bl_x: u16, bl_y: u16, tr_x: u16, tr_y: u16) -> Result<()> {
        self.write_wdw_tr_x(tr_x)?;
        self.write_wdw_tr_y(tr_y)?;
        self.write_wdw_bl_x(bl_x)?;
        self.write_wdw_bl_y(bl_y)
    }

    /// Read the device information registers
    pub fn get_info(&mut self) -> Result<DeviceInfo> {
        Ok(DeviceInfo {
            chip_id: self.read_chip_id()?,
            version: self.read_id_ver()?,
        })
    }

    fn read_touched(&mut self) -> Result<bool> {
        Ok(self.read_tsc_ctrl()? & registers::TSC_CTRL_STA != 0)
    }

    /// Refresh the touched status
    ///
    /// Returns `true` if the FIFO holds samples from before the current
    /// status and must be drained.
    fn update_touched(&mut self) -> Result<bool> {
        if self.config.irq_pin {
            if !self.board.irq_asserted()? {
                return Ok(false);
            }
            self.write_int_sta(registers::INT_STA_CLEAR_ALL)?;
            self.touched = self.read_touched()?;
            #[cfg(feature = "defmt")]
            defmt::trace!("IRQ, touched {}", self.touched);
            Ok(true)
        } else {
            let last_touched = self.touched;
            self.touched = self.read_touched()?;
            let edge = self.touched != last_touched;
            if edge {
                #[cfg(feature = "defmt")]
                defmt::trace!("touch edge, touched {}", self.touched);
            }
            Ok(edge)
        }
    }

    /// Read X, Y and Z from the FIFO
    ///
    /// With `clear_fifo` reads are repeated until the FIFO reports empty,
    /// leaving the most recent sample. Fails with `Error::FifoTimeout` if
    /// that takes more than `max_drain` reads.
    fn drain_fifo(&mut self, clear_fifo: bool) -> Result<(u16, u16, u8)> {
        let mut reads: u16 = 0;
        loop {
            let x = self.read_tsc_data_x()?;
            let y = self.read_tsc_data_y()?;
            let z = self.read_tsc_data_z()?;
            reads += 1;

            let sample = (x & (ADC_RANGE - 1), y & (ADC_RANGE - 1), z);
            if !clear_fifo {
                return Ok(sample);
            }
            if self.read_fifo_sta()? & registers::FIFO_STA_EMPTY != 0 {
                #[cfg(feature = "defmt")]
                defmt::trace!("FIFO drained after {} reads", reads);
                return Ok(sample);
            }
            if reads >= self.config.max_drain {
                #[cfg(feature = "defmt")]
                defmt::warn!("FIFO not empty after {} reads", reads);
                return Err(Error::FifoTimeout);
            }
        }
    }
}

macro_rules! register_read {
    ($name:ident, $sz:tt) => {
        $crate::paste::paste! {
            impl<IF, B, W> Stmpe811<IF, B, W>
            where
                IF: RegisterAccess,
            {
                #[doc="Read the " [<$name:upper>] " register"]
                pub fn [<read_ $name:lower>](&mut self) -> Result<$sz> {
                    self.iface.[<read_reg_ $sz>](registers::[<$name:upper>])
                }
            }
        }
    };
}

macro_rules! register_write {
    ($name:ident, $sz:tt) => {
        $crate::paste::paste! {
            impl<IF, B, W> Stmpe811<IF, B, W>
            where
                IF: RegisterAccess,
            {
                #[doc="Write the " [<$name:upper>] " register"]
                pub fn [<write_ $name:lower>](&mut self, v: $sz) -> Result<()> {
                    self.iface.[<write_reg_ $sz>](registers::[<$name:upper>], v)
                }
            }
        }
    };
}

macro_rules! register_acc {
    ($name:ident, $sz:tt, ro) => {
        register_read!($name, $sz);
    };
    ($name:ident, $sz:tt, rw) => {
        register_read!($name, $sz);
        register_write!($name, $sz);
    };
}

register_acc!(CHIP_ID, u16, ro);
register_acc!(ID_VER, u8, ro);
register_acc!(SYS_CTRL1, u8, rw);
register_acc!(SYS_CTRL2, u8, rw);
register_acc!(INT_CTRL, u8, rw);
register_acc!(INT_EN, u8, rw);
register_acc!(INT_STA, u8, rw);
register_acc!(GPIO_AF, u8, rw);
register_acc!(ADC_CTRL1, u8, rw);
register_acc!(ADC_CTRL2, u8, rw);
register_acc!(TSC_CTRL, u8, rw);
register_acc!(TSC_CFG, u8, rw);
register_acc!(WDW_TR_X, u16, rw);
register_acc!(WDW_TR_Y, u16, rw);
register_acc!(WDW_BL_X, u16, rw);
register_acc!(WDW_BL_Y, u16, rw);
register_acc!(FIFO_TH, u8, rw);
register_acc!(FIFO_STA, u8, rw);
register_acc!(FIFO_SIZE, u8, ro);
register_acc!(TSC_DATA_X, u16, ro);
register_acc!(TSC_DATA_Y, u16, ro);
register_acc!(TSC_DATA_Z, u8, ro);
register_acc!(TSC_FRACT_XYZ, u8, rw);
register_acc!(TSC_I_DRIVE, u8, rw);


// End of file
