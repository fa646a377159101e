//! Register IDs and bit fields for STMPE811

macro_rules! register_id {
    ($name:ident, $addr:literal) => {
        $crate::paste::paste! {
            pub const [<$name:upper>]: u8 = $addr;
        }
    };
}

register_id!(CHIP_ID, 0x00);
register_id!(ID_VER, 0x02);
register_id!(SYS_CTRL1, 0x03);
register_id!(SYS_CTRL2, 0x04);
register_id!(INT_CTRL, 0x09);
register_id!(INT_EN, 0x0A);
register_id!(INT_STA, 0x0B);
register_id!(GPIO_AF, 0x17);
register_id!(ADC_CTRL1, 0x20);
register_id!(ADC_CTRL2, 0x21);
register_id!(TSC_CTRL, 0x40);
register_id!(TSC_CFG, 0x41);
register_id!(WDW_TR_X, 0x42);
register_id!(WDW_TR_Y, 0x44);
register_id!(WDW_BL_X, 0x46);
register_id!(WDW_BL_Y, 0x48);
register_id!(FIFO_TH, 0x4A);
register_id!(FIFO_STA, 0x4B);
register_id!(FIFO_SIZE, 0x4C);
register_id!(TSC_DATA_X, 0x4D);
register_id!(TSC_DATA_Y, 0x4F);
register_id!(TSC_DATA_Z, 0x51);
register_id!(TSC_FRACT_XYZ, 0x56);
register_id!(TSC_I_DRIVE, 0x58);

/// Value of the CHIP_ID register
pub const CHIP_ID_STMPE811: u16 = 0x0811;

/// SYS_CTRL1: software reset
pub const SYS_CTRL1_SOFT_RESET: u8 = 1 << 1;
/// SYS_CTRL2: temperature sensor and GPIO clocks off, touch and ADC clocks on
pub const SYS_CTRL2_TSC_ADC_ON: u8 = 0x0C;

/// INT_CTRL: level interrupt, active low, global enable
pub const INT_CTRL_LEVEL_ENABLE: u8 = 0x01;
/// INT_EN: touch detect
pub const INT_EN_TOUCH_DET: u8 = 1 << 0;
/// INT_STA: write to clear all pending interrupts
pub const INT_STA_CLEAR_ALL: u8 = 0xFF;

/// ADC_CTRL1: 80 clock conversion time, 12-bit, internal reference
pub const ADC_CTRL1_CONFIG: u8 = 0x48;
/// ADC_CTRL2: 3.25MHz ADC clock
pub const ADC_CTRL2_CONFIG: u8 = 0x01;

/// TSC_CTRL: touch sensing enable, X, Y and Z acquisition
pub const TSC_CTRL_EN: u8 = 1 << 0;
/// TSC_CTRL: panel currently touched
pub const TSC_CTRL_STA: u8 = 1 << 7;
/// TSC_CFG: 4 sample averaging, 500us touch detect delay, 500us settling
pub const TSC_CFG_CONFIG: u8 = 0x9A;
/// TSC_FRACT_XYZ: Z axis data format
pub const TSC_FRACT_XYZ_CONFIG: u8 = 0x07;
/// TSC_I_DRIVE: 50mA panel drive current
pub const TSC_I_DRIVE_50MA: u8 = 0x01;

/// FIFO_TH: interrupt threshold
pub const FIFO_TH_CONFIG: u8 = 0x40;
/// FIFO_STA: hold FIFO in reset
pub const FIFO_STA_RESET: u8 = 1 << 0;
/// FIFO_STA: threshold reached
pub const FIFO_STA_TH_TRIG: u8 = 1 << 4;
/// FIFO_STA: empty
pub const FIFO_STA_EMPTY: u8 = 1 << 5;
/// FIFO_STA: full
pub const FIFO_STA_FULL: u8 = 1 << 6;
/// FIFO_STA: overflowed
pub const FIFO_STA_OFLOW: u8 = 1 << 7;
/// FIFO_STA bits meaning buffered data is stale
pub const FIFO_STA_STALE: u8 = FIFO_STA_OFLOW | FIFO_STA_FULL | FIFO_STA_TH_TRIG;

/// Number of samples the FIFO can hold
pub const FIFO_DEPTH: u16 = 128;
