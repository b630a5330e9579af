//! Sensirion SPS30 particulate-matter sensor on I2C.
//!
//! Thin command mapping over any `embedded_hal::i2c::I2c` bus. Response
//! word framing and CRC-8 checking are delegated to `sensirion-i2c`; this
//! module only knows the SPS30 command set and how to decode the
//! big-endian IEEE-754 measurement words.
//!
//! Measurements are requested in float output format, so a full read
//! returns ten `f32` values (20 words, 60 bytes with CRCs).

use embedded_hal::i2c::I2c;
use log::{debug, info};
use sensirion_i2c::{crc8, i2c as sensirion};

use crate::app::ports::SensorPort;
use crate::app::reading::Reading;
use crate::error::SensorError;

const CMD_START_MEASUREMENT: u16 = 0x0010;
const CMD_STOP_MEASUREMENT: u16 = 0x0104;
const CMD_READ_DATA_READY: u16 = 0x0202;
const CMD_READ_MEASURED_VALUES: u16 = 0x0300;
const CMD_READ_SERIAL_NUMBER: u16 = 0xD033;

/// Start-measurement argument selecting big-endian IEEE-754 output.
const OUTPUT_FORMAT_FLOAT: [u8; 2] = [0x03, 0x00];

/// 10 floats × 2 words × (2 data bytes + 1 CRC).
const MEASUREMENT_LEN: usize = 60;
/// 16 words × (2 data bytes + 1 CRC); NUL-terminated ASCII.
const SERIAL_LEN: usize = 48;
/// One word + CRC.
const WORD_LEN: usize = 3;

/// SPS30 driver adapter. Owns the bus handle for its whole lifetime.
pub struct Sps30<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Sps30<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Give the bus handle back (closing it when dropped).
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn command(&mut self, command: u16) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &command.to_be_bytes())
            .map_err(|e| {
                debug!("SPS30 command 0x{:04X} failed: {:?}", command, e);
                SensorError::BusWrite
            })
    }

    fn read_words(&mut self, command: u16, buf: &mut [u8]) -> Result<(), SensorError> {
        self.command(command)?;
        sensirion::read_words_with_crc(&mut self.i2c, self.address, buf).map_err(|e| match e {
            sensirion::Error::Crc => SensorError::Crc,
            _ => {
                debug!("SPS30 read after 0x{:04X} failed", command);
                SensorError::BusRead
            }
        })
    }
}

impl<I2C: I2c> SensorPort for Sps30<I2C> {
    fn start_measurement(&mut self) -> Result<(), SensorError> {
        let [hi, lo] = CMD_START_MEASUREMENT.to_be_bytes();
        let crc = crc8::calculate(&OUTPUT_FORMAT_FLOAT);
        let frame = [hi, lo, OUTPUT_FORMAT_FLOAT[0], OUTPUT_FORMAT_FLOAT[1], crc];
        self.i2c.write(self.address, &frame).map_err(|e| {
            debug!("SPS30 start measurement failed: {:?}", e);
            SensorError::BusWrite
        })
    }

    fn is_data_ready(&mut self) -> Result<bool, SensorError> {
        let mut buf = [0u8; WORD_LEN];
        self.read_words(CMD_READ_DATA_READY, &mut buf)?;
        Ok(buf[1] == 0x01)
    }

    fn read_measurement(&mut self) -> Result<Reading, SensorError> {
        let mut buf = [0u8; MEASUREMENT_LEN];
        self.read_words(CMD_READ_MEASURED_VALUES, &mut buf)?;
        Ok(Reading::from_words(decode_floats(&buf)))
    }

    fn stop_measurement(&mut self) -> Result<(), SensorError> {
        self.command(CMD_STOP_MEASUREMENT)
    }

    fn read_serial(&mut self) -> Result<String, SensorError> {
        let mut buf = [0u8; SERIAL_LEN];
        self.read_words(CMD_READ_SERIAL_NUMBER, &mut buf)?;
        decode_serial(&buf)
    }
}

/// Each float spans two CRC-framed words: `[b0 b1 crc b2 b3 crc]`.
fn decode_floats(buf: &[u8; MEASUREMENT_LEN]) -> [f32; 10] {
    let mut out = [0f32; 10];
    for (value, chunk) in out.iter_mut().zip(buf.chunks_exact(6)) {
        *value = f32::from_be_bytes([chunk[0], chunk[1], chunk[3], chunk[4]]);
    }
    out
}

fn decode_serial(buf: &[u8; SERIAL_LEN]) -> Result<String, SensorError> {
    let bytes: Vec<u8> = buf
        .chunks_exact(WORD_LEN)
        .flat_map(|w| [w[0], w[1]])
        .take_while(|&b| b != 0)
        .collect();
    if !bytes.is_ascii() {
        return Err(SensorError::InvalidSerial);
    }
    String::from_utf8(bytes).map_err(|_| SensorError::InvalidSerial)
}

// ── Linux bus ─────────────────────────────────────────────────

/// Open `device` (e.g. `/dev/i2c-1`) and bind an SPS30 at `address`.
pub fn open_linux(
    device: &str,
    address: u8,
) -> Result<Sps30<linux_embedded_hal::I2cdev>, SensorError> {
    let bus = linux_embedded_hal::I2cdev::new(device)
        .map_err(|e| SensorError::Open(format!("{device}: {e}")))?;
    info!("I2C bus {} opened, SPS30 at 0x{:02X}", device, address);
    Ok(Sps30::new(bus, address))
}
