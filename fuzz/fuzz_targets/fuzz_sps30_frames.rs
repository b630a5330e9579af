//! Fuzz target: SPS30 response framing
//!
//! Feeds arbitrary bytes back as I2C read data and drives every SPS30
//! command through the driver.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - A read either decodes or fails with a typed `SensorError`
//! - A decoded serial is always ASCII
//!
//! cargo fuzz run fuzz_sps30_frames

#![no_main]

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
use libfuzzer_sys::fuzz_target;
use pmreporter::adapters::sps30::Sps30;
use pmreporter::app::ports::SensorPort;

/// Bus that answers every read from the fuzz input, cycling through it.
struct ReplayBus<'a> {
    data: &'a [u8],
    pos: usize,
}

impl ErrorType for ReplayBus<'_> {
    type Error = ErrorKind;
}

impl I2c for ReplayBus<'_> {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            if let Operation::Read(buf) = op {
                for byte in buf.iter_mut() {
                    *byte = self.data[self.pos % self.data.len()];
                    self.pos += 1;
                }
            }
        }
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut sensor = Sps30::new(ReplayBus { data, pos: 0 }, 0x69);

    let _ = sensor.start_measurement();
    let _ = sensor.is_data_ready();
    let _ = sensor.read_measurement();
    if let Ok(serial) = sensor.read_serial() {
        assert!(serial.is_ascii(), "serial must be ASCII: {serial:?}");
    }
    let _ = sensor.stop_measurement();
});
