#![no_main]

use carver::{ByteSource, Carver, OffsetUnits, ScanOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for units in [OffsetUnits::Bytes, OffsetUnits::Nibbles] {
        let options = ScanOptions::default().with_offset_units(units);
        let Ok(found) = Carver::new(options).scan(ByteSource::new(data)) else {
            return;
        };
        for d in &found {
            assert!(d.end >= d.start);
            assert_eq!(d.start % 512, 0);
        }
    }
});
