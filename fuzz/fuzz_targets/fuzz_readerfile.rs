#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // Parsing must either succeed or fail with an error, never panic
    if let Ok(file) = platescreen::reader::parse_readerfile("001AcD01001.txt", &text) {
        let measurements = file.measurements();
        let _ = platescreen::process::precipitation_test(&measurements, None);
    }

    for line in text.lines().take(64) {
        if let Ok((row, column)) = platescreen::position::parse_position(line.trim()) {
            for quadrant in 0..=5 {
                let _ = platescreen::position::map_96_to_384(row, column, quadrant);
            }
        }
    }
});
