//! Audio duration probing for uploads that arrive without a duration

use lofty::prelude::*;
use lofty::probe::Probe;
use std::io::Cursor;
use tracing::debug;

/// Duration in whole seconds (rounded), `None` when the container is not recognized
pub fn probe_duration_secs(data: &[u8]) -> Option<i64> {
    let probe = match Probe::new(Cursor::new(data)).guess_file_type() {
        Ok(probe) => probe,
        Err(e) => {
            debug!("Audio probe failed: {}", e);
            return None;
        }
    };

    match probe.read() {
        Ok(tagged_file) => {
            let millis = tagged_file.properties().duration().as_millis();
            Some((millis as f64 / 1000.0).round() as i64)
        }
        Err(e) => {
            debug!("Audio probe failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(seconds: u32, sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for _ in 0..seconds * sample_rate {
                writer.write_sample(0i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_probe_wav_duration() {
        assert_eq!(probe_duration_secs(&wav_bytes(3, 8000)), Some(3));
    }

    #[test]
    fn test_probe_unknown_bytes() {
        assert_eq!(probe_duration_secs(b"definitely not audio"), None);
    }
}
