use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::audio::domain::signal::Signal;
use crate::media::domain::signal_writer::SignalWriter;
use crate::shared::constants::NPY_EXTENSION;

const MAGIC: &[u8] = b"\x93NUMPY";

/// Header (magic + version + length + dict) is padded to this alignment.
const HEADER_ALIGNMENT: usize = 64;

/// Writes signals as NumPy `.npy` v1.0 files of little-endian `f32`.
///
/// Mono signals are stored with shape `(n,)`, multichannel ones as
/// `(channels, n)` in C order.
pub struct NpyWriter;

impl NpyWriter {
    fn header(signal: &Signal) -> Vec<u8> {
        let shape = if signal.channels() == 1 {
            format!("({},)", signal.len())
        } else {
            format!("({}, {})", signal.channels(), signal.len())
        };
        let mut dict = format!("{{'descr': '<f4', 'fortran_order': False, 'shape': {shape}, }}");

        // magic(6) + version(2) + header length(2) + dict + '\n'
        let unpadded = MAGIC.len() + 4 + dict.len() + 1;
        let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
        dict.extend(std::iter::repeat(' ').take(padding));
        dict.push('\n');

        let mut header = Vec::with_capacity(unpadded + padding);
        header.extend_from_slice(MAGIC);
        header.extend_from_slice(&[1, 0]);
        header.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        header.extend_from_slice(dict.as_bytes());
        header
    }
}

impl SignalWriter for NpyWriter {
    fn write(&self, path: &Path, signal: &Signal) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(&Self::header(signal))?;
        // Rows are channels, so iterating in logical order yields C order.
        for sample in signal.data().iter() {
            out.write_all(&sample.to_le_bytes())?;
        }
        out.flush()?;
        Ok(())
    }

    fn extension(&self) -> &str {
        NPY_EXTENSION
    }
}
