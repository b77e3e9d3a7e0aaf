//! Binary model files.
//!
//! Layout, all little-endian, no magic and no version:
//!
//! ```text
//! offset  size        field
//! 0       4           input_size   (i32)
//! 4       4           hidden_size  (i32)
//! 8       8           learning_rate (f64)
//! 16      8           output_bias  (f64)
//! 24      8 * slots   W_in, B_hidden, A_hidden, W_out (f64 each)
//! ```
//!
//! where `slots = hidden_size * (input_size + 3)`. The `A_hidden` scratch
//! region is written as-is and zeroed again on load.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::network::buffer::ParameterBuffer;
use crate::network::network::Network;

/// Size in bytes of the fixed header that precedes the parameter payload.
pub const HEADER_LEN: usize = 24;

impl Network {
    /// Writes the network to `path`, creating or truncating the file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        debug!(
            "saved {}x{} network to {}",
            self.input_size(),
            self.hidden_size(),
            path.display()
        );
        Ok(())
    }

    /// Reads a network previously written by [`Network::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Network> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let net = Network::read_from(&mut reader)?;
        debug!(
            "loaded {}x{} network from {}",
            net.input_size(),
            net.hidden_size(),
            path.display()
        );
        Ok(net)
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let input_size = i32::try_from(self.input_size())
            .map_err(|_| Error::ModelFormat("input_size does not fit in i32".to_owned()))?;
        let hidden_size = i32::try_from(self.hidden_size())
            .map_err(|_| Error::ModelFormat("hidden_size does not fit in i32".to_owned()))?;

        w.write_all(&input_size.to_le_bytes())?;
        w.write_all(&hidden_size.to_le_bytes())?;
        w.write_all(&self.learning_rate().to_le_bytes())?;
        w.write_all(&self.output_bias().to_le_bytes())?;
        for value in self.params().as_slice() {
            w.write_all(&value.to_le_bytes())?;
        }
        Ok(())
    }

    /// Decodes one network from `r`, which must end exactly after it.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Network> {
        let mut header = [0u8; HEADER_LEN];
        r.read_exact(&mut header).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                Error::ModelFormat("file shorter than the 24-byte header".to_owned())
            }
            _ => Error::Io(e),
        })?;

        let input_size = i32::from_le_bytes(le_array(&header[0..4]));
        let hidden_size = i32::from_le_bytes(le_array(&header[4..8]));
        let learning_rate = f64::from_le_bytes(le_array(&header[8..16]));
        let output_bias = f64::from_le_bytes(le_array(&header[16..24]));

        if input_size <= 0 || hidden_size <= 0 {
            return Err(Error::ModelFormat(format!(
                "sizes must be positive, got input_size={input_size} hidden_size={hidden_size}"
            )));
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(Error::ModelFormat(format!(
                "learning_rate must be finite and > 0, got {learning_rate}"
            )));
        }

        let (input_size, hidden_size) = (input_size as usize, hidden_size as usize);
        let slots = ParameterBuffer::slots_for(input_size, hidden_size);
        let payload_len = slots.and_then(|s| s.checked_mul(8)).ok_or_else(|| {
            Error::ModelFormat(format!(
                "parameter buffer for {input_size}x{hidden_size} overflows usize"
            ))
        })?;

        let mut payload = Vec::new();
        r.by_ref()
            .take(payload_len as u64)
            .read_to_end(&mut payload)?;
        if payload.len() != payload_len {
            return Err(Error::ModelFormat(format!(
                "truncated parameter payload: expected {payload_len} bytes, found {}",
                payload.len()
            )));
        }
        let mut probe = [0u8; 1];
        if r.read(&mut probe)? != 0 {
            return Err(Error::ModelFormat(
                "trailing bytes after parameter payload".to_owned(),
            ));
        }

        let data = payload
            .chunks_exact(8)
            .map(|chunk| f64::from_le_bytes(le_array(chunk)))
            .collect();
        let params = ParameterBuffer::from_vec(input_size, hidden_size, data)?;
        Network::from_parts(learning_rate, params, output_bias)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.params().len() * 8);
        self.write_to(&mut out)?;
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Network> {
        let mut cursor = bytes;
        Network::read_from(&mut cursor)
    }
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::spec::NetworkSpec;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample() -> Network {
        let mut rng = StdRng::seed_from_u64(3);
        Network::new(&NetworkSpec::new(4, 2, 0.05), &mut rng).unwrap()
    }

    #[test]
    fn header_layout_is_little_endian() {
        let net = sample();
        let bytes = net.to_bytes().unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 2 * (4 + 3) * 8);
        assert_eq!(&bytes[0..4], &4i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2i32.to_le_bytes());
        assert_eq!(&bytes[8..16], &0.05f64.to_le_bytes());
        assert_eq!(&bytes[16..24], &net.output_bias().to_le_bytes());
        assert_eq!(&bytes[24..32], &net.params().as_slice()[0].to_le_bytes());
    }

    #[test]
    fn decode_restores_parameters_and_zeroes_scratch() {
        let mut net = sample();
        net.forward(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(net.params().a_hidden().iter().any(|&a| a != 0.0));

        let back = Network::from_bytes(&net.to_bytes().unwrap()).unwrap();
        assert!(back.params().same_parameters(net.params()));
        assert_eq!(back.output_bias().to_bits(), net.output_bias().to_bits());
        assert_eq!(back.learning_rate(), net.learning_rate());
        assert!(back.params().a_hidden().iter().all(|&a| a == 0.0));
        assert!(!back.is_primed());
    }

    #[test]
    fn rejects_bad_header_values() {
        let good = sample().to_bytes().unwrap();

        let mut zero_hidden = good.clone();
        zero_hidden[4..8].copy_from_slice(&0i32.to_le_bytes());
        assert!(matches!(Network::from_bytes(&zero_hidden), Err(Error::ModelFormat(_))));

        let mut negative_input = good.clone();
        negative_input[0..4].copy_from_slice(&(-4i32).to_le_bytes());
        assert!(matches!(Network::from_bytes(&negative_input), Err(Error::ModelFormat(_))));

        let mut nan_lr = good.clone();
        nan_lr[8..16].copy_from_slice(&f64::NAN.to_le_bytes());
        assert!(matches!(Network::from_bytes(&nan_lr), Err(Error::ModelFormat(_))));

        let mut zero_lr = good;
        zero_lr[8..16].copy_from_slice(&0.0f64.to_le_bytes());
        assert!(matches!(Network::from_bytes(&zero_lr), Err(Error::ModelFormat(_))));
    }

    #[test]
    fn huge_declared_shape_fails_without_allocating() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0..4].copy_from_slice(&i32::MAX.to_le_bytes());
        bytes[4..8].copy_from_slice(&i32::MAX.to_le_bytes());
        assert!(matches!(Network::from_bytes(&bytes), Err(Error::ModelFormat(_))));
    }

    #[test]
    fn rejects_short_header() {
        assert!(matches!(Network::from_bytes(&[0u8; 10]), Err(Error::ModelFormat(_))));
    }
}
