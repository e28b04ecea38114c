//! Serialization of fitted models.
//!
//! Fitted state is plain data (vocabularies, fill values, tree nodes,
//! weights), so any `serde` type can be turned into bytes and back. Files on
//! disk are wrapped in a small envelope carrying a format tag and version.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A trait for parameter representations that can be serialized to and from bytes.
pub trait SerializableParams: Sized {
    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;
}

impl<T> SerializableParams for T
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

const FORMAT_TAG: &str = "titanic-survival-model";

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    format: String,
    version: u32,
    payload: Vec<u8>,
}

/// Write `value` to `path` inside a versioned envelope.
pub fn save_to_file<T: SerializableParams, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let envelope = Envelope {
        format: FORMAT_TAG.to_string(),
        version: FORMAT_VERSION,
        payload: value.to_bytes()?,
    };
    std::fs::write(path, envelope.to_bytes()?)?;
    Ok(())
}

/// Read a value written by [`save_to_file`].
///
/// # Errors
/// [`PipelineError::Serialization`] when the file is not a model file or was
/// written by a different format version.
pub fn load_from_file<T: SerializableParams, P: AsRef<Path>>(path: P) -> Result<T> {
    let bytes = std::fs::read(path)?;
    let envelope = Envelope::from_bytes(&bytes)?;
    if envelope.format != FORMAT_TAG {
        let msg = format!("not a model file (format tag {:?})", envelope.format);
        return Err(PipelineError::Serialization(msg));
    }
    if envelope.version != FORMAT_VERSION {
        return Err(PipelineError::Serialization(format!(
            "unsupported model format version {} (expected {})",
            envelope.version, FORMAT_VERSION
        )));
    }
    T::from_bytes(&envelope.payload)
}
