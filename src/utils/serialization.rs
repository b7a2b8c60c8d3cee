// Every record that touches sled goes through these two functions so the on-disk
// layout is decided in exactly one place: bincode 2 with the standard configuration.
use crate::error::{BlockchainError, Result};
use serde::{Deserialize, Serialize};

/// Encode a record into its stored byte form
pub fn serialize<T: Serialize + bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    let config = bincode::config::standard();
    bincode::encode_to_vec(data, config)
        .map_err(|e| BlockchainError::Serialization(format!("Serialization failed: {e}")))
}

/// Decode a record from its stored byte form
pub fn deserialize<T>(bytes: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de> + bincode::Decode<()>,
{
    let config = bincode::config::standard();
    let (data, read) = bincode::decode_from_slice(bytes, config)
        .map_err(|e| BlockchainError::Serialization(format!("Deserialization failed: {e}")))?;
    if read != bytes.len() {
        return Err(BlockchainError::Serialization(format!(
            "Trailing bytes after record: consumed {read} of {}",
            bytes.len()
        )));
    }
    Ok(data)
}
