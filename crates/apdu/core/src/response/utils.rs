//! Utility functions for APDU response handling

use crate::response::error::ResponseError;
use crate::response::status::StatusWord;
use tracing::debug;

/// Split raw APDU response data into its status word and payload
///
/// The status word is taken from the last two bytes; everything before them is payload.
///
/// # Errors
/// Returns [`ResponseError::Malformed`] if the data is too short to contain a status word.
pub fn split_status(data: &[u8]) -> Result<(StatusWord, &[u8]), ResponseError> {
    let Some((payload, sw)) = data.split_last_chunk::<2>() else {
        debug!("Response too short: {} bytes", data.len());
        return Err(ResponseError::Malformed { length: data.len() });
    };

    Ok((StatusWord::new(sw[0], sw[1]), payload))
}
