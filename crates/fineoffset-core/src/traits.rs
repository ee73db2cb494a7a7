//! Trait abstraction for the packet decoder.
//!
//! Demodulation and protocol decoding live outside this crate. The station
//! layer only needs to turn a raw packet back into a [`Reading`], which it
//! does once per accepted packet and once per burst resolution.

use fineoffset_types::{DecodeResult, MessageFormat, Reading};

/// Turns a raw radio packet into a typed reading.
///
/// Implementations must reject packets that fail checksum or format
/// validation instead of returning a partially filled reading.
///
/// Closures with the matching signature implement this trait:
///
/// ```
/// use fineoffset_core::Decoder;
/// use fineoffset_types::{DecodeError, MessageFormat, Reading};
///
/// let reject_all = |_: MessageFormat, _: &[u8]| -> Result<Reading, DecodeError> {
///     Err(DecodeError::InvalidData("not a weather packet".into()))
/// };
/// assert!(reject_all.decode(MessageFormat::Ws3000, &[0u8; 10]).is_err());
/// ```
pub trait Decoder {
    /// Decode `packet`, received in `format`.
    fn decode(&self, format: MessageFormat, packet: &[u8]) -> DecodeResult<Reading>;
}

impl<F> Decoder for F
where
    F: Fn(MessageFormat, &[u8]) -> DecodeResult<Reading>,
{
    fn decode(&self, format: MessageFormat, packet: &[u8]) -> DecodeResult<Reading> {
        self(format, packet)
    }
}
