//! Series id ⇄ flat RGB color bijection used by the identity raster.
//!
//! `id + 1` is written as a 24-bit number with red as the lowest byte and
//! blue as the highest; raw value 0 (black or a transparent pixel) is the
//! background. Ids above [`MAX_IDENTITY_ID`] cannot be represented and are
//! rejected rather than wrapped onto another series' color.

use crate::core::SeriesId;
use crate::error::{ChartError, ChartResult};
use crate::render::Rgba8;

/// Raw 24-bit value of an unpainted identity pixel.
pub const BACKGROUND_RAW: u32 = 0;

/// Largest encodable id (`2^24 - 2`).
pub const MAX_IDENTITY_ID: u32 = (1 << 24) - 2;

pub fn encode_id(id: SeriesId) -> ChartResult<Rgba8> {
    if id.raw() > MAX_IDENTITY_ID {
        return Err(ChartError::IdentityOverflow { id: id.raw() });
    }
    let raw = id.raw() + 1;
    let [r, g, b, _] = raw.to_le_bytes();
    Ok(Rgba8::opaque(r, g, b))
}

/// Raw 24-bit value of a sampled pixel. Transparent pixels count as background.
#[must_use]
pub fn raw_value(pixel: Rgba8) -> u32 {
    if pixel.a == 0 {
        return BACKGROUND_RAW;
    }
    u32::from_le_bytes([pixel.r, pixel.g, pixel.b, 0])
}

#[must_use]
pub fn decode_raw(raw: u32) -> Option<SeriesId> {
    if raw == BACKGROUND_RAW || raw > MAX_IDENTITY_ID + 1 {
        return None;
    }
    Some(SeriesId::new(raw - 1))
}

#[must_use]
pub fn decode_pixel(pixel: Rgba8) -> Option<SeriesId> {
    decode_raw(raw_value(pixel))
}

#[cfg(test)]
mod tests {
    use super::{MAX_IDENTITY_ID, decode_pixel, decode_raw, encode_id, raw_value};
    use crate::core::SeriesId;
    use crate::error::ChartError;
    use crate::render::Rgba8;

    #[test]
    fn encoding_puts_lowest_byte_in_red() {
        assert_eq!(encode_id(SeriesId::new(0)).expect("encode"), Rgba8::opaque(1, 0, 0));
        assert_eq!(encode_id(SeriesId::new(255)).expect("encode"), Rgba8::opaque(0, 1, 0));
        assert_eq!(
            encode_id(SeriesId::new(65_535)).expect("encode"),
            Rgba8::opaque(0, 0, 1)
        );
        assert_eq!(
            encode_id(SeriesId::new(MAX_IDENTITY_ID)).expect("encode"),
            Rgba8::opaque(255, 255, 255)
        );
    }

    #[test]
    fn background_and_transparent_decode_to_none() {
        assert_eq!(decode_pixel(Rgba8::opaque(0, 0, 0)), None);
        assert_eq!(decode_pixel(Rgba8::new(7, 0, 0, 0)), None);
        assert_eq!(raw_value(Rgba8::new(7, 0, 0, 0)), 0);
        assert_eq!(decode_raw(1), Some(SeriesId::new(0)));
    }

    #[test]
    fn ids_past_the_limit_are_rejected() {
        let err = encode_id(SeriesId::new(MAX_IDENTITY_ID + 1)).expect_err("overflow");
        assert!(matches!(err, ChartError::IdentityOverflow { id } if id == MAX_IDENTITY_ID + 1));
    }
}
