//! Decoders that turn a request body into a [`FormMap`], keyed by media
//! type. The registry is immutable and built once per process.

mod charset;
mod multipart;
mod urlencoded;

use crate::{FormMap, MediaType, Result};
use hashbrown::HashMap;
use std::sync::OnceLock;

type Decoder = fn(&[u8], &MediaType) -> Result<Option<FormMap>>;

fn registry() -> &'static HashMap<&'static str, Decoder> {
    static REGISTRY: OnceLock<HashMap<&'static str, Decoder>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map: HashMap<&'static str, Decoder> = HashMap::new();
        map.insert("application/x-www-form-urlencoded", |body, _| {
            urlencoded::decode(body).map(Some)
        });
        map.insert("multipart/form-data", multipart::decode);
        map
    })
}

/// Decode `body` according to its media type. `Ok(None)` means either
/// that no decoder is registered for the media type or that the decoder
/// produced nothing to surface.
pub(crate) fn decode(media_type: &MediaType, body: &[u8]) -> Result<Option<FormMap>> {
    match registry().get(media_type.essence().as_str()) {
        Some(decoder) => decoder(body, media_type),
        None => Ok(None),
    }
}

pub(crate) use urlencoded::decode as decode_urlencoded;
