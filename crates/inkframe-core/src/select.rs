//! Uniform random photo selection.

use rand::Rng;

use crate::error::ResolveError;
use crate::listing::RawPhotoRecord;

/// Pick one photo uniformly at random using the thread-local RNG.
///
/// Calls are independent; the same photo may come up twice in a row.
pub fn select_random_photo(photos: &[RawPhotoRecord]) -> Result<&RawPhotoRecord, ResolveError> {
    select_random_photo_with(photos, &mut rand::thread_rng())
}

/// [`select_random_photo`] with an explicit RNG.
pub fn select_random_photo_with<'a, R: Rng + ?Sized>(
    photos: &'a [RawPhotoRecord],
    rng: &mut R,
) -> Result<&'a RawPhotoRecord, ResolveError> {
    // The fetcher never yields an empty list, but guard anyway.
    if photos.is_empty() {
        return Err(ResolveError::EmptyAlbum);
    }

    let index = rng.gen_range(0..photos.len());
    Ok(&photos[index])
}
