//! Profile-photo change flow for the profile screen.

use tracing::info;

use studybuddy_media::{ImagePicker, ImageUploader, PickOutcome};
use studybuddy_shared::constants::PHOTO_URL_FIELD;
use studybuddy_shared::UserId;
use studybuddy_store::ProfileRepository;

use crate::error::Result;

/// Pick a new photo, upload it to the owner's canonical slot, and persist
/// the hosted URL on the profile record.
///
/// Cancelling the picker resolves to `Ok(None)` with nothing changed.
/// Upload and persistence are separate steps on purpose: an upload failure
/// leaves the stored record untouched, and a persistence failure can be
/// retried without re-uploading. While an upload for this owner is in
/// flight, a second call is rejected by the uploader's guard.
pub async fn change_photo(
    picker: &dyn ImagePicker,
    uploader: &dyn ImageUploader,
    profiles: &ProfileRepository,
    uid: &UserId,
) -> Result<Option<String>> {
    let image = match picker.pick_image().await? {
        PickOutcome::Picked(image) => image,
        PickOutcome::Cancelled => return Ok(None),
    };

    let url = uploader.upload(&image, uid).await?;
    profiles.update_field(uid, PHOTO_URL_FIELD, &url).await?;

    info!(uid = %uid, "Profile photo updated");
    Ok(Some(url))
}
