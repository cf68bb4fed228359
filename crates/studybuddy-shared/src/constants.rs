//! Cross-crate constants.

/// Application name
pub const APP_NAME: &str = "Study Buddy";

/// Shown for any profile that has never uploaded a photo.
pub const PLACEHOLDER_PHOTO_URL: &str =
    "https://www.pngkey.com/png/full/73-730477_first-name-profile-image-placeholder-png.png";

/// Document-store collection holding one profile record per uid.
pub const USERS_COLLECTION: &str = "users";

/// Remote folder that profile photos are uploaded into.
pub const UPLOAD_FOLDER: &str = "ProfilePictures";

/// Profile field key for the hosted photo URL.
pub const PHOTO_URL_FIELD: &str = "profilePhotoURL";

/// Profile field key for the display name.
pub const FULLNAME_FIELD: &str = "fullname";

/// Profile field key for the account email.
pub const EMAIL_FIELD: &str = "email";

/// Default timeout applied to every network-bound request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
