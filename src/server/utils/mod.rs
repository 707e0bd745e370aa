pub mod allowlist_utils;
pub mod header_utils;
pub mod playlist_utils;
