//! Utility functions and constants.

pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{
    extension_of, fragment_of, guess_content_type, has_known_file_extension, host_dir_name,
    is_crawlable_url, mirror_path_for, normalize_url, relative_url_above,
};
