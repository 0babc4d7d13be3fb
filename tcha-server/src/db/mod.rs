//! Database access layer
//!
//! Free functions over the shared pool, one module per table group. Every
//! statement stands alone: multi-step operations built from these are not
//! transactional.

pub mod albums;
pub mod artists;
pub mod blobs;
pub mod genres;
pub mod likes;
pub mod playlists;
pub mod songs;
pub mod stats;
pub mod users;

/// `%term%` pattern for LIKE searches, with wildcards in the term escaped
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" rumba "), "%rumba%");
        assert_eq!(like_pattern("100%_"), "%100\\%\\_%");
    }
}
