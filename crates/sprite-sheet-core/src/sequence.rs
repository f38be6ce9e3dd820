//! Expanding a renderer's frame-path pattern into the ordered list of frame files.

use std::path::PathBuf;

use crate::error::{Result, SpriteSheetError};

/// Renders the path of frame `frame` from `pattern`.
///
/// The last run of `#` in the pattern becomes the zero-padded frame number (run length = width).
/// Without any `#`, a four-digit number is appended to the file stem.
pub fn frame_path(pattern: &str, frame: i64) -> PathBuf {
    if let Some(end) = pattern.rfind('#') {
        // byte offset of the run start; '#' is one byte, so this is a char boundary
        let start = pattern[..=end].trim_end_matches('#').len();
        let width = end + 1 - start;
        let mut out = String::with_capacity(pattern.len() + 4);
        out.push_str(&pattern[..start]);
        out.push_str(&format!("{frame:0width$}"));
        out.push_str(&pattern[end + 1..]);
        return PathBuf::from(out);
    }

    let path = PathBuf::from(pattern);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{frame:04}.{}", ext.to_string_lossy()),
        None => format!("{stem}{frame:04}"),
    };
    path.with_file_name(name)
}

/// Paths for frames `start, start + step, ...` below `end` (end exclusive).
pub fn frame_paths(pattern: &str, start: i64, end: i64, step: i64) -> Result<Vec<PathBuf>> {
    if step <= 0 {
        return Err(SpriteSheetError::InvalidInput("invalid step".into()));
    }
    if pattern.is_empty() {
        return Err(SpriteSheetError::InvalidInput("empty frame path pattern".into()));
    }
    let mut out = Vec::new();
    let mut frame = start;
    while frame < end {
        out.push(frame_path(pattern, frame));
        match frame.checked_add(step) {
            Some(next) => frame = next,
            None => break,
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_become_padded_number() {
        assert_eq!(frame_path("render/####.png", 7), PathBuf::from("render/0007.png"));
        assert_eq!(frame_path("walk_##.png", 123), PathBuf::from("walk_123.png"));
        // only the last run is replaced
        assert_eq!(frame_path("take#1/f_###.png", 5), PathBuf::from("take#1/f_005.png"));
        // multibyte character right before the run
        assert_eq!(frame_path("é##.png", 7), PathBuf::from("é07.png"));
        assert_eq!(frame_path("动画####", 42), PathBuf::from("动画0042"));
    }

    #[test]
    fn no_hashes_appends_number_to_stem() {
        assert_eq!(frame_path("out/walk.png", 3), PathBuf::from("out/walk0003.png"));
        assert_eq!(frame_path("out/walk", 12), PathBuf::from("out/walk0012"));
    }

    #[test]
    fn range_is_end_exclusive() {
        let paths = frame_paths("f_##.png", 1, 10, 3).expect("paths");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("f_01.png"),
                PathBuf::from("f_04.png"),
                PathBuf::from("f_07.png"),
            ]
        );
        assert!(frame_paths("f_##.png", 5, 5, 1).expect("paths").is_empty());
    }

    #[test]
    fn range_stops_at_i64_max() {
        let paths = frame_paths("f_#.png", i64::MAX - 1, i64::MAX, 5).expect("paths");
        assert_eq!(paths, vec![PathBuf::from(format!("f_{}.png", i64::MAX - 1))]);
        let paths = frame_paths("f_#.png", i64::MAX - 10, i64::MAX, 4).expect("paths");
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn rejects_bad_step_and_pattern() {
        assert!(frame_paths("f_##.png", 1, 10, 0).is_err());
        assert!(frame_paths("f_##.png", 1, 10, -2).is_err());
        assert!(frame_paths("", 1, 10, 1).is_err());
    }
}
