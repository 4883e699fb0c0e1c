//! Panic isolation and message trimming for the worker boundary.
//!
//! An action that panics must fail its own task, not the worker channel
//! and not the UI. Output captured from scripts is clipped before it
//! reaches the log so one noisy script cannot flood the panel.

use std::any::Any;

/// Longest error text kept from a failed action, in bytes.
pub const MAX_MESSAGE_BYTES: usize = 4096;

/// Snap a byte position back to the nearest UTF-8 character boundary.
pub fn snap_to_char_boundary(s: &str, byte_pos: usize) -> usize {
    if byte_pos >= s.len() {
        return s.len();
    }
    let mut pos = byte_pos;
    while !s.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Clip `s` to at most `max_bytes`, marking the cut with an ellipsis.
pub fn clip_message(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let cut = snap_to_char_boundary(s, max_bytes);
    format!("{}…", &s[..cut])
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Run `f`, turning a panic into `Err(message)`.
pub fn catch_panic<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f))
        .map_err(|payload| format!("panicked: {}", panic_message(payload.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_ascii() {
        let s = "hello";
        assert_eq!(snap_to_char_boundary(s, 0), 0);
        assert_eq!(snap_to_char_boundary(s, 3), 3);
        assert_eq!(snap_to_char_boundary(s, 100), 5);
    }

    #[test]
    fn test_snap_multibyte() {
        // 'é' is 2 bytes, '😀' is 4
        let s = "é😀";
        assert_eq!(snap_to_char_boundary(s, 1), 0);
        assert_eq!(snap_to_char_boundary(s, 2), 2);
        assert_eq!(snap_to_char_boundary(s, 5), 2);
        assert_eq!(snap_to_char_boundary(s, 6), 6);
    }

    #[test]
    fn test_clip_message() {
        assert_eq!(clip_message("short", 10), "short");
        assert_eq!(clip_message("abcdef", 3), "abc…");
        assert_eq!(clip_message("café", 4), "caf…");
    }

    #[test]
    fn test_catch_panic() {
        assert_eq!(catch_panic(|| 7), Ok(7));
        assert_eq!(catch_panic(|| -> u8 { panic!("bad state") }), Err("panicked: bad state".to_string()));
        let owned = catch_panic(|| -> u8 { panic!("{} items", 3) });
        assert_eq!(owned, Err("panicked: 3 items".to_string()));
    }
}
