//! Display masking for key secrets

const VISIBLE_PREFIX: usize = 5;
const VISIBLE_SUFFIX: usize = 4;
const MASK_WIDTH: usize = 20;
const MASK_CHAR: char = '•';

/// Hide the middle of a secret, keeping the first 5 and last 4 characters.
///
/// Secrets shorter than 9 characters keep the same slicing, so prefix and
/// suffix may overlap.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let len = chars.len();

    let mut masked = String::with_capacity(secret.len() + MASK_WIDTH * MASK_CHAR.len_utf8());
    masked.extend(&chars[..len.min(VISIBLE_PREFIX)]);
    masked.extend(std::iter::repeat_n(MASK_CHAR, MASK_WIDTH));
    masked.extend(&chars[len.saturating_sub(VISIBLE_SUFFIX)..]);
    masked
}

/// The secret as it should be shown: in full when revealed, masked otherwise
pub fn display_secret(secret: &str, revealed: bool) -> String {
    if revealed {
        secret.to_string()
    } else {
        mask_secret(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "dev-3f2b8c1e-4d5a-4b6c-9e7f-0a1b2c3d4e5f";

    #[test]
    fn test_mask_shape() {
        let masked = mask_secret(SECRET);

        assert_eq!(masked.chars().count(), 29);
        assert!(masked.starts_with("dev-3"));
        assert!(masked.ends_with("4e5f"));
        assert_eq!(masked.chars().filter(|c| *c == '•').count(), 20);
    }

    #[test]
    fn test_mask_never_contains_middle() {
        let masked = mask_secret(SECRET);
        assert!(!masked.contains("4d5a"));
    }

    #[test]
    fn test_mask_short_secret() {
        assert_eq!(mask_secret("abcdefghi"), format!("abcde{}fghi", "•".repeat(20)));
        assert_eq!(mask_secret("abc"), format!("abc{}abc", "•".repeat(20)));
        assert_eq!(mask_secret(""), "•".repeat(20));
    }

    #[test]
    fn test_display_secret() {
        assert_eq!(display_secret(SECRET, true), SECRET);
        assert_eq!(display_secret(SECRET, false), mask_secret(SECRET));
    }
}
