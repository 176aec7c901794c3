// src/utils/html.rs

use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Material bodies arrive as rendered HTML (authored in the admin panel
/// or imported from generated content). This employs a whitelist-based
/// sanitization strategy: safe tags (like <b>, <p>) are preserved while
/// dangerous tags (like <script>, <iframe>) and malicious attributes
/// (like onclick) are stripped before the content is stored.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_stripped() {
        let cleaned = clean_html("<p>halo</p><script>alert(1)</script>");
        assert!(cleaned.contains("<p>halo</p>"));
        assert!(!cleaned.contains("script"));
    }
}
