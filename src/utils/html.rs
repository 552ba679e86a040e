// src/utils/html.rs

/// Strips dangerous markup from free text (test titles) before it is stored.
///
/// Whitelist-based: harmless tags like `<b>` survive, `<script>` goes away
/// together with its content.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
