/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) survive while <script>,
/// <iframe> and event-handler attributes are stripped. Only post bodies go
/// through here; plain-text fields are rendered as text, never as markup.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
