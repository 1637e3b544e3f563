use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Allow-listed cleaner for untrusted HTML coming from wiki extracts and Commons metadata.
///
/// Tags: a, b, br, i, img, p, span. Attributes: `href` on a, `src`/`alt` on img.
/// Everything else is dropped; script and style elements lose their content too.
static SANITIZER: LazyLock<ammonia::Builder<'static>> = LazyLock::new(|| {
    let mut cleaner = ammonia::Builder::default();
    cleaner
        .tags(HashSet::from(["a", "b", "br", "i", "img", "p", "span"]))
        .tag_attributes(HashMap::from([
            ("a", HashSet::from(["href"])),
            ("img", HashSet::from(["src", "alt"])),
        ]))
        .generic_attributes(HashSet::new())
        .link_rel(None)
        .strip_comments(true);
    cleaner
});

/// Extra passes allowed until the output reaches a fixed point
const MAX_PASSES: usize = 4;

/// Strip all markup outside the allow-list
///
/// Never fails. Sibling elements are never merged, so adjacent links and
/// paragraphs stay separate, and `<br>` is kept as an empty element.
///
/// # Example
/// ```
/// use wiki_iiif::utils::html::sanitize;
///
/// assert_eq!(
///     sanitize(r#"<p onclick="x()">Hi <script>alert(1)</script><b>there</b></p>"#),
///     "<p>Hi <b>there</b></p>"
/// );
/// ```
pub fn sanitize(html: &str) -> String {
    // Stripped containers can leave nesting (a in a, p in p) that reparses differently
    let mut cleaned = clean_once(html);
    for _ in 0..MAX_PASSES {
        let again = clean_once(&cleaned);
        if again == cleaned {
            break;
        }
        cleaned = again;
    }
    cleaned
}

fn clean_once(html: &str) -> String {
    SANITIZER.clean(html).to_string().trim().to_string()
}
