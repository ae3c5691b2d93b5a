use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::error::Skip;

static MARKER: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div[onmouseover]").unwrap());
static EMPHASIS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("em").unwrap());

/// Recover the correct response hidden in the hover handler of `carrier`.
///
/// The handler holds a JavaScript call whose string argument is an HTML
/// snippet; the response is the first `<em>` in that snippet.
pub fn resolve(carrier: ElementRef) -> Result<String, Skip> {
    let marker = carrier.select(&MARKER).next().ok_or(Skip::NoAnswer)?;
    let handler = marker.value().attr("onmouseover").ok_or(Skip::NoAnswer)?;
    let fragment = parse_fragment(handler).ok_or(Skip::EmptyFragment)?;
    first_emphasis(&fragment)
        .map(|answer| unescape(&answer))
        .ok_or(Skip::NoEmphasis)
}

/// Parse `raw` in its own tree, isolated from the page it came from.
/// An empty snippet yields nothing.
pub fn parse_fragment(raw: &str) -> Option<Html> {
    if raw.trim().is_empty() {
        return None;
    }
    Some(Html::parse_fragment(raw))
}

fn first_emphasis(fragment: &Html) -> Option<String> {
    fragment
        .select(&EMPHASIS)
        .next()
        .map(|em| em.text().collect::<String>())
}

/// Undo the JavaScript string escaping of quotes.
fn unescape(answer: &str) -> String {
    answer.replace("\\'", "'").replace("\\\"", "\"")
}
