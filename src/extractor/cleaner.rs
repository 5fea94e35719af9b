use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Layout chrome whose text must never reach the title or body.
const NOISE: &str = "script, style, noscript, template, iframe, \
     nav, footer, aside, \
     [role='navigation'], [role='contentinfo'], [role='complementary'], \
     .sidebar, #sidebar, .side-bar, \
     .ad, .ads, .advert, .advertisement, .ad-container, .sponsored, [id^='ad-']";

static NOISE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse(NOISE).unwrap());

/// Detach every noise element (and so its subtree) from the document.
///
/// Returns how many elements were removed.
pub fn strip_noise(document: &mut Html) -> usize {
    let ids: Vec<_> = document
        .root_element()
        .select(&NOISE_SELECTOR)
        .map(|el| el.id())
        .collect();

    let mut removed = 0;
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
            removed += 1;
        }
    }
    removed
}
