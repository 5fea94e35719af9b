#![no_main]

use libfuzzer_sys::fuzz_target;

use critic::extractor::extract;
use critic::text::normalize;

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);

    // Neither extraction nor normalization may panic, whatever the markup
    let article = extract(&html);
    let _ = normalize(&article.title);
    let _ = normalize(&article.body);
});
