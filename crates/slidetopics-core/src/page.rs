use once_cell::sync::Lazy;
use regex::Regex;

use crate::backend::PageText;
use crate::config::Thresholds;
use crate::normalize::normalize_text;
use crate::Candidate;

/// Structural markers, course banners and date stamps that are never topics.
///
/// Matched against the normalized form, so punctuation is already gone
/// ("Q&A" → "qa", "Today's" → "todays").
static BOILERPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)^(?:
            # generic structural markers
            (?:slide|page|chapter|section|lecture|part|unit)\s*\d*
            # table of contents / navigation
            | contents? | table\s*of\s*contents | outline | agenda | overview | roadmap
            | todays?\s*(?:lecture|class|agenda|topic)s?
            # intro / conclusion
            | introduction | intro | conclusions? | summary | recap | review
            # q&a and closing slides
            | questions? | q\s*a\s* | thank\s*you.* | thanks.* | the\s*end
            # references
            | references? | bibliography | further\s*reading | resources?
            # institutional and personnel banners
            | .*frankfurt\s*school.* | .*fs\s*frankfurt.*
            | .*university.* | .*professor.* | .*instructor.*
            | .*\bdr\b\s*\w+.* | .*\bphd\b.*
            | .*department\s*of.* | .*course\s*(?:code|number).*
            # semester and date markers
            | .*semester.* | .*(?:spring|fall|winter)\s*\d{4}.* | .*academic\s*year.*
        )$",
    )
    .unwrap()
});

static PAGE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\s\-/]+$").unwrap());

/// Whether `text` is boilerplate (course name, navigation slide, closing slide, ...).
pub fn is_boilerplate(text: &str) -> bool {
    BOILERPLATE_RE.is_match(&normalize_text(text))
}

/// Structural validity of a heading line: length, alphanumeric share,
/// page-number shape, boilerplate.
pub fn is_valid_candidate_line(text: &str, thresholds: &Thresholds) -> bool {
    let text = text.trim();
    let len = text.chars().count();

    if len < thresholds.min_line_chars || len > thresholds.max_line_chars {
        return false;
    }

    let alnum = text.chars().filter(|c| c.is_alphanumeric()).count();
    if (alnum as f64) < len as f64 * thresholds.min_alnum_ratio {
        return false;
    }

    if PAGE_NUMBER_RE.is_match(text) {
        return false;
    }

    !is_boilerplate(text)
}

/// Pick the heading lines of one page.
///
/// Only lines set in (nearly) the page's largest font survive, minus
/// anything in the header/footer bands and anything failing
/// [`is_valid_candidate_line`]. A page with no headings yields nothing.
pub fn extract_page_candidates(
    page: &PageText,
    page_num: usize,
    thresholds: &Thresholds,
) -> Vec<Candidate> {
    // Fragments of two characters or fewer never count, not even toward the
    // page's max font size.
    let lines: Vec<_> = page
        .lines
        .iter()
        .filter(|l| l.text.trim().chars().count() > 2)
        .collect();

    let Some(max_font) = lines.iter().map(|l| l.font_size).reduce(f32::max) else {
        return Vec::new();
    };

    let top = page.height * thresholds.header_band;
    let bottom = page.height * thresholds.footer_band;

    lines
        .into_iter()
        .filter(|l| l.font_size >= max_font * thresholds.font_tolerance)
        .filter(|l| top < l.y && l.y < bottom)
        .filter(|l| is_valid_candidate_line(&l.text, thresholds))
        .map(|l| Candidate::new(l.text.trim(), l.font_size, page_num))
        .collect()
}
