use std::collections::HashMap;

/// Heading id generator. Repeated headings get `-1`, `-2`, ... suffixes.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    /// Creates an empty slugger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a slug for `text` that is unique within this slugger.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        slug
    }
}

/// Lowercase `text`, keep letters, digits, combining marks, `-` and `_`,
/// turn spaces into hyphens and drop everything else. Hyphens are neither
/// collapsed nor trimmed, matching GitHub's anchors.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            ' ' => slug.push('-'),
            '-' | '_' => slug.push(ch),
            c if c.is_ascii_alphanumeric() => slug.push(c.to_ascii_lowercase()),
            c if !c.is_ascii() && (c.is_alphanumeric() || is_combining_mark(c)) => {
                slug.extend(c.to_lowercase());
            }
            _ => {}
        }
    }
    if slug.is_empty() {
        slug.push_str("section");
    }
    slug
}

/// Combining marks (diacritics, viramas, nukta, vowel signs) common in
/// headings. Dropping them would corrupt Indic, Thai, Arabic and Hebrew text.
fn is_combining_mark(ch: char) -> bool {
    matches!(
        ch as u32,
        0x0300..=0x036F
            | 0x0591..=0x05C7
            | 0x0610..=0x061A
            | 0x064B..=0x065F
            | 0x0670
            | 0x0900..=0x0903
            | 0x093A..=0x094F
            | 0x0951..=0x0957
            | 0x0962..=0x0963
            | 0x0980..=0x0983
            | 0x09BC..=0x09CD
            | 0x0A01..=0x0A4D
            | 0x0A81..=0x0ACD
            | 0x0B01..=0x0BCD
            | 0x0E31..=0x0E3A
            | 0x0E47..=0x0E4E
            | 0x1AB0..=0x1AFF
            | 0x1DC0..=0x1DFF
            | 0x3099..=0x309A
            | 0xFE20..=0xFE2F
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Why Folio?"), "why-folio");
        assert_eq!(slugify("Q&A"), "qa");
    }

    #[test]
    fn hyphens_are_not_collapsed() {
        assert_eq!(slugify("  a---b  "), "--a---b--");
        assert_eq!(slugify("Tools & Tips"), "tools--tips");
    }

    #[test]
    fn unicode_is_kept() {
        assert_eq!(slugify("Héllo Wörld"), "héllo-wörld");
        assert_eq!(slugify("安装 Guide"), "安装-guide");
        assert_eq!(slugify("स्लॉट्स"), "स्लॉट्स");
    }

    #[test]
    fn emoji_and_punctuation_are_dropped() {
        assert_eq!(slugify("🚀 Launch"), "-launch");
        assert_eq!(slugify("!!!"), "section");
    }

    #[test]
    fn duplicates_get_suffixes() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Intro"), "intro");
        assert_eq!(slugger.slug("Intro"), "intro-1");
        assert_eq!(slugger.slug("intro"), "intro-2");
        assert_eq!(slugger.slug("Other"), "other");
    }
}
