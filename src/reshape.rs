//! Contextual shaping and visual reordering of Arabic-script text, so a
//! renderer that lays glyphs out strictly left to right draws joined,
//! correctly ordered words.

use unicode_bidi::BidiInfo;

// Right-joining letters have no initial/medial forms.
#[derive(Debug, Clone, Copy)]
struct Forms {
    isolated: char,
    last: char,
    first: Option<char>,
    middle: Option<char>,
}

impl Forms {
    const fn dual(isolated: char, last: char, first: char, middle: char) -> Self {
        Self {
            isolated,
            last,
            first: Some(first),
            middle: Some(middle),
        }
    }

    const fn right(isolated: char, last: char) -> Self {
        Self {
            isolated,
            last,
            first: None,
            middle: None,
        }
    }

    const fn non_joining(isolated: char) -> Self {
        Self {
            isolated,
            last: isolated,
            first: None,
            middle: None,
        }
    }

    fn joins_forward(&self) -> bool {
        self.first.is_some()
    }

    fn joins_back(&self) -> bool {
        self.first.is_some() || self.last != self.isolated
    }
}

fn forms(c: char) -> Option<Forms> {
    let f = match c {
        'ء' => Forms::non_joining('\u{fe80}'),
        'آ' => Forms::right('\u{fe81}', '\u{fe82}'),
        'أ' => Forms::right('\u{fe83}', '\u{fe84}'),
        'ؤ' => Forms::right('\u{fe85}', '\u{fe86}'),
        'إ' => Forms::right('\u{fe87}', '\u{fe88}'),
        'ئ' => Forms::dual('\u{fe89}', '\u{fe8a}', '\u{fe8b}', '\u{fe8c}'),
        'ا' => Forms::right('\u{fe8d}', '\u{fe8e}'),
        'ب' => Forms::dual('\u{fe8f}', '\u{fe90}', '\u{fe91}', '\u{fe92}'),
        'ة' => Forms::right('\u{fe93}', '\u{fe94}'),
        'ت' => Forms::dual('\u{fe95}', '\u{fe96}', '\u{fe97}', '\u{fe98}'),
        'ث' => Forms::dual('\u{fe99}', '\u{fe9a}', '\u{fe9b}', '\u{fe9c}'),
        'ج' => Forms::dual('\u{fe9d}', '\u{fe9e}', '\u{fe9f}', '\u{fea0}'),
        'ح' => Forms::dual('\u{fea1}', '\u{fea2}', '\u{fea3}', '\u{fea4}'),
        'خ' => Forms::dual('\u{fea5}', '\u{fea6}', '\u{fea7}', '\u{fea8}'),
        'د' => Forms::right('\u{fea9}', '\u{feaa}'),
        'ذ' => Forms::right('\u{feab}', '\u{feac}'),
        'ر' => Forms::right('\u{fead}', '\u{feae}'),
        'ز' => Forms::right('\u{feaf}', '\u{feb0}'),
        'س' => Forms::dual('\u{feb1}', '\u{feb2}', '\u{feb3}', '\u{feb4}'),
        'ش' => Forms::dual('\u{feb5}', '\u{feb6}', '\u{feb7}', '\u{feb8}'),
        'ص' => Forms::dual('\u{feb9}', '\u{feba}', '\u{febb}', '\u{febc}'),
        'ض' => Forms::dual('\u{febd}', '\u{febe}', '\u{febf}', '\u{fec0}'),
        'ط' => Forms::dual('\u{fec1}', '\u{fec2}', '\u{fec3}', '\u{fec4}'),
        'ظ' => Forms::dual('\u{fec5}', '\u{fec6}', '\u{fec7}', '\u{fec8}'),
        'ع' => Forms::dual('\u{fec9}', '\u{feca}', '\u{fecb}', '\u{fecc}'),
        'غ' => Forms::dual('\u{fecd}', '\u{fece}', '\u{fecf}', '\u{fed0}'),
        'ـ' => Forms::dual('ـ', 'ـ', 'ـ', 'ـ'),
        'ف' => Forms::dual('\u{fed1}', '\u{fed2}', '\u{fed3}', '\u{fed4}'),
        'ق' => Forms::dual('\u{fed5}', '\u{fed6}', '\u{fed7}', '\u{fed8}'),
        'ك' => Forms::dual('\u{fed9}', '\u{feda}', '\u{fedb}', '\u{fedc}'),
        'ل' => Forms::dual('\u{fedd}', '\u{fede}', '\u{fedf}', '\u{fee0}'),
        'م' => Forms::dual('\u{fee1}', '\u{fee2}', '\u{fee3}', '\u{fee4}'),
        'ن' => Forms::dual('\u{fee5}', '\u{fee6}', '\u{fee7}', '\u{fee8}'),
        'ه' => Forms::dual('\u{fee9}', '\u{feea}', '\u{feeb}', '\u{feec}'),
        'و' => Forms::right('\u{feed}', '\u{feee}'),
        'ى' => Forms::right('\u{feef}', '\u{fef0}'),
        'ي' => Forms::dual('\u{fef1}', '\u{fef2}', '\u{fef3}', '\u{fef4}'),
        'پ' => Forms::dual('\u{fb56}', '\u{fb57}', '\u{fb58}', '\u{fb59}'),
        'چ' => Forms::dual('\u{fb7a}', '\u{fb7b}', '\u{fb7c}', '\u{fb7d}'),
        'ژ' => Forms::right('\u{fb8a}', '\u{fb8b}'),
        'ک' => Forms::dual('\u{fb8e}', '\u{fb8f}', '\u{fb90}', '\u{fb91}'),
        'گ' => Forms::dual('\u{fb92}', '\u{fb93}', '\u{fb94}', '\u{fb95}'),
        'ی' => Forms::dual('\u{fbfc}', '\u{fbfd}', '\u{fbfe}', '\u{fbff}'),
        'ۀ' => Forms::right('\u{fba4}', '\u{fba5}'),
        _ => return None,
    };
    Some(f)
}

fn lam_alef(alef: char) -> Option<(char, char)> {
    match alef {
        'آ' => Some(('\u{fef5}', '\u{fef6}')),
        'أ' => Some(('\u{fef7}', '\u{fef8}')),
        'إ' => Some(('\u{fef9}', '\u{fefa}')),
        'ا' => Some(('\u{fefb}', '\u{fefc}')),
        _ => None,
    }
}

fn is_transparent(c: char) -> bool {
    matches!(c, '\u{0610}'..='\u{061a}' | '\u{064b}'..='\u{065f}' | '\u{0670}' | '\u{06d6}'..='\u{06ed}')
}

/// Replaces Arabic-script letters by their contextual presentation forms.
pub fn reshape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    // Whether the previous non-transparent character joins forward.
    let mut joins_back = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_transparent(c) {
            out.push(c);
            i += 1;
            continue;
        }

        let f = match forms(c) {
            Some(f) => f,
            None => {
                out.push(c);
                joins_back = false;
                i += 1;
                continue;
            }
        };

        let next = (i + 1..chars.len()).find(|&j| !is_transparent(chars[j]));

        if c == 'ل' {
            if let Some((j, (isolated, last))) =
                next.and_then(|j| lam_alef(chars[j]).map(|ligature| (j, ligature)))
            {
                out.push(if joins_back { last } else { isolated });
                out.extend(&chars[i + 1..j]);
                joins_back = false;
                i = j + 1;
                continue;
            }
        }

        let next_joins = f.joins_forward()
            && next.map_or(false, |j| forms(chars[j]).map_or(false, |nf| nf.joins_back()));

        let connected = joins_back && f.joins_back();
        let shaped = match (connected, next_joins) {
            (true, true) => f.middle.unwrap_or(f.last),
            (true, false) => f.last,
            (false, true) => f.first.unwrap_or(f.isolated),
            (false, false) => f.isolated,
        };
        out.push(shaped);
        joins_back = f.joins_forward();
        i += 1;
    }
    out
}

/// Reorders each paragraph from logical to visual order.
pub fn get_display(text: &str) -> String {
    let bidi = BidiInfo::new(text, None);
    let mut out = String::with_capacity(text.len());
    for para in &bidi.paragraphs {
        out.push_str(&bidi.reorder_line(para, para.range.clone()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reshape_joins_letters() {
        // ب م ب: initial, medial, final.
        assert_eq!(reshape("بمب"), "\u{fe91}\u{fee4}\u{fe90}");
        // Right-joining dal breaks the word after it.
        assert_eq!(reshape("بدب"), "\u{fe91}\u{feaa}\u{fe8f}");
    }

    #[test]
    fn reshape_persian_letters() {
        // گ ل: initial gaf, final lam.
        assert_eq!(reshape("گل"), "\u{fb94}\u{fede}");
        assert_eq!(reshape("ی"), "\u{fbfc}");
    }

    #[test]
    fn reshape_lam_alef() {
        assert_eq!(reshape("لا"), "\u{fefb}");
        // Harakat between lam and alef keep the ligature and follow it.
        assert_eq!(reshape("لَا"), "\u{fefb}\u{064e}");
        assert_eq!(reshape("سلَام"), "\u{feb3}\u{fefc}\u{064e}\u{fee1}");
        // س + lam-alef: the ligature takes its final form.
        assert_eq!(reshape("سلام"), "\u{feb3}\u{fefc}\u{fee1}");
    }

    #[test]
    fn reshape_skips_harakat() {
        assert_eq!(reshape("بَب"), "\u{fe91}\u{064e}\u{fe90}");
    }

    #[test]
    fn reshape_keeps_other_scripts() {
        assert_eq!(reshape("rust 2021!"), "rust 2021!");
        assert_eq!(reshape("ب b"), "\u{fe8f} b");
    }

    #[test]
    fn hamza_does_not_join() {
        assert_eq!(reshape("بء"), "\u{fe8f}\u{fe80}");
    }

    #[test]
    fn get_display_reverses_rtl() {
        assert_eq!(get_display("abc"), "abc");
        assert_eq!(get_display("سلام"), "مالس");
        assert_eq!(get_display("سلام دنیا"), "ایند مالس");
    }
}
