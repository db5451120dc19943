//! Metrics for the Helvetica family of the PDF standard 14 fonts.
//!
//! Standard fonts are never embedded; viewers supply them. Text is encoded with
//! `WinAnsiEncoding`, so only characters that encoding covers can be drawn.

/// Ascender height in 1/1000 em, shared by all four faces
pub(crate) const ASCENDER: f32 = 718.0;
/// Descender depth in 1/1000 em, shared by all four faces
pub(crate) const DESCENDER: f32 = -207.0;

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Characters outside printable ASCII: (char, WinAnsi code, regular width, bold width)
#[rustfmt::skip]
const EXTRAS: [(char, u8, u16, u16); 14] = [
    ('\u{00A0}', 0xA0, 278, 278),
    ('\u{2022}', 0x95, 350, 350),
    ('\u{2013}', 0x96, 556, 556),
    ('\u{2014}', 0x97, 1000, 1000),
    ('\u{2018}', 0x91, 222, 278),
    ('\u{2019}', 0x92, 222, 278),
    ('\u{201C}', 0x93, 333, 500),
    ('\u{201D}', 0x94, 333, 500),
    ('\u{2026}', 0x85, 1000, 1000),
    ('\u{20AC}', 0x80, 556, 556),
    ('\u{00A9}', 0xA9, 737, 737),
    ('\u{00AE}', 0xAE, 737, 737),
    ('\u{00B0}', 0xB0, 400, 400),
    ('\u{00B7}', 0xB7, 278, 278),
];

/// One of the four faces of the Helvetica family
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StandardFace {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl StandardFace {
    /// Pick the face for a combination of weight and slant
    pub fn for_style(bold: bool, italic: bool) -> StandardFace {
        match (bold, italic) {
            (false, false) => StandardFace::Helvetica,
            (true, false) => StandardFace::HelveticaBold,
            (false, true) => StandardFace::HelveticaOblique,
            (true, true) => StandardFace::HelveticaBoldOblique,
        }
    }

    /// The PostScript name viewers resolve the face by
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFace::Helvetica => "Helvetica",
            StandardFace::HelveticaBold => "Helvetica-Bold",
            StandardFace::HelveticaOblique => "Helvetica-Oblique",
            StandardFace::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(
            self,
            StandardFace::HelveticaBold | StandardFace::HelveticaBoldOblique
        )
    }

    /// The `WinAnsiEncoding` byte for a character, if the encoding has one
    pub(crate) fn encode(ch: char) -> Option<u8> {
        match ch {
            ' '..='~' => Some(ch as u8),
            '\u{00C0}'..='\u{00FF}' => Some(ch as u32 as u8),
            _ => EXTRAS
                .iter()
                .find(|(c, ..)| *c == ch)
                .map(|&(_, code, ..)| code),
        }
    }

    /// Horizontal advance in 1/1000 em, [None] if the face cannot draw `ch`
    pub(crate) fn advance(&self, ch: char) -> Option<u16> {
        let bold = self.is_bold();
        let table = if bold {
            &HELVETICA_BOLD_WIDTHS
        } else {
            &HELVETICA_WIDTHS
        };
        match ch {
            ' '..='~' => Some(table[ch as usize - 0x20]),
            '\u{00C0}'..='\u{00FF}' => Some(self.latin1_advance(ch, table)),
            _ => EXTRAS
                .iter()
                .find(|(c, ..)| *c == ch)
                .map(|&(_, _, regular, heavy)| if bold { heavy } else { regular }),
        }
    }

    fn latin1_advance(&self, ch: char, table: &[u16; 95]) -> u16 {
        let ascii = |c: char| table[c as usize - 0x20];
        let bold = self.is_bold();
        match ch {
            'Æ' => 1000,
            'æ' => 889,
            'ß' | 'ø' => 611,
            '×' | '÷' => 584,
            'Ø' => 778,
            'Ð' => ascii('D'),
            'Þ' => ascii('P'),
            'ð' => ascii('o'),
            'þ' => ascii('p'),
            'ì'..='ï' => 278,
            _ => {
                let base = match ch {
                    'À'..='Å' => 'A',
                    'Ç' => 'C',
                    'È'..='Ë' => 'E',
                    'Ì'..='Ï' => 'I',
                    'Ñ' => 'N',
                    'Ò'..='Ö' => 'O',
                    'Ù'..='Ü' => 'U',
                    'Ý' => 'Y',
                    'à'..='å' => 'a',
                    'ç' => 'c',
                    'è'..='ë' => 'e',
                    'ñ' => 'n',
                    'ò'..='ö' => 'o',
                    'ù'..='ü' => 'u',
                    'ý' | 'ÿ' => 'y',
                    _ => '?',
                };
                if base == '?' && bold {
                    611
                } else {
                    ascii(base)
                }
            }
        }
    }
}
