//! Advance widths for the standard Helvetica faces, from the Adobe AFM files.
//!
//! Widths are in 1/1000 em for the printable ASCII range 32..=126. Other
//! characters use [`FALLBACK_WIDTH`].

/// Width used for characters outside the table.
pub const FALLBACK_WIDTH: u16 = 556;

const FIRST_CHAR: u32 = 32;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    // space ! " # $ % & ' ( )
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333,
    // * + , - . / 0 1 2 3
    389, 584, 278, 333, 278, 278, 556, 556, 556, 556,
    // 4 5 6 7 8 9 : ; < =
    556, 556, 556, 556, 556, 556, 278, 278, 584, 584,
    // > ? @ A B C D E F G
    584, 556, 1015, 667, 667, 722, 722, 667, 611, 778,
    // H I J K L M N O P Q
    722, 278, 500, 667, 556, 833, 722, 778, 667, 778,
    // R S T U V W X Y Z [
    722, 667, 611, 722, 667, 944, 667, 667, 611, 278,
    // \ ] ^ _ ` a b c d e
    278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    // f g h i j k l m n o
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    // p q r s t u v w x y
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500,
    // z { | } ~
    500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    // space ! " # $ % & ' ( )
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333,
    // * + , - . / 0 1 2 3
    389, 584, 278, 333, 278, 278, 556, 556, 556, 556,
    // 4 5 6 7 8 9 : ; < =
    556, 556, 556, 556, 556, 556, 333, 333, 584, 584,
    // > ? @ A B C D E F G
    584, 611, 975, 722, 722, 722, 722, 667, 611, 778,
    // H I J K L M N O P Q
    722, 278, 556, 722, 611, 833, 722, 778, 667, 778,
    // R S T U V W X Y Z [
    722, 667, 611, 722, 667, 944, 667, 667, 611, 333,
    // \ ] ^ _ ` a b c d e
    278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    // f g h i j k l m n o
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    // p q r s t u v w x y
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556,
    // z { | } ~
    500, 389, 280, 389, 584,
];

/// Width table for one standard face.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    widths: &'static [u16; 95],
}

impl StandardFontMetrics {
    pub const HELVETICA: StandardFontMetrics = StandardFontMetrics { widths: &HELVETICA };
    pub const HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
        widths: &HELVETICA_BOLD,
    };

    /// Advance width in 1/1000 em.
    pub fn advance(&self, ch: char) -> u16 {
        let code = ch as u32;
        if (FIRST_CHAR..FIRST_CHAR + 95).contains(&code) {
            self.widths[(code - FIRST_CHAR) as usize]
        } else if ch == '\u{00A0}' {
            self.widths[0]
        } else {
            FALLBACK_WIDTH
        }
    }

    /// Advance width in points at `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.advance(ch) as f64 / 1000.0 * font_size
    }
}
