#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    pub annotation_start: char,
    pub annotation_line: char,
    pub annotation_end: char,
    pub annotation_single: char,
}

pub fn select(fancy_requested: bool) -> Glyphs {
    if fancy_requested {
        fancy()
    } else {
        ascii()
    }
}

pub fn ascii() -> Glyphs {
    Glyphs {
        annotation_start: '[',
        annotation_line: '-',
        annotation_end: ']',
        annotation_single: '|',
    }
}

pub fn fancy() -> Glyphs {
    Glyphs {
        annotation_start: '└',
        annotation_line: '─',
        annotation_end: '┘',
        annotation_single: '╵',
    }
}
