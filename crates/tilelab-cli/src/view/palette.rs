use ratatui::style::Color;

mod color {
    use ratatui::style::Color;

    // ColorBrewer Dark2
    pub const TEAL: Color = Color::Rgb(0x1b, 0x9e, 0x77);
    pub const ORANGE: Color = Color::Rgb(0xd9, 0x5f, 0x02);
    pub const PURPLE: Color = Color::Rgb(0x75, 0x70, 0xb3);
    pub const PINK: Color = Color::Rgb(0xe7, 0x29, 0x8a);
    pub const GREEN: Color = Color::Rgb(0x66, 0xa6, 0x1e);
    pub const MUSTARD: Color = Color::Rgb(0xe6, 0xab, 0x02);
    pub const BROWN: Color = Color::Rgb(0xa6, 0x76, 0x1d);
    pub const GRAY: Color = Color::Rgb(0x66, 0x66, 0x66);
}

/// Series colours, handed out in order and reused once exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark2()
    }
}

impl Palette {
    pub const DARK2: [Color; 8] = [
        color::TEAL,
        color::ORANGE,
        color::PURPLE,
        color::PINK,
        color::GREEN,
        color::MUSTARD,
        color::BROWN,
        color::GRAY,
    ];

    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    pub fn dark2() -> Self {
        Self::new(Self::DARK2.to_vec())
    }

    /// Colour of the `index`-th series. An empty palette yields the terminal
    /// default.
    pub fn color(&self, index: usize) -> Color {
        index
            .checked_rem(self.colors.len())
            .map_or(Color::Reset, |i| self.colors[i])
    }
}
