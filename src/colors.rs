use crossterm::event::KeyCode;
use crossterm::style::Color;

/// Dot tier carrying the location marker; red in every scheme.
pub const MARKER_TIER: u8 = 4;

/// Shared color scheme state
#[derive(Clone, Copy)]
pub struct ColorState {
    pub scheme: u8,
}

impl ColorState {
    pub fn new(default_scheme: u8) -> Self {
        Self { scheme: default_scheme }
    }

    /// Handle color scheme key input. Returns true if key was handled.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('!') => self.scheme = 1,  // Shift+1: fire
            KeyCode::Char('@') => self.scheme = 2,  // Shift+2: ice
            KeyCode::Char('#') => self.scheme = 3,  // Shift+3: pink
            KeyCode::Char('$') => self.scheme = 4,  // Shift+4: gold
            KeyCode::Char('%') => self.scheme = 5,  // Shift+5: electric
            KeyCode::Char('^') => self.scheme = 6,  // Shift+6: lava
            KeyCode::Char('&') => self.scheme = 7,  // Shift+7: mono
            KeyCode::Char('*') => self.scheme = 8,  // Shift+8: forest
            KeyCode::Char('(') => self.scheme = 9,  // Shift+9: neon
            KeyCode::Char(')') => self.scheme = 0,  // Shift+0: ocean
            _ => return false,
        }
        true
    }
}

/// Resolve a dot intensity tier under the given scheme.
/// Tier 1 is dim detail (night side, limb), 2 the regular graticule,
/// 3 highlighted lines (equator, prime meridian, terminator).
pub fn globe_color(scheme: u8, tier: u8) -> (Color, bool) {
    if tier >= MARKER_TIER {
        return (Color::Red, true);
    }
    match scheme {
        1 => match tier {  // Red/Yellow (fire)
            0 | 1 => (Color::DarkRed, false),
            2 => (Color::Red, false),
            _ => (Color::Yellow, true),
        },
        2 => match tier {  // Blue/Cyan (ice)
            0 | 1 => (Color::DarkBlue, false),
            2 => (Color::Cyan, false),
            _ => (Color::Cyan, true),
        },
        3 => match tier {  // Magenta/Pink (pink)
            0 | 1 => (Color::DarkMagenta, false),
            2 => (Color::Magenta, false),
            _ => (Color::AnsiValue(13), true),  // Bright magenta
        },
        4 => match tier {  // Yellow/Gold (gold)
            0 | 1 => (Color::DarkYellow, false),
            2 => (Color::Yellow, false),
            _ => (Color::AnsiValue(11), true),  // Bright yellow
        },
        5 => match tier {  // Cyan/Electric (electric)
            0 | 1 => (Color::DarkCyan, false),
            2 => (Color::Cyan, false),
            _ => (Color::AnsiValue(14), true),  // Bright cyan
        },
        6 => match tier {  // Red/Magenta (lava)
            0 | 1 => (Color::DarkRed, false),
            2 => (Color::Magenta, false),
            _ => (Color::AnsiValue(9), true),  // Bright red
        },
        7 => match tier {  // White/Grey (mono)
            0 | 1 => (Color::DarkGrey, false),
            2 => (Color::Grey, false),
            _ => (Color::White, true),
        },
        8 => match tier {  // Green (forest)
            0 | 1 => (Color::DarkGreen, false),
            2 => (Color::Green, false),
            _ => (Color::AnsiValue(10), true),  // Bright green
        },
        9 => match tier {  // Blue/Magenta (neon)
            0 | 1 => (Color::DarkBlue, false),
            2 => (Color::Magenta, false),
            _ => (Color::AnsiValue(13), true),  // Bright magenta
        },
        _ => match tier {  // Default: Blue/White (ocean)
            0 | 1 => (Color::DarkBlue, false),
            2 => (Color::Blue, false),
            _ => (Color::White, true),
        },
    }
}
