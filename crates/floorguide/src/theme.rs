use eframe::egui::Color32;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    pub panel: Color32,
    pub map_background: Color32,
    pub map_border: Color32,
    pub marker_fill: Color32,
    pub marker_stroke: Color32,
    pub route: Color32,
    pub error: Color32,
    pub heading_size: f32,
    pub body_size: f32,
    pub label_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x0F, 0x17, 0x2A),
            foreground: Color32::from_rgb(0xCB, 0xD5, 0xE1),
            heading_color: Color32::from_rgb(0x7D, 0xD3, 0xFC),
            accent: Color32::from_rgb(0x0E, 0xA5, 0xE9),
            panel: Color32::from_rgb(0x1E, 0x29, 0x3B),
            map_background: Color32::from_rgb(0x33, 0x41, 0x55),
            map_border: Color32::from_rgb(0x47, 0x55, 0x69),
            marker_fill: Color32::from_rgb(0xFD, 0xE0, 0x47),
            marker_stroke: Color32::from_rgb(0x1E, 0x29, 0x3B),
            route: Color32::from_rgb(0xF8, 0x71, 0x71),
            error: Color32::from_rgb(0xF8, 0x71, 0x71),
            heading_size: 28.0,
            body_size: 18.0,
            label_size: 20.0,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(0xF8, 0xFA, 0xFC),
            foreground: Color32::from_rgb(0x1E, 0x29, 0x3B),
            heading_color: Color32::from_rgb(0x03, 0x69, 0xA1),
            accent: Color32::from_rgb(0x02, 0x84, 0xC7),
            panel: Color32::WHITE,
            map_background: Color32::from_rgb(0xE2, 0xE8, 0xF0),
            map_border: Color32::from_rgb(0x94, 0xA3, 0xB8),
            marker_fill: Color32::from_rgb(0xFA, 0xCC, 0x15),
            marker_stroke: Color32::from_rgb(0x1E, 0x29, 0x3B),
            route: Color32::from_rgb(0xDC, 0x26, 0x26),
            error: Color32::from_rgb(0xB9, 0x1C, 0x1C),
            heading_size: 28.0,
            body_size: 18.0,
            label_size: 20.0,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }
}

/// Parse the CSS colors used in building files: `#rgb`, `#rrggbb` and `hsl(h, s%, l%)`.
pub fn parse_css_color(value: &str) -> Option<Color32> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    let args = value.strip_prefix("hsl(")?.strip_suffix(')')?;
    let parts: Vec<f32> = args
        .split(',')
        .map(|p| p.trim().trim_end_matches('%').trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        &[h, s, l] => Some(hsl_to_rgb(h, s / 100.0, l / 100.0)),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<Color32> {
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;
    match digits.as_slice() {
        &[r, g, b] => Some(Color32::from_rgb(r * 17, g * 17, b * 17)),
        &[r1, r2, g1, g2, b1, b2] => Some(Color32::from_rgb(
            r1 * 16 + r2,
            g1 * 16 + g2,
            b1 * 16 + b2,
        )),
        _ => None,
    }
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Color32 {
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgb(channel(r1), channel(g1), channel(b1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_css_color("#d1d5db"), Some(Color32::from_rgb(0xD1, 0xD5, 0xDB)));
        assert_eq!(parse_css_color("#fff"), Some(Color32::WHITE));
        assert_eq!(parse_css_color("#12345"), None);
        assert_eq!(parse_css_color("#ggg"), None);
    }

    #[test]
    fn test_hsl_colors() {
        assert_eq!(parse_css_color("hsl(0, 100%, 50%)"), Some(Color32::from_rgb(255, 0, 0)));
        assert_eq!(parse_css_color("hsl(120, 100%, 50%)"), Some(Color32::from_rgb(0, 255, 0)));
        assert_eq!(parse_css_color("hsl(0, 0%, 100%)"), Some(Color32::WHITE));
        assert_eq!(parse_css_color("hsl(195, 50%, 85%)"), Some(Color32::from_rgb(198, 226, 236)));
    }

    #[test]
    fn test_unknown_colors() {
        assert_eq!(parse_css_color("tomato"), None);
        assert_eq!(parse_css_color("hsl(1, 2)"), None);
    }

    #[test]
    fn test_accent_readable_on_panel() {
        for theme in [Theme::dark(), Theme::light()] {
            assert_ne!(theme.accent, theme.panel, "{}", theme.name);
        }
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Theme::dark().toggled().name, "light");
        assert_eq!(Theme::from_name("anything").name, "dark");
    }
}
