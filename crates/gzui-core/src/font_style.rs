//! Font styles referenced by the `font` attribute.
//!
//! Styles live in the `[Font Styles]` section of `FontStyle.ini`:
//!
//! ```text
//! [Font Styles]
//! ; name = face list, size, params separated by |, guid
//! "Dialog Title" = "ITC Benguiat Gothic", 14, bold | aa=1 | linespacing=2, {0x1234}
//! ```

use std::collections::BTreeMap;

/// One parsed font style.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontStyle {
    pub face: String,
    pub size: u32,
    pub bold: bool,
    pub underline: bool,
    pub line_spacing: i32,
    pub antialiasing: String,
    pub xscale: f32,
}

/// Parse the `[Font Styles]` section, keyed by style name.
///
/// Lines that do not follow the `name = face, size, params, guid` shape are
/// skipped and logged.
#[must_use]
pub fn parse_font_styles(source: &str) -> BTreeMap<String, FontStyle> {
    let mut styles = BTreeMap::new();
    let mut in_section = false;

    for raw_line in source.lines() {
        let line: String = raw_line
            .chars()
            .filter(|c| *c != '\t' && *c != '"')
            .collect();
        let line = line.trim();

        if line == "[Font Styles]" {
            in_section = true;
            continue;
        }
        if line.starts_with('[') {
            in_section = false;
        }
        if !in_section || line.is_empty() || line.starts_with(';') {
            continue;
        }

        match parse_style_line(line) {
            Some((name, style)) => {
                styles.insert(name, style);
            }
            None => crate::warn!(line = line, "skipping malformed font style"),
        }
    }

    styles
}

fn parse_style_line(line: &str) -> Option<(String, FontStyle)> {
    let (name, values) = line.split_once('=')?;
    let mut fields = values.splitn(4, ',');
    let face = fields.next()?.trim();
    let size = fields.next()?.trim().parse().ok()?;
    let params = fields.next()?;
    fields.next()?;

    let mut style = FontStyle {
        face: face.to_string(),
        size,
        xscale: 1.0,
        ..FontStyle::default()
    };
    for param in params.split('|').map(str::trim) {
        match param.split_once('=') {
            Some(("aa", value)) => style.antialiasing = value.to_string(),
            Some(("linespacing", value)) => style.line_spacing = value.parse().unwrap_or(0),
            Some(("xscale", value)) => style.xscale = value.parse().unwrap_or(1.0),
            Some(_) => {}
            None if param == "bold" => style.bold = true,
            None if param == "underline" => style.underline = true,
            None => {}
        }
    }

    Some((name.trim().to_string(), style))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INI: &str = "\
[Setup]
Foo = \"Bar\", 1, none, {0}

[Font Styles]
; comment line
\"Dialog Title\"\t= \"ITC Benguiat Gothic\", 14, bold | aa=1 | linespacing=2, {0x1}
Body = \"HelveticaNeueLT Std Medium\", 9, underline | xscale=0.85, {0x2}
Broken = only a face
Plain = Arial, 10, , {0x3}

[Other]
Ignored = Arial, 10, bold, {0x4}
";

    #[test]
    fn parses_section_only() {
        let styles = parse_font_styles(INI);
        assert_eq!(styles.len(), 3);
        assert!(!styles.contains_key("Foo"));
        assert!(!styles.contains_key("Ignored"));
        assert!(!styles.contains_key("Broken"));
    }

    #[test]
    fn parses_params() {
        let styles = parse_font_styles(INI);
        let title = &styles["Dialog Title"];
        assert_eq!(title.face, "ITC Benguiat Gothic");
        assert_eq!(title.size, 14);
        assert!(title.bold);
        assert!(!title.underline);
        assert_eq!(title.antialiasing, "1");
        assert_eq!(title.line_spacing, 2);
        assert_eq!(title.xscale, 1.0);

        let body = &styles["Body"];
        assert!(body.underline);
        assert!((body.xscale - 0.85).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_params_are_defaults() {
        let styles = parse_font_styles(INI);
        let plain = &styles["Plain"];
        assert_eq!(plain.face, "Arial");
        assert!(!plain.bold);
        assert_eq!(plain.xscale, 1.0);
    }
}
