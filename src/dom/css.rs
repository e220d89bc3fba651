//! Lightweight CSS property extraction and cascade.
//!
//! Parses inline `style=""` attributes and `<style>` element text into a
//! small set of properties that layout and visibility checks care about.
//! Selectors are limited to compound simple selectors (`tag`, `.class`,
//! `#id`, `*` and combinations such as `p.note`); rules using combinators,
//! pseudo-classes or attribute selectors are skipped.

use super::{Document, ElementData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Inline,
    Block,
    InlineBlock,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

/// Declared CSS properties. `None` means "not specified here".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleProps {
    pub display: Option<Display>,
    pub visibility: Option<Visibility>,
    pub opacity: Option<f32>,
    pub position: Option<Position>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub color: Option<[f32; 4]>,
    pub background_color: Option<[f32; 4]>,
    pub font_size: Option<f32>,
}

impl StyleProps {
    /// Overlay every property `other` specifies on top of `self`.
    pub fn merge(&mut self, other: &StyleProps) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(display, visibility, opacity, position, width, height, color, background_color, font_size);
    }
}

/// Final style of an element after user-agent defaults, stylesheet rules
/// and the inline style have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub opacity: f32,
    pub position: Position,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub color: Option<[f32; 4]>,
    pub background_color: Option<[f32; 4]>,
    pub font_size: Option<f32>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Inline,
            visibility: Visibility::Visible,
            opacity: 1.0,
            position: Position::Static,
            width: None,
            height: None,
            color: None,
            background_color: None,
            font_size: None,
        }
    }
}

impl ComputedStyle {
    fn from_props(props: &StyleProps) -> Self {
        let base = Self::default();
        Self {
            display: props.display.unwrap_or(base.display),
            visibility: props.visibility.unwrap_or(base.visibility),
            opacity: props.opacity.unwrap_or(base.opacity),
            position: props.position.unwrap_or(base.position),
            width: props.width,
            height: props.height,
            color: props.color,
            background_color: props.background_color,
            font_size: props.font_size,
        }
    }
}

pub const BLOCK_TAGS: &[&str] = &[
    "html",
    "body",
    "div",
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "li",
    "table",
    "tr",
    "td",
    "th",
    "form",
    "section",
    "article",
    "aside",
    "main",
    "header",
    "footer",
    "nav",
    "blockquote",
    "pre",
    "figure",
    "figcaption",
    "details",
    "summary",
    "hr",
];

/// Tags the user-agent stylesheet never renders.
const HIDDEN_TAGS: &[&str] = &[
    "head", "script", "style", "title", "template", "noscript", "meta", "link", "base",
];

/// User-agent defaults for a tag.
pub fn user_agent_style(el: &ElementData) -> StyleProps {
    let tag = el.tag.as_str();
    let display = if HIDDEN_TAGS.contains(&tag) || el.has_attr("hidden") {
        Display::None
    } else if BLOCK_TAGS.contains(&tag) {
        Display::Block
    } else {
        Display::Inline
    };
    StyleProps {
        display: Some(display),
        ..StyleProps::default()
    }
}

/// Parse an inline `style="..."` attribute value (or a rule body).
pub fn parse_inline_style(style: &str) -> StyleProps {
    let mut props = StyleProps::default();
    for decl in style.split(';') {
        let parts: Vec<&str> = decl.splitn(2, ':').collect();
        if parts.len() != 2 {
            continue;
        }
        let prop = parts[0].trim().to_ascii_lowercase();
        let val = parts[1].trim();
        let val = val.strip_suffix("!important").unwrap_or(val).trim();
        match prop.as_str() {
            "display" => props.display = parse_display(val),
            "visibility" => props.visibility = parse_visibility(val),
            "opacity" => props.opacity = parse_opacity(val),
            "position" => props.position = parse_position(val),
            "width" => props.width = parse_css_size(val),
            "height" => props.height = parse_css_size(val),
            "color" => props.color = parse_css_color(val),
            "background-color" | "background" => props.background_color = parse_css_color(val),
            "font-size" => props.font_size = parse_css_size(val),
            _ => {}
        }
    }
    props
}

fn parse_display(val: &str) -> Option<Display> {
    match val.to_ascii_lowercase().as_str() {
        "none" => Some(Display::None),
        "inline" => Some(Display::Inline),
        "inline-block" | "inline-flex" | "inline-grid" => Some(Display::InlineBlock),
        "block" | "flex" | "grid" | "list-item" | "table" | "flow-root" => Some(Display::Block),
        _ => None,
    }
}

fn parse_visibility(val: &str) -> Option<Visibility> {
    match val.to_ascii_lowercase().as_str() {
        "visible" => Some(Visibility::Visible),
        "hidden" => Some(Visibility::Hidden),
        "collapse" => Some(Visibility::Collapse),
        _ => None,
    }
}

fn parse_position(val: &str) -> Option<Position> {
    match val.to_ascii_lowercase().as_str() {
        "static" => Some(Position::Static),
        "relative" => Some(Position::Relative),
        "absolute" => Some(Position::Absolute),
        "fixed" => Some(Position::Fixed),
        "sticky" => Some(Position::Sticky),
        _ => None,
    }
}

/// `0.5` or `50%`, clamped to 0..=1.
fn parse_opacity(val: &str) -> Option<f32> {
    let v = val.trim();
    let parsed = match v.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f32>().ok()? / 100.0,
        None => v.parse::<f32>().ok()?,
    };
    Some(parsed.clamp(0.0, 1.0))
}

/// Parse a CSS color value into [r, g, b, a] (0.0–1.0).
pub fn parse_css_color(val: &str) -> Option<[f32; 4]> {
    let v = val.trim().to_lowercase();

    // Named colours (common subset)
    let named = match v.as_str() {
        "black" => Some([0.0, 0.0, 0.0, 1.0]),
        "white" => Some([1.0, 1.0, 1.0, 1.0]),
        "red" => Some([1.0, 0.0, 0.0, 1.0]),
        "green" => Some([0.0, 0.5, 0.0, 1.0]),
        "blue" => Some([0.0, 0.0, 1.0, 1.0]),
        "yellow" => Some([1.0, 1.0, 0.0, 1.0]),
        "orange" => Some([1.0, 0.647, 0.0, 1.0]),
        "gray" | "grey" => Some([0.5, 0.5, 0.5, 1.0]),
        "transparent" => Some([0.0, 0.0, 0.0, 0.0]),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    // Hex: #rgb, #rrggbb, #rrggbbaa
    if let Some(hex) = v.strip_prefix('#') {
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|c| c as f32 / 255.0);
        return match hex.len() {
            3 => Some([
                channel(&hex[0..1].repeat(2))?,
                channel(&hex[1..2].repeat(2))?,
                channel(&hex[2..3].repeat(2))?,
                1.0,
            ]),
            6 => Some([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                1.0,
            ]),
            8 => Some([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            ]),
            _ => None,
        };
    }

    // rgb(r, g, b) / rgba(r, g, b, a)
    if v.starts_with("rgb") {
        let inner = v
            .trim_start_matches("rgba(")
            .trim_start_matches("rgb(")
            .trim_end_matches(')');
        let nums: Vec<f32> = inner
            .split(',')
            .filter_map(|s| s.trim().parse::<f32>().ok())
            .collect();
        if nums.len() >= 3 {
            let a = if nums.len() >= 4 { nums[3] } else { 1.0 };
            return Some([
                (nums[0] / 255.0).clamp(0.0, 1.0),
                (nums[1] / 255.0).clamp(0.0, 1.0),
                (nums[2] / 255.0).clamp(0.0, 1.0),
                a.clamp(0.0, 1.0),
            ]);
        }
    }

    None
}

/// Parse a CSS size value (px or plain number).
pub fn parse_css_size(val: &str) -> Option<f32> {
    let v = val.trim().to_lowercase();
    let num_str = v
        .trim_end_matches("px")
        .trim_end_matches("rem")
        .trim_end_matches("em");
    num_str.trim().parse::<f32>().ok()
}

/// Compound selector: optional tag, optional id, any number of classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';

        let mut sel = Selector {
            tag: None,
            id: None,
            classes: Vec::new(),
        };
        let mut rest = text;
        if let Some(after) = rest.strip_prefix('*') {
            rest = after;
        } else {
            let end = rest.find(|c: char| !is_ident(c)).unwrap_or(rest.len());
            if end > 0 {
                sel.tag = Some(rest[..end].to_ascii_lowercase());
                rest = &rest[end..];
            }
        }

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(|c: char| !is_ident(c)).unwrap_or(body.len());
            if end == 0 {
                return None;
            }
            let ident = body[..end].to_string();
            match marker {
                '.' => sel.classes.push(ident),
                '#' if sel.id.is_none() => sel.id = Some(ident),
                _ => return None,
            }
            rest = &body[end..];
        }
        Some(sel)
    }

    /// (ids, classes, tags), compared lexicographically.
    pub fn specificity(&self) -> (usize, usize, usize) {
        (
            usize::from(self.id.is_some()),
            self.classes.len(),
            usize::from(self.tag.is_some()),
        )
    }

    pub fn matches(&self, el: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if *tag != el.tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| el.has_class(c))
    }
}

#[derive(Debug, Clone)]
struct Rule {
    selector: Selector,
    props: StyleProps,
    order: usize,
}

/// Rules gathered from `<style>` elements, in document order.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<Rule>,
}

impl Stylesheet {
    pub fn parse(text: &str) -> Self {
        let mut sheet = Self::default();
        sheet.append(text);
        sheet
    }

    /// Gather every connected `<style>` element's rules.
    pub fn collect(doc: &Document) -> Self {
        let mut sheet = Self::default();
        for style in doc.elements_by_tag("style") {
            sheet.append(&doc.text_content(style));
        }
        sheet
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn append(&mut self, text: &str) {
        let text = strip_comments(text);
        let mut rest = text.as_str();
        while let Some(open) = rest.find('{') {
            let prelude = rest[..open].trim();
            let Some(close) = matching_brace(&rest[open..]) else {
                break;
            };
            let body = &rest[open + 1..open + close];
            rest = &rest[open + close + 1..];

            // @media, @font-face, ...
            if prelude.starts_with('@') {
                continue;
            }
            let props = parse_inline_style(body);
            for sel in prelude.split(',') {
                match Selector::parse(sel) {
                    Some(selector) => {
                        let order = self.rules.len();
                        self.rules.push(Rule {
                            selector,
                            props: props.clone(),
                            order,
                        });
                    }
                    None => log::trace!("unsupported selector skipped: {}", sel.trim()),
                }
            }
        }
    }

    /// UA defaults, then matching rules by specificity and order, then the
    /// inline style.
    pub fn cascade(&self, el: &ElementData) -> ComputedStyle {
        let mut props = user_agent_style(el);

        let mut matched: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|r| r.selector.matches(el))
            .collect();
        matched.sort_by_key(|r| (r.selector.specificity(), r.order));
        for rule in matched {
            props.merge(&rule.props);
        }

        if let Some(inline) = el.attr("style") {
            props.merge(&parse_inline_style(inline));
        }
        ComputedStyle::from_props(&props)
    }
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Offset of the brace closing the `{` at the start of `s`.
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: &str, attrs: &[(&str, &str)]) -> ElementData {
        let mut e = ElementData::new(tag);
        e.attributes = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        e
    }

    #[test]
    fn parse_named_colors() {
        assert_eq!(parse_css_color("red"), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_css_color("black"), Some([0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn parse_hex_colors() {
        let c = parse_css_color("#ff0000").unwrap();
        assert!((c[0] - 1.0).abs() < 0.01);
        assert!(c[1].abs() < 0.01);

        let c3 = parse_css_color("#f00").unwrap();
        assert!((c3[0] - 1.0).abs() < 0.01);
    }

    #[test]
    fn parse_rgb_colors() {
        let c = parse_css_color("rgb(128, 64, 0)").unwrap();
        assert!((c[0] - 0.502).abs() < 0.01);
        assert!((c[1] - 0.251).abs() < 0.01);
    }

    #[test]
    fn parse_inline_visibility_props() {
        let props = parse_inline_style(
            "display: none; visibility:hidden; opacity: 0; position: relative; height: 20px",
        );
        assert_eq!(props.display, Some(Display::None));
        assert_eq!(props.visibility, Some(Visibility::Hidden));
        assert_eq!(props.opacity, Some(0.0));
        assert_eq!(props.position, Some(Position::Relative));
        assert_eq!(props.height, Some(20.0));
    }

    #[test]
    fn important_is_ignored() {
        let props = parse_inline_style("background-color: #ffff00 !important");
        assert_eq!(props.background_color, Some([1.0, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn opacity_percent() {
        assert_eq!(parse_inline_style("opacity: 50%").opacity, Some(0.5));
    }

    #[test]
    fn selector_parsing() {
        assert!(Selector::parse("p").is_some());
        assert!(Selector::parse("p.note#main").is_some());
        assert!(Selector::parse("*").is_some());
        assert!(Selector::parse("div p").is_none());
        assert!(Selector::parse("a:hover").is_none());
        assert!(Selector::parse("input[type=text]").is_none());
    }

    #[test]
    fn selector_matching() {
        let sel = Selector::parse("p.note").unwrap();
        assert!(sel.matches(&el("p", &[("class", "x note")])));
        assert!(!sel.matches(&el("div", &[("class", "note")])));
        assert!(!sel.matches(&el("p", &[])));
    }

    #[test]
    fn cascade_order() {
        let sheet = Stylesheet::parse(
            "/* hide */ .gone { display: none } #keep { display: block } p { opacity: 0.5 }
             @media print { p { display: none } }",
        );
        assert_eq!(sheet.len(), 3);

        let gone = sheet.cascade(&el("span", &[("class", "gone")]));
        assert_eq!(gone.display, Display::None);

        // id beats class regardless of order
        let kept = sheet.cascade(&el("span", &[("class", "gone"), ("id", "keep")]));
        assert_eq!(kept.display, Display::Block);

        let p = sheet.cascade(&el("p", &[("style", "opacity: 1")]));
        assert_eq!(p.opacity, 1.0);
        assert_eq!(p.display, Display::Block);
    }

    #[test]
    fn user_agent_hides_head_content() {
        let sheet = Stylesheet::default();
        assert_eq!(sheet.cascade(&el("script", &[])).display, Display::None);
        assert_eq!(sheet.cascade(&el("b", &[("hidden", "")])).display, Display::None);
        assert_eq!(sheet.cascade(&el("b", &[])).display, Display::Inline);
    }
}
