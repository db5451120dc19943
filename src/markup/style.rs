//! Resolving inline styles into flat runs of styled text.

use super::parser::{Element, Node, Tag};
use crate::colour::Colour;
use crate::layout::Alignment;
use crate::units::Pt;

/// Everything that decides how a run of text looks
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: Pt,
    pub colour: Colour,
    pub line_height: Pt,
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub highlight: bool,
    /// Target of the enclosing link, if any
    pub link: Option<String>,
}

impl TextStyle {
    pub fn new(font_size: Pt, line_height_factor: f32, colour: Colour) -> TextStyle {
        TextStyle {
            font_size,
            colour,
            line_height: font_size * line_height_factor,
            bold: false,
            italic: false,
            strikethrough: false,
            highlight: false,
            link: None,
        }
    }

    pub fn is_link(&self) -> bool {
        self.link.is_some()
    }

    pub fn bold(mut self) -> TextStyle {
        self.bold = true;
        self
    }

    pub fn coloured(mut self, colour: Colour) -> TextStyle {
        self.colour = colour;
        self
    }

    /// The same style at a different size, keeping the ratio of line height to size
    pub fn sized(mut self, font_size: Pt) -> TextStyle {
        let factor = self.line_height / self.font_size;
        self.font_size = font_size;
        self.line_height = font_size * factor;
        self
    }

    /// The style inside `element`, derived from (a copy of) the surrounding style
    pub fn within(&self, element: &Element) -> TextStyle {
        let mut style = self.clone();
        match element.tag {
            Tag::Bold => style.bold = true,
            Tag::Italic => style.italic = true,
            Tag::Strike => style.strikethrough = true,
            Tag::Highlight => style.highlight = true,
            Tag::Link => {
                style.link = element
                    .attribute("href")
                    .map(str::trim)
                    .filter(|href| !href.is_empty())
                    .map(str::to_string);
            }
            _ => {}
        }

        if let Some(colour) = element.style_property("color").and_then(Colour::from_hex) {
            style.colour = colour;
        }
        if let Some(weight) = element.style_property("font-weight") {
            style.bold = matches!(weight, "bold" | "bolder" | "600" | "700" | "800" | "900");
        }
        if element.style_property("font-style") == Some("italic") {
            style.italic = true;
        }
        if element
            .style_property("text-decoration")
            .is_some_and(|d| d.contains("line-through"))
        {
            style.strikethrough = true;
        }
        style
    }
}

/// A run of text sharing one style
#[derive(Debug, Clone, PartialEq)]
pub struct StyledFragment {
    pub text: String,
    pub style: TextStyle,
}

impl StyledFragment {
    /// A forced line break
    pub fn line_break(style: &TextStyle) -> StyledFragment {
        StyledFragment {
            text: "\n".to_string(),
            style: style.clone(),
        }
    }

    pub fn is_line_break(&self) -> bool {
        self.text == "\n"
    }
}

/// Flatten inline content into fragments. Block elements met here are flattened
/// like any other container; `<br>` becomes a line-break fragment.
pub fn collect_fragments(nodes: &[Node], style: &TextStyle, out: &mut Vec<StyledFragment>) {
    for node in nodes {
        match node {
            Node::Text(text) => {
                if !text.is_empty() {
                    out.push(StyledFragment {
                        text: text.replace(['\n', '\r'], " "),
                        style: style.clone(),
                    });
                }
            }
            Node::Element(element) if element.tag == Tag::LineBreak => {
                out.push(StyledFragment::line_break(style));
            }
            Node::Element(element) => {
                let inner = style.within(element);
                collect_fragments(&element.children, &inner, out);
            }
        }
    }
}

/// The alignment of a block element, inherited unless its `text-align` overrides it
pub fn block_alignment(element: &Element, inherited: Alignment) -> Alignment {
    element
        .style_property("text-align")
        .and_then(Alignment::from_css)
        .unwrap_or(inherited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colours;
    use crate::markup::parse;

    fn body() -> TextStyle {
        TextStyle::new(Pt(12.0), 1.4, colours::BLACK)
    }

    fn fragments(markup: &str) -> Vec<StyledFragment> {
        let parsed = parse(markup);
        let mut out = Vec::new();
        collect_fragments(&parsed.nodes, &body(), &mut out);
        out
    }

    #[test]
    fn sibling_styles_do_not_leak() {
        let frags = fragments("<b>bold</b><i>italic</i>plain");
        assert_eq!(frags.len(), 3);
        assert!(frags[0].style.bold && !frags[0].style.italic);
        assert!(!frags[1].style.bold && frags[1].style.italic);
        assert!(!frags[2].style.bold && !frags[2].style.italic);
    }

    #[test]
    fn nested_styles_combine() {
        let frags = fragments("<strong><em><s><mark>all</mark></s></em></strong>");
        let style = &frags[0].style;
        assert!(style.bold && style.italic && style.strikethrough && style.highlight);
    }

    #[test]
    fn links_carry_their_target() {
        let frags = fragments(r#"see <a href=" https://cmrit.ac.in ">site</a>"#);
        assert_eq!(frags[0].style.link, None);
        assert_eq!(frags[1].style.link.as_deref(), Some("https://cmrit.ac.in"));
        assert!(frags[1].style.is_link());
    }

    #[test]
    fn line_breaks_become_fragments() {
        let frags = fragments("a<br>b");
        assert!(frags[1].is_line_break());
        assert_eq!(frags[2].text, "b");
    }

    #[test]
    fn inline_css_is_honoured() {
        let frags = fragments(r#"<span style="color:#ff0000;font-weight:700">x</span>"#);
        assert_eq!(frags[0].style.colour, Colour::new_rgb(1.0, 0.0, 0.0));
        assert!(frags[0].style.bold);
    }

    #[test]
    fn alignment_is_inherited_until_overridden() {
        let parsed = parse(r#"<p style="text-align: justify">x</p><p>y</p>"#);
        let align = |n: &Node| match n {
            Node::Element(e) => block_alignment(e, Alignment::Center),
            Node::Text(_) => unreachable!(),
        };
        assert_eq!(align(&parsed.nodes[0]), Alignment::Justify);
        assert_eq!(align(&parsed.nodes[1]), Alignment::Center);
    }

    #[test]
    fn resizing_keeps_the_line_height_ratio() {
        let heading = body().sized(Pt(20.0));
        assert!((*heading.line_height - 28.0).abs() < 1e-4);
    }
}
