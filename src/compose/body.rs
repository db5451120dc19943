use super::flow::{has_content, Marker};
use super::{heading_metrics, Composer, ListFrame};
use crate::markup::{
    block_alignment, collect_fragments, Element, Node, StyledFragment, Tag, TextStyle,
};

impl Composer<'_> {
    /// Lay out a parsed letter body. Inline content outside any block element is
    /// set as implicit paragraphs; unknown elements wrapping blocks are walked
    /// through as if absent.
    pub fn compose(&mut self, nodes: &[Node]) {
        let style = self.body_style.clone();
        self.compose_blocks(nodes, &style);
    }

    fn compose_blocks(&mut self, nodes: &[Node], style: &TextStyle) {
        let mut pending: Vec<StyledFragment> = Vec::new();

        for node in nodes {
            let element = match node {
                Node::Element(element) if is_block_level(element) => element,
                _ => {
                    collect_fragments(std::slice::from_ref(node), style, &mut pending);
                    continue;
                }
            };

            self.implicit_paragraph(&mut pending);
            let alignment = block_alignment(element, self.cursor.alignment);
            self.aligned(alignment, |c| match element.tag {
                Tag::Paragraph => c.paragraph(element, style),
                Tag::Heading(level) => c.heading(element, level, style),
                Tag::UnorderedList | Tag::OrderedList => c.list(element, style),
                Tag::ListItem => c.stray_list_item(element, style),
                _ => c.compose_blocks(&element.children, &style.within(element)),
            });
        }

        self.implicit_paragraph(&mut pending);
    }

    fn implicit_paragraph(&mut self, pending: &mut Vec<StyledFragment>) {
        let fragments = std::mem::take(pending);
        if has_content(&fragments) {
            self.spaced_flow(&fragments);
        }
    }

    /// Flow `fragments` with paragraph spacing around them
    fn spaced_flow(&mut self, fragments: &[StyledFragment]) {
        let (before, after) = self.metrics.paragraph_spacing;
        self.advance(before);
        self.flow(fragments, &mut None);
        self.advance(after);
    }

    fn paragraph(&mut self, element: &Element, style: &TextStyle) {
        let inner = style.within(element);
        let mut fragments = Vec::new();
        collect_fragments(&element.children, &inner, &mut fragments);
        if has_content(&fragments) {
            self.spaced_flow(&fragments);
        } else {
            // an empty paragraph is the editor's blank line
            self.ensure_space(inner.line_height);
            self.advance(inner.line_height);
        }
    }

    fn heading(&mut self, element: &Element, level: u8, style: &TextStyle) {
        let (size, before, after) = heading_metrics(level);
        let inner = style.within(element).sized(size).bold();
        let mut fragments = Vec::new();
        collect_fragments(&element.children, &inner, &mut fragments);
        if !has_content(&fragments) {
            return;
        }
        self.advance(before);
        self.flow(&fragments, &mut None);
        self.advance(after);
    }

    fn list(&mut self, element: &Element, style: &TextStyle) {
        let ordered = element.tag == Tag::OrderedList;
        let start = element
            .attribute("start")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(1);
        self.lists.push(ListFrame {
            ordered,
            counter: start.saturating_sub(1),
        });
        let inner = style.within(element);

        if self.lists.len() == 1 {
            self.advance(self.metrics.paragraph_spacing.0);
        }
        for child in &element.children {
            match child {
                Node::Element(item) if item.tag == Tag::ListItem => self.list_item(item, &inner),
                // a list directly inside a list nests one level deeper
                Node::Element(nested)
                    if matches!(nested.tag, Tag::UnorderedList | Tag::OrderedList) =>
                {
                    self.list(nested, &inner)
                }
                Node::Element(other) => self.list_item(other, &inner),
                Node::Text(text) if text.trim().is_empty() => {}
                Node::Text(_) => {
                    let item = Element {
                        name: "li".to_string(),
                        tag: Tag::ListItem,
                        attributes: Vec::new(),
                        children: vec![child.clone()],
                    };
                    self.list_item(&item, &inner);
                }
            }
        }
        self.lists.pop();
        if self.lists.is_empty() {
            self.advance(self.metrics.paragraph_spacing.1);
        }
    }

    /// A `<li>` outside any list is treated as a one-item bulleted list
    fn stray_list_item(&mut self, element: &Element, style: &TextStyle) {
        self.lists.push(ListFrame {
            ordered: false,
            counter: 0,
        });
        self.list_item(element, style);
        self.lists.pop();
    }

    fn list_item(&mut self, element: &Element, style: &TextStyle) {
        let level = self.lists.len();
        let Some(frame) = self.lists.last_mut() else {
            return;
        };
        frame.counter += 1;
        let text = if frame.ordered {
            format!("{}.", frame.counter)
        } else {
            "\u{2022}".to_string()
        };

        let inner = style.within(element);
        let marker_x = self.page_margins.left + self.metrics.list_indent * level as f32;
        let mut marker = Some(Marker {
            text,
            x: marker_x,
            style: TextStyle {
                bold: false,
                italic: false,
                strikethrough: false,
                highlight: false,
                link: None,
                ..inner.clone()
            },
        });

        let saved = self.cursor.margins;
        self.cursor.margins.left = marker_x + self.metrics.bullet_gap;

        let mut pending: Vec<StyledFragment> = Vec::new();
        for child in &element.children {
            match child {
                Node::Element(nested)
                    if matches!(nested.tag, Tag::UnorderedList | Tag::OrderedList) =>
                {
                    self.item_run(&mut pending, &mut marker);
                    self.list(nested, &inner);
                }
                Node::Element(block) if block.tag == Tag::Paragraph && has_content(&pending) => {
                    // consecutive paragraphs inside an item start on new lines
                    self.item_run(&mut pending, &mut marker);
                    collect_fragments(std::slice::from_ref(child), &inner, &mut pending);
                }
                _ => collect_fragments(std::slice::from_ref(child), &inner, &mut pending),
            }
        }
        self.item_run(&mut pending, &mut marker);

        // an item with no text still shows its marker
        if marker.is_some() {
            self.flow(&[StyledFragment::line_break(&inner)], &mut marker);
        }

        self.cursor.margins = saved;
    }

    fn item_run(&mut self, pending: &mut Vec<StyledFragment>, marker: &mut Option<Marker>) {
        let fragments = std::mem::take(pending);
        if has_content(&fragments) {
            self.flow(&fragments, marker);
        }
    }
}

/// Elements that start a new block rather than flowing inline
fn is_block_level(element: &Element) -> bool {
    element.tag.is_block() || (element.tag == Tag::Unknown && element.contains_block())
}
