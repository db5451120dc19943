//! A tolerant parser for the small HTML subset letter bodies are written in.
//!
//! Parsing never fails. Anything the parser does not understand is kept as a
//! plain container (unknown tags) or dropped (comments, stray end tags), and
//! recorded in [ParsedMarkup::ignored] for callers that want to be strict.

/// A node of the parsed tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// The tags that carry meaning in a letter body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Paragraph,
    /// `h1`..`h3`
    Heading(u8),
    UnorderedList,
    OrderedList,
    ListItem,
    LineBreak,
    Bold,
    Italic,
    Strike,
    Highlight,
    Link,
    /// `span`; styles only
    Span,
    /// Any other tag, treated as a plain container
    Unknown,
}

impl Tag {
    pub fn from_name(name: &str) -> Tag {
        match name {
            "p" => Tag::Paragraph,
            "h1" => Tag::Heading(1),
            "h2" => Tag::Heading(2),
            "h3" => Tag::Heading(3),
            "ul" => Tag::UnorderedList,
            "ol" => Tag::OrderedList,
            "li" => Tag::ListItem,
            "br" => Tag::LineBreak,
            "strong" | "b" => Tag::Bold,
            "em" | "i" => Tag::Italic,
            "s" | "strike" | "del" => Tag::Strike,
            "mark" => Tag::Highlight,
            "a" => Tag::Link,
            "span" => Tag::Span,
            _ => Tag::Unknown,
        }
    }

    /// Tags that start a new block when they appear in running text
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Tag::Paragraph
                | Tag::Heading(_)
                | Tag::UnorderedList
                | Tag::OrderedList
                | Tag::ListItem
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Lower-cased tag name as written
    pub name: String,
    pub tag: Tag,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Element {
        let name = name.to_ascii_lowercase();
        Element {
            tag: Tag::from_name(&name),
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute by (case-insensitive) name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Look up a property of the inline `style` attribute
    pub fn style_property(&self, property: &str) -> Option<&str> {
        self.attribute("style")?
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(property))
            .map(|(_, value)| value.trim())
    }

    /// Whether any descendant starts a block
    pub fn contains_block(&self) -> bool {
        self.children.iter().any(|child| match child {
            Node::Element(e) => e.tag.is_block() || e.contains_block(),
            Node::Text(_) => false,
        })
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) => text.push_str(t),
                Node::Element(e) => text.push_str(&e.text_content()),
            }
        }
        text
    }

    fn is_void(&self) -> bool {
        matches!(
            self.name.as_str(),
            "br" | "hr" | "img" | "input" | "meta" | "link" | "area" | "base" | "col" | "wbr"
        )
    }
}

/// Something in the markup the parser skipped or could only partially honour
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ignored {
    /// A tag with no special meaning, kept as a plain container
    UnknownTag(String),
    /// An element still open at the end of its parent or of the input
    UnclosedTag(String),
    /// An end tag with no matching open element
    StrayEndTag(String),
    Comment,
    Declaration,
    /// A tag nested deeper than [MAX_DEPTH]; its content joins the enclosing element
    TooDeep(String),
}

/// Elements nested deeper than this are flattened into their ancestor at this depth
pub const MAX_DEPTH: usize = 256;

/// The result of parsing: a best-effort tree plus everything that was skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMarkup {
    pub nodes: Vec<Node>,
    pub ignored: Vec<Ignored>,
}

/// Parse letter markup into a tree
pub fn parse(markup: &str) -> ParsedMarkup {
    let mut parser = MarkupParser::new(markup);
    let nodes = parser.parse_children();
    ParsedMarkup {
        nodes,
        ignored: parser.ignored,
    }
}

struct MarkupParser {
    pos: usize,
    input: Vec<char>,
    ignored: Vec<Ignored>,
    /// Names of the elements currently open, outermost first
    open: Vec<String>,
}

impl MarkupParser {
    fn new(markup: &str) -> Self {
        Self {
            pos: 0,
            input: markup.chars().collect(),
            ignored: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Parse nodes until the end tag of the innermost open element, or the end
    /// tag of any of its ancestors (which is left for the ancestor to consume)
    fn parse_children(&mut self) -> Vec<Node> {
        let mut children: Vec<Node> = Vec::new();
        // tags past the depth limit whose content lands in `children`
        let mut flattened: Vec<String> = Vec::new();

        while !self.eof() {
            if self.starts_with("</") {
                let start = self.pos;
                self.advance_by(2);
                let name = self.parse_name();
                self.skip_until('>');
                self.advance();

                if flattened.last() == Some(&name) {
                    flattened.pop();
                    continue;
                }
                match self.open.iter().rposition(|tag| *tag == name) {
                    Some(i) if i + 1 == self.open.len() => return children,
                    Some(_) => {
                        // closes an ancestor; let it see the end tag too
                        self.pos = start;
                        if let Some(current) = self.open.last() {
                            self.ignored.push(Ignored::UnclosedTag(current.clone()));
                        }
                        return children;
                    }
                    None => self.ignored.push(Ignored::StrayEndTag(name)),
                }
            } else if self.starts_with("<!--") {
                self.skip_until_str("-->");
                self.advance_by(3);
                self.ignored.push(Ignored::Comment);
            } else if self.starts_with("<!") || self.starts_with("<?") {
                self.skip_until('>');
                self.advance();
                self.ignored.push(Ignored::Declaration);
            } else if self.at_start_tag() {
                self.advance();
                let (mut element, has_content) = self.parse_start_tag();
                if !has_content {
                    children.push(Node::Element(element));
                } else if self.open.len() >= MAX_DEPTH {
                    self.ignored.push(Ignored::TooDeep(element.name.clone()));
                    flattened.push(element.name);
                } else {
                    self.open.push(element.name.clone());
                    element.children = self.parse_children();
                    self.open.pop();
                    children.push(Node::Element(element));
                }
            } else {
                let text = self.parse_text();
                if let Some(Node::Text(previous)) = children.last_mut() {
                    previous.push_str(&text);
                } else {
                    children.push(Node::Text(text));
                }
            }
        }

        if let Some(current) = self.open.last() {
            self.ignored.push(Ignored::UnclosedTag(current.clone()));
        }
        children
    }

    /// Read a start tag up to its closing `>`. The flag is false for void and
    /// self-closing tags, which have no content to parse.
    fn parse_start_tag(&mut self) -> (Element, bool) {
        let name = self.parse_name();
        let mut element = Element::new(&name);
        if element.tag == Tag::Unknown {
            self.ignored.push(Ignored::UnknownTag(element.name.clone()));
        }

        self.parse_attributes(&mut element);

        self.skip_whitespace();
        if self.starts_with("/>") {
            self.advance_by(2);
            return (element, false);
        }
        if self.current() == Some('>') {
            self.advance();
        }

        let has_content = !element.is_void();
        (element, has_content)
    }

    fn parse_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.current() {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ':' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        name.to_ascii_lowercase()
    }

    fn parse_attributes(&mut self, element: &mut Element) {
        loop {
            self.skip_whitespace();
            match self.current() {
                None | Some('>') => break,
                Some('/') if self.starts_with("/>") => break,
                _ => {}
            }

            let name = self.parse_name();
            if name.is_empty() {
                // junk inside the tag, skip a character and keep going
                self.advance();
                continue;
            }

            self.skip_whitespace();
            let value = if self.current() == Some('=') {
                self.advance();
                self.skip_whitespace();
                self.parse_attribute_value()
            } else {
                String::new()
            };

            element.attributes.push((name, value));
        }
    }

    fn parse_attribute_value(&mut self) -> String {
        let mut value = String::new();
        match self.current() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                while let Some(c) = self.current() {
                    self.advance();
                    if c == quote {
                        break;
                    }
                    value.push(c);
                }
            }
            _ => {
                while let Some(c) = self.current() {
                    if c.is_whitespace() || c == '>' {
                        break;
                    }
                    value.push(c);
                    self.advance();
                }
            }
        }
        decode_entities(&value)
    }

    fn parse_text(&mut self) -> String {
        let mut text = String::new();
        // the first character is always consumed so a lone '<' makes progress
        if let Some(c) = self.current() {
            text.push(c);
            self.advance();
        }
        while let Some(c) = self.current() {
            if c == '<' && (self.at_start_tag() || self.starts_with("</") || self.starts_with("<!"))
            {
                break;
            }
            text.push(c);
            self.advance();
        }
        decode_entities(&text)
    }

    fn at_start_tag(&self) -> bool {
        self.current() == Some('<')
            && self
                .input
                .get(self.pos + 1)
                .is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn advance_by(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    fn starts_with(&self, s: &str) -> bool {
        let mut i = self.pos;
        for c in s.chars() {
            if self.input.get(i) != Some(&c) {
                return false;
            }
            i += 1;
        }
        true
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn skip_until(&mut self, target: char) {
        while self.current().is_some_and(|c| c != target) {
            self.advance();
        }
    }

    fn skip_until_str(&mut self, target: &str) {
        while !self.eof() && !self.starts_with(target) {
            self.advance();
        }
    }
}

/// Decode the character references that rich-text editors emit
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&after[..end]).map(|ch| (ch, end)));
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        "hellip" => Some('\u{2026}'),
        "bull" => Some('\u{2022}'),
        "lsquo" => Some('\u{2018}'),
        "rsquo" => Some('\u{2019}'),
        "ldquo" => Some('\u{201C}'),
        "rdquo" => Some('\u{201D}'),
        "copy" => Some('\u{00A9}'),
        "reg" => Some('\u{00AE}'),
        "deg" => Some('\u{00B0}'),
        "euro" => Some('\u{20AC}'),
        _ => {
            let code = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}
