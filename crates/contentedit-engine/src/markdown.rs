//! Build document trees from Markdown.
//!
//! Hand-assembling trees gets tedious past a handful of nodes, so fixtures,
//! benches and the inspector describe their content as Markdown and let
//! pulldown-cmark produce the event stream. Adjacent text is merged into a
//! single text node; soft breaks become their own `"\n"` text node, the same
//! whitespace-only text a host would leave between blocks.

use log::trace;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, TextMergeStream};

use crate::dom::{Dom, DomError, NodeId};

/// A tree built from Markdown: `<body><div>…content…</div></body>`
#[derive(Debug, Clone)]
pub struct MarkdownDocument {
    pub dom: Dom,
    /// The document root the content is attached to
    pub body: NodeId,
    /// The container holding the rendered content
    pub content_root: NodeId,
}

pub fn dom_from_markdown(source: &str) -> Result<MarkdownDocument, DomError> {
    dom_from_markdown_with(Dom::new(), source)
}

/// Like [`dom_from_markdown`], starting from a preconfigured (e.g. with extra
/// void tags) but empty tree
pub fn dom_from_markdown_with(mut dom: Dom, source: &str) -> Result<MarkdownDocument, DomError> {
    let body = dom.create_element("body");
    let content_root = dom.append_element(body, "div")?;

    let mut builder = TreeBuilder {
        dom,
        stack: vec![content_root],
        html_block: None,
    };

    let options = Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TABLES
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;
    for event in TextMergeStream::new(Parser::new_ext(source, options)) {
        builder.event(event)?;
    }

    Ok(MarkdownDocument {
        dom: builder.dom,
        body,
        content_root,
    })
}

struct TreeBuilder {
    dom: Dom,
    stack: Vec<NodeId>,
    /// Lines of the raw HTML block being read
    html_block: Option<String>,
}

impl TreeBuilder {
    fn current(&self) -> NodeId {
        // The content root is pushed first and never popped
        self.stack[self.stack.len() - 1]
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), DomError> {
        trace!("markdown event {event:?}");
        match event {
            Event::Start(Tag::HtmlBlock) => {
                self.html_block = Some(String::new());
                self.stack.push(self.current());
            }
            Event::Start(tag) => self.start(tag)?,
            Event::End(TagEnd::TableHead) => {
                // <thead><tr> pushed together
                self.pop();
                self.pop();
            }
            Event::End(TagEnd::HtmlBlock) => {
                if let Some(block) = self.html_block.take() {
                    self.html(&block)?;
                }
                self.pop();
            }
            Event::End(_) => self.pop(),
            Event::Html(html) if self.html_block.is_some() => {
                if let Some(block) = self.html_block.as_mut() {
                    block.push_str(&html);
                }
            }
            leaf => {
                let parent = self.current();
                if self.dom.tag(parent) == Some("img") {
                    self.describe_image(parent, leaf);
                } else {
                    self.leaf(parent, leaf)?;
                }
            }
        }
        Ok(())
    }

    fn leaf(&mut self, parent: NodeId, event: Event<'_>) -> Result<(), DomError> {
        match event {
            Event::Text(text) => {
                self.dom.append_text(parent, &text)?;
            }
            Event::Code(code) => {
                let element = self.dom.append_element(parent, "code")?;
                self.dom.append_text(element, &code)?;
            }
            Event::Html(html) | Event::InlineHtml(html) => self.html(&html)?,
            Event::FootnoteReference(label) => {
                let sup = self.dom.append_element(parent, "sup")?;
                self.dom.append_text(sup, &label)?;
            }
            Event::SoftBreak => {
                self.dom.append_text(parent, "\n")?;
            }
            Event::HardBreak => {
                self.dom.append_element(parent, "br")?;
            }
            Event::Rule => {
                self.dom.append_element(parent, "hr")?;
            }
            Event::TaskListMarker(checked) => {
                let input = self.dom.append_element(parent, "input")?;
                self.dom.set_attribute(input, "type", "checkbox");
                if checked {
                    self.dom.set_attribute(input, "checked", "");
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Image descriptions land in `alt` as plain text; <img> cannot hold
    /// children
    fn describe_image(&mut self, image: NodeId, event: Event<'_>) {
        let text: &str = match &event {
            Event::Text(text) | Event::Code(text) | Event::FootnoteReference(text) => text,
            Event::SoftBreak | Event::HardBreak => " ",
            _ => return,
        };
        let alt = format!("{}{text}", self.dom.attribute(image, "alt").unwrap_or(""));
        self.dom.set_attribute(image, "alt", &alt);
    }

    /// Raw HTML is not interpreted. HTML comments are kept as comment nodes,
    /// anything else is dropped.
    fn html(&mut self, html: &str) -> Result<(), DomError> {
        if let Some(data) = html_comment(html) {
            let comment = self.dom.create_comment(data);
            self.dom.append_child(self.current(), comment)?;
        }
        Ok(())
    }

    fn start(&mut self, tag: Tag<'_>) -> Result<(), DomError> {
        let parent = self.current();

        // Formatting inside an image description adds no element; the parent
        // is pushed again so the matching end pops it
        if self.dom.tag(parent) == Some("img") {
            self.stack.push(parent);
            return Ok(());
        }

        let element = match tag {
            Tag::Paragraph => self.dom.append_element(parent, "p")?,
            Tag::Heading { level, .. } => self.dom.append_element(parent, heading_tag(level))?,
            Tag::BlockQuote(_) => self.dom.append_element(parent, "blockquote")?,
            Tag::CodeBlock(_) => self.dom.append_element(parent, "pre")?,
            Tag::List(None) => self.dom.append_element(parent, "ul")?,
            Tag::List(Some(start)) => {
                let list = self.dom.append_element(parent, "ol")?;
                if start != 1 {
                    self.dom.set_attribute(list, "start", &start.to_string());
                }
                list
            }
            Tag::Item => self.dom.append_element(parent, "li")?,
            Tag::Table(_) => self.dom.append_element(parent, "table")?,
            Tag::TableHead => {
                let head = self.dom.append_element(parent, "thead")?;
                self.stack.push(head);
                self.dom.append_element(head, "tr")?
            }
            Tag::TableRow => self.dom.append_element(parent, "tr")?,
            Tag::TableCell => self.dom.append_element(parent, "td")?,
            Tag::Emphasis => self.dom.append_element(parent, "em")?,
            Tag::Strong => self.dom.append_element(parent, "strong")?,
            Tag::Strikethrough => self.dom.append_element(parent, "del")?,
            Tag::Link { dest_url, .. } => {
                let link = self.dom.append_element(parent, "a")?;
                self.dom.set_attribute(link, "href", &dest_url);
                link
            }
            Tag::Image { dest_url, .. } => {
                let image = self.dom.append_element(parent, "img")?;
                self.dom.set_attribute(image, "src", &dest_url);
                image
            }
            _ => self.dom.append_element(parent, "span")?,
        };
        self.stack.push(element);
        Ok(())
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }
}

/// The data of a lone `<!-- ... -->`, surrounding whitespace ignored
fn html_comment(html: &str) -> Option<&str> {
    let data = html.trim().strip_prefix("<!--")?.strip_suffix("-->")?;
    (!data.contains("-->")).then_some(data)
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}
