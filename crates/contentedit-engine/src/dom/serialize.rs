use super::{Dom, NodeId, NodeKind};

pub(super) fn to_html(dom: &Dom, node: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, node, &mut out);
    out
}

fn write_node(dom: &Dom, node: NodeId, out: &mut String) {
    match dom.kind(node) {
        NodeKind::Text(text) => out.push_str(&html_escape::encode_text(text)),
        NodeKind::Comment(data) => {
            out.push_str("<!--");
            out.push_str(data);
            out.push_str("-->");
        }
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attributes {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
            }
            out.push('>');

            // Void elements have no end tag and never hold children
            if dom.is_void(node) {
                return;
            }

            for &child in dom.children(node) {
                write_node(dom, child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::Dom;

    #[test]
    fn test_serialize_nested_content() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let p = dom.append_element(root, "p").unwrap();
        dom.append_text(p, "1 < 2 & ").unwrap();
        let link = dom.append_element(p, "a").unwrap();
        dom.set_attribute(link, "href", "https://example.com/?a=\"b\"");
        dom.append_text(link, "link").unwrap();
        dom.append_element(p, "br").unwrap();
        let comment = dom.create_comment(" marker ");
        dom.append_child(root, comment).unwrap();

        insta::assert_snapshot!(
            dom.to_html(root),
            @r#"<div><p>1 &lt; 2 &amp; <a href="https://example.com/?a=&quot;b&quot;">link</a><br></p><!-- marker --></div>"#
        );
    }

    #[test]
    fn test_serialize_boolean_attribute() {
        let mut dom = Dom::new();
        let span = dom.create_element("span");
        dom.set_attribute(span, "hidden", "");

        insta::assert_snapshot!(dom.to_html(span), @"<span hidden></span>");
    }
}
