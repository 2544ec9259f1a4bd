//! HTML ↔ 문서 트리 변환

use std::collections::HashMap;

use scraper::{Html, Node};

use super::{Document, Element, NodeId, NodeKind};

/// 닫는 태그가 없는 요소
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// 내용을 이스케이프하지 않는 요소
///
/// 파서가 스크립트 활성 상태로 동작하므로 `noscript` 내용도 마크업이 아닌 원문 텍스트다.
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "iframe", "noembed", "noframes", "xmp", "plaintext",
];

/// 텍스트만 담고 내용은 이스케이프하는 요소
pub const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["textarea", "title"];

/// 자식이 마크업이 아닌 텍스트 하나뿐인 요소인지 (대소문자 무시)
pub fn is_text_only_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS
        .iter()
        .chain(ESCAPABLE_RAW_TEXT_ELEMENTS)
        .any(|t| t.eq_ignore_ascii_case(tag))
}

/// HTML 문서 전체를 파싱
pub fn parse(source: &str) -> Document {
    let html = Html::parse_document(source);
    let mut doc = Document::new();
    let mut ids = HashMap::new();

    // 전위 순회이므로 부모가 항상 먼저 등록됨
    for node in html.tree.root().descendants() {
        let kind = match node.value() {
            Node::Document | Node::Fragment => {
                ids.insert(node.id(), doc.root());
                continue;
            }
            Node::Doctype(doctype) => NodeKind::Doctype(doctype.name().to_string()),
            Node::Comment(comment) => NodeKind::Comment(String::from(&**comment)),
            Node::Text(text) => NodeKind::Text(String::from(&**text)),
            Node::Element(el) => {
                let mut element = Element::new(el.name());
                for (name, value) in el.attrs() {
                    element.attrs.push((name.to_string(), value.to_string()));
                }
                NodeKind::Element(element)
            }
            Node::ProcessingInstruction(_) => continue,
        };

        let id = doc.create_node(kind);
        let parent = node
            .parent()
            .and_then(|p| ids.get(&p.id()).copied())
            .unwrap_or_else(|| doc.root());
        doc.append_child(parent, id);
        ids.insert(node.id(), id);
    }

    doc
}

/// 문서 트리를 HTML로 직렬화
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    for &child in doc.children(doc.root()) {
        write_node(doc, child, false, &mut out);
    }
    out
}

/// 노드 하나(와 하위)를 직렬화
pub fn serialize_node(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, false, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, raw_text: bool, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Document => {
            for &child in doc.children(id) {
                write_node(doc, child, false, out);
            }
        }
        NodeKind::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                return;
            }

            let raw = RAW_TEXT_ELEMENTS.contains(&el.tag.as_str());
            for &child in doc.children(id) {
                write_node(doc, child, raw, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
