//! 문서 순회: 변환 대상 텍스트 노드 수집
//!
//! 먼저 대상 노드 목록을 만들어 두고 나중에 교체합니다.
//! 교체 중 새로 생긴 노드가 같은 순회에 다시 들어오지 않습니다.

use crate::dom::html::is_text_only_element;
use crate::dom::{Document, NodeId, NodeKind};
use crate::page::rewriter::ANNOTATION_CLASS;

/// 하위 텍스트를 보지 않는 요소 (원문 텍스트 요소 외)
const SKIPPED_ELEMENTS: &[&str] = &["svg"];

/// 건너뛸 요소인지 (대소문자 무시)
///
/// `script`/`style`/`noscript`/`textarea` 같은 텍스트 전용 요소도 포함.
pub fn is_skipped_element(tag: &str) -> bool {
    SKIPPED_ELEMENTS.iter().any(|t| t.eq_ignore_ascii_case(tag)) || is_text_only_element(tag)
}

/// 조상 중에 주석 요소가 있는지
pub fn is_inside_annotation(doc: &Document, node: NodeId) -> bool {
    doc.ancestors(node)
        .any(|id| doc.has_class(id, ANNOTATION_CLASS))
}

/// `root` 아래 변환 대상 텍스트 노드 (문서 순서)
pub fn collect_text_nodes(doc: &Document, root: NodeId) -> Vec<NodeId> {
    let mut found = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        match doc.kind(node) {
            NodeKind::Element(el) if is_skipped_element(&el.tag) => continue,
            // 주석 내부는 통째로 건너뜀
            NodeKind::Element(el) if el.has_class(ANNOTATION_CLASS) => continue,
            NodeKind::Text(_) => {
                if !is_inside_annotation(doc, node) {
                    found.push(node);
                }
            }
            _ => stack.extend(doc.children(node).iter().rev().copied()),
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::html;

    fn texts(doc: &Document, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .filter_map(|&n| doc.text(n))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    #[test]
    fn test_skips_script_style_svg() {
        let doc = html::parse(
            "<body><p>one</p><script>var x = '5 in';</script><style>.a{}</style>\
             <svg><text>10 ft</text></svg><div>two</div></body>",
        );
        let nodes = collect_text_nodes(&doc, doc.body());
        assert_eq!(texts(&doc, &nodes), vec!["one", "two"]);
    }

    #[test]
    fn test_skips_noscript_and_textarea() {
        let doc = html::parse(
            "<body><noscript><p>Fits a 10 inch pan</p></noscript>\
             <textarea>5 in</textarea><p>hi</p></body>",
        );
        let nodes = collect_text_nodes(&doc, doc.body());
        assert_eq!(texts(&doc, &nodes), vec!["hi"]);
    }

    #[test]
    fn test_skips_annotation_subtree() {
        let doc = html::parse(
            "<body><p>before <span class=\"unit-conversion\" data-original=\"5 in\" \
             data-converted=\"12.7 cm\">12.7 cm<span class=\"unit-conversion-tooltip\">x</span></span> after</p></body>",
        );
        let nodes = collect_text_nodes(&doc, doc.body());
        assert_eq!(texts(&doc, &nodes), vec!["before", "after"]);
    }

    #[test]
    fn test_text_root_inside_annotation() {
        let doc = html::parse("<body><span class=\"unit-conversion\">12.7 cm</span></body>");
        let span = doc.elements_with_class(ANNOTATION_CLASS)[0];
        let inner = doc.children(span)[0];
        assert!(is_inside_annotation(&doc, inner));
        assert!(collect_text_nodes(&doc, inner).is_empty());
    }

    #[test]
    fn test_skip_is_case_insensitive() {
        assert!(is_skipped_element("SCRIPT"));
        assert!(is_skipped_element("Svg"));
        assert!(is_skipped_element("NoScript"));
        assert!(!is_skipped_element("span"));
    }
}
