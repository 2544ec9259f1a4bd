//! 텍스트 노드 → 일반 텍스트 + 변환 주석 노드 교체, 토글, 복원
//!
//! 주석 노드는 원문/변환값/툴팁을 data 속성으로 들고 있어서
//! 토글과 복원에 변환 테이블이 다시 필요하지 않습니다.

use crate::detection::matcher::CandidateMatch;
use crate::dom::{Document, NodeId};

/// 주석 요소 표식 클래스
pub const ANNOTATION_CLASS: &str = "unit-conversion";
/// 툴팁 요소 클래스
pub const TOOLTIP_CLASS: &str = "unit-conversion-tooltip";
/// 원문 표시 중 클래스
pub const ORIGINAL_CLASS: &str = "original";

pub const DATA_ORIGINAL: &str = "data-original";
pub const DATA_CONVERTED: &str = "data-converted";
pub const DATA_TOOLTIP: &str = "data-tooltip";

/// 주석의 표시 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// 변환값 (초기 상태)
    Converted,
    /// 원문
    Original,
}

/// 주석 노드에 저장된 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub original: String,
    pub converted: String,
    pub tooltip: String,
    pub state: DisplayState,
}

impl Annotation {
    /// 주석 요소의 속성에서 읽음
    pub fn read(doc: &Document, id: NodeId) -> Option<Self> {
        let el = doc.element(id)?;
        if !el.has_class(ANNOTATION_CLASS) {
            return None;
        }
        Some(Self {
            original: el.attr(DATA_ORIGINAL)?.to_string(),
            converted: el.attr(DATA_CONVERTED)?.to_string(),
            tooltip: el.attr(DATA_TOOLTIP).unwrap_or_default().to_string(),
            state: if el.has_class(ORIGINAL_CLASS) {
                DisplayState::Original
            } else {
                DisplayState::Converted
            },
        })
    }

    /// 현재 보이는 텍스트
    pub fn displayed_text(&self) -> &str {
        match self.state {
            DisplayState::Converted => &self.converted,
            DisplayState::Original => &self.original,
        }
    }

    /// 현재 상태의 툴팁
    pub fn displayed_tooltip(&self) -> String {
        match self.state {
            DisplayState::Converted => self.tooltip.clone(),
            DisplayState::Original => format!("Converted: {}", self.converted),
        }
    }
}

/// 매치 하나를 주석 요소로 생성 (변환값 표시)
fn create_annotation(doc: &mut Document, m: &CandidateMatch) -> NodeId {
    let span = doc.create_element("span");
    if let Some(el) = doc.element_mut(span) {
        el.add_class(ANNOTATION_CLASS);
        el.set_attr(DATA_ORIGINAL, &m.original);
        el.set_attr(DATA_CONVERTED, &m.converted);
        el.set_attr(DATA_TOOLTIP, &m.tooltip);
    }
    let annotation = Annotation {
        original: m.original.clone(),
        converted: m.converted.clone(),
        tooltip: m.tooltip.clone(),
        state: DisplayState::Converted,
    };
    render(doc, span, &annotation);
    span
}

/// 표시 텍스트와 툴팁 자식을 다시 그림
///
/// 이미 `[텍스트, 툴팁]` 구조면 노드를 새로 만들지 않고 내용만 바꾼다.
fn render(doc: &mut Document, id: NodeId, annotation: &Annotation) {
    if !update_children(doc, id, annotation) {
        doc.remove_children(id);

        let text = doc.create_text(annotation.displayed_text());
        doc.append_child(id, text);

        let tooltip = doc.create_element("span");
        if let Some(el) = doc.element_mut(tooltip) {
            el.add_class(TOOLTIP_CLASS);
        }
        let tooltip_text = doc.create_text(&annotation.displayed_tooltip());
        doc.append_child(tooltip, tooltip_text);
        doc.append_child(id, tooltip);
    }

    if let Some(el) = doc.element_mut(id) {
        match annotation.state {
            DisplayState::Converted => el.remove_class(ORIGINAL_CLASS),
            DisplayState::Original => el.add_class(ORIGINAL_CLASS),
        }
    }
}

fn update_children(doc: &mut Document, id: NodeId, annotation: &Annotation) -> bool {
    let &[text, tooltip] = doc.children(id) else {
        return false;
    };
    if !doc.has_class(tooltip, TOOLTIP_CLASS) {
        return false;
    }
    let &[tooltip_text] = doc.children(tooltip) else {
        return false;
    };
    if doc.text(text).is_none() || doc.text(tooltip_text).is_none() {
        return false;
    }
    doc.set_text(text, annotation.displayed_text());
    doc.set_text(tooltip_text, &annotation.displayed_tooltip());
    true
}

/// 텍스트 노드를 일반 텍스트/주석 노드 열로 한 번에 교체
///
/// `matches`는 겹치지 않고 시작 위치 순이어야 한다.
/// 매치가 없으면 노드를 건드리지 않는다. 생성된 주석 노드를 반환.
pub fn rewrite_text_node(doc: &mut Document, node: NodeId, matches: &[CandidateMatch]) -> Vec<NodeId> {
    if matches.is_empty() {
        return Vec::new();
    }
    let Some(text) = doc.text(node).map(str::to_string) else {
        return Vec::new();
    };

    let mut fragment = Vec::with_capacity(matches.len() * 2 + 1);
    let mut annotations = Vec::with_capacity(matches.len());
    let mut last = 0;

    for m in matches {
        if m.start > last {
            fragment.push(doc.create_text(&text[last..m.start]));
        }
        let span = create_annotation(doc, m);
        fragment.push(span);
        annotations.push(span);
        last = m.end;
    }
    if last < text.len() {
        fragment.push(doc.create_text(&text[last..]));
    }

    if !doc.replace_with(node, &fragment) {
        for id in fragment {
            doc.remove(id);
        }
        return Vec::new();
    }
    doc.remove(node);
    annotations
}

/// 클릭된 노드가 속한 주석 요소 (자기 자신 포함)
pub fn enclosing_annotation(doc: &Document, node: NodeId) -> Option<NodeId> {
    std::iter::once(node)
        .chain(doc.ancestors(node))
        .find(|&id| doc.has_class(id, ANNOTATION_CLASS))
}

/// 변환값 ⇄ 원문 토글. 바뀐 뒤의 상태를 반환.
pub fn toggle(doc: &mut Document, id: NodeId) -> Option<DisplayState> {
    let mut annotation = Annotation::read(doc, id)?;
    annotation.state = match annotation.state {
        DisplayState::Converted => DisplayState::Original,
        DisplayState::Original => DisplayState::Converted,
    };
    render(doc, id, &annotation);
    Some(annotation.state)
}

/// 주석 요소를 원문 텍스트 노드로 되돌림
///
/// 되돌린 텍스트는 앞뒤 텍스트 형제와 합쳐져 스캔 전과 같은 텍스트 노드가 된다.
pub fn revert(doc: &mut Document, id: NodeId) -> bool {
    let Some(original) = doc.attr(id, DATA_ORIGINAL).map(str::to_string) else {
        return false;
    };
    if doc.parent(id).is_none() {
        return false;
    }

    // 표시 텍스트 노드 재사용
    let shown = doc.children(id).first().copied();
    let text = match shown {
        Some(child) if doc.set_text(child, &original) => child,
        _ => doc.create_text(&original),
    };
    if !doc.replace_with(id, &[text]) {
        return false;
    }
    doc.remove(id);
    doc.merge_text_siblings(text);
    true
}

/// 문서의 모든 주석을 원문으로 되돌림. 되돌린 개수 반환.
pub fn revert_all(doc: &mut Document) -> usize {
    doc.elements_with_class(ANNOTATION_CLASS)
        .into_iter()
        .filter(|&id| revert(doc, id))
        .count()
}
