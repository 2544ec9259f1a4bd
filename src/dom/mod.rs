//! 노드 핸들 기반 문서 트리 (arena)
//!
//! 분리(detach)된 노드의 핸들은 계속 유효하지만 문서 순회에는 나타나지 않습니다.
//! `remove`로 해제한 노드의 슬롯은 다음 노드 생성 때 재사용되므로
//! 해제 후에는 그 핸들을 쓰면 안 됩니다.

pub mod html;

/// 노드 핸들
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// 요소 이름과 속성
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// 소문자 태그 이름
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let classes = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr("class", &classes);
    }

    pub fn remove_class(&mut self, class: &str) {
        let Some(existing) = self.attr("class") else {
            return;
        };
        let classes: Vec<&str> = existing.split_whitespace().filter(|c| *c != class).collect();
        let joined = classes.join(" ");
        self.set_attr("class", &joined);
    }
}

/// 노드 종류
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Doctype(String),
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// 문서 트리
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    /// 해제된 슬롯
    free: Vec<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// 루트(Document) 노드만 있는 빈 문서
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            free: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let data = NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = data;
                id
            }
            None => {
                self.nodes.push(data);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// 살아 있는 노드 수 (루트 포함)
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        self.push(kind)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// 텍스트 노드의 내용
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// 텍스트 노드 내용 교체. 텍스트 노드가 아니면 false.
    pub fn set_text(&mut self, id: NodeId, content: &str) -> bool {
        match &mut self.nodes[id.0].kind {
            NodeKind::Text(text) => {
                text.clear();
                text.push_str(content);
                true
            }
            _ => false,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    /// 기존 부모에서 떼어 `parent`의 마지막 자식으로 붙임
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// 부모에서 분리
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// `old` 자리에 `replacements`를 한 번에 끼워 넣음 (fragment 교체)
    ///
    /// `old`가 분리된 노드면 아무것도 하지 않고 false.
    pub fn replace_with(&mut self, old: NodeId, replacements: &[NodeId]) -> bool {
        let Some(parent) = self.nodes[old.0].parent else {
            return false;
        };
        for &node in replacements {
            self.detach(node);
        }
        let Some(index) = self.nodes[parent.0].children.iter().position(|&c| c == old) else {
            return false;
        };

        self.nodes[parent.0]
            .children
            .splice(index..=index, replacements.iter().copied());
        for &node in replacements {
            self.nodes[node.0].parent = Some(parent);
        }
        self.nodes[old.0].parent = None;
        true
    }

    /// 부모에서 떼고 하위 트리 전체의 슬롯을 해제
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root() {
            return;
        }
        self.detach(id);
        for node in self.descendants(id) {
            self.nodes[node.0] = NodeData {
                kind: NodeKind::Text(String::new()),
                parent: None,
                children: Vec::new(),
            };
            self.free.push(node);
        }
    }

    /// 자식을 모두 해제
    pub fn remove_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.remove(child);
        }
    }

    /// `id`와 붙어 있는 텍스트 형제들을 하나의 텍스트 노드로 합침
    ///
    /// 가장 앞의 텍스트 노드가 남고 나머지는 해제된다. 남은 노드를 반환.
    pub fn merge_text_siblings(&mut self, id: NodeId) -> NodeId {
        let Some(parent) = self.parent(id) else {
            return id;
        };
        let siblings = self.children(parent);
        let Some(index) = siblings.iter().position(|&c| c == id) else {
            return id;
        };
        let is_text = |node: NodeId| self.text(node).is_some();

        let mut first = index;
        while first > 0 && is_text(siblings[first - 1]) {
            first -= 1;
        }
        let mut last = index;
        while last + 1 < siblings.len() && is_text(siblings[last + 1]) {
            last += 1;
        }
        if first == last {
            return id;
        }

        let run = siblings[first..=last].to_vec();
        let merged: String = run.iter().filter_map(|&node| self.text(node)).collect();
        let keep = run[0];
        self.set_text(keep, &merged);
        for &node in &run[1..] {
            self.remove(node);
        }
        keep
    }

    /// 부모 → 루트 방향 조상
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&node| self.parent(node))
    }

    /// `id`를 포함한 전위 순회 (문서 순서)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// 하위 텍스트 전체 이어 붙임
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.text(node))
            .collect()
    }

    /// 이름이 같은 첫 요소 (문서 순서)
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&node| self.element(node).is_some_and(|el| el.tag.eq_ignore_ascii_case(tag)))
    }

    /// 클래스를 가진 모든 요소 (문서 순서)
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&node| self.has_class(node, class))
            .collect()
    }

    /// `<body>`가 있으면 body, 없으면 루트
    pub fn body(&self) -> NodeId {
        self.find_element("body").unwrap_or_else(|| self.root())
    }
}
