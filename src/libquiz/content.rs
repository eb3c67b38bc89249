use serde::{Deserialize, Serialize};

/// One block of renderable content.
///
/// Serialized externally tagged, e.g. `{"text": "..."}` or
/// `{"code": {"language": "ts", "source": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentNode {
    Text(String),
    Emphasis(Content),
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        source: String,
    },
    List(Vec<Content>),
}

/// Renderable rich content: an ordered run of [`ContentNode`]s.
///
/// Authors may write a plain string wherever content is expected; it is read
/// as a single text run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ContentRepr")]
pub struct Content(Vec<ContentNode>);

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentRepr {
    Plain(String),
    Nodes(Vec<ContentNode>),
}

impl From<ContentRepr> for Content {
    fn from(repr: ContentRepr) -> Self {
        match repr {
            ContentRepr::Plain(text) => Content::text(text),
            ContentRepr::Nodes(nodes) => Content(nodes),
        }
    }
}

impl Content {
    pub fn new(nodes: Vec<ContentNode>) -> Self {
        Content(nodes)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Content(vec![ContentNode::Text(text.into())])
    }

    pub fn nodes(&self) -> &[ContentNode] {
        &self.0
    }

    /// Flattens the tree to text: code blocks and list items start on their
    /// own lines, emphasis is dropped.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        write_plain(&self.0, &mut out);
        out.trim_end().to_string()
    }

    pub fn is_blank(&self) -> bool {
        self.plain_text().trim().is_empty()
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::text(text)
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::text(text)
    }
}

impl From<Vec<ContentNode>> for Content {
    fn from(nodes: Vec<ContentNode>) -> Self {
        Content(nodes)
    }
}

fn start_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn write_plain(nodes: &[ContentNode], out: &mut String) {
    for node in nodes {
        match node {
            ContentNode::Text(text) => out.push_str(text),
            ContentNode::Emphasis(inner) => write_plain(&inner.0, out),
            ContentNode::Code { source, .. } => {
                start_line(out);
                out.push_str(source);
                out.push('\n');
            }
            ContentNode::List(items) => {
                for item in items {
                    start_line(out);
                    out.push_str("- ");
                    write_plain(&item.0, out);
                }
                out.push('\n');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_string_reads_as_single_text_run() {
        let content: Content = serde_json::from_str("\"3 класса\"").unwrap();
        assert_eq!(content, Content::text("3 класса"));
        assert_eq!(content.plain_text(), "3 класса");
    }

    #[test]
    fn node_array_parses_every_node_kind() {
        let json = r#"[
            {"text": "Which class "},
            {"emphasis": "violates"},
            {"text": " SRP?"},
            {"code": {"language": "ts", "source": "class Report {}"}},
            {"list": ["prints", [{"emphasis": "saves"}]]}
        ]"#;
        let content: Content = serde_json::from_str(json).unwrap();

        assert_eq!(content.nodes().len(), 5);
        assert_eq!(
            content.nodes()[3],
            ContentNode::Code {
                language: Some("ts".to_string()),
                source: "class Report {}".to_string(),
            }
        );
        assert_eq!(
            content.plain_text(),
            "Which class violates SRP?\nclass Report {}\n- prints\n- saves"
        );
    }

    #[test]
    fn code_without_language_omits_the_field() {
        let content = Content::new(vec![ContentNode::Code {
            language: None,
            source: "x".to_string(),
        }]);
        let json = serde_json::to_string(&content).unwrap();
        assert_eq!(json, r#"[{"code":{"source":"x"}}]"#);
    }

    #[test]
    fn whitespace_only_content_is_blank() {
        assert!(Content::text("  \n").is_blank());
        assert!(Content::default().is_blank());
        assert!(Content::new(vec![ContentNode::Emphasis(Content::text(" "))]).is_blank());
        assert!(!Content::text("ok").is_blank());
    }
}
