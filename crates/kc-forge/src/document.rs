//! HCL document assembly on top of `hcl-rs`.
//!
//! Blocks and attributes are built with [`hcl::Block::builder`] and rendered
//! by [`hcl::format`], which owns quoting and escaping. A [`Document`] only
//! sequences those structures with `#` comment lines, which the `hcl-rs`
//! structure model does not carry.

use hcl::expr::{Expression, FuncCall, ObjectKey, Traversal, Variable};
use hcl::structure::BlockBuilder;
use hcl::{Block, Body, Identifier, Structure};

use crate::error::ForgeResult;

/// A reference expression such as `var.realm_id` or `keycloak_user.alice.id`.
#[must_use]
pub fn reference(path: &str) -> Expression {
    let mut segments = path.split('.');
    let root = Variable::unchecked(segments.next().unwrap_or_default());
    let mut rest = segments.peekable();
    if rest.peek().is_none() {
        return Expression::from(root);
    }
    let mut traversal = Traversal::builder(root);
    for segment in rest {
        traversal = traversal.attr(Identifier::unchecked(segment));
    }
    Expression::from(traversal.build())
}

/// `var.<name>`.
#[must_use]
pub fn var(name: &str) -> Expression {
    reference(&format!("var.{name}"))
}

/// A function call with literal or expression arguments.
#[must_use]
pub fn call<I>(name: &str, args: I) -> Expression
where
    I: IntoIterator<Item = Expression>,
{
    let mut builder = FuncCall::builder(Identifier::unchecked(name));
    for arg in args {
        builder = builder.arg(arg);
    }
    Expression::from(builder.build())
}

/// A tuple of string literals.
#[must_use]
pub fn strings<I, S>(items: I) -> Expression
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Expression::Array(items.into_iter().map(|s| Expression::String(s.into())).collect())
}

/// A tuple of references.
#[must_use]
pub fn references<I, S>(paths: I) -> Expression
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Expression::Array(paths.into_iter().map(|p| reference(p.as_ref())).collect())
}

/// An empty tuple.
#[must_use]
pub fn empty_list() -> Expression {
    Expression::Array(Vec::new())
}

/// An object with quoted keys.
#[must_use]
pub fn map<I, K>(entries: I) -> Expression
where
    I: IntoIterator<Item = (K, Expression)>,
    K: Into<String>,
{
    Expression::Object(
        entries
            .into_iter()
            .map(|(k, v)| (ObjectKey::Expression(Expression::String(k.into())), v))
            .collect(),
    )
}

/// An object of quoted keys to string literals.
#[must_use]
pub fn string_map<I, K, V>(entries: I) -> Expression
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    map(entries.into_iter().map(|(k, v)| (k, Expression::String(v.into()))))
}

/// An object with identifier keys (`inputs = { realm_id = ... }`).
#[must_use]
pub fn object<I, K>(entries: I) -> Expression
where
    I: IntoIterator<Item = (K, Expression)>,
    K: Into<String>,
{
    Expression::Object(
        entries
            .into_iter()
            .map(|(k, v)| (ObjectKey::Identifier(Identifier::unchecked(k.into())), v))
            .collect(),
    )
}

/// `resource "<kind>" "<label>" { ... }`.
#[must_use]
pub fn resource(kind: &str, label: &str) -> BlockBuilder {
    Block::builder("resource").add_label(kind).add_label(label)
}

/// Optional attributes on a block under construction.
pub trait BlockBuilderExt: Sized {
    /// Adds `key = value` when a value is present.
    #[must_use]
    fn opt_attribute<V: Into<Expression>>(self, key: &str, value: Option<V>) -> Self;

    /// Adds a nested block when one is present.
    #[must_use]
    fn opt_block(self, block: Option<Block>) -> Self;
}

impl BlockBuilderExt for BlockBuilder {
    fn opt_attribute<V: Into<Expression>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.add_attribute((key, value.into())),
            None => self,
        }
    }

    fn opt_block(self, block: Option<Block>) -> Self {
        match block {
            Some(block) => self.add_block(block),
            None => self,
        }
    }
}

#[derive(Debug)]
enum Item {
    Comment(String),
    Blank,
    Structure(Structure),
    CommentedOut(Structure),
}

/// An ordered sequence of top-level structures and comments.
#[derive(Debug, Default)]
pub struct Document {
    items: Vec<Item>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `#` comment; multi-line text becomes several comment lines.
    pub fn comment(&mut self, text: &str) -> &mut Self {
        self.items.push(Item::Comment(text.to_string()));
        self
    }

    /// Adds an empty line.
    pub fn blank(&mut self) -> &mut Self {
        self.items.push(Item::Blank);
        self
    }

    /// Adds a block.
    pub fn block(&mut self, block: Block) -> &mut Self {
        self.items.push(Item::Structure(Structure::Block(block)));
        self
    }

    /// Adds a top-level attribute.
    pub fn attribute(&mut self, key: &str, value: impl Into<Expression>) -> &mut Self {
        self.items
            .push(Item::Structure(Structure::Attribute(hcl::Attribute::new(key, value.into()))));
        self
    }

    /// Adds a block with every rendered line commented out.
    pub fn commented_out(&mut self, block: Block) -> &mut Self {
        self.items.push(Item::CommentedOut(Structure::Block(block)));
        self
    }

    /// Renders the document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ForgeError::Render`] when a structure cannot be formatted.
    pub fn render(self) -> ForgeResult<String> {
        let mut out = String::new();
        for item in self.items {
            match item {
                Item::Comment(text) => {
                    for line in text.lines() {
                        push_comment_line(&mut out, line);
                    }
                }
                Item::Blank => out.push('\n'),
                Item::Structure(structure) => out.push_str(&format_structure(structure)?),
                Item::CommentedOut(structure) => {
                    for line in format_structure(structure)?.lines() {
                        push_comment_line(&mut out, line);
                    }
                }
            }
        }
        Ok(out)
    }
}

fn push_comment_line(out: &mut String, line: &str) {
    if line.is_empty() {
        out.push_str("#\n");
    } else {
        out.push_str("# ");
        out.push_str(line);
        out.push('\n');
    }
}

fn format_structure(structure: Structure) -> ForgeResult<String> {
    let body = match structure {
        Structure::Attribute(attribute) => Body::builder().add_attribute(attribute),
        Structure::Block(block) => Body::builder().add_block(block),
    }
    .build();
    let mut text = hcl::format::to_string(&body)?;
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(doc: Document) -> String {
        doc.render().unwrap()
    }

    #[test]
    fn references_are_unquoted() {
        let mut doc = Document::new();
        doc.block(
            resource("keycloak_user", "alice")
                .add_attribute(("realm_id", var("realm_id")))
                .add_attribute(("parent", reference("keycloak_group.eng.id")))
                .build(),
        );
        let text = render(doc);
        assert!(text.starts_with("resource \"keycloak_user\" \"alice\" {\n"));
        assert!(text.contains("realm_id = var.realm_id\n"));
        assert!(text.contains("parent = keycloak_group.eng.id\n"));
    }

    #[test]
    fn string_literals_are_quoted_and_escaped() {
        let mut doc = Document::new();
        doc.attribute("name", r#"say "hi""#);
        let text = render(doc);
        assert!(text.contains(r#"name = "say \"hi\"""#));
    }

    #[test]
    fn nested_blocks_indent() {
        let block = Block::builder("smtp_server")
            .add_attribute(("port", 25_i64))
            .add_block(Block::builder("auth").add_attribute(("username", "mailer")).build())
            .build();
        let mut doc = Document::new();
        doc.block(block);
        let text = render(doc);
        assert!(text.contains("\n  port = 25\n"));
        assert!(text.contains("\n  auth {\n    username = \"mailer\"\n  }\n"));
    }

    #[test]
    fn comments_and_commented_blocks() {
        let mut doc = Document::new();
        doc.comment("first\n\nsecond")
            .blank()
            .commented_out(resource("x", "y").add_attribute(("a", 1_i64)).build());
        let text = render(doc);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(&lines[..4], &["# first", "#", "# second", ""]);
        assert!(lines[4..].iter().all(|l| l.starts_with('#')));
        assert!(text.contains("# resource \"x\" \"y\" {"));
    }

    #[test]
    fn optional_attributes_skip_none() {
        let block = Block::builder("b")
            .opt_attribute::<&str>("missing", None)
            .opt_attribute("present", Some("x"))
            .opt_block(None)
            .build();
        let mut doc = Document::new();
        doc.block(block);
        let text = render(doc);
        assert!(!text.contains("missing"));
        assert!(text.contains("present = \"x\""));
    }

    #[test]
    fn maps_and_lists() {
        let mut doc = Document::new();
        doc.attribute("attrs", string_map([("dept", "eng")]))
            .attribute("ids", references(["a.b.id"]))
            .attribute("empty", empty_list())
            .attribute("inputs", object([("realm_id", var("realm_id"))]));
        let text = render(doc);
        assert!(text.contains("\"dept\" = \"eng\""));
        assert!(text.contains("a.b.id"));
        assert!(text.contains("empty = []\n"));
        assert!(text.contains("realm_id = var.realm_id"));
    }

    #[test]
    fn function_calls() {
        let mut doc = Document::new();
        doc.attribute("path", call("find_in_parent_folders", []));
        assert!(render(doc).contains("path = find_in_parent_folders()\n"));
    }
}
