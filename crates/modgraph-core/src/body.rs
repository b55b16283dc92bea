//! Method body analysis.
//!
//! Bodies arrive as source text. We wrap them in a throwaway class so
//! Tree-sitter can parse them, then walk the tree collecting invocations,
//! instantiations and field uses. Resolving those names to graph nodes is
//! left to the graph builder, which knows what exists.

use crate::error::AnalyzeError;
use crate::records::AccessType;
use std::collections::BTreeSet;
use tracing::debug;
use tree_sitter::{Node, Parser};

/// A call site inside a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Receiver expression text (`repo`, `this`, `super`), absent for bare calls.
    pub receiver: Option<String>,
    pub name: String,
    /// Line relative to the body, starting at 1.
    pub line: u32,
}

/// A use of a name that may be a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUse {
    pub name: String,
    pub access: AccessType,
    /// Written as `this.name`, so it cannot be a local.
    pub qualified: bool,
}

/// Everything mined from one body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyFacts {
    pub invocations: Vec<Invocation>,
    /// Type names from `new T(..)` expressions.
    pub instantiations: Vec<String>,
    pub field_uses: Vec<FieldUse>,
    /// Locals and lambda/catch/loop variables declared in the body.
    pub locals: BTreeSet<String>,
}

impl BodyFacts {
    fn record_use(&mut self, name: &str, access: AccessType, qualified: bool) {
        let exists = self
            .field_uses
            .iter()
            .any(|u| u.name == name && u.access == access && u.qualified == qualified);
        if !exists {
            self.field_uses.push(FieldUse {
                name: name.to_string(),
                access,
                qualified,
            });
        }
    }
}

/// Parses method bodies with the Java grammar.
pub struct BodyAnalyzer {
    parser: Parser,
}

impl BodyAnalyzer {
    pub fn new() -> Result<Self, AnalyzeError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::language())
            .map_err(|e| AnalyzeError::Language(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Analyzes a body given either as a `{ ... }` block or bare statements.
    ///
    /// Syntax errors are tolerated: whatever Tree-sitter recovers is walked.
    pub fn analyze(&mut self, body: &str) -> Result<BodyFacts, AnalyzeError> {
        let trimmed = body.trim();
        let (block, line_offset) = if trimmed.starts_with('{') {
            (trimmed.to_string(), 1)
        } else {
            (format!("{{\n{}\n}}", trimmed), 0)
        };
        let source = format!("class __Body {{ void __body() {} }}", block);

        let tree = self
            .parser
            .parse(&source, None)
            .ok_or(AnalyzeError::NoTree)?;
        if tree.root_node().has_error() {
            debug!("Body has syntax errors; walking the recovered tree");
        }

        let mut walker = Walker {
            source: &source,
            line_offset,
            facts: BodyFacts::default(),
        };
        if let Some(block) = find_method_body(&tree.root_node()) {
            walker.visit(&block);
        }

        let mut facts = walker.facts;
        let locals = facts.locals.clone();
        facts
            .field_uses
            .retain(|u| u.qualified || !locals.contains(&u.name));
        Ok(facts)
    }
}

struct Walker<'s> {
    source: &'s str,
    line_offset: u32,
    facts: BodyFacts,
}

impl<'s> Walker<'s> {
    fn text(&self, node: &Node) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn visit(&mut self, node: &Node) {
        match node.kind() {
            "method_invocation" => {
                let receiver = node.child_by_field_name("object");
                if let Some(obj) = receiver {
                    self.visit(&obj);
                }
                if let Some(name) = node.child_by_field_name("name") {
                    let invocation = Invocation {
                        receiver: receiver.map(|r| self.text(&r).to_string()),
                        name: self.text(&name).to_string(),
                        line: node.start_position().row as u32 + self.line_offset,
                    };
                    self.facts.invocations.push(invocation);
                }
                if let Some(args) = node.child_by_field_name("arguments") {
                    self.visit(&args);
                }
            }

            "object_creation_expression" => {
                if let Some(ty) = node.child_by_field_name("type") {
                    let name = strip_type_arguments(self.text(&ty));
                    self.facts.instantiations.push(name.to_string());
                }
                if let Some(args) = node.child_by_field_name("arguments") {
                    self.visit(&args);
                }
                if let Some(class_body) = node.child_by_field_name("body") {
                    self.visit(&class_body);
                }
            }

            "assignment_expression" => {
                if let Some(left) = node.child_by_field_name("left") {
                    if !self.record_write(&left) {
                        self.visit(&left);
                    }
                }
                if let Some(right) = node.child_by_field_name("right") {
                    self.visit(&right);
                }
            }

            "update_expression" => {
                for i in 0..node.named_child_count() {
                    if let Some(operand) = node.named_child(i) {
                        if !self.record_write(&operand) {
                            self.visit(&operand);
                        }
                    }
                }
            }

            "field_access" => {
                let object = node.child_by_field_name("object");
                let field = node.child_by_field_name("field");
                match (object, field) {
                    (Some(obj), Some(field)) if obj.kind() == "this" => {
                        let name = self.text(&field);
                        self.facts.record_use(name, AccessType::Read, true);
                    }
                    (Some(obj), _) => self.visit(&obj),
                    _ => {}
                }
            }

            "variable_declarator" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.facts.locals.insert(self.text(&name).to_string());
                }
                if let Some(value) = node.child_by_field_name("value") {
                    self.visit(&value);
                }
            }

            "enhanced_for_statement" => {
                let name = node.child_by_field_name("name");
                if let Some(name) = name {
                    self.facts.locals.insert(self.text(&name).to_string());
                }
                for field in ["value", "body"] {
                    if let Some(child) = node.child_by_field_name(field) {
                        self.visit(&child);
                    }
                }
            }

            "catch_formal_parameter" | "formal_parameter" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.facts.locals.insert(self.text(&name).to_string());
                }
            }

            "lambda_expression" => {
                if let Some(params) = node.child_by_field_name("parameters") {
                    self.collect_lambda_params(&params);
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.visit(&body);
                }
            }

            "identifier" => {
                let name = self.text(node);
                self.facts.record_use(name, AccessType::Read, false);
            }

            // Names in these positions never denote fields.
            "method_reference" | "scoped_identifier" | "labeled_statement"
            | "break_statement" | "continue_statement" | "type_identifier"
            | "generic_type" | "line_comment" | "block_comment" => {}

            _ => {
                for i in 0..node.child_count() {
                    if let Some(child) = node.child(i) {
                        self.visit(&child);
                    }
                }
            }
        }
    }

    /// Records a write if `target` is a plain or `this.`-qualified name.
    fn record_write(&mut self, target: &Node) -> bool {
        match target.kind() {
            "identifier" => {
                let name = self.text(target);
                self.facts.record_use(name, AccessType::Write, false);
                true
            }
            "field_access" => {
                let object = target.child_by_field_name("object");
                let field = target.child_by_field_name("field");
                match (object, field) {
                    (Some(obj), Some(field)) if obj.kind() == "this" => {
                        let name = self.text(&field);
                        self.facts.record_use(name, AccessType::Write, true);
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn collect_lambda_params(&mut self, params: &Node) {
        if params.kind() == "identifier" {
            self.facts.locals.insert(self.text(params).to_string());
            return;
        }
        for i in 0..params.named_child_count() {
            if let Some(child) = params.named_child(i) {
                match child.kind() {
                    "identifier" => {
                        self.facts.locals.insert(self.text(&child).to_string());
                    }
                    "formal_parameter" => self.visit(&child),
                    _ => {}
                }
            }
        }
    }
}

/// Locates the block of the wrapper method so its names are never walked.
fn find_method_body<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    if node.kind() == "method_declaration" {
        return node.child_by_field_name("body");
    }
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i) {
            if let Some(found) = find_method_body(&child) {
                return Some(found);
            }
        }
    }
    None
}

/// `Map<K, V>` → `Map`, `String[]` → `String`.
fn strip_type_arguments(ty: &str) -> &str {
    let end = ty.find(|c: char| c == '<' || c == '[').unwrap_or(ty.len());
    ty[..end].trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(body: &str) -> BodyFacts {
        BodyAnalyzer::new().unwrap().analyze(body).unwrap()
    }

    fn uses(facts: &BodyFacts, access: AccessType) -> Vec<&str> {
        facts
            .field_uses
            .iter()
            .filter(|u| u.access == access)
            .map(|u| u.name.as_str())
            .collect()
    }

    #[test]
    fn test_invocations_with_receivers() {
        let facts = analyze(
            r#"{
                List<User> users = repository.findAll();
                validate(users);
                this.audit();
                return users;
            }"#,
        );

        let calls: Vec<(Option<&str>, &str)> = facts
            .invocations
            .iter()
            .map(|i| (i.receiver.as_deref(), i.name.as_str()))
            .collect();
        assert_eq!(
            calls,
            vec![
                (Some("repository"), "findAll"),
                (None, "validate"),
                (Some("this"), "audit"),
            ]
        );
        assert_eq!(facts.invocations[0].line, 2);
    }

    #[test]
    fn test_reads_and_writes() {
        let facts = analyze(
            r#"
            this.count = count + 1;
            name = prefix;
            total++;
            "#,
        );

        let writes = uses(&facts, AccessType::Write);
        assert!(writes.contains(&"count"));
        assert!(writes.contains(&"name"));
        assert!(writes.contains(&"total"));

        let reads = uses(&facts, AccessType::Read);
        assert!(reads.contains(&"count"));
        assert!(reads.contains(&"prefix"));
        assert!(!reads.contains(&"name"));
    }

    #[test]
    fn test_locals_are_not_field_uses() {
        let facts = analyze(
            r#"{
                int local = 3;
                for (String item : items) { local += item.length(); }
                Runnable r = () -> cache.clear();
                return local;
            }"#,
        );

        assert!(facts.locals.contains("local"));
        assert!(facts.locals.contains("item"));
        let reads = uses(&facts, AccessType::Read);
        assert!(reads.contains(&"items"));
        assert!(reads.contains(&"cache"));
        assert!(!reads.contains(&"local"));
        assert!(!reads.contains(&"item"));
    }

    #[test]
    fn test_this_qualified_survives_shadowing() {
        let facts = analyze("{ String name = \"x\"; this.name = name; }");
        assert!(facts
            .field_uses
            .iter()
            .any(|u| u.name == "name" && u.access == AccessType::Write && u.qualified));
    }

    #[test]
    fn test_instantiations() {
        let facts = analyze("{ return new ResponseEntity<User>(user, HttpStatus.OK); }");
        assert_eq!(facts.instantiations, vec!["ResponseEntity"]);
    }

    #[test]
    fn test_empty_body() {
        let facts = analyze("");
        assert!(facts.invocations.is_empty());
        assert!(facts.field_uses.is_empty());
    }
}
