//! Python analyzer using tree-sitter.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::analysis::{ClassInfo, Complexity, FunctionInfo, ParsedFile, Structure, SyntaxAnalyzer};

/// Tree-sitter query for import statements, in document order.
const IMPORT_QUERY: &str = r#"
(import_statement) @import
(import_from_statement) @import_from
"#;

const UNKNOWN_DECORATOR: &str = "unknown_decorator";

pub struct PythonAnalyzer {
    language: Language,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn extract_imports(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<String>> {
        let query = Query::new(&self.language, IMPORT_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        let mut imports = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "import" => imports.extend(plain_import_names(parsed, capture.node)),
                    "import_from" => imports.extend(from_import_names(parsed, capture.node)),
                    _ => {}
                }
            }
        }
        Ok(imports)
    }
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxAnalyzer for PythonAnalyzer {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py", "pyw", "pyi"]
    }

    fn parse(&self, source: &str) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Python source"))?;

        Ok(ParsedFile {
            tree,
            source: source.as_bytes().to_vec(),
        })
    }

    fn complexity(&self, parsed: &ParsedFile) -> Complexity {
        let mut walker = ComplexityWalker::default();
        walker.walk(parsed.tree.root_node());
        walker.into_complexity()
    }

    fn extract_structure(&self, parsed: &ParsedFile) -> anyhow::Result<Structure> {
        let mut walker = StructureWalker::new(parsed);
        walker.walk(parsed.tree.root_node());

        let mut structure = walker.finish();
        structure.imports = self.extract_imports(parsed)?;
        Ok(structure)
    }
}

// ---------------------------------------------------------------------------
// Complexity
// ---------------------------------------------------------------------------

/// Accumulates cognitive load, branches and nesting over a subtree.
///
/// An `elif` nests inside the `if` it continues, so a chain of n `elif`s
/// reaches depth n + 1 and the trailing `else` is visited at that depth.
#[derive(Default)]
struct ComplexityWalker {
    depth: usize,
    max_depth: usize,
    branches: usize,
    load: usize,
}

impl ComplexityWalker {
    fn enter(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn walk(&mut self, node: Node) {
        match node.kind() {
            "function_definition" | "class_definition" => {
                self.load += 1;
                self.walk_children(node);
            }
            "if_statement" => self.walk_if(node),
            "for_statement" | "while_statement" => {
                self.load += 2;
                self.branches += 1;
                self.enter();
                self.walk_children(node);
                self.depth -= 1;
            }
            "try_statement" => {
                let mut cursor = node.walk();
                let handlers = node
                    .children(&mut cursor)
                    .filter(|c| matches!(c.kind(), "except_clause" | "except_group_clause"))
                    .count();
                self.load += 1;
                self.branches += handlers + 1;
                self.enter();
                self.walk_children(node);
                self.depth -= 1;
            }
            _ => self.walk_children(node),
        }
    }

    fn walk_if(&mut self, node: Node) {
        self.load += 1;
        self.branches += 1;
        self.enter();
        let mut opened = 1;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "elif_clause" => {
                    self.load += 1;
                    self.branches += 1;
                    self.enter();
                    opened += 1;
                    self.walk_children(child);
                }
                "else_clause" => self.walk_children(child),
                _ => self.walk(child),
            }
        }

        self.depth -= opened;
    }

    fn walk_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child);
        }
    }

    fn into_complexity(self) -> Complexity {
        Complexity {
            cognitive_load: self.load,
            nesting_depth: self.max_depth,
            branches: self.branches,
            max_method_complexity: 0,
            total_complexity: 0,
        }
        .finish()
    }
}

/// Complexity of one subtree, the root node included.
pub(crate) fn subtree_complexity(node: Node) -> Complexity {
    let mut walker = ComplexityWalker::default();
    walker.walk(node);
    walker.into_complexity()
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

struct StructureWalker<'a> {
    parsed: &'a ParsedFile,
    functions: Vec<FunctionInfo>,
    classes: Vec<ClassInfo>,
    current_function: Option<usize>,
    current_class: Option<usize>,
}

impl<'a> StructureWalker<'a> {
    fn new(parsed: &'a ParsedFile) -> Self {
        Self {
            parsed,
            functions: Vec::new(),
            classes: Vec::new(),
            current_function: None,
            current_class: None,
        }
    }

    fn finish(self) -> Structure {
        Structure {
            functions: self.functions,
            classes: self.classes,
            imports: Vec::new(),
        }
    }

    fn text(&self, node: Node) -> &'a str {
        self.parsed.node_text(node)
    }

    fn walk(&mut self, node: Node) {
        match node.kind() {
            "function_definition" => self.visit_function(node),
            "class_definition" => self.visit_class(node),
            "call" => {
                if let Some(name) = node
                    .child_by_field_name("function")
                    .and_then(|f| self.callee_name(f))
                {
                    if let Some(idx) = self.current_function {
                        self.functions[idx].calls.insert(name);
                    }
                }
                self.walk_children(node);
            }
            "attribute" => self.visit_attribute(node),
            _ => self.walk_children(node),
        }
    }

    fn walk_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child);
        }
    }

    fn visit_function(&mut self, node: Node) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();

        let mut info = FunctionInfo {
            name: name.clone(),
            has_docstring: node
                .child_by_field_name("body")
                .is_some_and(has_docstring),
            decorators: self.decorators(node),
            returns: node
                .child_by_field_name("return_type")
                .map(|n| self.text(n).to_string()),
            is_async: is_async(node),
            complexity: subtree_complexity(node),
            line: node.start_position().row + 1,
            ..Default::default()
        };
        if let Some(params) = node.child_by_field_name("parameters") {
            count_parameters(params, &mut info);
        }

        if let Some(class_idx) = self.current_class {
            if is_class_member(node) {
                self.classes[class_idx].methods.push(name);
            }
        }

        self.functions.push(info);
        let previous = self.current_function.replace(self.functions.len() - 1);
        self.walk_children(node);
        self.current_function = previous;
    }

    fn visit_class(&mut self, node: Node) {
        let bases = node
            .child_by_field_name("superclasses")
            .map(|args| {
                let mut cursor = args.walk();
                args.named_children(&mut cursor)
                    .filter(|n| !matches!(n.kind(), "keyword_argument" | "comment"))
                    .map(|n| match n.kind() {
                        "identifier" => self.text(n).to_string(),
                        "attribute" => self.dotted_name(n),
                        _ => "unknown".to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        self.classes.push(ClassInfo {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default(),
            bases,
            has_docstring: node
                .child_by_field_name("body")
                .is_some_and(has_docstring),
            decorators: self.decorators(node),
            line: node.start_position().row + 1,
            ..Default::default()
        });

        let previous = self.current_class.replace(self.classes.len() - 1);
        self.walk_children(node);
        self.current_class = previous;
    }

    /// Attribute chains go to the enclosing class when there is one,
    /// otherwise to the enclosing function.
    fn visit_attribute(&mut self, node: Node) {
        let name = self.dotted_name(node);
        if !name.is_empty() {
            if let Some(idx) = self.current_class {
                self.classes[idx].attributes.insert(name);
            } else if let Some(idx) = self.current_function {
                self.functions[idx].attributes.insert(name);
            }
        }

        // the chain itself is recorded; keep looking inside its base object
        let mut base = node;
        while base.kind() == "attribute" {
            match base.child_by_field_name("object") {
                Some(object) => base = object,
                None => return,
            }
        }
        if base.kind() != "identifier" {
            self.walk(base);
        }
    }

    fn callee_name(&self, node: Node) -> Option<String> {
        match node.kind() {
            "identifier" => Some(self.text(node).to_string()),
            "attribute" => Some(self.dotted_name(node)).filter(|n| !n.is_empty()),
            _ => None,
        }
    }

    /// `a.b.c` for an attribute chain rooted at a name; a chain rooted at
    /// another expression keeps only the attribute parts.
    fn dotted_name(&self, node: Node) -> String {
        let mut parts = Vec::new();
        let mut current = node;
        while current.kind() == "attribute" {
            if let Some(attr) = current.child_by_field_name("attribute") {
                parts.push(self.text(attr));
            }
            match current.child_by_field_name("object") {
                Some(object) => current = object,
                None => break,
            }
        }
        if current.kind() == "identifier" {
            parts.push(self.text(current));
        }
        parts.reverse();
        parts.join(".")
    }

    fn decorators(&self, definition: Node) -> Vec<String> {
        let Some(parent) = definition.parent().filter(|p| p.kind() == "decorated_definition")
        else {
            return Vec::new();
        };

        let mut cursor = parent.walk();
        parent
            .children(&mut cursor)
            .filter(|c| c.kind() == "decorator")
            .map(|decorator| {
                let expr = decorator.named_child(0);
                match expr.map(|e| (e.kind(), e)) {
                    Some(("identifier", e)) => self.text(e).to_string(),
                    Some(("attribute", e)) => self.dotted_name(e),
                    Some(("call", e)) => e
                        .child_by_field_name("function")
                        .and_then(|f| self.callee_name(f))
                        .unwrap_or_else(|| UNKNOWN_DECORATOR.to_string()),
                    _ => UNKNOWN_DECORATOR.to_string(),
                }
            })
            .collect()
    }
}

/// Fill argument counts from a `parameters` node.
fn count_parameters(params: Node, info: &mut FunctionInfo) {
    let mut keyword_only = false;
    let mut cursor = params.walk();

    for param in params.named_children(&mut cursor) {
        let kind = match param.kind() {
            "typed_parameter" => param.named_child(0).map(|c| c.kind()).unwrap_or("identifier"),
            other => other,
        };

        match kind {
            "list_splat_pattern" => {
                info.has_varargs = true;
                keyword_only = true;
            }
            "keyword_separator" => keyword_only = true,
            "dictionary_splat_pattern" => info.has_kwargs = true,
            // everything counted so far was positional-only
            "positional_separator" => info.posonly_args = std::mem::take(&mut info.args),
            "comment" => {}
            "default_parameter" | "typed_default_parameter" => {
                if keyword_only {
                    info.kwonly_args += 1;
                } else {
                    info.args += 1;
                    info.defaults += 1;
                }
            }
            _ => {
                if keyword_only {
                    info.kwonly_args += 1;
                } else {
                    info.args += 1;
                }
            }
        }
    }
}

/// Whether a body block starts with a string expression statement.
fn has_docstring(body: Node) -> bool {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment");

    first.is_some_and(|stmt| {
        stmt.kind() == "expression_statement"
            && stmt
                .named_child(0)
                .is_some_and(|e| matches!(e.kind(), "string" | "concatenated_string"))
    })
}

fn is_async(function: Node) -> bool {
    function
        .child(0)
        .is_some_and(|first| first.kind() == "async")
}

/// Whether a function definition sits directly in a class body.
fn is_class_member(function: Node) -> bool {
    let mut node = function;
    if let Some(parent) = node.parent().filter(|p| p.kind() == "decorated_definition") {
        node = parent;
    }
    node.parent()
        .filter(|block| block.kind() == "block")
        .and_then(|block| block.parent())
        .is_some_and(|owner| owner.kind() == "class_definition")
}

/// Names of an `import a.b, c as d` statement.
fn plain_import_names(parsed: &ParsedFile, node: Node) -> Vec<String> {
    let mut cursor = node.walk();
    node.children_by_field_name("name", &mut cursor)
        .filter_map(|n| imported_name(parsed, n))
        .collect()
}

/// Names of a `from m import x, y` statement, qualified by the module.
///
/// Relative module prefixes are dropped, so `from . import x` yields `x`
/// and `from .pkg import x` yields `pkg.x`. A wildcard yields `m.*`.
fn from_import_names(parsed: &ParsedFile, node: Node) -> Vec<String> {
    let module = node
        .child_by_field_name("module_name")
        .map(|m| parsed.node_text(m).trim_start_matches('.').to_string())
        .unwrap_or_default();

    let qualify = |name: &str| {
        if module.is_empty() {
            name.to_string()
        } else {
            format!("{module}.{name}")
        }
    };

    let mut cursor = node.walk();
    let mut names: Vec<String> = node
        .children_by_field_name("name", &mut cursor)
        .filter_map(|n| imported_name(parsed, n))
        .map(|n| qualify(&n))
        .collect();

    let mut cursor = node.walk();
    if node
        .children(&mut cursor)
        .any(|c| c.kind() == "wildcard_import")
    {
        names.push(qualify("*"));
    }
    names
}

fn imported_name(parsed: &ParsedFile, node: Node) -> Option<String> {
    match node.kind() {
        "dotted_name" => Some(parsed.node_text(node).to_string()),
        "aliased_import" => node
            .child_by_field_name("name")
            .map(|n| parsed.node_text(n).to_string()),
        _ => None,
    }
}
