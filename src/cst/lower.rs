/// Tree-sitter front end
///
/// Parses Python source with tree-sitter-python and lowers the parse tree into the nested
/// grammar shapes of [`Cst`]. Simple expressions are wrapped through the whole precedence chain
/// (`test` down to `power`/`atom`) so templates can describe them structurally; expressions the
/// templates never look inside are flattened into an opaque `test` of leaf tokens.
use std::path::Path;

use tracing::debug;
use tree_sitter::{Node, Parser};

use super::{Cst, Symbol, TokenKind, EXPRESSION_CHAIN};
use crate::errors::DocInfoError;
use crate::language::python_language;

/// Parse `source` and lower it into a `file_input` tree
///
/// Syntax errors are tolerated: statements tree-sitter could not recognize are dropped and the
/// rest of the file is still lowered.
pub fn parse_python(source: &str, path: &Path) -> Result<Cst, DocInfoError> {
    let mut parser = Parser::new();
    parser.set_language(&python_language())?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| DocInfoError::Parse {
            path: path.to_path_buf(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        debug!(
            "Syntax errors in {}; extracting recognizable statements only",
            path.display()
        );
    }

    let lowering = Lowering {
        source: source.as_bytes(),
    };
    Ok(lowering.file_input(root))
}

struct Lowering<'s> {
    source: &'s [u8],
}

fn leaf(token: TokenKind, text: &str) -> Cst {
    Cst::leaf(token, text)
}

fn compound(inner: Cst) -> Cst {
    Cst::node(
        Symbol::Stmt,
        vec![Cst::node(Symbol::CompoundStmt, vec![inner])],
    )
}

fn simple(small: Cst, trailing_comment: Option<String>) -> Cst {
    Cst::node(
        Symbol::Stmt,
        vec![Cst::node(
            Symbol::SimpleStmt,
            vec![
                Cst::node(Symbol::SmallStmt, vec![small]),
                Cst::leaf(TokenKind::Newline, trailing_comment.unwrap_or_default()),
            ],
        )],
    )
}

/// Wrap a `power` node in every production from `factor` up to `test`
fn wrap_chain(power: Cst) -> Cst {
    EXPRESSION_CHAIN[..EXPRESSION_CHAIN.len() - 1]
        .iter()
        .rev()
        .fold(power, |inner, symbol| Cst::node(*symbol, vec![inner]))
}

/// Interleave groups with comma leaves
fn comma_separated(groups: Vec<Vec<Cst>>) -> Vec<Cst> {
    let mut joined = Vec::new();
    for (index, group) in groups.into_iter().enumerate() {
        if index > 0 {
            joined.push(leaf(TokenKind::Comma, ","));
        }
        joined.extend(group);
    }
    joined
}

impl<'s> Lowering<'s> {
    fn text(&self, node: Node) -> String {
        node.utf8_text(self.source)
            .map(str::to_string)
            .unwrap_or_default()
    }

    fn named_children<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect()
    }

    fn file_input(&self, root: Node) -> Cst {
        let mut children = self.statements(root);
        children.push(leaf(TokenKind::EndMarker, ""));
        Cst::node(Symbol::FileInput, children)
    }

    fn statements(&self, parent: Node) -> Vec<Cst> {
        let mut cursor = parent.walk();
        let named: Vec<Node> = parent.named_children(&mut cursor).collect();

        let mut statements = Vec::new();
        for (index, node) in named.iter().enumerate() {
            if node.kind() == "comment" {
                continue;
            }
            let trailing_comment = named
                .get(index + 1)
                .filter(|next| {
                    next.kind() == "comment"
                        && next.start_position().row == node.end_position().row
                })
                .map(|comment| self.text(*comment));

            if let Some(statement) = self.statement(*node, trailing_comment) {
                statements.push(statement);
            }
        }
        statements
    }

    fn statement(&self, node: Node, trailing_comment: Option<String>) -> Option<Cst> {
        let small = match node.kind() {
            "class_definition" | "function_definition" | "decorated_definition" => {
                return self.definition(node).map(compound);
            }
            "if_statement" => return Some(compound(self.block_statement(node, Symbol::IfStmt))),
            "for_statement" => return Some(compound(self.block_statement(node, Symbol::ForStmt))),
            "while_statement" => {
                return Some(compound(self.block_statement(node, Symbol::WhileStmt)))
            }
            "try_statement" => return Some(compound(self.block_statement(node, Symbol::TryStmt))),
            "with_statement" => {
                return Some(compound(self.block_statement(node, Symbol::WithStmt)))
            }
            "match_statement" => {
                return Some(compound(self.block_statement(node, Symbol::MatchStmt)))
            }
            "import_statement" => self.import_name(node),
            "import_from_statement" | "future_import_statement" => self.import_from(node),
            "expression_statement" => self.expr_stmt(node),
            "raise_statement" => self.raise_stmt(node),
            "return_statement" => Cst::node(Symbol::ReturnStmt, self.leaves(node)),
            "pass_statement" => Cst::node(Symbol::PassStmt, self.leaves(node)),
            "ERROR" => {
                debug!(
                    "Skipping unparseable statement at line {}",
                    node.start_position().row + 1
                );
                return None;
            }
            _ => Cst::node(Symbol::OtherStmt, self.leaves(node)),
        };
        Some(simple(small, trailing_comment))
    }

    // ------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------

    fn definition(&self, node: Node) -> Option<Cst> {
        match node.kind() {
            "class_definition" => self.classdef(node),
            "function_definition" => {
                let funcdef = self.funcdef(node)?;
                let mut cursor = node.walk();
                let is_async = node
                    .children(&mut cursor)
                    .any(|child| child.kind() == "async");
                if is_async {
                    Some(Cst::node(
                        Symbol::AsyncStmt,
                        vec![leaf(TokenKind::Name, "async"), funcdef],
                    ))
                } else {
                    Some(funcdef)
                }
            }
            "decorated_definition" => {
                let decorators: Vec<Cst> = self
                    .named_children(node)
                    .into_iter()
                    .filter(|child| child.kind() == "decorator")
                    .map(|decorator| self.decorator(decorator))
                    .collect();
                let definition = self.definition(node.child_by_field_name("definition")?)?;
                Some(Cst::node(
                    Symbol::Decorated,
                    vec![Cst::node(Symbol::Decorators, decorators), definition],
                ))
            }
            _ => None,
        }
    }

    fn decorator(&self, node: Node) -> Cst {
        let mut children = vec![leaf(TokenKind::At, "@")];
        if let Some(expression) = self.named_children(node).into_iter().next() {
            children.push(self.test(expression));
        }
        children.push(leaf(TokenKind::Newline, ""));
        Cst::node(Symbol::Decorator, children)
    }

    fn classdef(&self, node: Node) -> Option<Cst> {
        let name = node.child_by_field_name("name")?;
        let body = node.child_by_field_name("body")?;

        let mut children = vec![
            leaf(TokenKind::Name, "class"),
            Cst::leaf(TokenKind::Name, self.text(name)),
        ];
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            children.push(leaf(TokenKind::Lpar, "("));
            let arguments = self.arguments(superclasses);
            if !arguments.is_empty() {
                children.push(Cst::node(Symbol::Testlist, arguments));
            }
            children.push(leaf(TokenKind::Rpar, ")"));
        }
        children.push(leaf(TokenKind::Colon, ":"));
        children.push(self.suite(body));
        Some(Cst::node(Symbol::Classdef, children))
    }

    fn arguments(&self, list: Node) -> Vec<Cst> {
        let groups = self
            .named_children(list)
            .into_iter()
            .map(|argument| match argument.kind() {
                "keyword_argument" | "list_splat" | "dictionary_splat" => {
                    vec![Cst::node(Symbol::Argument, self.leaves(argument))]
                }
                _ => vec![self.test(argument)],
            })
            .collect();
        comma_separated(groups)
    }

    fn funcdef(&self, node: Node) -> Option<Cst> {
        let name = node.child_by_field_name("name")?;
        let body = node.child_by_field_name("body")?;

        let mut children = vec![
            leaf(TokenKind::Name, "def"),
            Cst::leaf(TokenKind::Name, self.text(name)),
        ];
        match node.child_by_field_name("parameters") {
            Some(parameters) => children.push(self.parameters(parameters)),
            None => children.push(Cst::node(
                Symbol::Parameters,
                vec![leaf(TokenKind::Lpar, "("), leaf(TokenKind::Rpar, ")")],
            )),
        }
        if let Some(return_type) = node.child_by_field_name("return_type") {
            children.push(leaf(TokenKind::Rarrow, "->"));
            children.push(self.test(return_type));
        }
        children.push(leaf(TokenKind::Colon, ":"));
        children.push(self.suite(body));
        Some(Cst::node(Symbol::Funcdef, children))
    }

    fn parameters(&self, node: Node) -> Cst {
        let groups: Vec<Vec<Cst>> = self
            .named_children(node)
            .into_iter()
            .map(|parameter| self.parameter(parameter))
            .collect();

        let mut children = vec![leaf(TokenKind::Lpar, "(")];
        if !groups.is_empty() {
            children.push(Cst::node(Symbol::Varargslist, comma_separated(groups)));
        }
        children.push(leaf(TokenKind::Rpar, ")"));
        Cst::node(Symbol::Parameters, children)
    }

    fn parameter(&self, node: Node) -> Vec<Cst> {
        match node.kind() {
            "identifier" => vec![Cst::leaf(TokenKind::Name, self.text(node))],
            "list_splat_pattern" | "dictionary_splat_pattern" => self.splat_target(node),
            "keyword_separator" => vec![leaf(TokenKind::Star, "*")],
            "positional_separator" => vec![leaf(TokenKind::Op, "/")],
            "default_parameter" => {
                let mut items = match node.child_by_field_name("name") {
                    Some(name) => self.parameter(name),
                    None => Vec::new(),
                };
                if let Some(value) = node.child_by_field_name("value") {
                    items.push(leaf(TokenKind::Equal, "="));
                    items.push(self.test(value));
                }
                items
            }
            "typed_parameter" | "typed_default_parameter" => {
                let target = match node.child_by_field_name("name") {
                    Some(name) => self.parameter(name),
                    None => self
                        .named_children(node)
                        .into_iter()
                        .next()
                        .map(|first| self.parameter(first))
                        .unwrap_or_default(),
                };
                let mut items = self.annotated_target(target, node.child_by_field_name("type"));
                if let Some(value) = node.child_by_field_name("value") {
                    items.push(leaf(TokenKind::Equal, "="));
                    items.push(self.test(value));
                }
                items
            }
            _ => vec![Cst::node(Symbol::Fpdef, self.leaves(node))],
        }
    }

    /// `*args` / `**kwargs` as a star leaf followed by the name
    fn splat_target(&self, node: Node) -> Vec<Cst> {
        let star = if node.kind() == "dictionary_splat_pattern" {
            leaf(TokenKind::DoubleStar, "**")
        } else {
            leaf(TokenKind::Star, "*")
        };
        let name = self
            .named_children(node)
            .into_iter()
            .next()
            .map(|inner| self.text(inner))
            .unwrap_or_default();
        vec![star, Cst::leaf(TokenKind::Name, name)]
    }

    /// Replace the trailing name of `target` with `fpdef(NAME, COLON, test)`
    fn annotated_target(&self, mut target: Vec<Cst>, annotation: Option<Node>) -> Vec<Cst> {
        let Some(annotation) = annotation else {
            return target;
        };
        match target.pop() {
            Some(name) => {
                target.push(Cst::node(
                    Symbol::Fpdef,
                    vec![name, leaf(TokenKind::Colon, ":"), self.test(annotation)],
                ));
                target
            }
            None => target,
        }
    }

    fn suite(&self, body: Node) -> Cst {
        let header_row = body
            .prev_sibling()
            .map(|colon| colon.end_position().row);
        let statements = self.statements(body);
        build_suite(statements, header_row == Some(body.start_position().row))
    }

    /// if/for/while/try/with/match: header tokens, opaque expressions and nested suites
    fn block_statement(&self, node: Node, symbol: Symbol) -> Cst {
        let mut children = Vec::new();
        self.block_children(node, &mut children);
        Cst::node(symbol, children)
    }

    fn block_children(&self, node: Node, out: &mut Vec<Cst>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "comment" => {}
                "block" => out.push(self.suite(child)),
                kind if kind.ends_with("_clause") && kind != "with_clause" => {
                    self.block_children(child, out)
                }
                _ if child.is_named() => out.push(Cst::node(Symbol::Test, self.leaves(child))),
                _ => out.push(self.token(child)),
            }
        }
    }

    // ------------------------------------------------------------------
    // Simple statements
    // ------------------------------------------------------------------

    fn expr_stmt(&self, node: Node) -> Cst {
        let parts = self.named_children(node);
        if let [single] = parts.as_slice() {
            match single.kind() {
                "assignment" => return self.assignment(*single),
                "augmented_assignment" => {
                    let mut children = Vec::new();
                    if let Some(left) = single.child_by_field_name("left") {
                        children.push(self.target_list(left));
                    }
                    if let Some(operator) = single.child_by_field_name("operator") {
                        children.push(Cst::leaf(TokenKind::Op, self.text(operator)));
                    }
                    if let Some(right) = single.child_by_field_name("right") {
                        children.push(self.target_list(right));
                    }
                    return Cst::node(Symbol::ExprStmt, children);
                }
                _ => {}
            }
        }
        Cst::node(Symbol::ExprStmt, vec![self.testlist(&parts)])
    }

    /// `a = b = value` flattens into `testlist EQUAL testlist EQUAL testlist`
    fn assignment(&self, node: Node) -> Cst {
        let mut children = Vec::new();
        let mut current = Some(node);
        while let Some(assignment) = current.take() {
            if let Some(left) = assignment.child_by_field_name("left") {
                children.push(self.target_list(left));
            }
            if let Some(annotation) = assignment.child_by_field_name("type") {
                children.push(leaf(TokenKind::Colon, ":"));
                children.push(self.test(annotation));
            }
            if let Some(right) = assignment.child_by_field_name("right") {
                children.push(leaf(TokenKind::Equal, "="));
                if right.kind() == "assignment" {
                    current = Some(right);
                } else {
                    children.push(self.target_list(right));
                }
            }
        }
        Cst::node(Symbol::ExprStmt, children)
    }

    fn target_list(&self, node: Node) -> Cst {
        match node.kind() {
            "pattern_list" | "expression_list" => self.testlist(&self.named_children(node)),
            _ => Cst::node(Symbol::Testlist, vec![self.test(node)]),
        }
    }

    fn testlist(&self, expressions: &[Node]) -> Cst {
        let groups = expressions
            .iter()
            .map(|expression| vec![self.test(*expression)])
            .collect();
        Cst::node(Symbol::Testlist, comma_separated(groups))
    }

    fn import_name(&self, node: Node) -> Cst {
        let mut cursor = node.walk();
        let groups = node
            .children_by_field_name("name", &mut cursor)
            .map(|name| vec![self.dotted_as_name(name)])
            .collect();

        let mut children = vec![leaf(TokenKind::Name, "import")];
        children.extend(comma_separated(groups));
        Cst::node(Symbol::ImportStmt, children)
    }

    fn dotted_as_name(&self, node: Node) -> Cst {
        if node.kind() != "aliased_import" {
            return self.dotted_name(node);
        }
        let mut children = Vec::new();
        if let Some(name) = node.child_by_field_name("name") {
            children.push(self.dotted_name(name));
        }
        if let Some(alias) = node.child_by_field_name("alias") {
            children.push(leaf(TokenKind::Name, "as"));
            children.push(Cst::leaf(TokenKind::Name, self.text(alias)));
        }
        Cst::node(Symbol::DottedAsName, children)
    }

    /// Relative prefixes (`from ..pkg import x`) become leading DOT leaves
    fn dotted_name(&self, node: Node) -> Cst {
        Cst::node(Symbol::DottedName, self.leaves(node))
    }

    fn import_from(&self, node: Node) -> Cst {
        let module = if node.kind() == "future_import_statement" {
            Cst::node(
                Symbol::DottedName,
                vec![leaf(TokenKind::Name, "__future__")],
            )
        } else {
            node.child_by_field_name("module_name")
                .map(|module| self.dotted_name(module))
                .unwrap_or_else(|| Cst::node(Symbol::DottedName, Vec::new()))
        };

        let mut cursor = node.walk();
        let mut groups: Vec<Vec<Cst>> = node
            .children_by_field_name("name", &mut cursor)
            .map(|name| match name.kind() {
                "aliased_import" => {
                    let mut parts = Vec::new();
                    if let Some(original) = name.child_by_field_name("name") {
                        parts.push(Cst::leaf(TokenKind::Name, self.text(original)));
                    }
                    if let Some(alias) = name.child_by_field_name("alias") {
                        parts.push(leaf(TokenKind::Name, "as"));
                        parts.push(Cst::leaf(TokenKind::Name, self.text(alias)));
                    }
                    vec![Cst::node(Symbol::ImportAsName, parts)]
                }
                _ => vec![Cst::leaf(TokenKind::Name, self.text(name))],
            })
            .collect();

        let mut cursor = node.walk();
        let has_wildcard = node
            .children(&mut cursor)
            .any(|child| child.kind() == "wildcard_import");
        if groups.is_empty() && has_wildcard {
            groups.push(vec![leaf(TokenKind::Star, "*")]);
        }

        let mut children = vec![leaf(TokenKind::Name, "from"), module, leaf(TokenKind::Name, "import")];
        children.extend(comma_separated(groups));
        Cst::node(Symbol::ImportStmt, children)
    }

    fn raise_stmt(&self, node: Node) -> Cst {
        let mut children = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "comment" => {}
                _ if child.is_named() => children.push(self.test(child)),
                _ => children.push(self.token(child)),
            }
        }
        Cst::node(Symbol::RaiseStmt, children)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn test(&self, expression: Node) -> Cst {
        match self.power(expression) {
            Some(power) => wrap_chain(power),
            None => Cst::node(Symbol::Test, self.leaves(expression)),
        }
    }

    fn power(&self, expression: Node) -> Option<Cst> {
        let (atom, trailers) = self.atom_and_trailers(expression)?;
        let mut children = vec![atom];
        children.extend(trailers);
        Some(Cst::node(Symbol::Power, children))
    }

    fn atom_and_trailers(&self, expression: Node) -> Option<(Cst, Vec<Cst>)> {
        let atom = |leaves: Vec<Cst>| Cst::node(Symbol::Atom, leaves);
        match expression.kind() {
            "identifier" | "keyword_identifier" | "true" | "false" | "none" => Some((
                atom(vec![Cst::leaf(TokenKind::Name, self.text(expression))]),
                Vec::new(),
            )),
            "integer" | "float" => Some((
                atom(vec![Cst::leaf(TokenKind::Number, self.text(expression))]),
                Vec::new(),
            )),
            "string" => Some((
                atom(vec![Cst::leaf(TokenKind::String, self.text(expression))]),
                Vec::new(),
            )),
            "concatenated_string" => {
                let strings = self
                    .named_children(expression)
                    .into_iter()
                    .map(|part| Cst::leaf(TokenKind::String, self.text(part)))
                    .collect();
                Some((atom(strings), Vec::new()))
            }
            "attribute" => {
                let (atom, mut trailers) =
                    self.atom_and_trailers(expression.child_by_field_name("object")?)?;
                let attribute = expression.child_by_field_name("attribute")?;
                trailers.push(Cst::node(
                    Symbol::Trailer,
                    vec![
                        leaf(TokenKind::Dot, "."),
                        Cst::leaf(TokenKind::Name, self.text(attribute)),
                    ],
                ));
                Some((atom, trailers))
            }
            "call" => {
                let (atom, mut trailers) =
                    self.atom_and_trailers(expression.child_by_field_name("function")?)?;
                let mut children = vec![leaf(TokenKind::Lpar, "(")];
                if let Some(arguments) = expression.child_by_field_name("arguments") {
                    let inner = self.bracketed_leaves(arguments);
                    if !inner.is_empty() {
                        children.push(Cst::node(Symbol::Arglist, inner));
                    }
                }
                children.push(leaf(TokenKind::Rpar, ")"));
                trailers.push(Cst::node(Symbol::Trailer, children));
                Some((atom, trailers))
            }
            "subscript" => {
                let (atom, mut trailers) =
                    self.atom_and_trailers(expression.child_by_field_name("value")?)?;
                let inner = self.bracketed_leaves(expression);
                trailers.push(Cst::node(
                    Symbol::Trailer,
                    vec![
                        leaf(TokenKind::Lsqb, "["),
                        Cst::node(Symbol::Subscript, inner),
                        leaf(TokenKind::Rsqb, "]"),
                    ],
                ));
                Some((atom, trailers))
            }
            _ => None,
        }
    }

    /// Leaves strictly between the first opening and the last closing bracket of `node`
    fn bracketed_leaves(&self, node: Node) -> Vec<Cst> {
        let leaves = self.leaves(node);
        let open = leaves
            .iter()
            .position(|l| matches!(l.token(), Some(TokenKind::Lpar | TokenKind::Lsqb)));
        let close = leaves
            .iter()
            .rposition(|l| matches!(l.token(), Some(TokenKind::Rpar | TokenKind::Rsqb)));
        match (open, close) {
            (Some(open), Some(close)) if open < close => leaves[open + 1..close].to_vec(),
            _ => leaves,
        }
    }

    fn leaves(&self, node: Node) -> Vec<Cst> {
        let mut out = Vec::new();
        self.collect_leaves(node, &mut out);
        out
    }

    fn collect_leaves(&self, node: Node, out: &mut Vec<Cst>) {
        match node.kind() {
            "comment" => {}
            "string" => out.push(Cst::leaf(TokenKind::String, self.text(node))),
            _ if node.child_count() == 0 => out.push(self.token(node)),
            _ => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.collect_leaves(child, out);
                }
            }
        }
    }

    fn token(&self, node: Node) -> Cst {
        let text = self.text(node);
        let kind = match node.kind() {
            "identifier" | "keyword_identifier" | "true" | "false" | "none" => TokenKind::Name,
            "integer" | "float" => TokenKind::Number,
            "string" => TokenKind::String,
            "(" => TokenKind::Lpar,
            ")" => TokenKind::Rpar,
            "[" => TokenKind::Lsqb,
            "]" => TokenKind::Rsqb,
            ":" => TokenKind::Colon,
            "," => TokenKind::Comma,
            "." => TokenKind::Dot,
            "=" => TokenKind::Equal,
            "*" => TokenKind::Star,
            "**" => TokenKind::DoubleStar,
            "@" => TokenKind::At,
            "->" => TokenKind::Rarrow,
            _ if !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_') => {
                TokenKind::Name
            }
            _ => TokenKind::Op,
        };
        Cst::leaf(kind, text)
    }
}

/// Suite node for a body's statements
///
/// One-line bodies (`def f(): pass`) keep the bare simple_stmt form; everything else gets the
/// NEWLINE INDENT ... DEDENT layout with statements in source order.
fn build_suite(statements: Vec<Cst>, one_line: bool) -> Cst {
    if one_line {
        let simple = statements
            .first()
            .and_then(|first| first.children().first())
            .filter(|child| child.is(Symbol::SimpleStmt));
        if let Some(simple) = simple {
            return Cst::node(Symbol::Suite, vec![simple.clone()]);
        }
    }

    let mut children = vec![leaf(TokenKind::Newline, ""), leaf(TokenKind::Indent, "")];
    children.extend(statements);
    children.push(leaf(TokenKind::Dedent, ""));
    Cst::node(Symbol::Suite, children)
}
