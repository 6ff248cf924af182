/// Function signature and body extraction: parameters and raised exceptions
use crate::cst::render::to_source_string;
use crate::cst::{Cst, Symbol, TokenKind};
use crate::pattern::lenient_match;
use crate::pattern::templates::{RAISED_NAME, RAISED_STRING};

use super::types::{DefaultKind, ExceptionKind, Parameter, RaisedException};

/// Parameters of a `funcdef` node, in declaration order
pub fn parameters(funcdef: &Cst) -> Vec<Parameter> {
    let Some(list) = funcdef
        .children()
        .iter()
        .find(|child| child.is(Symbol::Parameters))
        .and_then(|parameters| {
            parameters
                .children()
                .iter()
                .find(|child| child.is(Symbol::Varargslist))
        })
    else {
        return Vec::new();
    };

    let mut parameters: Vec<Parameter> = Vec::new();
    let mut star_prefix = "";
    let mut expecting_default = false;

    for item in list.children() {
        match item {
            Cst::Leaf {
                token: TokenKind::Comma,
                ..
            } => {
                star_prefix = "";
                expecting_default = false;
            }
            Cst::Leaf {
                token: TokenKind::Star,
                ..
            } => star_prefix = "*",
            Cst::Leaf {
                token: TokenKind::DoubleStar,
                ..
            } => star_prefix = "**",
            Cst::Leaf {
                token: TokenKind::Equal,
                ..
            } => expecting_default = true,
            _ if expecting_default => {
                if let Some(last) = parameters.last_mut() {
                    last.default = Some(to_source_string(item, " "));
                    last.default_kind = Some(default_kind(item));
                }
                expecting_default = false;
            }
            Cst::Leaf {
                token: TokenKind::Name,
                text,
            } => {
                parameters.push(Parameter::new(format!("{}{}", star_prefix, text)));
                star_prefix = "";
            }
            Cst::Node {
                symbol: Symbol::Fpdef,
                children,
            } => {
                let name = match children.first() {
                    Some(Cst::Leaf {
                        token: TokenKind::Name,
                        text,
                    }) => text.clone(),
                    _ => to_source_string(item, " "),
                };
                parameters.push(Parameter::new(format!("{}{}", star_prefix, name)));
                star_prefix = "";
            }
            _ => {}
        }
    }
    parameters
}

fn default_kind(value: &Cst) -> DefaultKind {
    if lenient_match(&RAISED_STRING, value).matched {
        return DefaultKind::String;
    }
    match lenient_match(&RAISED_NAME, value).get("power").and_then(dotted_head) {
        Some((_, complete)) if complete => DefaultKind::Name,
        _ => DefaultKind::Other,
    }
}

/// Leading dotted name of a `power` node
///
/// Returns the name and whether it covered every trailer. Rendering stops at the first trailer
/// that is not `.name`, so `pkg.Error(msg)` gives `pkg.Error`.
fn dotted_head(power: &Cst) -> Option<(String, bool)> {
    let (atom, trailers) = power.children().split_first()?;
    let [Cst::Leaf {
        token: TokenKind::Name,
        text,
    }] = atom.children()
    else {
        return None;
    };

    let mut name = text.clone();
    for trailer in trailers {
        match trailer.children() {
            [dot, Cst::Leaf {
                token: TokenKind::Name,
                text: attribute,
            }] if dot.token() == Some(TokenKind::Dot) => {
                name.push('.');
                name.push_str(attribute);
            }
            _ => return Some((name, false)),
        }
    }
    Some((name, true))
}

/// Exceptions raised in a function body, deduplicated by name in first-seen order
///
/// Nested function and class bodies are not searched. A bare `raise` names nothing.
pub fn raised_exceptions(suite: &Cst) -> Vec<RaisedException> {
    let mut found: Vec<RaisedException> = Vec::new();
    for raise in suite.collect(Symbol::RaiseStmt, &[Symbol::Funcdef, Symbol::Classdef]) {
        let Some(exception) = raise.children().get(1) else {
            continue;
        };
        let raised = classify_raised(exception);
        if !found.iter().any(|known| known.name == raised.name) {
            found.push(raised);
        }
    }
    found
}

fn classify_raised(exception: &Cst) -> RaisedException {
    if let Some(literal) = lenient_match(&RAISED_STRING, exception)
        .get("exception")
        .and_then(Cst::text)
    {
        return RaisedException {
            name: literal.to_string(),
            kind: ExceptionKind::StringLiteral,
        };
    }
    if let Some((name, _)) = lenient_match(&RAISED_NAME, exception)
        .get("power")
        .and_then(dotted_head)
    {
        return RaisedException {
            name,
            kind: ExceptionKind::Named,
        };
    }
    RaisedException {
        name: to_source_string(exception, " "),
        kind: ExceptionKind::Expression,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_python;
    use std::path::Path;

    fn funcdef(source: &str) -> Cst {
        let tree = parse_python(source, Path::new("functions.py")).unwrap();
        tree.collect(Symbol::Funcdef, &[])
            .into_iter()
            .next()
            .cloned()
            .expect("source should contain a function")
    }

    fn names(parameters: &[Parameter]) -> Vec<&str> {
        parameters.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_plain_and_star_parameters() {
        let function = funcdef("def f(self, name, *args, scale=1.0, **kwargs):\n    pass\n");
        let parameters = parameters(&function);
        assert_eq!(names(&parameters), vec!["self", "name", "*args", "scale", "**kwargs"]);
        assert_eq!(parameters[3].default.as_deref(), Some("1.0"));
        assert_eq!(parameters[3].default_kind, Some(DefaultKind::Other));
        assert_eq!(parameters[0].default, None);
    }

    #[test]
    fn test_separators_are_not_parameters() {
        let function = funcdef("def make(kind, /, *, strict=False):\n    pass\n");
        let parameters = parameters(&function);
        assert_eq!(names(&parameters), vec!["kind", "strict"]);
        assert_eq!(parameters[1].default.as_deref(), Some("False"));
        assert_eq!(parameters[1].default_kind, Some(DefaultKind::Name));
    }

    #[test]
    fn test_default_kinds() {
        let function = funcdef("def render(canvas, mode=modes.DEFAULT, title=\"untitled\", size=(1, 2)):\n    pass\n");
        let parameters = parameters(&function);
        assert_eq!(parameters[1].default.as_deref(), Some("modes.DEFAULT"));
        assert_eq!(parameters[1].default_kind, Some(DefaultKind::Name));
        assert_eq!(parameters[2].default.as_deref(), Some("\"untitled\""));
        assert_eq!(parameters[2].default_kind, Some(DefaultKind::String));
        assert_eq!(parameters[3].default_kind, Some(DefaultKind::Other));
    }

    #[test]
    fn test_annotated_parameters() {
        let function = funcdef("def typed(a: int, *rest: str, b: float = 2.5) -> None:\n    pass\n");
        let parameters = parameters(&function);
        assert_eq!(names(&parameters), vec!["a", "*rest", "b"]);
        assert_eq!(parameters[2].default.as_deref(), Some("2.5"));
    }

    #[test]
    fn test_no_parameters() {
        assert!(parameters(&funcdef("def nothing():\n    pass\n")).is_empty());
    }

    #[test]
    fn test_raised_exceptions() {
        let function = funcdef(
            "def area(self):\n    if self.bad:\n        raise ShapeError(\"no canvas\")\n    raise errors.CanvasError\n    raise ShapeError(\"again\")\n    raise \"legacy\"\n    raise\n",
        );
        let suite = function.children().last().unwrap();
        assert_eq!(
            raised_exceptions(suite),
            vec![
                RaisedException {
                    name: "ShapeError".to_string(),
                    kind: ExceptionKind::Named
                },
                RaisedException {
                    name: "errors.CanvasError".to_string(),
                    kind: ExceptionKind::Named
                },
                RaisedException {
                    name: "\"legacy\"".to_string(),
                    kind: ExceptionKind::StringLiteral
                },
            ]
        );
    }

    #[test]
    fn test_nested_definitions_are_not_searched() {
        let function = funcdef(
            "def outer():\n    def check():\n        raise ValueError(\"inner\")\n    raise KeyError\n",
        );
        let suite = function.children().last().unwrap();
        let raised = raised_exceptions(suite);
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].name, "KeyError");
    }

    #[test]
    fn test_expression_fallback() {
        let function = funcdef("def pick(flag):\n    raise (A if flag else B)\n");
        let suite = function.children().last().unwrap();
        let raised = raised_exceptions(suite);
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].kind, ExceptionKind::Expression);
    }
}
