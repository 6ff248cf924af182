/// Display text reconstruction for CST subtrees
///
/// Used to turn base class expressions, default values, decorators and import
/// module names back into readable source snippets.
use super::Cst;

/// Convert a subtree into a string which would have parsed the same way
pub fn to_source_string(node: &Cst, separator: &str) -> String {
    match node {
        Cst::Leaf { text, .. } => text.clone(),
        Cst::Node { children, .. } => children
            .iter()
            .map(|child| to_source_string(child, separator))
            .filter(|part| !part.is_empty())
            .fold(String::new(), |text, part| join_snippets(&text, &part, separator)),
    }
}

/// Join two code snippets, only separating them where source would have whitespace
fn join_snippets(first: &str, second: &str, separator: &str) -> String {
    let tight_after = |s: &str| s.is_empty() || s.ends_with(['.', '(', '[', '@']);
    let tight_before = second.starts_with(['.', ',', '(', ')', '[', ']', ':']);

    if tight_after(first) || tight_before {
        format!("{}{}", first, second)
    } else {
        format!("{}{}{}", first, separator, second)
    }
}
