//! Keyword grouping of code-element classes into broad categories

use crate::{html_escape, CountTable};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    DataStructures,
    ControlFlow,
    OopAndFunctions,
    Io,
    Modules,
    Operations,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::DataStructures,
        Category::ControlFlow,
        Category::OopAndFunctions,
        Category::Io,
        Category::Modules,
        Category::Operations,
        Category::Other,
    ];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::DataStructures => &["list", "tuple", "dict", "set", "array"],
            Category::ControlFlow => &[
                "if", "else", "loop", "for", "while", "try", "except", "break", "continue", "pass",
            ],
            Category::OopAndFunctions => &[
                "function",
                "lambda",
                "class",
                "method",
                "return",
                "yield",
                "super",
                "decorator",
                "init",
                "self",
            ],
            Category::Io => &["print", "file", "open", "read", "write", "input"],
            Category::Modules => &["import", "from", "module"],
            Category::Operations => &["assign", "operator", "compare", "binop"],
            Category::Other => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::DataStructures => "Data Structures",
            Category::ControlFlow => "Control Flow",
            Category::OopAndFunctions => "OOP & Functions",
            Category::Io => "I/O",
            Category::Modules => "Modules",
            Category::Operations => "Operations",
            Category::Other => "Other",
        };
        f.write_str(name)
    }
}

/// First category whose keyword occurs in the lower-cased class name
pub fn categorize(class_name: &str) -> Category {
    let name = class_name.to_lowercase();
    Category::ALL
        .into_iter()
        .find(|c| c.keywords().iter().any(|k| name.contains(k)))
        .unwrap_or(Category::Other)
}

/// Summed counts per category, in category order, skipping empty ones
pub fn rollup(classes: &CountTable) -> Vec<(Category, u64)> {
    let mut sums = [0u64; 7];
    let mut seen = [false; 7];
    for (name, count) in classes.iter() {
        let idx = categorize(name) as usize;
        sums[idx] = sums[idx].saturating_add(count);
        seen[idx] = true;
    }
    Category::ALL
        .into_iter()
        .filter(|c| seen[*c as usize])
        .map(|c| (c, sums[c as usize]))
        .collect()
}

pub fn render_rollup(rollup: &[(Category, u64)]) -> Option<String> {
    if rollup.is_empty() {
        return None;
    }
    let mut html = String::from("<h3>Element Categories</h3>\n<table class=\"category-table\">\n");
    for (category, count) in rollup {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            html_escape(&category.to_string()),
            count
        ));
    }
    html.push_str("</table>\n");
    Some(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize() {
        assert_eq!(categorize("Simple List"), Category::DataStructures);
        assert_eq!(categorize("Simple If statements"), Category::ControlFlow);
        assert_eq!(categorize("Function"), Category::OopAndFunctions);
        assert_eq!(categorize("print call"), Category::Io);
        assert_eq!(categorize("Import"), Category::Modules);
        assert_eq!(categorize("Simple Assignment"), Category::Operations);
        assert_eq!(categorize("Attribute"), Category::Other);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "for" (control flow) and "list" (data structures): data structures is checked first
        assert_eq!(categorize("List comprehension for"), Category::DataStructures);
    }

    #[test]
    fn test_rollup() {
        let classes: CountTable = [
            ("Simple List", 81),
            ("Nested Dict", 4),
            ("Function", 42),
            ("Attribute", 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            rollup(&classes),
            vec![
                (Category::DataStructures, 85),
                (Category::OopAndFunctions, 42),
                (Category::Other, 1),
            ]
        );
        let html = render_rollup(&rollup(&classes)).unwrap();
        assert!(html.contains("OOP &amp; Functions"));
        assert!(render_rollup(&[]).is_none());
    }
}
