use ficum::Node;
use std::collections::HashMap;

pub fn collect_selectors<'a>(trees: impl IntoIterator<Item = &'a Node>) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for tree in trees {
        count_node(tree, &mut counts);
    }

    counts
}

fn count_node(node: &Node, counts: &mut HashMap<String, usize>) {
    match node {
        Node::And(left, right) | Node::Or(left, right) => {
            count_node(left, counts);
            count_node(right, counts);
        }
        Node::Constraint { selector, .. } => {
            *counts.entry(selector.clone()).or_default() += 1;
        }
    }
}

pub fn format_selectors(counts: HashMap<String, usize>, show_count: bool) -> Vec<String> {
    let mut items: Vec<(String, usize)> = counts.into_iter().collect();

    if show_count {
        items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        items
            .into_iter()
            .map(|(selector, count)| format!("{}: {}", selector, count))
            .collect()
    } else {
        items.sort_by(|a, b| a.0.cmp(&b.0));
        items.into_iter().map(|(selector, _)| selector).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ficum::Comparison;

    fn eq(selector: &str) -> Node {
        Node::constraint(selector, Comparison::Equals, 1)
    }

    #[test]
    fn test_collect_selectors() {
        let first = Node::and(eq("status"), Node::or(eq("owner"), eq("status")));
        let second = eq("status");

        let counts = collect_selectors([&first, &second]);
        assert_eq!(counts.get("status"), Some(&3));
        assert_eq!(counts.get("owner"), Some(&1));
    }

    #[test]
    fn test_format_with_counts() {
        let counts = HashMap::from([
            ("b".to_string(), 1),
            ("a".to_string(), 1),
            ("c".to_string(), 4),
        ]);
        assert_eq!(format_selectors(counts.clone(), true), vec!["c: 4", "a: 1", "b: 1"]);
        assert_eq!(format_selectors(counts, false), vec!["a", "b", "c"]);
    }
}
