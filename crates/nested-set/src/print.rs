//! Text rendering of a forest.
//!
//! ```text
//! #1 R (0-7) [0]
//! ├─ #2 A (1-4) [1]
//! │  └─ #3 C (2-3) [2]
//! └─ #4 B (5-6) [1]
//! ```

use crate::node::Node;

/// Renders rows (any order) as one tree per root, roots in preorder.
///
/// Nesting is taken from the intervals, not from the cached parents.
pub fn print_forest(rows: &[Node]) -> String {
    let mut sorted: Vec<&Node> = rows.iter().collect();
    sorted.sort_by_key(|n| n.left);

    // children[i] holds indices into `sorted`.
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); sorted.len()];
    let mut roots = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    for (idx, node) in sorted.iter().enumerate() {
        while open.last().is_some_and(|&top| sorted[top].right < node.left) {
            open.pop();
        }
        match open.last() {
            Some(&top) => children[top].push(idx),
            None => roots.push(idx),
        }
        open.push(idx);
    }

    let mut out = String::new();
    for (i, &root) in roots.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&sorted[root].to_string());
        print_children(&mut out, "", &sorted, &children, root);
    }
    out
}

fn print_children(
    out: &mut String,
    tab: &str,
    sorted: &[&Node],
    children: &[Vec<usize>],
    idx: usize,
) {
    let kids = &children[idx];
    for (i, &child) in kids.iter().enumerate() {
        let is_last = i + 1 == kids.len();
        let branch = if is_last { "└─" } else { "├─" };
        out.push('\n');
        out.push_str(tab);
        out.push_str(branch);
        out.push(' ');
        out.push_str(&sorted[child].to_string());
        let child_tab = format!("{tab}{}  ", if is_last { " " } else { "│" });
        print_children(out, &child_tab, sorted, children, child);
    }
}
