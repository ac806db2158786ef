//! Property tests: native and path evaluation of the nth family agree with
//! each other and with a brute-force count.

use quarry_dom::{DomTree, NodeId};
use quarry_engine::MemoryEngine;
use quarry_selector::{NthArgument, SelectorCompiler};
use quickcheck_macros::quickcheck;

/// A list of `len` items, each carrying its 1-based index as text.
fn list(len: usize) -> (DomTree, Vec<NodeId>) {
    let mut tree = DomTree::new();
    let ul = tree.append_element(NodeId::ROOT, "ul", &[]);
    let items = (1..=len)
        .map(|index| {
            let li = tree.append_element(ul, "li", &[]);
            let _ = tree.append_text(li, &index.to_string());
            li
        })
        .collect();
    (tree, items)
}

fn run(tree: &DomTree, native: bool, selector: &str) -> Vec<NodeId> {
    let engine = if native {
        MemoryEngine::new(tree)
    } else {
        MemoryEngine::without_native_pseudo_classes(tree)
    };
    SelectorCompiler::default()
        .compile(&engine, selector)
        .unwrap()
        .execute(&engine, &NodeId::ROOT)
        .unwrap()
}

fn agrees(pseudo: &str, a: u8, b: i8, len: u8, from_end: bool) -> bool {
    let a = i32::from(a % 6);
    let b = i32::from(b % 9);
    let len = usize::from(len % 12) + 1;
    let argument = format!("{a}n{b:+}");
    let selector = format!("li:{pseudo}({argument})");

    let (tree, items) = list(len);
    let parsed = NthArgument::parse_for(pseudo, &argument).unwrap();
    let expected: Vec<NodeId> = items
        .iter()
        .enumerate()
        .filter(|(index, _)| {
            let position = if from_end { len - index } else { index + 1 };
            parsed.matches(i64::try_from(position).unwrap())
        })
        .map(|(_, &id)| id)
        .collect();

    run(&tree, true, &selector) == expected && run(&tree, false, &selector) == expected
}

#[quickcheck]
fn nth_child_native_and_path_agree(a: u8, b: i8, len: u8) -> bool {
    agrees("nth-child", a, b, len, false)
}

#[quickcheck]
fn nth_last_child_native_and_path_agree(a: u8, b: i8, len: u8) -> bool {
    agrees("nth-last-child", a, b, len, true)
}
