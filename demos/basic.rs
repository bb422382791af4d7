//! Basic select demo: mount a widget over 1000 options, open it, filter by
//! typing, navigate with the arrow keys, and commit with Enter. Prints the
//! node tree after each step to show how few rows are ever materialized.
//!
//! Run with: cargo run --example basic

use std::rc::Rc;

use tui_select::engine::arrays;
use tui_select::select::{select, ListProps, SelectCore, SelectProps, SelectionEngine};
use tui_select::state::{keyboard, mouse};
use tui_select::types::{PropValue, SelectOption};
use tui_select::{KeyboardEvent, MouseEvent, NodeKind};

fn main() {
    let options: Vec<SelectOption> = (1..=1000)
        .map(|i| SelectOption::labeled(format!("Option {i:04}")))
        .collect();
    let core = Rc::new(SelectCore::new(options));

    let handle = select(SelectProps {
        engine: core.clone(),
        placeholder: "Pick an option".to_string(),
        list: ListProps {
            viewport_height: PropValue::Static(6),
            ..Default::default()
        },
    });

    println!("== mounted (closed) ==");
    print_tree(handle.container, 0);

    mouse::dispatch_mouse_down(handle.container, &MouseEvent::down(0, 0));
    println!("\n== opened: 1000 options, {} rows materialized ==",
        arrays::nodes_of_kind(NodeKind::OptionRow).len());
    print_tree(handle.container, 0);

    for key in ["9", "9"] {
        keyboard::dispatch(handle.input, &KeyboardEvent::new(key));
    }
    println!("\n== filtered by \"99\": {} matches ==", core.options().len());
    print_tree(handle.container, 0);

    for _ in 0..3 {
        keyboard::dispatch(handle.input, &KeyboardEvent::new("ArrowDown"));
    }
    keyboard::dispatch(handle.input, &KeyboardEvent::new("Enter"));
    println!("\n== committed ==");
    println!(
        "value: {:?}",
        core.value().iter().map(|o| o.label.as_str()).collect::<Vec<_>>()
    );
    print_tree(handle.container, 0);

    handle.unmount();
    println!("\n== unmounted, {} live nodes ==", tui_select::live_count());
}

fn print_tree(node: usize, depth: usize) {
    let indent = "  ".repeat(depth);
    let kind = arrays::get_kind(node);
    let text = arrays::get_text(node);

    let mut line = format!("{indent}{kind:?}");
    if !text.is_empty() {
        line.push_str(&format!(" {text:?}"));
    }
    for attr in [
        "data-disabled",
        "data-multiple",
        "data-has-value",
        "data-is-active",
        "data-focused",
    ] {
        if arrays::has_attr(node, attr) {
            line.push_str(&format!(" [{attr}]"));
        }
    }
    if kind == NodeKind::List {
        line.push_str(&format!(
            " (scroll {}, content {})",
            arrays::scroll_signal(node).get(),
            arrays::get_content_height(node)
        ));
    }
    if kind == NodeKind::Spacer {
        line.push_str(&format!(" (height {})", arrays::get_height(node)));
    }
    println!("{line}");

    for child in arrays::children_of(node) {
        print_tree(child, depth + 1);
    }
}
