// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine basics.
//!
//! Build a small tree, run one frame, dump the structure, and route a
//! click.
//!
//! Run:
//! - `cargo run -p espalier_demos --example engine_basics`

use espalier_dispatch::ClickRouter;
use espalier_tree::{Alignment, Dim, MemorySink, NodeFlags, NodeId, NodeKind, Tree};
use std::cell::RefCell;
use std::rc::Rc;

fn main() {
    // Build a small tree: fixed-size root centering two children.
    let mut tree = Tree::new();
    let sink = Rc::new(RefCell::new(MemorySink::new()));
    tree.set_trace_sink(Box::new(Rc::clone(&sink)));

    let root = tree.create(NodeKind(0), NodeFlags::empty());
    tree.set_name(root, "root");
    tree.set_width(root, Dim::px(400.0));
    tree.set_height(root, Dim::px(300.0));
    tree.set_alignment(root, Alignment::Center);

    let label = tree.create(NodeKind(1), NodeFlags::empty());
    tree.set_name(label, "label");
    tree.set_width(label, Dim::px(120.0));
    tree.set_height(label, Dim::px(40.0));
    tree.add_child(root, label).unwrap();

    let banner = tree.create(NodeKind(2), NodeFlags::empty());
    tree.set_name(banner, "banner");
    tree.set_width(banner, Dim::percent(50.0));
    tree.set_height(banner, Dim::px(60.0));
    tree.add_child(root, banner).unwrap();

    // Run one frame.
    let size = tree.measure_layout_and_draw(root).unwrap();
    println!("root measured to {size:?}");
    println!("label at {:?}", tree.origin(label).unwrap());
    println!("banner at {:?}", tree.origin(banner).unwrap());

    println!("--- dump ---");
    print!("{}", tree.dump(root));

    // Route a click to the label.
    let mut clicks: ClickRouter<NodeId, (f64, f64)> = ClickRouter::new();
    clicks.register(
        label,
        Box::new(|&(x, y)| println!("label clicked at ({x}, {y})")),
    );
    clicks.emit(label, &(12.0, 8.0));

    println!("--- trace ---");
    for line in sink.borrow().lines() {
        println!("{line}");
    }
}
