// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-delegated passes and the frame clock.
//!
//! Flags a node for custom measurement, answers the delegated request from
//! a host bridge, and drives a few frames from the clock.
//!
//! Run:
//! - `cargo run -p espalier_demos --example host_bridge`

use espalier_dispatch::FrameClock;
use espalier_tree::{
    Dim, HostBridge, HostRequest, HostResponse, NodeFlags, NodeId, NodeKind, Tree,
};
use kurbo::Size;
use std::sync::mpsc;
use std::time::Duration;

/// A stand-in host runtime that sizes delegated nodes itself.
struct DemoHost;

impl HostBridge for DemoHost {
    fn dispatch(&mut self, node: NodeId, request: HostRequest) -> HostResponse {
        match request {
            HostRequest::Measure { spec } => {
                tracing::info!(?node, ?spec, "host measuring");
                HostResponse::Measured(Size::new(64.0, 64.0))
            }
            HostRequest::Layout => HostResponse::Done,
            HostRequest::Draw { canvas, region } => {
                tracing::info!(?node, canvas = canvas.0, ?region, "host drawing");
                HostResponse::Done
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut tree = Tree::new();
    tree.set_host_bridge(Box::new(DemoHost));

    let root = tree.create(NodeKind(0), NodeFlags::empty());
    let widget = tree.create(NodeKind(3), NodeFlags::CUSTOM_MEASURE | NodeFlags::CUSTOM_DRAW);
    tree.set_width(root, Dim::px(200.0));
    tree.set_height(root, Dim::px(200.0));
    tree.add_child(root, widget).unwrap();

    // Give the widget kind a simulated creation cost for later nodes.
    tree.set_delay(
        NodeKind(3),
        espalier_tree::DelayPhase::Create,
        Duration::from_micros(50),
    );

    // Drive three frames from the clock, then stop it.
    let (frames_tx, frames_rx) = mpsc::channel();
    let mut clock = FrameClock::start_vsync(move || {
        let _ = frames_tx.send(());
    })
    .unwrap();

    for frame in 0..3 {
        frames_rx.recv().unwrap();
        let size = tree.measure_layout_and_draw(root).unwrap();
        tracing::info!(frame, ?size, "frame complete");
    }
    clock.stop();

    println!("widget measured by host to {:?}", tree.size(widget).unwrap());
}
