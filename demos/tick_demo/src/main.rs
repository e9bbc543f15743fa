// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated frame loop that exercises the scene, its schedulers, and the
//! diagnostics pipeline.
//!
//! Builds a small scene, runs 60 frames at 60 Hz, and routes every trace
//! event to both a [`PrettyPrintSink`](kiwano_debug::pretty::PrettyPrintSink)
//! and a [`RecorderSink`](kiwano_debug::recorder::RecorderSink), then exports
//! a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use kiwano_core::action::{Action, Ease, Repeat};
use kiwano_core::node::{FrameId, NodeId, SceneTree};
use kiwano_core::scene::{Scene, SceneConfig};
use kiwano_core::task::Task;
use kiwano_core::trace::Tracer;
use kurbo::{Point, Size, Vec2};

use kiwano_debug::FanOut;
use kiwano_debug::pretty::PrettyPrintSink;
use kiwano_debug::recorder::RecorderSink;

const FRAME_COUNT: u64 = 60;
const FRAME_DT: f64 = 1.0 / 60.0;
/// Frame at which the spinner subtree is torn down.
const DESTROY_AT: u64 = 40;

fn main() {
    // -- sinks -------------------------------------------------------------
    let mut sinks = FanOut {
        a: PrettyPrintSink::new(Box::new(std::io::stdout())).quiet_passes(true),
        b: RecorderSink::new(),
    };

    // -- scene -------------------------------------------------------------
    let mut scene = Scene::new(SceneConfig::interactive());
    let root = scene.root();

    let player = sprite(&mut scene.tree, root, Point::new(40.0, 200.0), 0);
    let shadow = sprite(&mut scene.tree, player, Point::new(0.0, 8.0), -1);
    scene.tree.set_opacity(shadow, 0.4);

    let spinner = sprite(&mut scene.tree, root, Point::new(300.0, 120.0), 1);
    let blade = sprite(&mut scene.tree, spinner, Point::new(16.0, 0.0), 0);

    // Hop right twice, then ease back, then report.
    let hop = Action::sequence(vec![
        Action::jump_by(0.3, Vec2::new(60.0, 0.0), 24.0, 1),
        Action::jump_by(0.3, Vec2::new(60.0, 0.0), 24.0, 1),
        Action::move_by(0.2, Vec2::new(-30.0, 0.0)).with_ease(Ease::BackOut),
        Action::callback(|tree, node| {
            println!("player landed at {:?}", tree.position(node));
        }),
    ])
    .with_name("hop");
    scene.run_action(player, hop).expect("fresh action binds");
    let blink = Action::sequence(vec![Action::fade_out(0.1), Action::fade_in(0.1)]);
    scene
        .run_action(shadow, Action::repeat(blink, 3))
        .expect("fresh action binds");

    scene
        .run_action(spinner, Action::repeat_forever(Action::rotate_by(0.25, 90.0)))
        .expect("fresh action binds");
    scene
        .run_action(
            blade,
            Action::looped(
                Action::animate((0..4).map(FrameId).collect(), 0.05),
                Repeat::Forever,
            ),
        )
        .expect("fresh action binds");

    scene.add_task(
        Task::new(0.25, |tree, run| {
            if let Some(owner) = run.owner {
                let z = tree.z_order(owner);
                tree.set_z_order(owner, -z);
            }
        })
        .with_owner(spinner)
        .with_name("flip-z"),
    );
    scene.add_task(
        Task::new(0.5, |_, run| println!("heartbeat #{}", run.run))
            .with_times(Repeat::Times(2))
            .with_name("heartbeat"),
    );

    // Stretch the shadow a little every frame through a hook.
    scene.tree.set_update_hook(
        shadow,
        Some(Rc::new(|tree: &mut SceneTree, node: NodeId, dt: f64| {
            let s = tree.scale(node);
            let grow = 1.0 + dt * 0.1;
            tree.set_scale(node, Vec2::new(s.x * grow, s.y));
        })),
    );

    // -- simulated loop ----------------------------------------------------
    for frame_index in 0..FRAME_COUNT {
        scene.tick_traced(FRAME_DT, &mut Tracer::new(&mut sinks));

        if frame_index == DESTROY_AT {
            let nodes = scene.destroy_node_traced(spinner, &mut Tracer::new(&mut sinks));
            println!("destroyed spinner subtree ({nodes} nodes)");
        }

        let changes = scene.evaluate_traced(&mut Tracer::new(&mut sinks));
        if frame_index == FRAME_COUNT - 1 {
            println!("final draw list: {:?}", changes.draw_order);
        }
    }

    // -- export ------------------------------------------------------------
    let recorder = sinks.b;
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    kiwano_debug::chrome::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({FRAME_COUNT} frames)");
}

fn sprite(tree: &mut SceneTree, parent: NodeId, position: Point, z: i32) -> NodeId {
    let node = tree.create_node();
    tree.set_size(node, Size::new(32.0, 32.0));
    tree.set_pivot(node, Point::new(0.5, 0.5));
    tree.set_position(node, position);
    tree.add_child_with_z(parent, node, z)
        .expect("fresh node has no parent");
    node
}
