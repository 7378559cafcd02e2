use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use log::{info, trace};
use sift_config::SiftConfig;
use sift_motion::sim::{Compositor, SimElement};
use sift_motion::{
    Display, MotionSettings, MoveRequest, OperationId, OperationReport, Stage, StyleData, TargetId,
};

const COLUMNS: usize = 3;
const CELL: f64 = 120.0;
/// Give up on an operation after this much simulated time.
const MAX_RUN_MS: f32 = 60_000.0;

fn cell(index: usize) -> (f64, f64) {
    ((index % COLUMNS) as f64 * CELL, (index / COLUMNS) as f64 * CELL)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SiftConfig::load();
    let settings = MotionSettings::from_config(&config.animation, &config.layout)
        .context("invalid [animation] settings")?;
    info!(
        "{} targets, {}ms {} transitions, stagger {}ms",
        config.demo.targets, settings.duration_ms, settings.easing, settings.stagger_ms
    );

    let mut stage = Stage::new(settings.clone());
    let mut compositor = Compositor::new(&settings);

    let count = config.demo.targets;
    let ids: Vec<TargetId> = (0..count)
        .map(|index| {
            let (x, y) = cell(index);
            let element = SimElement::new()
                .at(x, y)
                .sized(100.0, 100.0)
                .with_style("display", &settings.layout_display)
                .with_attribute("data-order", &(count - index).to_string());
            stage.add_target(element)
        })
        .collect();

    let visible: Vec<TargetId> = ids.iter().copied().step_by(2).collect();
    let report = run(&mut stage, &mut compositor, config.demo.frame_ms, |stage, operation| {
        filter(stage, operation, &ids, &visible)
    })?;
    info!("filter finished: {report:?}");
    for id in ids.iter().filter(|id| !visible.contains(id)) {
        if let Some(target) = stage.target_mut(*id) {
            target.hide();
        }
    }

    let mut order = visible.clone();
    for id in &order {
        if let Some(target) = stage.target_mut(*id) {
            target.refresh_sort_key("order");
        }
    }
    order.sort_by(|a, b| match (stage.target(*a), stage.target(*b)) {
        (Some(a), Some(b)) => a.sort_key().compare(b.sort_key()),
        _ => std::cmp::Ordering::Equal,
    });
    let report = run(&mut stage, &mut compositor, config.demo.frame_ms, |stage, operation| {
        relayout(stage, operation, &order)
    })?;
    info!("sort finished: {report:?}");

    Ok(())
}

/// Drive one operation through the simulated host until it completes.
fn run<F>(
    stage: &mut Stage<SimElement>,
    compositor: &mut Compositor,
    frame_ms: f32,
    plan: F,
) -> Result<OperationReport>
where
    F: FnOnce(&mut Stage<SimElement>, OperationId) -> Result<()>,
{
    let finished = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&finished);
    let operation = stage.begin_operation(move |report| *sink.borrow_mut() = Some(*report));

    plan(stage, operation)?;
    stage.complete_if_idle(operation)?;

    compositor.observe(stage);
    stage.flush_frame();
    compositor.observe(stage);

    let mut elapsed = 0.0;
    while stage.is_active(operation) {
        if elapsed > MAX_RUN_MS {
            bail!("operation {operation} did not settle within {MAX_RUN_MS}ms");
        }
        compositor.update(frame_ms);
        for sample in compositor.samples() {
            trace!(
                "{} {} {:?} {:.3}",
                sample.target, sample.property, sample.state, sample.progress
            );
        }
        compositor.deliver(stage);
        compositor.observe(stage);
        elapsed += frame_ms;
    }

    let report = finished.borrow_mut().take();
    report.context("completion hook did not run")
}

/// Fade out every target not in `visible` and close the gaps between the rest.
fn filter(
    stage: &mut Stage<SimElement>,
    operation: OperationId,
    all: &[TargetId],
    visible: &[TargetId],
) -> Result<()> {
    let shown = Display::Shown(stage.settings().layout_display.clone());

    for id in all {
        if visible.contains(id) {
            continue;
        }
        let request = MoveRequest::new(
            StyleData::at(0.0, 0.0).with_display(shown.clone()).with_opacity(1.0),
            StyleData::at(0.0, 0.0),
        )
        .hiding()
        .on_settled(|_, _| {});
        stage.move_target(operation, *id, request)?;
    }

    relayout(stage, operation, visible)
}

/// Move `order` into consecutive grid cells, animating from where each
/// target currently sits.
fn relayout(
    stage: &mut Stage<SimElement>,
    operation: OperationId,
    order: &[TargetId],
) -> Result<()> {
    let shown = Display::Shown(stage.settings().layout_display.clone());

    for (index, id) in order.iter().enumerate() {
        let (from_x, from_y) = stage.pos_data(*id).map(|pos| (pos.x, pos.y))?;
        let (to_x, to_y) = cell(index);
        if let Some(target) = stage.target_mut(*id) {
            target.element_mut().set_offset(to_x, to_y);
        }

        let request = MoveRequest::new(
            StyleData::at(from_x - to_x, from_y - to_y).with_display(shown.clone()),
            StyleData::at(0.0, 0.0).with_display(shown.clone()),
        )
        .stagger_index(index);

        // Targets already in place take no part in the wait.
        let request = if (from_x, from_y) == (to_x, to_y) {
            request
        } else {
            request.on_settled(|_, _| {})
        };
        stage.move_target(operation, *id, request)?;
    }

    Ok(())
}
