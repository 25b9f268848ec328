use std::cell::RefCell;
use std::f32::consts::PI;
use std::rc::Rc;

use crate::animation::TimingFunction;
use crate::error::Result;
use crate::projection::{
    HeadAnchor, HeadProjector, Projector, ProjectorConfig, SceneGraph, Transform,
};
use crate::reactive::{on_cleanup, ReadSignal, Scope};
use crate::render::{Length, Property, SharedRenderer, TargetId};
use crate::scroll::{LayoutSource, ScrollTrigger, TriggerRegion};
use crate::stage::Stage;
use crate::timeline::{Segment, SegmentedTimeline};

use super::targets;

/// World-space distance the robot sinks over the page.
pub const DESCENT_DEPTH: f32 = -3.0;

/// Turn that makes the loaded model face the camera.
pub const MODEL_FACING: f32 = PI;

/// Rest height of the model, a little below the screen centre.
pub const MODEL_Y_OFFSET: f32 = -0.3;

/// Local transform of the model root for a pushed `robot-model` translate.
///
/// Hosts apply this to their scene when the descent timeline writes
/// `TranslateY` for [`targets::ROBOT_MODEL`].
pub fn model_transform(translate_y: f32) -> Transform {
    Transform::translate3d(0.0, MODEL_Y_OFFSET + translate_y, 0.0)
        .then(&Transform::rotate_y(MODEL_FACING))
}

/// The robot model's vertical travel over the whole page.
pub fn robot_descent() -> Result<SegmentedTimeline> {
    SegmentedTimeline::new([Segment::new("robot-descent", targets::ROBOT_MODEL, 0.0, 1.0)?
        .tween(Property::TranslateY, 0.0, DESCENT_DEPTH, TimingFunction::Linear)])
}

/// The beam above the head: grows to full height in the first half, then
/// pulses its opacity down to 0.9 and back.
pub fn head_beam_timeline() -> Result<SegmentedTimeline> {
    let grow = TimingFunction::PowerOut(2);
    SegmentedTimeline::new([
        Segment::new("head-beam-grow", targets::HEAD_BEAM, 0.0, 0.5)?
            .tween(Property::Height, Length::Vh(0.0), Length::Vh(100.0), grow.clone())
            .tween(Property::Opacity, 0.0, 1.0, grow),
        Segment::new("head-beam-pulse", targets::HEAD_BEAM, 0.5, 1.0)?
            .tween(Property::Opacity, 1.0, 0.9, TimingFunction::PowerInOut(1))
            .repeat(1, true),
    ])
}

/// The robot page: descent and beam follow the page scroll, and the beam is
/// re-anchored to the projected head every frame.
pub struct HeadBeam {
    projector: Rc<HeadProjector>,
    trigger: ScrollTrigger,
}

impl HeadBeam {
    /// Mount against the page body's layout and the live scene.
    ///
    /// The host applies the `robot-model` translate to its scene; the frame
    /// callback reads the scene back after that, so the beam always sits on
    /// the head of the frame being drawn.
    pub fn mount<S, P>(
        stage: &Stage,
        page: impl LayoutSource + 'static,
        scene: Rc<RefCell<S>>,
        camera: P,
        renderer: SharedRenderer,
        config: ProjectorConfig,
    ) -> Result<(Self, Scope)>
    where
        S: SceneGraph + 'static,
        P: Projector + 'static,
    {
        let descent = robot_descent()?;
        let beam = head_beam_timeline()?;
        let region = TriggerRegion::new("top top", "bottom bottom")?;
        let projector = Rc::new(HeadProjector::new(config));

        let (trigger, scope) = Scope::new(|| {
            let r = renderer.clone();
            let trigger = ScrollTrigger::builder(region, page)
                .on_progress(move |progress| {
                    let mut renderer = r.borrow_mut();
                    descent.apply(progress, &mut *renderer);
                    beam.apply(progress, &mut *renderer);
                })
                .attach(stage.viewport());

            let (p, target) = (projector.clone(), TargetId::new(targets::HEAD_BEAM));
            let frame = stage.on_frame(move |viewport| {
                let Some(anchor) = p.frame(&*scene.borrow(), &camera, viewport) else {
                    return;
                };
                p.placement(anchor, viewport)
                    .apply(&target, &mut *renderer.borrow_mut());
            });
            on_cleanup(move || frame.remove());
            trigger
        });
        log::debug!("head beam mounted");

        Ok((Self { projector, trigger }, scope))
    }

    /// The anchor projected on the latest frame.
    pub fn anchor(&self) -> ReadSignal<Option<HeadAnchor>> {
        self.projector.anchor()
    }

    pub fn trigger(&self) -> &ScrollTrigger {
        &self.trigger
    }
}
