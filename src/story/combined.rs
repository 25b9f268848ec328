use std::rc::Rc;

use crate::animation::TimingFunction;
use crate::error::Result;
use crate::reactive::{create_effect, Scope};
use crate::render::{Length, Property, PropertyValue, SharedRenderer, TargetId};
use crate::scroll::{LayoutSource, ScrollTrigger, TriggerRegion};
use crate::stage::Stage;
use crate::timeline::{CrossFade, Segment, SegmentedTimeline};
use crate::typewriter::{ProgressWindow, Typewriter, TypewriterConfig};

use super::targets;

/// Part of the page over which the dialog text types in. Raw page progress,
/// not timeline time.
pub const TYPING_WINDOW: (f32, f32) = (0.0, 0.25);

/// Timeline time at which the last tween (the button) ends. Positions below
/// are in timeline time and get stretched over the whole page.
const TIMELINE_LENGTH: f32 = 1.02;

fn ease() -> TimingFunction {
    TimingFunction::PowerOut(2)
}

/// Page progress of a timeline time.
fn page(time: f32) -> f32 {
    (time / TIMELINE_LENGTH).min(1.0)
}

fn at(name: &str, target: &str, start: f32, duration: f32) -> Result<Segment> {
    Segment::new(name, target, page(start), page(start + duration))
}

/// The robot-to-earth page: dialog and beam, a cross-fade into the second
/// section at the halfway mark, then the closing message.
pub fn combined_timeline() -> Result<SegmentedTimeline> {
    let mut segments = vec![
        at("dialog-in", targets::DIALOG, 0.0, 0.25)?
            .tween(Property::Opacity, 0.0, 1.0, ease())
            .tween(Property::TranslateY, 50.0, 0.0, ease()),
        at("dialog-text-in", targets::DIALOG_TEXT, 0.0, 0.25)?
            .tween(Property::Opacity, 0.0, 1.0, ease()),
        at("laser-grow", targets::LASER_BEAM, 0.25, 0.25)?
            .tween(Property::Height, Length::Vh(0.0), Length::Vh(50.0), ease())
            .tween(Property::Opacity, 0.0, 1.0, ease()),
        at("dialog-out", targets::DIALOG, 0.48, 0.1)?
            .tween(Property::Opacity, 1.0, 0.0, ease())
            .tween(Property::TranslateY, 0.0, -50.0, ease()),
        at("laser-out", targets::LASER_BEAM, 0.48, 0.1)?
            .tween(Property::Opacity, 1.0, 0.0, ease()),
        at("fotor-laser-grow", targets::FOTOR_LASER, 0.5, 0.25)?
            .tween(Property::Height, Length::Vh(0.0), Length::Vh(50.0), ease())
            .tween(Property::Opacity, 0.0, 1.0, ease()),
        at("earth-glow", targets::EARTH_GLOW, 0.75, 0.1)?
            .tween(Property::Opacity, 0.0, 1.0, ease()),
        at("message-container", targets::MESSAGE_CONTAINER, 0.85, 0.05)?
            .tween(Property::Opacity, 0.0, 1.0, ease()),
        at("message-text", targets::MESSAGE_TEXT, 0.87, 0.1)?
            .tween(Property::Opacity, 0.0, 1.0, ease())
            .tween(Property::TranslateY, 30.0, 0.0, ease()),
        at("button", targets::BUTTON, 0.92, 0.1)?
            .tween(Property::Opacity, 0.0, 1.0, ease())
            .tween(Property::TranslateY, 30.0, 0.0, ease()),
    ];
    segments.extend(
        CrossFade::new(targets::FIRST_SECTION, targets::SECOND_SECTION)
            .fade_out(page(0.49), page(0.59))
            .fade_in(page(0.5), page(0.6))
            .ease(ease())
            .into_segments()?,
    );
    SegmentedTimeline::new(segments)
}

/// The combined page mounted on a stage.
pub struct CombinedStory {
    timeline: Rc<SegmentedTimeline>,
    typewriter: Typewriter,
    trigger: ScrollTrigger,
}

impl CombinedStory {
    /// Mount against the page container's layout.
    ///
    /// The timeline and the typing follow one `top top` → `bottom bottom`
    /// trigger. Dropping or disposing the returned scope stops both.
    pub fn mount(
        stage: &Stage,
        container: impl LayoutSource + 'static,
        renderer: SharedRenderer,
        config: TypewriterConfig,
    ) -> Result<(Self, Scope)> {
        let (story, scope) = Scope::new(|| -> Result<Self> {
            let timeline = Rc::new(combined_timeline()?);
            let window = ProgressWindow::new(TYPING_WINDOW.0, TYPING_WINDOW.1)?;
            let typewriter = Typewriter::new(super::DIALOG_TEXT, &stage.handle(), config);

            timeline.apply(0.0, &mut *renderer.borrow_mut());
            bind_text(&typewriter, &renderer, TargetId::new(targets::DIALOG_TEXT));

            let region = TriggerRegion::new("top top", "bottom bottom")?;
            let (tl, tw, r) = (timeline.clone(), typewriter.clone(), renderer.clone());
            let trigger = ScrollTrigger::builder(region, container)
                .on_progress(move |progress| {
                    tl.apply(progress, &mut *r.borrow_mut());
                    if window.local(progress) >= 1.0 {
                        tw.complete();
                    } else if let Err(err) = tw.advance(window.target(progress, tw.len())) {
                        log::warn!("dialog typing stalled: {}", err);
                    }
                })
                .attach(stage.viewport());

            Ok(Self {
                timeline,
                typewriter,
                trigger,
            })
        });
        Ok((story?, scope))
    }

    pub fn timeline(&self) -> &SegmentedTimeline {
        &self.timeline
    }

    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    pub fn trigger(&self) -> &ScrollTrigger {
        &self.trigger
    }
}

/// Push the typewriter's visible text to `target` whenever it changes.
pub(super) fn bind_text(typewriter: &Typewriter, renderer: &SharedRenderer, target: TargetId) {
    let (visible, typewriter, renderer) =
        (typewriter.visible(), typewriter.clone(), renderer.clone());
    create_effect(move || {
        visible.get();
        let text = PropertyValue::Text(typewriter.lines().join("\n"));
        renderer
            .borrow_mut()
            .set_property(&target, &Property::Text, &text);
    });
}
