use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::reactive::{create_effect, create_signal, ReadSignal, Scope, Signal};
use crate::render::{Length, Property, PropertyValue, SharedRenderer, TargetId};
use crate::scroll::{FirePolicy, LayoutSource, ScrollTrigger, TriggerRegion};
use crate::stage::Stage;
use crate::text::{FitResult, StoryTextLayout, TextMeasure};

use super::targets;

/// Distance the frame rises while it is revealed.
pub const REVEAL_OFFSET_PX: f32 = 50.0;

/// A centered story text frame.
///
/// Its geometry follows the viewport width through [`StoryTextLayout`] and is
/// re-fitted on every width change. It starts lowered and transparent and is
/// revealed the first time its region is entered.
pub struct StoryFrame {
    text: String,
    start: String,
    end: String,
    policy: FirePolicy,
    frame: TargetId,
    text_target: TargetId,
}

impl StoryFrame {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: "top 90%".to_string(),
            end: "bottom top".to_string(),
            policy: FirePolicy::Once,
            frame: TargetId::new(targets::STORY_FRAME),
            text_target: TargetId::new(targets::STORY_TEXT),
        }
    }

    /// Scroll anchors; the frame is revealed once the start is passed.
    pub fn region(mut self, start: &str, end: &str) -> Self {
        self.start = start.to_string();
        self.end = end.to_string();
        self
    }

    pub fn policy(mut self, policy: FirePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn targets(mut self, frame: impl Into<TargetId>, text: impl Into<TargetId>) -> Self {
        self.frame = frame.into();
        self.text_target = text.into();
        self
    }

    pub fn mount(
        self,
        stage: &Stage,
        element: impl LayoutSource + 'static,
        renderer: SharedRenderer,
        measurer: Rc<RefCell<dyn TextMeasure>>,
    ) -> Result<(MountedFrame, Scope)> {
        let region = TriggerRegion::new(&self.start, &self.end)?;
        let viewport = stage.viewport();

        let (mounted, scope) = Scope::new(|| {
            {
                let mut renderer = renderer.borrow_mut();
                renderer.set_property(&self.frame, &Property::Opacity, &0.0f32.into());
                renderer.set_property(
                    &self.frame,
                    &Property::TranslateY,
                    &Length::Px(REVEAL_OFFSET_PX).into(),
                );
                renderer.set_property(
                    &self.text_target,
                    &Property::Text,
                    &PropertyValue::Text(self.text.clone()),
                );
            }

            let initial = StoryTextLayout::for_width(viewport.state().width);
            let layout = create_signal(initial);
            let fit = create_signal(None::<FitResult>);

            let resize = Resize {
                text: self.text,
                frame: self.frame.clone(),
                text_target: self.text_target,
                renderer: renderer.clone(),
                measurer,
                layout: layout.clone(),
                fit: fit.clone(),
            };
            let state = viewport.signal();
            let mut last_width = None;
            create_effect(move || {
                let width = state.get().width;
                if last_width == Some(width) {
                    return;
                }
                last_width = Some(width);
                resize.apply(width);
            });

            let (r, frame) = (renderer.clone(), self.frame);
            let trigger = ScrollTrigger::builder(region, element)
                .policy(self.policy)
                .on_enter(move || {
                    log::debug!("story frame `{}` revealed", frame.as_str());
                    let mut renderer = r.borrow_mut();
                    renderer.set_property(&frame, &Property::Opacity, &1.0f32.into());
                    renderer.set_property(&frame, &Property::TranslateY, &Length::Px(0.0).into());
                })
                .attach(viewport);

            MountedFrame {
                trigger,
                layout: layout.read_only(),
                fit: fit.read_only(),
            }
        });
        Ok((mounted, scope))
    }
}

/// Pushes the frame geometry for one viewport width and re-fits the text.
struct Resize {
    text: String,
    frame: TargetId,
    text_target: TargetId,
    renderer: SharedRenderer,
    measurer: Rc<RefCell<dyn TextMeasure>>,
    layout: Signal<StoryTextLayout>,
    fit: Signal<Option<FitResult>>,
}

impl Resize {
    fn apply(&self, viewport_width: f32) {
        let layout = StoryTextLayout::for_width(viewport_width);
        let frame = layout.fit_box(viewport_width);
        {
            let mut renderer = self.renderer.borrow_mut();
            renderer.set_property(&self.frame, &Property::Width, &Length::Px(frame.width).into());
            renderer.set_property(&self.frame, &Property::Height, &Length::Px(frame.height).into());
        }

        let result = layout
            .fit_config()
            .fit(&self.text, &frame, &mut *self.measurer.borrow_mut());
        match result {
            Ok(result) => {
                log::debug!(
                    "story frame {}px wide, text at {}px",
                    frame.width,
                    result.font_size_px
                );
                self.renderer.borrow_mut().set_property(
                    &self.text_target,
                    &Property::FontSize,
                    &Length::Px(result.font_size_px as f32).into(),
                );
                self.fit.set(Some(result));
            }
            Err(err) => log::warn!("story frame fit failed: {}", err),
        }
        self.layout.set(layout);
    }
}

pub struct MountedFrame {
    trigger: ScrollTrigger,
    layout: ReadSignal<StoryTextLayout>,
    fit: ReadSignal<Option<FitResult>>,
}

impl MountedFrame {
    pub fn trigger(&self) -> &ScrollTrigger {
        &self.trigger
    }

    /// The preset for the current viewport width.
    pub fn layout(&self) -> ReadSignal<StoryTextLayout> {
        self.layout.clone()
    }

    /// The latest fit, `None` only if fitting has never succeeded.
    pub fn fit(&self) -> ReadSignal<Option<FitResult>> {
        self.fit.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PropertyStore;
    use crate::scroll::ElementBox;
    use crate::text::Size;

    /// A single line forty font sizes wide.
    struct Wide;

    impl TextMeasure for Wide {
        fn measure(&mut self, _text: &str, font_size: f32, _max_width: Option<f32>) -> Size {
            Size::new(font_size * 40.0, font_size * 1.2)
        }
    }

    fn mount(stage: &Stage) -> (Rc<RefCell<PropertyStore>>, MountedFrame, Scope) {
        let store = Rc::new(RefCell::new(PropertyStore::new()));
        let (frame, scope) = StoryFrame::new("Far away, a small robot wakes up.")
            .mount(
                stage,
                ElementBox::new(1600.0, 400.0),
                store.clone(),
                Rc::new(RefCell::new(Wide)),
            )
            .unwrap();
        (store, frame, scope)
    }

    fn px(store: &PropertyStore, target: &str, property: Property) -> f32 {
        match store.get(target, &property) {
            Some(PropertyValue::Length(Length::Px(px))) => *px,
            other => panic!("{} {} is {:?}", target, property, other),
        }
    }

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_mount_lays_out_for_desktop_and_hides() {
        let stage = Stage::new().unwrap();
        let (store, frame, _scope) = mount(&stage);
        let store = store.borrow();

        assert_eq!(frame.layout().get_untracked().font_size_px, 22);
        assert!(approx_eq(px(&store, targets::STORY_FRAME, Property::Width), 960.0));
        assert!(approx_eq(px(&store, targets::STORY_FRAME, Property::Height), 400.0));
        // 800px of content width fits 20px text at 40 glyph widths.
        assert!(approx_eq(px(&store, targets::STORY_TEXT, Property::FontSize), 20.0));
        assert_eq!(frame.fit().get_untracked().map(|f| f.font_size_px), Some(20));

        assert_eq!(store.number(targets::STORY_FRAME, &Property::Opacity), Some(0.0));
        assert!(approx_eq(px(&store, targets::STORY_FRAME, Property::TranslateY), REVEAL_OFFSET_PX));
        assert_eq!(
            store.text(targets::STORY_TEXT),
            Some("Far away, a small robot wakes up.")
        );
    }

    #[test]
    fn test_resize_switches_breakpoint() {
        let mut stage = Stage::new().unwrap();
        let (store, frame, _scope) = mount(&stage);

        stage.viewport().resize(400.0, 800.0);
        stage.frame();
        let mobile = frame.layout().get_untracked();
        assert_eq!(mobile.font_size_px, 12);
        {
            let store = store.borrow();
            assert!(approx_eq(px(&store, targets::STORY_FRAME, Property::Width), 380.0));
            assert!(approx_eq(px(&store, targets::STORY_FRAME, Property::Height), 280.0));
            // 300px of content: 12px needs 480, so it shrinks to the floor.
            assert!(approx_eq(px(&store, targets::STORY_TEXT, Property::FontSize), 10.0));
        }
        assert_eq!(frame.fit().get_untracked().map(|f| f.fits), Some(false));

        stage.viewport().resize(900.0, 800.0);
        stage.frame();
        assert_eq!(frame.layout().get_untracked().font_size_px, 24);
        assert!(approx_eq(px(&store.borrow(), targets::STORY_FRAME, Property::Width), 765.0));
    }

    #[test]
    fn test_scroll_alone_does_not_refit() {
        let mut stage = Stage::new().unwrap();
        let (store, _frame, _scope) = mount(&stage);
        let writes = store.borrow().writes();

        // Still above "top 90%" (1600 - 720 = 880).
        stage.viewport().scroll_to(500.0);
        stage.frame();
        assert_eq!(store.borrow().writes(), writes);
    }

    #[test]
    fn test_reveal_fires_once() {
        let mut stage = Stage::new().unwrap();
        let (store, frame, _scope) = mount(&stage);

        stage.viewport().scroll_to(1000.0);
        stage.frame();
        assert!(frame.trigger().progress().get_untracked() > 0.0);
        {
            let store = store.borrow();
            assert_eq!(store.number(targets::STORY_FRAME, &Property::Opacity), Some(1.0));
            assert!(approx_eq(px(&store, targets::STORY_FRAME, Property::TranslateY), 0.0));
        }

        // Back above the region: the frame stays revealed.
        stage.viewport().scroll_to(0.0);
        stage.frame();
        assert_eq!(
            store.borrow().number(targets::STORY_FRAME, &Property::Opacity),
            Some(1.0)
        );
    }

    #[test]
    fn test_dispose_stops_resizing() {
        let mut stage = Stage::new().unwrap();
        let (store, _frame, scope) = mount(&stage);
        scope.dispose();
        assert_eq!(stage.viewport().subscriber_count(), 0);

        let writes = store.borrow().writes();
        stage.viewport().resize(400.0, 800.0);
        stage.viewport().scroll_to(1200.0);
        stage.frame();
        assert_eq!(store.borrow().writes(), writes);
        assert_eq!(Rc::strong_count(&store), 1);
    }
}
