use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::reactive::Scope;
use crate::render::{Length, Property, PropertyValue, SharedRenderer, TargetId};
use crate::scroll::{FirePolicy, LayoutSource, ScrollTrigger, TriggerRegion};
use crate::stage::Stage;
use crate::text::{FitBox, FitConfig, FitResult, TextMeasure};
use crate::typewriter::{target_for_progress, Typewriter, TypewriterConfig};

use super::combined::bind_text;
use super::targets;

/// The bottom-left dialog: fades in when scrolling starts, types its line
/// while the page scrolls to its middle, and shows the full line (re-fitted)
/// once that point is reached.
pub struct DialogSequence {
    text: String,
    frame: FitBox,
    fit: FitConfig,
    start: String,
    end: String,
    policy: FirePolicy,
    typing: TypewriterConfig,
    dialog: TargetId,
    text_target: TargetId,
}

impl Default for DialogSequence {
    fn default() -> Self {
        Self::new(super::DIALOG_TEXT)
    }
}

impl DialogSequence {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            // 360x200 box with 1.2rem padding.
            frame: FitBox::new(360.0, 200.0).with_padding(19.2),
            fit: FitConfig::default(),
            start: "top top".to_string(),
            end: "center center".to_string(),
            policy: FirePolicy::Once,
            typing: TypewriterConfig::default(),
            dialog: TargetId::new(targets::DIALOG),
            text_target: TargetId::new(targets::DIALOG_TEXT),
        }
    }

    pub fn frame(mut self, frame: FitBox) -> Self {
        self.frame = frame;
        self
    }

    pub fn font_range(mut self, min: u32, max: u32) -> Self {
        self.fit = FitConfig::new(min, max);
        self
    }

    /// Scroll anchors, e.g. `("top top", "center center")`.
    pub fn region(mut self, start: &str, end: &str) -> Self {
        self.start = start.to_string();
        self.end = end.to_string();
        self
    }

    pub fn policy(mut self, policy: FirePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn typing(mut self, typing: TypewriterConfig) -> Self {
        self.typing = typing;
        self
    }

    pub fn targets(mut self, dialog: impl Into<TargetId>, text: impl Into<TargetId>) -> Self {
        self.dialog = dialog.into();
        self.text_target = text.into();
        self
    }

    /// Mount on the stage, following the scroll of `page`.
    ///
    /// Setup errors (bad anchors, an empty font range) are returned before
    /// anything is registered.
    pub fn mount(
        self,
        stage: &Stage,
        page: impl LayoutSource + 'static,
        renderer: SharedRenderer,
        measurer: Rc<RefCell<dyn TextMeasure>>,
    ) -> Result<(MountedDialog, Scope)> {
        let region = TriggerRegion::new(&self.start, &self.end)?;
        let fitter = Fitter {
            text: self.text.clone(),
            frame: self.frame,
            fit: self.fit,
            target: self.text_target.clone(),
            renderer: renderer.clone(),
            measurer,
        };
        let initial_fit = fitter.run()?;

        let (mounted, scope) = Scope::new(|| {
            {
                let mut renderer = renderer.borrow_mut();
                renderer.set_property(&self.dialog, &Property::Opacity, &0.0f32.into());
                renderer.set_property(
                    &self.text_target,
                    &Property::Text,
                    &PropertyValue::Text(String::new()),
                );
            }

            let typewriter = Typewriter::new(&self.text, &stage.handle(), self.typing);
            bind_text(&typewriter, &renderer, self.text_target.clone());

            let (on_enter, dialog) = (renderer.clone(), self.dialog.clone());
            let typing = typewriter.clone();
            let finishing = typewriter.clone();
            let trigger = ScrollTrigger::builder(region, page)
                .policy(self.policy)
                .on_enter(move || {
                    log::debug!("dialog revealed");
                    on_enter
                        .borrow_mut()
                        .set_property(&dialog, &Property::Opacity, &1.0f32.into());
                })
                .on_progress(move |progress| {
                    let target = target_for_progress(progress, typing.len());
                    if let Err(err) = typing.advance(target) {
                        log::warn!("dialog typing stalled: {}", err);
                    }
                })
                .on_complete(move || {
                    finishing.complete();
                    if let Err(err) = fitter.run() {
                        log::warn!("dialog re-fit failed: {}", err);
                    }
                })
                .attach(stage.viewport());

            MountedDialog {
                typewriter,
                trigger,
                initial_fit,
            }
        });
        Ok((mounted, scope))
    }
}

/// Fits the full dialog line and pushes the font size.
struct Fitter {
    text: String,
    frame: FitBox,
    fit: FitConfig,
    target: TargetId,
    renderer: SharedRenderer,
    measurer: Rc<RefCell<dyn TextMeasure>>,
}

impl Fitter {
    fn run(&self) -> Result<FitResult> {
        let result = self
            .fit
            .fit(&self.text, &self.frame, &mut *self.measurer.borrow_mut())?;
        self.renderer.borrow_mut().set_property(
            &self.target,
            &Property::FontSize,
            &Length::Px(result.font_size_px as f32).into(),
        );
        Ok(result)
    }
}

pub struct MountedDialog {
    typewriter: Typewriter,
    trigger: ScrollTrigger,
    initial_fit: FitResult,
}

impl MountedDialog {
    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    pub fn trigger(&self) -> &ScrollTrigger {
        &self.trigger
    }

    pub fn initial_fit(&self) -> FitResult {
        self.initial_fit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PropertyStore;
    use crate::scroll::ElementBox;
    use crate::text::Size;

    struct FixedWidth;

    impl TextMeasure for FixedWidth {
        fn measure(&mut self, text: &str, font_size: f32, _max_width: Option<f32>) -> Size {
            let lines = text.split('\n').count() as f32;
            Size::new(font_size * 10.0, lines * font_size * 1.3)
        }
    }

    fn mount(stage: &Stage) -> (Rc<RefCell<PropertyStore>>, MountedDialog, Scope) {
        let store = Rc::new(RefCell::new(PropertyStore::new()));
        let (dialog, scope) = DialogSequence::default()
            .mount(
                stage,
                ElementBox::new(0.0, 3200.0),
                store.clone(),
                Rc::new(RefCell::new(FixedWidth)),
            )
            .unwrap();
        (store, dialog, scope)
    }

    #[test]
    fn test_mount_hides_dialog_and_fits() {
        let stage = Stage::new().unwrap();
        let (store, dialog, _scope) = mount(&stage);
        let store = store.borrow();
        assert_eq!(store.number(targets::DIALOG, &Property::Opacity), Some(0.0));
        assert_eq!(store.text(targets::DIALOG_TEXT), Some(""));
        // 18px * 10 = 180px fits the 321.6px content width.
        assert_eq!(dialog.initial_fit().font_size_px, 18);
        assert_eq!(
            store.get(targets::DIALOG_TEXT, &Property::FontSize),
            Some(&PropertyValue::Length(Length::Px(18.0)))
        );
    }

    #[test]
    fn test_scroll_reveals_types_and_completes() {
        let mut stage = Stage::new().unwrap();
        let (store, dialog, _scope) = mount(&stage);

        // "top top" → "center center" on a 3200px page spans 0..1200.
        stage.viewport().scroll_to(600.0);
        stage.frame();
        assert_eq!(store.borrow().number(targets::DIALOG, &Property::Opacity), Some(1.0));
        assert!(dialog.typewriter().is_ticking());
        assert_eq!(dialog.typewriter().target(), 30);

        stage.viewport().scroll_to(1200.0);
        stage.frame();
        assert!(!dialog.typewriter().is_ticking());
        assert_eq!(store.borrow().text(targets::DIALOG_TEXT), Some(super::super::DIALOG_TEXT));
    }

    #[test]
    fn test_scroll_back_snaps_to_word() {
        let mut stage = Stage::new().unwrap();
        let (store, _dialog, _scope) = mount(&stage);
        stage.viewport().scroll_to(1200.0);
        stage.frame();

        // 27 / 61 of the way: inside "sends".
        stage.viewport().scroll_to(27.0 / 61.0 * 1200.0 + 1.0);
        stage.frame();
        assert_eq!(
            store.borrow().text(targets::DIALOG_TEXT),
            Some("With its last energy,\nEMO ")
        );
    }

    #[test]
    fn test_dispose_stops_everything() {
        let mut stage = Stage::new().unwrap();
        let (store, dialog, scope) = mount(&stage);
        stage.viewport().scroll_to(600.0);
        stage.frame();
        assert_eq!(stage.viewport().subscriber_count(), 1);

        scope.dispose();
        assert_eq!(stage.viewport().subscriber_count(), 0);
        assert!(!dialog.typewriter().is_ticking());

        let writes = store.borrow().writes();
        stage.dispatch(Some(std::time::Duration::from_millis(50))).unwrap();
        stage.viewport().scroll_to(1200.0);
        stage.frame();
        assert_eq!(store.borrow().writes(), writes);
    }

    #[test]
    fn test_bad_anchor_fails_before_mount() {
        let stage = Stage::new().unwrap();
        let result = DialogSequence::default().region("top top", "middle").mount(
            &stage,
            ElementBox::new(0.0, 3200.0),
            Rc::new(RefCell::new(PropertyStore::new())),
            Rc::new(RefCell::new(FixedWidth)),
        );
        assert!(result.is_err());
        assert_eq!(stage.viewport().subscriber_count(), 0);
    }
}
