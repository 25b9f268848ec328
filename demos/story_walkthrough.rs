use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use beacon::prelude::*;
use beacon::projection::NodeId;
use beacon::story::{model_transform, targets};

/// Records every push and moves the robot when its translate changes.
struct Host {
    store: PropertyStore,
    scene: Rc<RefCell<StaticScene>>,
    robot: NodeId,
}

impl Renderer for Host {
    fn set_property(&mut self, target: &TargetId, property: &Property, value: &PropertyValue) {
        if target.as_str() == targets::ROBOT_MODEL && *property == Property::TranslateY {
            if let Some(y) = value.as_number() {
                self.scene
                    .borrow_mut()
                    .set_local(self.robot, model_transform(y));
            }
        }
        self.store.set_property(target, property, value);
    }
}

fn main() -> beacon::Result<()> {
    env_logger::init();

    let mut stage = Stage::with_config(StageConfig::default().width(1280.0).height(720.0))?;
    let scene = Rc::new(RefCell::new(StaticScene::new()));
    let robot = {
        let mut scene = scene.borrow_mut();
        let root = scene.add_root("Robot", model_transform(0.0));
        scene.add_child(root, "Body", Transform::translate3d(0.0, -1.0, 0.0));
        scene.add_child(root, "Head", Transform::translate3d(0.0, 1.0, 0.0));
        root
    };
    let host = Rc::new(RefCell::new(Host {
        store: PropertyStore::new(),
        scene: scene.clone(),
        robot,
    }));

    // The combined page is four viewports tall.
    let (story, _story_scope) = CombinedStory::mount(
        &stage,
        ElementBox::new(0.0, 2880.0),
        host.clone(),
        TypewriterConfig::default(),
    )?;

    // A story frame halfway down the combined page.
    let (frame, _frame_scope) = StoryFrame::new("Far away, a small robot wakes up.").mount(
        &stage,
        ElementBox::new(1200.0, 400.0),
        host.clone(),
        Rc::new(RefCell::new(CosmicTextMeasurer::new())),
    )?;

    // The robot page sits below it.
    let (beam, _beam_scope) = HeadBeam::mount(
        &stage,
        ElementBox::new(2880.0, 2160.0),
        scene,
        PerspectiveCamera::default(),
        host.clone(),
        ProjectorConfig::default(),
    )?;

    let mut y = 0.0;
    while y <= 4320.0 {
        stage.viewport().scroll_to(y);
        stage.run_for(Duration::from_millis(120))?;

        let host = host.borrow();
        println!(
            "scroll {:>6.0} | story {:.2} | dialog {:?} | frame {:.0} | earth glow {:.2} | head {:?}",
            y,
            story.trigger().progress().get_untracked(),
            story.typewriter().lines(),
            host.store
                .number(targets::STORY_FRAME, &Property::Opacity)
                .unwrap_or_default(),
            host.store
                .number(targets::EARTH_GLOW, &Property::Opacity)
                .unwrap_or_default(),
            beam.anchor().get_untracked().map(|a| (a.x.round(), a.y.round())),
        );
        y += 240.0;
    }

    // A phone-sized window picks the mobile frame.
    stage.viewport().resize(390.0, 844.0);
    stage.frame();
    println!(
        "resized to 390px | frame font {}px",
        frame.layout().get_untracked().font_size_px
    );

    Ok(())
}
