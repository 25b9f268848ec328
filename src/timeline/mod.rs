//! Segmented timelines: one progress value fanned out into property updates.
//!
//! Every segment is evaluated on every call, so a scroll jump across a segment
//! lands on that segment's edge value instead of leaving a stale mid-animation
//! value behind. When several segments drive the same property of the same
//! target, they behave like a sequenced timeline: the most recently started
//! segment (by start position) wins, and before any has started the earliest
//! one's start value is shown.

mod cross_fade;
mod segment;

pub use cross_fade::CrossFade;
pub use segment::{Segment, Track, TrackKind};

use std::collections::HashMap;

use crate::error::Result;
use crate::render::{Property, PropertyValue, Renderer, TargetId};

/// A resolved property value for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameUpdate {
    pub target: TargetId,
    pub property: Property,
    pub value: PropertyValue,
}

#[derive(Clone, Debug, Default)]
pub struct SegmentedTimeline {
    segments: Vec<Segment>,
    /// Indices into `segments`, sorted by start (stable).
    order: Vec<usize>,
}

impl SegmentedTimeline {
    pub fn new(segments: impl IntoIterator<Item = Segment>) -> Result<Self> {
        let segments: Vec<Segment> = segments.into_iter().collect();
        for segment in &segments {
            segment.validate()?;
        }
        let mut order: Vec<usize> = (0..segments.len()).collect();
        order.sort_by(|&a, &b| segments[a].start().total_cmp(&segments[b].start()));
        log::debug!("timeline built with {} segments", segments.len());
        Ok(Self { segments, order })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, name: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.name() == name)
    }

    /// Segments whose `[start, end)` contains `progress`.
    pub fn active(&self, progress: f32) -> impl Iterator<Item = &Segment> + '_ {
        self.segments.iter().filter(move |s| s.contains(progress))
    }

    /// Resolve every tracked property at `progress` without touching a renderer.
    ///
    /// Updates come out in first-seen order of `(target, property)`.
    pub fn sample(&self, progress: f32) -> Vec<FrameUpdate> {
        let progress = progress.clamp(0.0, 1.0);
        let mut updates: Vec<FrameUpdate> = Vec::new();
        let mut index: HashMap<(TargetId, Property), usize> = HashMap::new();

        for &i in &self.order {
            let segment = &self.segments[i];
            let started = segment.has_started(progress);
            for (property, value) in segment.values_at(progress) {
                let key = (segment.target().clone(), property.clone());
                match index.get(&key) {
                    Some(&slot) if started => updates[slot].value = value,
                    Some(_) => {}
                    None => {
                        index.insert(key, updates.len());
                        updates.push(FrameUpdate {
                            target: segment.target().clone(),
                            property: property.clone(),
                            value,
                        });
                    }
                }
            }
        }
        updates
    }

    /// Push the state at `progress` to the renderer.
    ///
    /// Calling this twice with the same progress pushes the same values.
    pub fn apply(&self, progress: f32, renderer: &mut dyn Renderer) {
        if !progress.is_finite() {
            log::warn!("ignoring non-finite timeline progress {}", progress);
            return;
        }
        for update in self.sample(progress) {
            log::trace!(
                "{} {} = {:?} @ {:.3}",
                update.target,
                update.property,
                update.value,
                progress
            );
            renderer.set_property(&update.target, &update.property, &update.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::TimingFunction;
    use crate::error::StoryError;
    use crate::render::{Length, PropertyStore};

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn dialog_timeline() -> SegmentedTimeline {
        SegmentedTimeline::new([
            Segment::at("dialog-in", "dialog", 0.0, 0.25)
                .unwrap()
                .tween(Property::Opacity, 0.0, 1.0, TimingFunction::Linear),
            Segment::at("dialog-out", "dialog", 0.48, 0.1)
                .unwrap()
                .tween(Property::Opacity, 1.0, 0.0, TimingFunction::Linear),
        ])
        .unwrap()
    }

    fn opacity_at(timeline: &SegmentedTimeline, progress: f32) -> f32 {
        let mut store = PropertyStore::new();
        timeline.apply(progress, &mut store);
        store.number("dialog", &Property::Opacity).unwrap()
    }

    #[test]
    fn test_latest_started_segment_wins() {
        let timeline = dialog_timeline();
        assert_eq!(opacity_at(&timeline, 0.0), 0.0);
        assert!(approx_eq(opacity_at(&timeline, 0.125), 0.5));
        assert_eq!(opacity_at(&timeline, 0.3), 1.0);
        assert!(approx_eq(opacity_at(&timeline, 0.53), 0.5));
        assert_eq!(opacity_at(&timeline, 1.0), 0.0);
    }

    #[test]
    fn test_one_update_per_property() {
        let updates = dialog_timeline().sample(0.5);
        assert_eq!(updates.len(), 1);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let timeline = dialog_timeline();
        for step in 0..=20 {
            let progress = step as f32 / 20.0;
            assert_eq!(timeline.sample(progress), timeline.sample(progress));
        }
    }

    #[test]
    fn test_jump_across_segment_lands_on_edge() {
        let timeline = SegmentedTimeline::new([Segment::new("grow", "beam", 0.25, 0.5)
            .unwrap()
            .tween(
                Property::Height,
                Length::Vh(0.0),
                Length::Vh(50.0),
                TimingFunction::PowerOut(2),
            )])
        .unwrap();
        let mut store = PropertyStore::new();
        timeline.apply(0.3, &mut store);
        timeline.apply(0.9, &mut store);
        assert_eq!(
            store.get("beam", &Property::Height),
            Some(&PropertyValue::Length(Length::Vh(50.0)))
        );
        timeline.apply(0.0, &mut store);
        assert_eq!(
            store.get("beam", &Property::Height),
            Some(&PropertyValue::Length(Length::Vh(0.0)))
        );
    }

    #[test]
    fn test_non_finite_progress_is_ignored() {
        let mut store = PropertyStore::new();
        dialog_timeline().apply(f32::NAN, &mut store);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_mismatched_track_rejected_at_build() {
        let result = SegmentedTimeline::new([Segment::new("bad", "x", 0.0, 1.0)
            .unwrap()
            .tween(Property::Opacity, 0.0, 1, TimingFunction::Linear)]);
        assert!(matches!(result, Err(StoryError::MismatchedValues { .. })));
    }

    #[test]
    fn test_active_segments() {
        let timeline = dialog_timeline();
        let names: Vec<_> = timeline.active(0.1).map(Segment::name).collect();
        assert_eq!(names, vec!["dialog-in"]);
        assert_eq!(timeline.active(0.4).count(), 0);
    }
}
