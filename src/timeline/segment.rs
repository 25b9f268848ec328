use crate::animation::{Animatable, TimingFunction};
use crate::error::{Result, StoryError};
use crate::render::{Property, PropertyValue, TargetId};

#[derive(Clone, Debug)]
pub enum TrackKind {
    /// Interpolate through the easing curve.
    Tween(TimingFunction),
    /// Hold `from` until the segment starts, then hold `to`.
    Switch,
}

/// One property animated by a segment.
#[derive(Clone, Debug)]
pub struct Track {
    pub property: Property,
    pub from: PropertyValue,
    pub to: PropertyValue,
    pub kind: TrackKind,
}

impl Track {
    /// Value at raw local progress `raw_t` and folded progress `folded_t`.
    fn value_at(&self, raw_t: f32, folded_t: f32) -> PropertyValue {
        match &self.kind {
            TrackKind::Tween(ease) => {
                PropertyValue::lerp(&self.from, &self.to, ease.evaluate(folded_t))
            }
            TrackKind::Switch if raw_t > 0.0 => self.to.clone(),
            TrackKind::Switch => self.from.clone(),
        }
    }
}

/// A sub-range of progress over which a target's properties animate.
#[derive(Clone, Debug)]
pub struct Segment {
    name: String,
    target: TargetId,
    start: f32,
    end: f32,
    tracks: Vec<Track>,
    repeat: u32,
    yoyo: bool,
}

impl Segment {
    /// Create a segment over `[start, end)`.
    ///
    /// Fails unless `0 <= start < end <= 1` with both bounds finite.
    pub fn new(
        name: impl Into<String>,
        target: impl Into<TargetId>,
        start: f32,
        end: f32,
    ) -> Result<Self> {
        let name = name.into();
        let valid = start.is_finite()
            && end.is_finite()
            && (0.0..=1.0).contains(&start)
            && (0.0..=1.0).contains(&end)
            && end > start;
        if !valid {
            return Err(StoryError::InvalidRange { name, start, end });
        }
        Ok(Self {
            name,
            target: target.into(),
            start,
            end,
            tracks: Vec::new(),
            repeat: 0,
            yoyo: false,
        })
    }

    /// Segment starting at `start` and lasting `duration`, the way timelines
    /// position tweens.
    pub fn at(
        name: impl Into<String>,
        target: impl Into<TargetId>,
        start: f32,
        duration: f32,
    ) -> Result<Self> {
        Self::new(name, target, start, start + duration)
    }

    pub fn tween(
        mut self,
        property: Property,
        from: impl Into<PropertyValue>,
        to: impl Into<PropertyValue>,
        ease: TimingFunction,
    ) -> Self {
        self.tracks.push(Track {
            property,
            from: from.into(),
            to: to.into(),
            kind: TrackKind::Tween(ease),
        });
        self
    }

    pub fn switch(
        mut self,
        property: Property,
        before: impl Into<PropertyValue>,
        after: impl Into<PropertyValue>,
    ) -> Self {
        self.tracks.push(Track {
            property,
            from: before.into(),
            to: after.into(),
            kind: TrackKind::Switch,
        });
        self
    }

    /// Play the tweens `1 + count` times across the range, reversing every
    /// other pass when `yoyo` is set.
    pub fn repeat(mut self, count: u32, yoyo: bool) -> Self {
        self.repeat = count;
        self.yoyo = yoyo;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &TargetId {
        &self.target
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Whether `progress` lies in `[start, end)`.
    pub fn contains(&self, progress: f32) -> bool {
        progress >= self.start && progress < self.end
    }

    pub fn has_started(&self, progress: f32) -> bool {
        progress >= self.start
    }

    /// Local progress, clamped so out-of-range segments sit at an edge.
    pub fn local_t(&self, progress: f32) -> f32 {
        ((progress - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }

    fn fold(&self, t: f32) -> f32 {
        if self.repeat == 0 {
            return t;
        }
        let cycles = (self.repeat + 1) as f32;
        let scaled = t * cycles;
        let index = scaled.floor().min(cycles - 1.0);
        let frac = scaled - index;
        if self.yoyo && (index as u32) % 2 == 1 {
            1.0 - frac
        } else {
            frac
        }
    }

    /// Every track's value at `progress`.
    pub fn values_at(&self, progress: f32) -> impl Iterator<Item = (&Property, PropertyValue)> + '_ {
        let raw_t = self.local_t(progress);
        let folded_t = self.fold(raw_t);
        self.tracks
            .iter()
            .map(move |track| (&track.property, track.value_at(raw_t, folded_t)))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for track in &self.tracks {
            if !track.from.is_compatible(&track.to) {
                return Err(StoryError::MismatchedValues {
                    segment: self.name.clone(),
                    property: track.property.to_string(),
                });
            }
        }
        Ok(())
    }
}
