use crate::animation::TimingFunction;
use crate::error::Result;
use crate::render::{Property, TargetId};

use super::Segment;

/// Cross-fade between two stacked sections.
///
/// Produces one segment fading `outgoing` from 1 to 0 and one fading
/// `incoming` from 0 to 1. The ranges may overlap so both are partially
/// visible. The incoming section's z-index is raised the instant its segment
/// starts, which is the first progress at which its opacity is positive.
#[derive(Clone, Debug)]
pub struct CrossFade {
    outgoing: TargetId,
    incoming: TargetId,
    fade_out: (f32, f32),
    fade_in: (f32, f32),
    ease: TimingFunction,
    base_z: i32,
    raised_z: i32,
}

impl CrossFade {
    pub fn new(outgoing: impl Into<TargetId>, incoming: impl Into<TargetId>) -> Self {
        Self {
            outgoing: outgoing.into(),
            incoming: incoming.into(),
            fade_out: (0.49, 0.59),
            fade_in: (0.5, 0.6),
            ease: TimingFunction::PowerOut(2),
            base_z: 1,
            raised_z: 2,
        }
    }

    pub fn fade_out(mut self, start: f32, end: f32) -> Self {
        self.fade_out = (start, end);
        self
    }

    pub fn fade_in(mut self, start: f32, end: f32) -> Self {
        self.fade_in = (start, end);
        self
    }

    pub fn ease(mut self, ease: TimingFunction) -> Self {
        self.ease = ease;
        self
    }

    /// z-index of the incoming section before and after it starts fading in.
    pub fn z_order(mut self, base: i32, raised: i32) -> Self {
        self.base_z = base;
        self.raised_z = raised;
        self
    }

    pub fn into_segments(self) -> Result<Vec<Segment>> {
        let out = Segment::new(
            format!("{}-fade-out", self.outgoing),
            self.outgoing,
            self.fade_out.0,
            self.fade_out.1,
        )?
        .tween(Property::Opacity, 1.0, 0.0, self.ease.clone());

        let incoming = Segment::new(
            format!("{}-fade-in", self.incoming),
            self.incoming,
            self.fade_in.0,
            self.fade_in.1,
        )?
        .tween(Property::Opacity, 0.0, 1.0, self.ease)
        .switch(Property::ZIndex, self.base_z, self.raised_z);

        Ok(vec![out, incoming])
    }
}
