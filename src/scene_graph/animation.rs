//! Keyframe animation for scene objects.
//!
//! A [`Track`] holds keys sorted by time (seconds) and samples them with one of
//! the glTF interpolation modes. A [`Channel`] binds a track to one transform
//! property of one object, and an [`AnimationClip`] groups channels.

use anyhow::ensure;
use glam::{Quat, Vec3, Vec4};

use crate::scene_graph::object3d::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    Step,
    #[default]
    Linear,
    /// Hermite spline; keys carry in and out tangents.
    CubicSpline,
}

/// Values a track can interpolate.
pub trait Animatable: Copy + Default {
    fn interpolate(from: Self, to: Self, t: f32) -> Self;

    /// Cubic Hermite between `p0` and `p1`, tangents already in units per second.
    fn hermite(p0: Self, m0: Self, p1: Self, m1: Self, t: f32, dt: f32) -> Self;
}

fn hermite_weights(t: f32) -> (f32, f32, f32, f32) {
    let t2 = t * t;
    let t3 = t2 * t;
    (
        2.0 * t3 - 3.0 * t2 + 1.0,
        t3 - 2.0 * t2 + t,
        -2.0 * t3 + 3.0 * t2,
        t3 - t2,
    )
}

impl Animatable for Vec3 {
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        from.lerp(to, t)
    }

    fn hermite(p0: Self, m0: Self, p1: Self, m1: Self, t: f32, dt: f32) -> Self {
        let (h00, h10, h01, h11) = hermite_weights(t);
        p0 * h00 + m0 * (h10 * dt) + p1 * h01 + m1 * (h11 * dt)
    }
}

impl Animatable for Quat {
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        from.slerp(to, t)
    }

    fn hermite(p0: Self, m0: Self, p1: Self, m1: Self, t: f32, dt: f32) -> Self {
        let (h00, h10, h01, h11) = hermite_weights(t);
        let value = Vec4::from(p0) * h00
            + Vec4::from(m0) * (h10 * dt)
            + Vec4::from(p1) * h01
            + Vec4::from(m1) * (h11 * dt);
        Quat::from_vec4(value).normalize()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key<T> {
    pub time: f32,
    pub value: T,
    pub in_tangent: T,
    pub out_tangent: T,
}

impl<T: Animatable> Key<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self {
            time,
            value,
            in_tangent: T::default(),
            out_tangent: T::default(),
        }
    }

    pub fn with_tangents(time: f32, in_tangent: T, value: T, out_tangent: T) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Track<T> {
    interpolation: Interpolation,
    keys: Vec<Key<T>>,
}

impl<T: Animatable> Track<T> {
    pub fn new(interpolation: Interpolation, keys: Vec<Key<T>>) -> anyhow::Result<Self> {
        ensure!(!keys.is_empty(), "Animation track without keys");
        ensure!(
            keys.windows(2).all(|pair| pair[0].time < pair[1].time),
            "Animation key times must be strictly increasing"
        );

        Ok(Self {
            interpolation,
            keys,
        })
    }

    pub fn linear(keys: impl IntoIterator<Item = (f32, T)>) -> anyhow::Result<Self> {
        Self::new(
            Interpolation::Linear,
            keys.into_iter()
                .map(|(time, value)| Key::new(time, value))
                .collect(),
        )
    }

    pub fn step(keys: impl IntoIterator<Item = (f32, T)>) -> anyhow::Result<Self> {
        Self::new(
            Interpolation::Step,
            keys.into_iter()
                .map(|(time, value)| Key::new(time, value))
                .collect(),
        )
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn keys(&self) -> &[Key<T>] {
        &self.keys
    }

    pub fn start_time(&self) -> f32 {
        self.keys[0].time
    }

    pub fn end_time(&self) -> f32 {
        self.keys[self.keys.len() - 1].time
    }

    /// Samples the track at `time` seconds. Outside the key range the nearest
    /// end value holds.
    pub fn sample(&self, time: f32) -> T {
        let first = &self.keys[0];
        let last = &self.keys[self.keys.len() - 1];

        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        let next = self.keys.partition_point(|key| key.time <= time);
        let k0 = &self.keys[next - 1];
        let k1 = &self.keys[next];
        let dt = k1.time - k0.time;
        let t = (time - k0.time) / dt;

        match self.interpolation {
            Interpolation::Step => k0.value,
            Interpolation::Linear => T::interpolate(k0.value, k1.value, t),
            Interpolation::CubicSpline => {
                T::hermite(k0.value, k0.out_tangent, k1.value, k1.in_tangent, t, dt)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum ChannelProperty {
    Translation(Track<Vec3>),
    Rotation(Track<Quat>),
    Scale(Track<Vec3>),
}

impl ChannelProperty {
    fn end_time(&self) -> f32 {
        match self {
            ChannelProperty::Translation(track) | ChannelProperty::Scale(track) => {
                track.end_time()
            }
            ChannelProperty::Rotation(track) => track.end_time(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Channel {
    pub target: ObjectId,
    pub property: ChannelProperty,
}

#[derive(Debug, Clone, Default)]
pub struct AnimationClip {
    pub name: String,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: Vec::new(),
        }
    }

    pub fn with_channel(mut self, target: ObjectId, property: ChannelProperty) -> Self {
        self.channels.push(Channel { target, property });
        self
    }

    /// Time of the last key across all channels, in seconds.
    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .map(|channel| channel.property.end_time())
            .fold(0.0, f32::max)
    }
}
