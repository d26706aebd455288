//! Host elements (deck framing) that posts bear on.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a host element in the caller's model.
pub type HostId = u64;

/// A framing member posts can land on.
///
/// The caller supplies its axis-aligned world bounds and, when it has one,
/// the member's end-to-end centreline. The top of the bounds is the bearing
/// elevation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostElement {
    pub id: HostId,
    pub min: Vec3,
    pub max: Vec3,
    pub centerline: Option<(Vec3, Vec3)>,
}

impl HostElement {
    /// Creates a host from two opposite corners of its bounds (any order).
    pub fn new(id: HostId, a: Vec3, b: Vec3) -> Self {
        Self {
            id,
            min: a.min(b),
            max: a.max(b),
            centerline: None,
        }
    }

    pub fn with_centerline(mut self, start: Vec3, end: Vec3) -> Self {
        self.centerline = Some((start, end));
        self
    }

    pub fn top_z(&self) -> f32 {
        self.max.z
    }

    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Whether `point` lies inside the bounds seen from above.
    pub fn contains_plan(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Plan distance from `point` to the centreline clamped to its ends,
    /// or to the bounds centre when there is no centreline.
    pub fn plan_distance(&self, point: Vec3) -> f32 {
        let p = point.truncate();
        match self.centerline {
            Some((start, end)) => distance_to_segment(p, start.truncate(), end.truncate()),
            None => p.distance(self.centroid().truncate()),
        }
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > f32::EPSILON {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p.distance(a + ab * t)
}

/// Picks the host a station bears on.
///
/// Hosts whose plan bounds contain the station always win over hosts that
/// do not; within each group the smallest [`HostElement::plan_distance`]
/// wins and ties keep the earlier host. `None` means the caller falls back
/// to path-relative elevations.
pub fn nearest_host(point: Vec3, hosts: &[HostElement]) -> Option<&HostElement> {
    hosts.iter().min_by(|a, b| {
        let key = |h: &HostElement| (!h.contains_plan(point), h.plan_distance(point));
        let (a_out, a_dist) = key(a);
        let (b_out, b_dist) = key(b);
        a_out.cmp(&b_out).then(a_dist.total_cmp(&b_dist))
    })
}

/// Which side of the line through `reference` the host lies on: `+1` along
/// `left`, `-1` against it. Without a host the left side is assumed.
pub fn side_sign_toward(host: Option<&HostElement>, left: Vec3, reference: Vec3) -> f32 {
    match host {
        Some(host) => {
            let to_host = (host.centroid() - reference).truncate();
            if to_host.dot(left.truncate()) >= 0.0 { 1.0 } else { -1.0 }
        }
        None => 1.0,
    }
}
