//! Per-side post layout: stations, offset post lines, host elevations.

use crate::host::{HostElement, HostId, nearest_host, side_sign_toward};
use crate::joiner::RailSideSpec;
use crate::side::{RunPolyline, Side};
use crate::stations::StationDistribution;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Post layout inputs in world units (mm).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub spacing: f32,
    pub start_offset: f32,
    pub end_offset: f32,
    pub base_offset: f32,
    pub post_height: f32,
    /// Signed offset of the post centreline along each side's left vector.
    pub post_lateral: f32,
}

/// One station on one side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub index: usize,
    /// Distance along the side from its start point.
    pub distance: f32,
    /// The station on the picked path.
    pub on_line: Vec3,
    /// Post base (offset laterally, at host or path elevation).
    pub base: Vec3,
    pub top: Vec3,
    pub host: Option<HostId>,
    /// `false` when another post already stands at this base.
    pub placed: bool,
}

/// Layout of one usable side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SideLayout {
    pub side: Side,
    /// Polyline vertex the side starts at.
    pub start_vertex: usize,
    /// Polyline vertex the side ends at (wraps to 0 on a closed loop).
    pub end_vertex: usize,
    pub distribution: StationDistribution,
    pub stations: Vec<StationRecord>,
    /// Which side of the path the side's host lies on.
    pub host_sign: f32,
}

impl SideLayout {
    /// Rail inputs for this side: stations span the rail, rails sit beside
    /// the posts on the host side.
    pub fn rail_spec(
        &self,
        post_lateral: f32,
        half_post_width: f32,
        half_rail_width: f32,
    ) -> Option<RailSideSpec> {
        let first = self.stations.first()?;
        let last = self.stations.last()?;
        Some(RailSideSpec {
            side: self.side.index,
            start_vertex: self.start_vertex,
            end_vertex: self.end_vertex,
            start_on_line: first.on_line,
            end_on_line: last.on_line,
            direction: self.side.direction,
            left: self.side.left,
            rail_lateral: post_lateral + self.host_sign * (half_post_width + half_rail_width),
            host_sign: self.host_sign,
            start_top_z: first.top.z,
            end_top_z: last.top.z,
        })
    }

    pub fn first_station(&self) -> Option<&StationRecord> {
        self.stations.first()
    }

    pub fn last_station(&self) -> Option<&StationRecord> {
        self.stations.last()
    }
}

/// Posts for a whole polyline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PostLayout {
    /// Sides in the polyline, usable or not.
    pub side_count: usize,
    pub sides: Vec<SideLayout>,
    pub skipped_sides: usize,
    pub duplicate_stations: usize,
}

impl PostLayout {
    pub fn placed_posts(&self) -> usize {
        self.sides
            .iter()
            .flat_map(|s| &s.stations)
            .filter(|st| st.placed)
            .count()
    }
}

/// Post base snapped to the millimetre, for duplicate detection.
fn base_key(base: Vec3) -> (i64, i64, i64) {
    (
        base.x.round() as i64,
        base.y.round() as i64,
        base.z.round() as i64,
    )
}

/// Lays posts out along every side of `poly`.
///
/// Sides that are too short, or whose usable length after the start and end
/// offsets is too short, are skipped. Each station looks up the nearest
/// host at its point on the path, is offset by `post_lateral` and bears on
/// that host (host top plus the base offset, or path elevation plus the
/// base offset without one). It is placed only if no earlier station
/// produced the same base. A shared corner therefore gets one post, while
/// the repeated station still bounds the side's rails.
pub fn layout_posts(
    poly: &RunPolyline,
    hosts: &[HostElement],
    params: &LayoutParams,
) -> PostLayout {
    let vertex_count = poly.points().len();
    let mut layout = PostLayout {
        side_count: poly.side_count(),
        ..Default::default()
    };
    let mut occupied = HashSet::new();

    for index in 0..poly.side_count() {
        let (a, b) = poly.side_endpoints(index);
        let Some(side) = Side::new(index, a, b) else {
            debug!(side = index, "side too short, skipped");
            layout.skipped_sides += 1;
            continue;
        };

        let Some(distribution) = StationDistribution::new(
            side.length,
            params.start_offset,
            params.end_offset,
            params.spacing,
        ) else {
            debug!(side = index, length = side.length, "no usable length after offsets, skipped");
            layout.skipped_sides += 1;
            continue;
        };

        let mut stations = Vec::with_capacity(distribution.station_count());
        let mut first_host: Option<&HostElement> = None;
        let mut last_host: Option<&HostElement> = None;

        for (i, d) in distribution.positions().enumerate() {
            let on_line = side.point_at(d);
            let post_line = side.offset(on_line, params.post_lateral);
            // Hosts are found under the path, not under the offset post.
            let host = nearest_host(on_line, hosts);

            let base_z = match host {
                Some(h) => h.top_z() + params.base_offset,
                None => on_line.z + params.base_offset,
            };
            let base = Vec3::new(post_line.x, post_line.y, base_z);

            let placed = occupied.insert(base_key(base));
            if !placed {
                debug!(side = index, station = i, "post already placed here");
                layout.duplicate_stations += 1;
            }

            if i == 0 {
                first_host = host;
            }
            last_host = host;

            stations.push(StationRecord {
                index: i,
                distance: d,
                on_line,
                base,
                top: base + Vec3::Z * params.post_height,
                host: host.map(|h| h.id),
                placed,
            });
        }

        let reference = stations.first().map_or(side.start, |s| s.on_line);
        let host_sign = side_sign_toward(first_host.or(last_host), side.left, reference);

        layout.sides.push(SideLayout {
            side,
            start_vertex: index % vertex_count,
            end_vertex: (index + 1) % vertex_count,
            distribution,
            stations,
            host_sign,
        });
    }

    layout
}
