use crate::host::HostId;
use crate::joiner::{CornerJoint, FacePlane, RailEnd};
use crate::seat::SeatSpec;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Index of a post inside [`RailingBlueprint::posts`].
pub type PostIndex = usize;

/// Everything one layout run asks the host model to create.
///
/// This is the engine-agnostic output of [`crate::RailingEngine`]: plain
/// placement instructions with no identity in any CAD model. The caller
/// materializes them and tallies its own successes and failures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RailingBlueprint {
    /// Posts, in station order along the path.
    pub posts: Vec<PostRequest>,

    /// One cap plate per post.
    pub post_caps: Vec<PostCapRequest>,

    /// Post-to-host connections (only when connections are enabled).
    pub connections: Vec<ConnectionRequest>,

    /// Rail pieces, already split at the maximum piece length.
    pub rail_pieces: Vec<RailPieceRequest>,

    /// Cap plates closing open or non-butting rail ends.
    pub end_caps: Vec<EndCapRequest>,

    /// Rail ends trimmed flush to an adjoining rail's face.
    pub end_fittings: Vec<EndFittingRequest>,

    /// Seat angles under rails at posts and at corners.
    pub seats: Vec<SeatSpec>,

    /// Per-row corner decisions, kept for inspection and drawing.
    pub corners: Vec<CornerJoint>,

    pub summary: LayoutSummary,
}

impl RailingBlueprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a post and its cap; returns the post's index.
    pub fn add_post(&mut self, post: PostRequest, cap: PostCapRequest) -> PostIndex {
        let index = self.posts.len();
        self.posts.push(post);
        self.post_caps.push(PostCapRequest { post: index, ..cap });
        index
    }

    pub fn add_connection(&mut self, connection: ConnectionRequest) {
        self.connections.push(connection);
    }

    pub fn add_seat(&mut self, seat: SeatSpec) {
        self.seats.push(seat);
    }
}

/// Counts describing one layout run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSummary {
    /// Sides in the picked path (including a closing side).
    pub sides: usize,
    /// Sides skipped as too short or with no usable length.
    pub skipped_sides: usize,
    /// Stations dropped because a post already stands there.
    pub duplicate_stations: usize,
    /// Sides that carry rails.
    pub rail_sides: usize,
    /// Corners per row that fell back to a plain cap.
    pub degenerate_corners: usize,
}

/// Host-neutral reference plane across the part's width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane {
    Left,
    Middle,
    Right,
}

/// Host-neutral rotation of a part's cross-section about its axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    Front,
    Top,
    Back,
    Below,
}

/// Host-neutral reference plane across the part's depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Depth {
    Front,
    Middle,
    Behind,
}

/// How a linear part's cross-section is placed around its axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub plane: Plane,
    pub rotation: Rotation,
    pub depth: Depth,
}

impl Placement {
    /// Centred on the axis with the given rotation.
    pub const fn centered(rotation: Rotation) -> Self {
        Self {
            plane: Plane::Middle,
            rotation,
            depth: Depth::Middle,
        }
    }
}

/// Catalogue identity of a part.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSpec {
    pub profile: String,
    pub material: String,
    pub class: String,
    pub name: String,
}

impl PartSpec {
    pub fn new(profile: &str, material: &str, class: &str, name: &str) -> Self {
        Self {
            profile: profile.to_owned(),
            material: material.to_owned(),
            class: class.to_owned(),
            name: name.to_owned(),
        }
    }
}

/// A vertical post from its base to its top.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostRequest {
    pub side: usize,
    pub station: usize,
    pub start: Vec3,
    pub end: Vec3,
    pub placement: Placement,
    pub part: PartSpec,
    /// Host the post bears on, if one was resolved.
    pub host: Option<HostId>,
}

/// A square plate sitting on a post top.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostCapRequest {
    pub post: PostIndex,
    /// Centre of the plate (half a thickness above the post top).
    pub center: Vec3,
    /// Half the plate's side length.
    pub half_size: f32,
    pub thickness: f32,
    pub part: PartSpec,
}

/// A connection between a post and the host it bears on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRequest {
    pub post: PostIndex,
    pub host: HostId,
    /// Component name or number.
    pub component: String,
    /// Optional attribute file for the component.
    pub attributes: Option<String>,
}

/// One straight rail piece.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RailPieceRequest {
    pub side: usize,
    pub row: usize,
    /// Position of this piece within its run.
    pub piece: usize,
    pub start: Vec3,
    pub end: Vec3,
    pub placement: Placement,
    pub part: PartSpec,
}

/// A plate closing a rail end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndCapRequest {
    pub side: usize,
    pub row: usize,
    pub end: RailEnd,
    /// Centre of the plate (half a thickness beyond the rail end).
    pub center: Vec3,
    /// Unit normal pointing out of the rail.
    pub normal: Vec3,
    pub half_size: f32,
    pub thickness: f32,
    pub part: PartSpec,
}

/// A rail end cut to an adjoining rail's face plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndFittingRequest {
    pub side: usize,
    pub row: usize,
    pub end: RailEnd,
    /// The rail end point lying on the plane.
    pub point: Vec3,
    pub plane: FacePlane,
}

/// Maximum-length split of the segment `start..end` into equal pieces.
///
/// Segments shorter than 1 mm produce no pieces.
pub fn split_rail(start: Vec3, end: Vec3, max_piece: f32) -> Vec<(Vec3, Vec3)> {
    let total = start.distance(end);
    if total < 1.0 {
        return Vec::new();
    }

    let pieces = if max_piece > 0.0 {
        ((total / max_piece).ceil() as usize).max(1)
    } else {
        1
    };

    (0..pieces)
        .map(|i| {
            let t0 = i as f32 / pieces as f32;
            let t1 = (i + 1) as f32 / pieces as f32;
            (start.lerp(end, t0), start.lerp(end, t1))
        })
        .collect()
}

/// Created/failed counts a caller keeps while materializing a blueprint.
///
/// Placement attempts are independent: a failed rail piece does not roll
/// back its neighbours, it only shows up here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementTally {
    pub created: usize,
    pub failed: usize,
}

impl PlacementTally {
    pub fn record(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn attempted(&self) -> usize {
        self.created + self.failed
    }
}
