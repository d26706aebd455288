//! The layout engine: pick points and hosts in, [`RailingBlueprint`] out.
//!
//! The entry point is [`RailingEngine`]. Build it from a [`RailingConfig`]
//! (or resolve one from raw [`RailingSettings`]), optionally swap the shop's
//! [`FabricationDefaults`], then call [`RailingEngine::build_blueprint`].

use crate::blueprint::{
    ConnectionRequest, EndCapRequest, EndFittingRequest, LayoutSummary, Placement,
    PostCapRequest, PostRequest, RailPieceRequest, RailingBlueprint, Rotation, split_rail,
};
use crate::defaults::FabricationDefaults;
use crate::distance::inches_to_mm;
use crate::error::LayoutError;
use crate::host::HostElement;
use crate::joiner::{
    ButtAssignment, EndFinish, JoinParams, JoinedRails, RailEnd, RailSideSpec, join_rails,
};
use crate::layout::{LayoutParams, PostLayout, layout_posts};
use crate::offset::lateral_offset;
use crate::profile::outside_dimension_mm_or;
use crate::seat::{HolePattern, PostSeatSite, SeatParams, corner_seat, post_seat};
use crate::settings::{RailingConfig, RailingSettings};
use crate::side::RunPolyline;
use glam::Vec3;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Lays out posts, rails and seats along a picked path.
#[derive(Clone, Debug)]
pub struct RailingEngine {
    config: RailingConfig,
    fabrication: FabricationDefaults,
}

impl RailingEngine {
    /// Creates an engine with the given configuration and the standard
    /// [`FabricationDefaults`].
    pub fn new(config: RailingConfig) -> Self {
        Self {
            config,
            fabrication: FabricationDefaults::default(),
        }
    }

    /// Replaces the fabrication defaults (builder pattern).
    pub fn with_fabrication(mut self, fabrication: FabricationDefaults) -> Self {
        self.fabrication = fabrication;
        self
    }

    /// Resolves `instance` over `defaults` and builds an engine from the result.
    pub fn from_settings(
        instance: &RailingSettings,
        defaults: &RailingSettings,
    ) -> Result<Self, LayoutError> {
        let config = instance.merged_over(defaults).resolve()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &RailingConfig {
        &self.config
    }

    pub fn fabrication(&self) -> &FabricationDefaults {
        &self.fabrication
    }

    /// Post outside width (mm); zero when the post profile is unreadable.
    pub fn post_width(&self) -> f32 {
        outside_dimension_mm_or(&self.config.post.profile, 0.0)
    }

    /// Rail outside width (mm), falling back to the configured default.
    pub fn rail_width(&self) -> f32 {
        outside_dimension_mm_or(
            &self.fabrication.rail.profile,
            inches_to_mm(self.fabrication.rail_width_fallback_in),
        )
    }

    /// Lays out a railing along `picks` (world mm, Z up) over `hosts`.
    ///
    /// # Pipeline
    ///
    /// 1. The picks become a [`RunPolyline`]; a closing pick makes a loop.
    /// 2. Every side gets redistributed stations and one post per distinct
    ///    station, standing on the nearest host.
    /// 3. Each usable side contributes a rail span per row; the joiner butts
    ///    or caps every corner.
    /// 4. Rails are split into pieces and their ends capped or fitted.
    /// 5. Seats go under every rail at every post not at a joint, and one
    ///    stands at every joined corner.
    ///
    /// Only malformed input is an error; degenerate geometry is skipped or
    /// falls back locally and shows up in [`RailingBlueprint::summary`].
    #[instrument(skip_all, fields(picks = picks.len(), hosts = hosts.len()))]
    pub fn build_blueprint(
        &self,
        picks: &[Vec3],
        hosts: &[HostElement],
    ) -> Result<RailingBlueprint, LayoutError> {
        let cfg = &self.config;
        let poly = RunPolyline::new(picks)?;

        // 1. Section dimensions and the post line offset.
        let half_post = self.post_width() * 0.5;
        let rail_width = self.rail_width();
        let post_lateral = lateral_offset(cfg.line_ref, inches_to_mm(cfg.deck_edge_in), half_post);

        // 2. Posts
        let layout = layout_posts(
            &poly,
            hosts,
            &LayoutParams {
                spacing: inches_to_mm(cfg.spacing_in),
                start_offset: inches_to_mm(cfg.start_offset_in),
                end_offset: inches_to_mm(cfg.end_offset_in),
                base_offset: inches_to_mm(cfg.base_offset_in),
                post_height: inches_to_mm(cfg.post_height_in),
                post_lateral,
            },
        );

        let mut blueprint = RailingBlueprint::new();
        self.emit_posts(&mut blueprint, &layout, half_post);

        blueprint.summary = LayoutSummary {
            sides: layout.side_count,
            skipped_sides: layout.skipped_sides,
            duplicate_stations: layout.duplicate_stations,
            ..Default::default()
        };

        // 3. Rails
        if cfg.rails.enabled && cfg.rails.count > 0 {
            let specs: Vec<RailSideSpec> = layout
                .sides
                .iter()
                .filter_map(|s| s.rail_spec(post_lateral, half_post, rail_width * 0.5))
                .collect();
            let join = JoinParams {
                rows: cfg.rails.count,
                drop_from_top: inches_to_mm(cfg.rails.from_top_in),
                row_spacing: inches_to_mm(cfg.rails.spacing_in),
                start_extension: inches_to_mm(cfg.rails.start_offset_in),
                end_extension: inches_to_mm(cfg.rails.end_offset_in),
                half_rail_width: rail_width * 0.5,
            };
            let joined = join_rails(&specs, &join);

            // 4. Pieces, caps and fittings
            self.emit_rails(&mut blueprint, &joined, rail_width);

            // 5. Seats
            let seats = self.seat_params(rail_width);
            self.emit_post_seats(
                &mut blueprint,
                &layout,
                &joined,
                &join,
                post_lateral,
                half_post,
                &seats,
            );
            for joint in &joined.corners {
                if joint.assignment == ButtAssignment::Fallback {
                    continue;
                }
                match corner_seat(joint, &seats) {
                    Some(seat) => blueprint.add_seat(seat),
                    None => debug!(
                        row = joint.row,
                        prev = joint.prev_side,
                        next = joint.next_side,
                        "corner legs are opposite, no corner seat"
                    ),
                }
            }

            blueprint.summary.rail_sides = specs.len();
            blueprint.summary.degenerate_corners = joined
                .corners
                .iter()
                .filter(|c| c.assignment == ButtAssignment::Fallback)
                .count();
            blueprint.corners = joined.corners;
        }

        info!(
            posts = blueprint.posts.len(),
            connections = blueprint.connections.len(),
            rail_pieces = blueprint.rail_pieces.len(),
            end_caps = blueprint.end_caps.len(),
            end_fittings = blueprint.end_fittings.len(),
            seats = blueprint.seats.len(),
            skipped_sides = blueprint.summary.skipped_sides,
            "railing laid out"
        );

        Ok(blueprint)
    }

    fn emit_posts(&self, blueprint: &mut RailingBlueprint, layout: &PostLayout, half_post: f32) {
        let cfg = &self.config;
        let cap_thickness = inches_to_mm(self.fabrication.cap_thickness_in);
        let attributes = (!cfg.connection_attr.is_empty()).then(|| cfg.connection_attr.clone());

        for side in &layout.sides {
            let placement = Placement::centered(side.side.post_rotation());
            for station in side.stations.iter().filter(|s| s.placed) {
                let post = blueprint.add_post(
                    PostRequest {
                        side: side.side.index,
                        station: station.index,
                        start: station.base,
                        end: station.top,
                        placement,
                        part: cfg.post.clone(),
                        host: station.host,
                    },
                    PostCapRequest {
                        post: 0,
                        center: station.top + Vec3::Z * (cap_thickness * 0.5),
                        half_size: half_post,
                        thickness: cap_thickness,
                        part: self.fabrication.post_cap.clone(),
                    },
                );

                if cfg.create_connection
                    && let Some(host) = station.host
                {
                    blueprint.add_connection(ConnectionRequest {
                        post,
                        host,
                        component: cfg.connection_name.clone(),
                        attributes: attributes.clone(),
                    });
                }
            }
        }
    }

    fn emit_rails(&self, blueprint: &mut RailingBlueprint, joined: &JoinedRails, rail_width: f32) {
        let fab = &self.fabrication;
        let max_piece = inches_to_mm(fab.max_rail_piece_in);
        let cap_thickness = inches_to_mm(fab.cap_thickness_in);

        for run in &joined.runs {
            let pieces = split_rail(run.start, run.end, max_piece);
            for (piece, (start, end)) in pieces.into_iter().enumerate() {
                blueprint.rail_pieces.push(RailPieceRequest {
                    side: run.side,
                    row: run.row,
                    piece,
                    start,
                    end,
                    placement: Placement::centered(Rotation::Top),
                    part: fab.rail.clone(),
                });
            }

            for end in [RailEnd::Start, RailEnd::End] {
                let point = run.point(end);
                match run.finish(end) {
                    EndFinish::Cap => {
                        let normal = run.outward(end);
                        blueprint.end_caps.push(EndCapRequest {
                            side: run.side,
                            row: run.row,
                            end,
                            center: point + normal * (cap_thickness * 0.5),
                            normal,
                            half_size: rail_width * 0.5,
                            thickness: cap_thickness,
                            part: fab.rail_cap.clone(),
                        });
                    }
                    EndFinish::Butt(plane) => blueprint.end_fittings.push(EndFittingRequest {
                        side: run.side,
                        row: run.row,
                        end,
                        point,
                        plane,
                    }),
                    EndFinish::Plain => {}
                }
            }
        }
    }

    /// Seats at every placed post, per rail row, except at stations where
    /// the rails meet another side in a butt joint (those get a corner seat).
    #[allow(clippy::too_many_arguments)]
    fn emit_post_seats(
        &self,
        blueprint: &mut RailingBlueprint,
        layout: &PostLayout,
        joined: &JoinedRails,
        join: &JoinParams,
        post_lateral: f32,
        half_post: f32,
        params: &SeatParams,
    ) {
        let mut jointed: HashSet<(usize, RailEnd)> = HashSet::new();
        for joint in joined
            .corners
            .iter()
            .filter(|c| c.assignment != ButtAssignment::Fallback)
        {
            jointed.insert((joint.prev_side, RailEnd::End));
            jointed.insert((joint.next_side, RailEnd::Start));
        }

        for side in &layout.sides {
            let last = side.stations.len().saturating_sub(1);
            for station in side.stations.iter().filter(|s| s.placed) {
                let at_joint = (station.index == 0
                    && jointed.contains(&(side.side.index, RailEnd::Start)))
                    || (station.index == last
                        && jointed.contains(&(side.side.index, RailEnd::End)));
                if at_joint {
                    continue;
                }

                for row in 0..join.rows {
                    let drop = join.drop_from_top + row as f32 * join.row_spacing;
                    let site = PostSeatSite {
                        side: side.side.index,
                        station: station.index,
                        row,
                        on_line: station.on_line,
                        direction: side.side.plan_direction(),
                        left: side.side.left,
                        post_lateral,
                        half_post_width: half_post,
                        rail_sign: side.host_sign,
                        rail_z: station.top.z - drop,
                    };
                    blueprint.add_seat(post_seat(&site, params));
                }
            }
        }
    }

    fn seat_params(&self, rail_width: f32) -> SeatParams {
        let fab = &self.fabrication;
        let seats = &self.config.seats;
        SeatParams {
            part: fab.seat.clone(),
            length: inches_to_mm(fab.seat_length_in),
            half_leg_thickness: inches_to_mm(fab.seat_leg_thickness_in) * 0.5,
            half_rail_depth: rail_width * 0.5,
            rail_width,
            inside_inset: inches_to_mm(fab.inside_corner_inset_in),
            hole_line: inches_to_mm(seats.hole_line_in),
            slot: HolePattern {
                standard: seats.slot_standard.clone(),
                size: inches_to_mm(seats.slot_size_in),
                cut_length: inches_to_mm(seats.slot_cut_length_in),
                spacing: inches_to_mm(seats.slot_c2c_in),
                special_first_layer: seats.slot_special_first_layer,
            },
            pilot: HolePattern {
                standard: seats.pilot_standard.clone(),
                size: inches_to_mm(seats.pilot_diameter_in),
                cut_length: inches_to_mm(seats.pilot_cut_length_in),
                spacing: inches_to_mm(seats.pilot_c2c_in),
                special_first_layer: false,
            },
        }
    }
}
