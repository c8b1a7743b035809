// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parameter structs for every feature build.
//!
//! All structs load from partial JSON: missing fields take their defaults.

use serde::{Deserialize, Serialize};

/// Roof construction style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoofKind {
    Flat,
    #[default]
    Gable,
    Hip,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoofParams {
    pub kind: RoofKind,
    /// Slab thickness of a flat roof.
    pub thickness: f64,
    /// Overhang of a flat roof past the walls.
    pub outset: f64,
    /// Ridge height above the footprint for gable and hip roofs.
    pub height: f64,
}

impl Default for RoofParams {
    fn default() -> Self {
        Self {
            kind: RoofKind::Gable,
            thickness: 0.1,
            outset: 0.1,
            height: 1.0,
        }
    }
}

/// Shell laid over existing roof faces of any pitch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoofTopParams {
    pub thickness: f64,
    /// Overhang of the shell past the roof outline.
    pub outset: f64,
}

impl Default for RoofTopParams {
    fn default() -> Self {
        Self {
            thickness: 0.1,
            outset: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorParams {
    pub floor_count: usize,
    pub floor_height: f64,
    pub slab_thickness: f64,
    /// How far slabs stick out past the walls.
    pub slab_outset: f64,
    pub wall_thickness: f64,
    pub add_slab: bool,
    /// `false` builds a terrace: slabs only.
    pub add_walls: bool,
    /// Roof placed over the top ceiling.
    pub roof: Option<RoofParams>,
}

impl Default for FloorParams {
    fn default() -> Self {
        Self {
            floor_count: 1,
            floor_height: 2.8,
            slab_thickness: 0.2,
            slab_outset: 0.1,
            wall_thickness: 0.12,
            add_slab: true,
            add_walls: true,
            roof: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorplanParams {
    pub width: f64,
    pub length: f64,
}

impl Default for FloorplanParams {
    fn default() -> Self {
        Self {
            width: 4.0,
            length: 4.0,
        }
    }
}

/// Requested placement of an opening in its host face.
///
/// `None` components fall back to defaults derived from the host face.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeOffset {
    pub size: Option<[f64; 2]>,
    pub offset: Option<[f64; 2]>,
}

impl SizeOffset {
    pub fn new(size: [f64; 2], offset: [f64; 2]) -> Self {
        Self {
            size: Some(size),
            offset: Some(offset),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameParams {
    /// Width of the frame bars around each leaf.
    pub margin: f64,
    /// Recess of the frame into the wall.
    pub depth: f64,
    /// Front to back size of the frame solid.
    pub thickness: f64,
    /// Trim raised around each leaf.
    pub border: f64,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            margin: 0.05,
            depth: 0.04,
            thickness: 0.08,
            border: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hinge {
    #[default]
    Left,
    Right,
}

/// Shape of an imported knob or handle asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareKind {
    None,
    #[default]
    Round,
    Straight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelFill {
    pub count_x: usize,
    pub count_y: usize,
    pub border: f64,
    pub margin: f64,
    pub gap: f64,
    pub depth: f64,
}

impl Default for PanelFill {
    fn default() -> Self {
        Self {
            count_x: 2,
            count_y: 2,
            border: 0.03,
            margin: 0.15,
            gap: 0.1,
            depth: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlassFill {
    pub count_x: usize,
    pub count_y: usize,
    pub margin: f64,
    pub gap: f64,
    pub border: f64,
    pub glass_thickness: f64,
}

impl Default for GlassFill {
    fn default() -> Self {
        Self {
            count_x: 2,
            count_y: 2,
            margin: 0.1,
            gap: 0.01,
            border: 0.01,
            glass_thickness: 0.002,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LouverFill {
    pub margin: f64,
    pub louver_width: f64,
    pub depth: f64,
    /// Tilt of each slat in radians.
    pub angle: f64,
    pub slat_thickness: f64,
}

impl Default for LouverFill {
    fn default() -> Self {
        Self {
            margin: 0.15,
            louver_width: 0.04,
            depth: 0.01,
            angle: 30f64.to_radians(),
            slat_thickness: 0.005,
        }
    }
}

/// Infill of a leaf face pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FillParams {
    #[default]
    None,
    Panels(PanelFill),
    GlassPanes(GlassFill),
    Louver(LouverFill),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarFill {
    pub count_x: usize,
    pub count_y: usize,
    pub radius: f64,
    /// Distance of the bars in front of the sash.
    pub depth: f64,
    pub segments: usize,
}

impl Default for BarFill {
    fn default() -> Self {
        Self {
            count_x: 5,
            count_y: 1,
            radius: 0.01,
            depth: 0.04,
            segments: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorParams {
    pub thickness: f64,
    pub hinge: Hinge,
    pub knob: HardwareKind,
    /// Mount the leaf flush with the wall face instead of the frame back.
    pub flip: bool,
    pub bottom_panel: bool,
    pub bottom_panel_height: f64,
    pub fill: FillParams,
    pub bottom_fill: FillParams,
}

impl Default for DoorParams {
    fn default() -> Self {
        Self {
            thickness: 0.03,
            hinge: Hinge::Left,
            knob: HardwareKind::Round,
            flip: false,
            bottom_panel: false,
            bottom_panel_height: 1.0,
            fill: FillParams::None,
            bottom_fill: FillParams::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowParams {
    pub thickness: f64,
    pub hinge: Hinge,
    pub handle: HardwareKind,
    pub flip: bool,
    pub fill: FillParams,
    pub bars: Option<BarFill>,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            thickness: 0.03,
            hinge: Hinge::Left,
            handle: HardwareKind::Round,
            flip: false,
            fill: FillParams::None,
            bars: None,
        }
    }
}

/// Curve profile of an arch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchFunction {
    #[default]
    Sphere,
    Sine,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchParams {
    pub function: ArchFunction,
    /// Number of points between the arc ends.
    pub resolution: usize,
    /// Rise of the arc above its chord.
    pub height: f64,
    /// Distance of the sphere center below the chord.
    pub offset: f64,
    pub thickness: f64,
    pub fill: Option<GlassFill>,
}

impl Default for ArchParams {
    fn default() -> Self {
        Self {
            function: ArchFunction::Sphere,
            resolution: 12,
            height: 0.4,
            offset: 0.4,
            thickness: 0.03,
            fill: None,
        }
    }
}

/// Full description of one opening build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningParams {
    /// Components left to right, e.g. `"wdw"` or `"window,door,window"`.
    pub components: String,
    /// Repeats of the opening across the host face.
    pub count: usize,
    pub size_offset: SizeOffset,
    /// Use `width_ratio` for window widths; otherwise windows match doors.
    pub different_widths: bool,
    pub width_ratio: f64,
    /// Cut the recess only.
    pub only_hole: bool,
    pub frame: FrameParams,
    pub door: DoorParams,
    pub window: WindowParams,
    pub arch: Option<ArchParams>,
}

impl Default for OpeningParams {
    fn default() -> Self {
        Self {
            components: "d".into(),
            count: 1,
            size_offset: SizeOffset::default(),
            different_widths: false,
            width_ratio: 1.2,
            only_hole: false,
            frame: FrameParams::default(),
            door: DoorParams::default(),
            window: WindowParams::default(),
            arch: None,
        }
    }
}

impl OpeningParams {
    /// A single door.
    pub fn door() -> Self {
        Self::default()
    }

    /// A single window.
    pub fn window() -> Self {
        Self {
            components: "w".into(),
            ..Self::default()
        }
    }

    /// A multi-component opening.
    pub fn multigroup(components: &str) -> Self {
        Self {
            components: components.into(),
            ..Self::default()
        }
    }

    /// Window to door width ratio in effect.
    pub fn effective_ratio(&self) -> f64 {
        if self.different_widths {
            self.width_ratio
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StairsBottom {
    #[default]
    Filled,
    Blocked,
    Slope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RailingFill {
    #[default]
    Posts,
    Rails,
    Wall,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostFill {
    pub size: f64,
    /// Posts per unit length.
    pub density: f64,
    pub segments: usize,
}

impl Default for PostFill {
    fn default() -> Self {
        Self {
            size: 0.04,
            density: 5.0,
            segments: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailFill {
    pub size: f64,
    /// Rails per unit height.
    pub density: f64,
    pub segments: usize,
}

impl Default for RailFill {
    fn default() -> Self {
        Self {
            size: 0.025,
            density: 5.0,
            segments: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallFill {
    pub width: f64,
}

impl Default for WallFill {
    fn default() -> Self {
        Self { width: 0.075 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailParams {
    pub fill: RailingFill,
    /// Inset of the railing from the slab or stair edge.
    pub offset: f64,
    pub corner_post_width: f64,
    pub corner_post_height: f64,
    pub has_corner_post: bool,
    pub posts: PostFill,
    pub rails: RailFill,
    pub wall: WallFill,
}

impl Default for RailParams {
    fn default() -> Self {
        Self {
            fill: RailingFill::Posts,
            offset: 0.05,
            corner_post_width: 0.06,
            corner_post_height: 0.7,
            has_corner_post: true,
            posts: PostFill::default(),
            rails: RailFill::default(),
            wall: WallFill::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StairsParams {
    pub width: f64,
    pub step_count: usize,
    /// Run of each step.
    pub step_width: f64,
    /// Rise of each step.
    pub step_height: f64,
    pub landing: bool,
    pub landing_width: f64,
    pub bottom: StairsBottom,
    /// Offset of the stair face in the host face's frame; `z` pushes it out.
    pub offset: Option<[f64; 3]>,
    pub railing_left: bool,
    pub railing_right: bool,
    pub railing: Option<RailParams>,
}

impl Default for StairsParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            step_count: 3,
            step_width: 0.2,
            step_height: 0.12,
            landing: true,
            landing_width: 1.0,
            bottom: StairsBottom::Filled,
            offset: None,
            railing_left: true,
            railing_right: true,
            railing: None,
        }
    }
}

impl StairsParams {
    pub fn has_railing(&self) -> bool {
        self.railing.is_some() && (self.railing_left || self.railing_right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalconyParams {
    /// Extent along the wall.
    pub length: f64,
    /// Projection out of the wall.
    pub width: f64,
    pub slab_height: f64,
    /// Offset along the wall; centered when `None`.
    pub offset: Option<[f64; 2]>,
    pub railing: Option<RailParams>,
}

impl Default for BalconyParams {
    fn default() -> Self {
        Self {
            length: 2.0,
            width: 1.0,
            slab_height: 0.2,
            offset: None,
            railing: Some(RailParams::default()),
        }
    }
}
