//! Anchor-relative placement of floating menu lists.
//!
//! `Positioner` is the seam the menu system calls to place a list next to its
//! trigger. `AnchorPositioner` is the built-in implementation: it resolves one
//! of twelve placements and runs the configured middleware (offset, flip,
//! shift) against the viewport.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::dom::Bounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    Top,
    TopStart,
    TopEnd,
    Bottom,
    BottomStart,
    BottomEnd,
    Left,
    LeftStart,
    LeftEnd,
    Right,
    RightStart,
    RightEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown placement `{0}`")]
pub struct PlacementParseError(pub String);

impl Placement {
    pub const ALL: [Placement; 12] = [
        Placement::Top,
        Placement::TopStart,
        Placement::TopEnd,
        Placement::Bottom,
        Placement::BottomStart,
        Placement::BottomEnd,
        Placement::Left,
        Placement::LeftStart,
        Placement::LeftEnd,
        Placement::Right,
        Placement::RightStart,
        Placement::RightEnd,
    ];

    pub fn side(self) -> Side {
        use Placement::*;
        match self {
            Top | TopStart | TopEnd => Side::Top,
            Bottom | BottomStart | BottomEnd => Side::Bottom,
            Left | LeftStart | LeftEnd => Side::Left,
            Right | RightStart | RightEnd => Side::Right,
        }
    }

    pub fn alignment(self) -> Option<Alignment> {
        use Placement::*;
        match self {
            TopStart | BottomStart | LeftStart | RightStart => Some(Alignment::Start),
            TopEnd | BottomEnd | LeftEnd | RightEnd => Some(Alignment::End),
            Top | Bottom | Left | Right => None,
        }
    }

    pub fn from_parts(side: Side, alignment: Option<Alignment>) -> Self {
        use Placement::*;
        match (side, alignment) {
            (Side::Top, None) => Top,
            (Side::Top, Some(Alignment::Start)) => TopStart,
            (Side::Top, Some(Alignment::End)) => TopEnd,
            (Side::Bottom, None) => Bottom,
            (Side::Bottom, Some(Alignment::Start)) => BottomStart,
            (Side::Bottom, Some(Alignment::End)) => BottomEnd,
            (Side::Left, None) => Left,
            (Side::Left, Some(Alignment::Start)) => LeftStart,
            (Side::Left, Some(Alignment::End)) => LeftEnd,
            (Side::Right, None) => Right,
            (Side::Right, Some(Alignment::Start)) => RightStart,
            (Side::Right, Some(Alignment::End)) => RightEnd,
        }
    }

    /// Same alignment on the opposite side.
    pub fn flipped(self) -> Self {
        let side = match self.side() {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };
        Self::from_parts(side, self.alignment())
    }

    pub fn as_str(self) -> &'static str {
        use Placement::*;
        match self {
            Top => "top",
            TopStart => "top-start",
            TopEnd => "top-end",
            Bottom => "bottom",
            BottomStart => "bottom-start",
            BottomEnd => "bottom-end",
            Left => "left",
            LeftStart => "left-start",
            LeftEnd => "left-end",
            Right => "right",
            RightStart => "right-start",
            RightEnd => "right-end",
        }
    }

    /// CSS `transform-origin` that makes a scale/fade grow out of the anchor.
    pub fn transform_origin(self) -> &'static str {
        use Placement::*;
        match self {
            Top => "bottom",
            TopStart => "bottom left",
            TopEnd => "bottom right",
            Bottom => "top",
            BottomStart => "top left",
            BottomEnd => "top right",
            Left => "right",
            LeftStart => "top right",
            LeftEnd => "bottom right",
            Right => "left",
            RightStart => "top left",
            RightEnd => "bottom left",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = PlacementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Placement::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| PlacementParseError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Middleware {
    Offset {
        #[serde(default, alias = "mainAxis")]
        main_axis: f32,
    },
    Flip,
    Shift {
        #[serde(default)]
        padding: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PopoverOptions {
    pub placement: Placement,
    pub middleware: Vec<Middleware>,
}

impl PopoverOptions {
    pub fn menu_default() -> Self {
        Self {
            placement: Placement::BottomStart,
            middleware: vec![Middleware::Flip, Middleware::Shift { padding: 0.0 }],
        }
    }

    pub fn submenu_default() -> Self {
        Self {
            placement: Placement::RightStart,
            middleware: vec![Middleware::Flip, Middleware::Shift { padding: 0.0 }],
        }
    }
}

impl Default for PopoverOptions {
    fn default() -> Self {
        Self::menu_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingPosition {
    pub x: f32,
    pub y: f32,
    pub placement: Placement,
}

pub trait Positioner {
    /// Place `floating` (only its size is read) against `anchor`.
    fn compute(
        &self,
        anchor: Bounds,
        floating: Bounds,
        viewport: Bounds,
        options: &PopoverOptions,
    ) -> FloatingPosition;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorPositioner;

impl Positioner for AnchorPositioner {
    fn compute(
        &self,
        anchor: Bounds,
        floating: Bounds,
        viewport: Bounds,
        options: &PopoverOptions,
    ) -> FloatingPosition {
        let offset: f32 = options
            .middleware
            .iter()
            .map(|m| match m {
                Middleware::Offset { main_axis } => *main_axis,
                _ => 0.0,
            })
            .sum();
        let mut placement = options.placement;
        let (mut x, mut y) = base_coords(anchor, floating, placement, offset);

        for middleware in &options.middleware {
            match middleware {
                Middleware::Offset { .. } => {}
                Middleware::Flip => {
                    let overflow = main_overflow(x, y, floating, viewport, placement.side());
                    if overflow > 0.0 {
                        let candidate = placement.flipped();
                        let (cx, cy) = base_coords(anchor, floating, candidate, offset);
                        if main_overflow(cx, cy, floating, viewport, candidate.side()) < overflow {
                            placement = candidate;
                            x = cx;
                            y = cy;
                        }
                    }
                }
                Middleware::Shift { padding } => match placement.side() {
                    Side::Top | Side::Bottom => {
                        x = clamp_axis(x, floating.width, viewport.x, viewport.right(), *padding);
                    }
                    Side::Left | Side::Right => {
                        y = clamp_axis(y, floating.height, viewport.y, viewport.bottom(), *padding);
                    }
                },
            }
        }

        FloatingPosition { x, y, placement }
    }
}

fn base_coords(anchor: Bounds, floating: Bounds, placement: Placement, offset: f32) -> (f32, f32) {
    let centered_x = anchor.x + (anchor.width - floating.width) / 2.0;
    let centered_y = anchor.y + (anchor.height - floating.height) / 2.0;
    match placement.side() {
        Side::Top | Side::Bottom => {
            let y = if placement.side() == Side::Top {
                anchor.y - floating.height - offset
            } else {
                anchor.bottom() + offset
            };
            let x = match placement.alignment() {
                None => centered_x,
                Some(Alignment::Start) => anchor.x,
                Some(Alignment::End) => anchor.right() - floating.width,
            };
            (x, y)
        }
        Side::Left | Side::Right => {
            let x = if placement.side() == Side::Left {
                anchor.x - floating.width - offset
            } else {
                anchor.right() + offset
            };
            let y = match placement.alignment() {
                None => centered_y,
                Some(Alignment::Start) => anchor.y,
                Some(Alignment::End) => anchor.bottom() - floating.height,
            };
            (x, y)
        }
    }
}

fn main_overflow(x: f32, y: f32, floating: Bounds, viewport: Bounds, side: Side) -> f32 {
    let overflow = match side {
        Side::Top => viewport.y - y,
        Side::Bottom => y + floating.height - viewport.bottom(),
        Side::Left => viewport.x - x,
        Side::Right => x + floating.width - viewport.right(),
    };
    overflow.max(0.0)
}

fn clamp_axis(pos: f32, size: f32, min: f32, max: f32, padding: f32) -> f32 {
    let lo = min + padding;
    let hi = max - padding - size;
    if hi < lo { lo } else { pos.clamp(lo, hi) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Bounds = Bounds::new(0.0, 0.0, 100.0, 50.0);

    fn opts(placement: Placement, middleware: Vec<Middleware>) -> PopoverOptions {
        PopoverOptions {
            placement,
            middleware,
        }
    }

    #[test]
    fn base_placements() {
        let anchor = Bounds::new(40.0, 10.0, 10.0, 2.0);
        let floating = Bounds::new(0.0, 0.0, 20.0, 6.0);
        let p = AnchorPositioner;
        let at = |placement| {
            let pos = p.compute(anchor, floating, VIEWPORT, &opts(placement, vec![]));
            (pos.x, pos.y)
        };
        assert_eq!(at(Placement::BottomStart), (40.0, 12.0));
        assert_eq!(at(Placement::BottomEnd), (30.0, 12.0));
        assert_eq!(at(Placement::Bottom), (35.0, 12.0));
        assert_eq!(at(Placement::Top), (35.0, 4.0));
        assert_eq!(at(Placement::RightStart), (50.0, 10.0));
        assert_eq!(at(Placement::LeftEnd), (20.0, 6.0));
    }

    #[test]
    fn offset_pushes_along_main_axis() {
        let anchor = Bounds::new(0.0, 0.0, 10.0, 2.0);
        let floating = Bounds::new(0.0, 0.0, 10.0, 4.0);
        let pos = AnchorPositioner.compute(
            anchor,
            floating,
            VIEWPORT,
            &opts(
                Placement::BottomStart,
                vec![Middleware::Offset { main_axis: 3.0 }],
            ),
        );
        assert_eq!((pos.x, pos.y), (0.0, 5.0));
    }

    #[test]
    fn flip_moves_to_opposite_side_when_it_fits_better() {
        let anchor = Bounds::new(10.0, 44.0, 10.0, 2.0);
        let floating = Bounds::new(0.0, 0.0, 20.0, 10.0);
        let pos = AnchorPositioner.compute(
            anchor,
            floating,
            VIEWPORT,
            &opts(Placement::BottomStart, vec![Middleware::Flip]),
        );
        assert_eq!(pos.placement, Placement::TopStart);
        assert_eq!(pos.y, 34.0);
    }

    #[test]
    fn flip_keeps_side_when_opposite_is_worse() {
        let anchor = Bounds::new(10.0, 2.0, 10.0, 2.0);
        let floating = Bounds::new(0.0, 0.0, 20.0, 60.0);
        let pos = AnchorPositioner.compute(
            anchor,
            floating,
            VIEWPORT,
            &opts(Placement::BottomStart, vec![Middleware::Flip]),
        );
        assert_eq!(pos.placement, Placement::BottomStart);
    }

    #[test]
    fn shift_clamps_cross_axis() {
        let anchor = Bounds::new(90.0, 0.0, 10.0, 1.0);
        let floating = Bounds::new(0.0, 0.0, 30.0, 5.0);
        let pos = AnchorPositioner.compute(
            anchor,
            floating,
            VIEWPORT,
            &opts(
                Placement::BottomStart,
                vec![Middleware::Shift { padding: 2.0 }],
            ),
        );
        assert_eq!(pos.x, 68.0);
    }

    #[test]
    fn every_placement_round_trips_and_has_an_origin() {
        for placement in Placement::ALL {
            assert_eq!(placement.as_str().parse::<Placement>(), Ok(placement));
            assert_eq!(placement.flipped().flipped(), placement);
            assert!(!placement.transform_origin().is_empty());
        }
        assert_eq!(Placement::TopEnd.transform_origin(), "bottom right");
        assert_eq!(Placement::RightStart.transform_origin(), "top left");
        assert!("middle".parse::<Placement>().is_err());
    }

    #[test]
    fn options_deserialize_from_toml() {
        let options: PopoverOptions = toml::from_str(
            r#"
            placement = "left-end"
            middleware = [{ type = "offset", mainAxis = 4 }, { type = "flip" }]
            "#,
        )
        .unwrap();
        assert_eq!(options.placement, Placement::LeftEnd);
        assert_eq!(
            options.middleware,
            vec![Middleware::Offset { main_axis: 4.0 }, Middleware::Flip]
        );
    }
}
