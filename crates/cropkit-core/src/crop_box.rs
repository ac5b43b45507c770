//! The crop box: a resizable rectangle in view space.
//!
//! The crop box is dragged by its corners and edges. Every drag is computed
//! from the frame captured when the drag began, so a finger that overshoots
//! the workable region or the minimum size keeps tracking without the box
//! snapping when it comes back.
//!
//! # Constraints
//!
//! - Width and height never drop below [`MINIMUM_BOX_SIZE`].
//! - The frame never leaves the workable region.
//! - With the aspect ratio locked, the ratio captured at drag start is kept.
//! - Width is resolved before height.

use crate::geometry::{AspectRatio, Point, Rect, Size};

/// Smallest width or height the crop box may have, in view points.
pub const MINIMUM_BOX_SIZE: f64 = 42.0;

/// How far outside the crop box a touch still grabs a handle.
const HANDLE_OUTSET: f64 = 32.0;

/// Side length of the square hit area of a corner handle.
const HANDLE_EXTENT: f64 = 64.0;

/// Touches this far inside the box pan the image instead of resizing.
const GESTURE_MARGIN: f64 = 22.0;

/// A draggable corner or edge of the crop box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CropEdge {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl CropEdge {
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            CropEdge::TopLeft | CropEdge::TopRight | CropEdge::BottomLeft | CropEdge::BottomRight
        )
    }

    fn moves_left(self) -> bool {
        matches!(self, CropEdge::Left | CropEdge::TopLeft | CropEdge::BottomLeft)
    }

    fn moves_right(self) -> bool {
        matches!(self, CropEdge::Right | CropEdge::TopRight | CropEdge::BottomRight)
    }

    fn moves_top(self) -> bool {
        matches!(self, CropEdge::Top | CropEdge::TopLeft | CropEdge::TopRight)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, CropEdge::Bottom | CropEdge::BottomLeft | CropEdge::BottomRight)
    }

    fn affects_width(self) -> bool {
        self.moves_left() || self.moves_right()
    }

    fn affects_height(self) -> bool {
        self.moves_top() || self.moves_bottom()
    }
}

/// Rules a resize has to obey besides the size and region limits.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResizeConstraints {
    /// Keep the width:height ratio of the frame the drag started from.
    pub aspect_locked: bool,
    /// Smallest short-side/long-side ratio of a free resize, 0 to disable.
    pub minimum_aspect_ratio: f64,
}

/// Compute the frame produced by dragging `edge` of `origin` by `delta`.
///
/// The edges opposite the dragged one stay anchored. When the aspect ratio is
/// locked a corner drag follows whichever axis changed the most, and a single
/// edge drag grows the other dimension around the box's centre line.
pub fn resized_frame(
    origin: Rect,
    edge: CropEdge,
    delta: Point,
    workable: Rect,
    constraints: ResizeConstraints,
) -> Rect {
    let mut width = origin.width;
    let mut height = origin.height;

    if edge.moves_left() {
        width -= delta.x;
    } else if edge.moves_right() {
        width += delta.x;
    }
    if edge.moves_top() {
        height -= delta.y;
    } else if edge.moves_bottom() {
        height += delta.y;
    }

    // Room available while the anchored edges stay put
    let max_width = if edge.moves_left() {
        origin.max_x() - workable.min_x()
    } else if edge.moves_right() {
        workable.max_x() - origin.min_x()
    } else {
        workable.width
    };
    let max_height = if edge.moves_top() {
        origin.max_y() - workable.min_y()
    } else if edge.moves_bottom() {
        workable.max_y() - origin.min_y()
    } else {
        workable.height
    };

    let lockable = origin.width > 0.0 && origin.height > 0.0;
    if constraints.aspect_locked && lockable {
        let width_scale = width / origin.width;
        let height_scale = height / origin.height;
        let scale = match (edge.affects_width(), edge.affects_height()) {
            (true, false) => width_scale,
            (false, true) => height_scale,
            _ => {
                if (width_scale - 1.0).abs() >= (height_scale - 1.0).abs() {
                    width_scale
                } else {
                    height_scale
                }
            }
        };
        let scale = if scale.is_finite() { scale } else { 1.0 };

        let min_scale = (MINIMUM_BOX_SIZE / origin.width).max(MINIMUM_BOX_SIZE / origin.height);
        let max_scale = (max_width / origin.width)
            .min(max_height / origin.height)
            .max(min_scale);
        let scale = scale.clamp(min_scale, max_scale);

        width = origin.width * scale;
        height = origin.height * scale;
    } else {
        if edge.affects_width() {
            width = clamp_dimension(width, max_width);
        }
        if edge.affects_height() {
            height = clamp_dimension(height, max_height);
        }
        if constraints.minimum_aspect_ratio > 0.0 {
            (width, height) = enforce_minimum_aspect(
                width,
                height,
                edge,
                constraints.minimum_aspect_ratio,
                max_width,
                max_height,
            );
        }
    }

    let x = if edge.moves_left() {
        origin.max_x() - width
    } else if edge.moves_right() {
        origin.min_x()
    } else {
        origin.mid_x() - width * 0.5
    };
    let y = if edge.moves_top() {
        origin.max_y() - height
    } else if edge.moves_bottom() {
        origin.min_y()
    } else {
        origin.mid_y() - height * 0.5
    };

    Rect::new(x, y, width, height).clamped_within(&workable)
}

fn clamp_dimension(value: f64, max: f64) -> f64 {
    let value = if value.is_finite() { value } else { MINIMUM_BOX_SIZE };
    value.clamp(MINIMUM_BOX_SIZE, max.max(MINIMUM_BOX_SIZE))
}

/// Pull the dragged dimension back until short/long is at least `minimum`.
fn enforce_minimum_aspect(
    width: f64,
    height: f64,
    edge: CropEdge,
    minimum: f64,
    max_width: f64,
    max_height: f64,
) -> (f64, f64) {
    let short = width.min(height);
    let long = width.max(height);
    if long <= 0.0 || short / long >= minimum {
        return (width, height);
    }

    if width < height {
        if edge.affects_width() {
            (clamp_dimension(height * minimum, max_width), height)
        } else {
            (width, clamp_dimension(width / minimum, max_height))
        }
    } else if edge.affects_height() {
        (width, clamp_dimension(width * minimum, max_height))
    } else {
        (clamp_dimension(height / minimum, max_width), height)
    }
}

/// Enforce the minimum size and containment in the workable region.
pub fn sanitize_frame(frame: Rect, workable: Rect) -> Rect {
    let width = if frame.width.is_finite() { frame.width } else { 0.0 };
    let height = if frame.height.is_finite() { frame.height } else { 0.0 };
    Rect::new(
        frame.x,
        frame.y,
        width.max(MINIMUM_BOX_SIZE),
        height.max(MINIMUM_BOX_SIZE),
    )
    .clamped_within(&workable)
}

/// The largest frame of `ratio` (width / height) that fits `workable`,
/// centred on `center` and shifted back inside the region if needed.
pub fn aspect_ratio_frame(center: Point, ratio: f64, workable: Rect) -> Rect {
    let unit = Size::new(ratio.max(f64::MIN_POSITIVE), 1.0);
    let size = unit.scaled(unit.fit_scale(workable.size()));
    sanitize_frame(Rect::centered_at(center, size), workable)
}

/// The frame a reset lays out: the image's own ratio (or `ratio` when it is
/// constrained) at the largest size the workable region allows, centred.
pub fn default_frame(image_size: Size, ratio: AspectRatio, workable: Rect) -> Rect {
    let resolved = ratio.resolve(image_size);
    let value = resolved.value().or_else(|| image_size.aspect()).unwrap_or(1.0);
    aspect_ratio_frame(workable.center(), value, workable)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizeDrag {
    edge: CropEdge,
    origin_frame: Rect,
    start: Point,
}

/// Crop box state: the frame, the region it lives in, and any active drag.
#[derive(Debug, Clone, PartialEq)]
pub struct CropBox {
    frame: Rect,
    workable: Rect,
    drag: Option<ResizeDrag>,
    editing: bool,
}

impl CropBox {
    pub fn new(workable: Rect) -> Self {
        Self {
            frame: workable,
            workable,
            drag: None,
            editing: false,
        }
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn workable_region(&self) -> Rect {
        self.workable
    }

    /// Replace the workable region. The frame is left alone; callers relayout.
    pub fn set_workable_region(&mut self, workable: Rect) {
        self.workable = workable;
    }

    /// Assign a new frame, clamped to the minimum size and the workable region.
    ///
    /// Degenerate frames (zero or NaN sizes) are ignored.
    pub fn set_frame(&mut self, frame: Rect) -> Rect {
        if !(frame.width > 0.0 && frame.height > 0.0) {
            log::debug!("Ignoring degenerate crop box frame {:?}", frame);
            return self.frame;
        }
        self.frame = sanitize_frame(frame, self.workable);
        self.frame
    }

    /// Resize the current frame by dragging `edge` by `delta`.
    pub fn resize(&mut self, edge: CropEdge, delta: Point, constraints: ResizeConstraints) -> Rect {
        self.frame = resized_frame(self.frame, edge, delta, self.workable, constraints);
        self.frame
    }

    /// Which handle, if any, a touch at `point` grabs.
    ///
    /// Corners win over edges.
    pub fn edge_at(&self, point: Point) -> Option<CropEdge> {
        let frame = self.frame.inset(-HANDLE_OUTSET, -HANDLE_OUTSET);

        let top_left = Rect::new(frame.x, frame.y, HANDLE_EXTENT, HANDLE_EXTENT);
        let top_right = Rect::new(
            frame.max_x() - HANDLE_EXTENT,
            frame.y,
            HANDLE_EXTENT,
            HANDLE_EXTENT,
        );
        let bottom_left = Rect::new(
            frame.x,
            frame.max_y() - HANDLE_EXTENT,
            HANDLE_EXTENT,
            HANDLE_EXTENT,
        );
        let bottom_right = Rect::new(
            frame.max_x() - HANDLE_EXTENT,
            frame.max_y() - HANDLE_EXTENT,
            HANDLE_EXTENT,
            HANDLE_EXTENT,
        );

        let corners = [
            (top_left, CropEdge::TopLeft),
            (top_right, CropEdge::TopRight),
            (bottom_left, CropEdge::BottomLeft),
            (bottom_right, CropEdge::BottomRight),
        ];
        if let Some((_, edge)) = corners.iter().find(|(rect, _)| rect.contains(point)) {
            return Some(*edge);
        }

        let top = Rect::new(frame.x, frame.y, frame.width, HANDLE_EXTENT);
        let bottom = Rect::new(
            frame.x,
            frame.max_y() - HANDLE_EXTENT,
            frame.width,
            HANDLE_EXTENT,
        );
        let left = Rect::new(frame.x, frame.y, HANDLE_EXTENT, frame.height);
        let right = Rect::new(
            frame.max_x() - HANDLE_EXTENT,
            frame.y,
            HANDLE_EXTENT,
            frame.height,
        );

        [
            (top, CropEdge::Top),
            (bottom, CropEdge::Bottom),
            (left, CropEdge::Left),
            (right, CropEdge::Right),
        ]
        .iter()
        .find(|(rect, _)| rect.contains(point))
        .map(|(_, edge)| *edge)
    }

    /// Whether a touch at `point` should start a resize rather than a pan.
    pub fn accepts_resize_gesture(&self, point: Point) -> bool {
        let inner = self.frame.inset(GESTURE_MARGIN, GESTURE_MARGIN);
        let outer = self.frame.inset(-GESTURE_MARGIN, -GESTURE_MARGIN);
        outer.contains(point) && !inner.contains(point)
    }

    /// Start dragging the handle under `point`.
    pub fn begin_resize(&mut self, point: Point) -> Option<CropEdge> {
        if !self.accepts_resize_gesture(point) {
            return None;
        }
        let edge = self.edge_at(point)?;
        self.drag = Some(ResizeDrag {
            edge,
            origin_frame: self.frame,
            start: point,
        });
        self.editing = true;
        Some(edge)
    }

    /// Move the active drag to `point`. Returns the new frame, or `None`
    /// when no drag is active.
    pub fn update_resize(&mut self, point: Point, constraints: ResizeConstraints) -> Option<Rect> {
        self.update_resize_within(point, constraints, self.workable)
    }

    /// Like [`update_resize`](Self::update_resize), but confined to `bounds`
    /// (a part of the workable region, such as the visible image).
    pub fn update_resize_within(
        &mut self,
        point: Point,
        constraints: ResizeConstraints,
        bounds: Rect,
    ) -> Option<Rect> {
        let drag = self.drag?;
        let delta = point - drag.start;
        self.frame = resized_frame(drag.origin_frame, drag.edge, delta, bounds, constraints);
        log::trace!("Resized crop box via {:?} to {:?}", drag.edge, self.frame);
        Some(self.frame)
    }

    /// Finish the active drag. Returns whether one was active.
    pub fn end_resize(&mut self) -> bool {
        self.drag.take().is_some()
    }

    pub fn is_resizing(&self) -> bool {
        self.drag.is_some()
    }

    pub fn active_edge(&self) -> Option<CropEdge> {
        self.drag.map(|drag| drag.edge)
    }

    /// Editing shows the grid lines; it lasts until the layout settles.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    pub fn grid_overlay_hidden(&self) -> bool {
        !self.editing
    }

    pub fn aspect_ratio_is_portrait(&self) -> bool {
        self.frame.size().is_portrait()
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
