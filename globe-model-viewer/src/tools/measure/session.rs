use bevy::math::DVec3;
use bevy::prelude::*;

use super::geometry::{
    centroid, distance, format_area, format_distance_label, format_point_label, midpoint,
    polygon_area,
};
use crate::engine::geodesy::Ellipsoid;
use crate::panels::view::MeasurementReadout;
use crate::tools::tool_manager::ToolType;

/// Where a label sits relative to its anchor on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPlacement {
    /// Centred horizontally, lifted clear of a marker.
    Above,
    Centred,
}

/// Drawing surface for measurement visuals. Positions are Earth-fixed metres.
pub trait MeasurementCanvas {
    fn add_marker(&mut self, position: DVec3, tool: ToolType) -> Entity;
    fn add_label(&mut self, position: DVec3, text: &str, placement: LabelPlacement) -> Entity;
    fn add_polyline(&mut self, positions: &[DVec3], closed: bool, tool: ToolType) -> Entity;
    fn add_polygon(&mut self, positions: &[DVec3], tool: ToolType) -> Entity;
    fn remove(&mut self, entity: Entity);
}

/// Picked points and the visuals created for them.
///
/// `mode` is `None` when no tool is running. Every spawned entity is tracked
/// in `entities` so a clear can remove all of them at once.
#[derive(Resource, Default)]
pub struct MeasurementSession {
    mode: Option<ToolType>,
    points: Vec<DVec3>,
    entities: Vec<Entity>,
    outline: Option<Entity>,
    fill: Option<Entity>,
    area_label: Option<Entity>,
    ellipsoid: Ellipsoid,
}

impl MeasurementSession {
    pub fn mode(&self) -> Option<ToolType> {
        self.mode
    }

    pub fn is_measuring(&self) -> bool {
        self.mode.is_some()
    }

    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Begin a tool from a clean slate.
    pub fn start(&mut self, tool: ToolType, canvas: &mut impl MeasurementCanvas) -> MeasurementReadout {
        self.clear(canvas);
        self.mode = Some(tool);
        MeasurementReadout::Instructions(tool)
    }

    /// End the tool, leaving finished visuals on screen.
    pub fn stop(&mut self) {
        self.mode = None;
        self.points.clear();
        self.outline = None;
        self.fill = None;
        self.area_label = None;
    }

    /// Remove every visual and end the tool.
    pub fn clear(&mut self, canvas: &mut impl MeasurementCanvas) -> MeasurementReadout {
        for entity in self.entities.drain(..) {
            canvas.remove(entity);
        }
        self.stop();
        MeasurementReadout::Prompt
    }

    /// Record a picked position. Returns new panel content, if it changed.
    pub fn click(
        &mut self,
        position: DVec3,
        canvas: &mut impl MeasurementCanvas,
    ) -> Option<MeasurementReadout> {
        match self.mode? {
            ToolType::Point => self.place_point(position, canvas),
            ToolType::Distance => self.add_distance_point(position, canvas),
            ToolType::Area => self.add_area_vertex(position, canvas),
        }
    }

    /// Live readout for the hovered position; no visuals change.
    pub fn pointer_moved(&self, position: DVec3) -> Option<MeasurementReadout> {
        match (self.mode?, self.points.as_slice()) {
            (ToolType::Distance, [start]) => Some(MeasurementReadout::Distance {
                metres: distance(*start, position),
            }),
            (ToolType::Area, points) if points.len() >= 2 => {
                let mut preview = points.to_vec();
                preview.push(position);
                Some(MeasurementReadout::Area {
                    square_metres: polygon_area(&preview, &self.ellipsoid),
                })
            }
            _ => None,
        }
    }

    fn place_point(
        &mut self,
        position: DVec3,
        canvas: &mut impl MeasurementCanvas,
    ) -> Option<MeasurementReadout> {
        let cartographic = self.ellipsoid.cartesian_to_cartographic(position)?;

        let marker = canvas.add_marker(position, ToolType::Point);
        let label = canvas.add_label(
            position,
            &format_point_label(&cartographic),
            LabelPlacement::Above,
        );
        self.entities.extend([marker, label]);
        self.stop();

        Some(MeasurementReadout::Point(cartographic))
    }

    fn add_distance_point(
        &mut self,
        position: DVec3,
        canvas: &mut impl MeasurementCanvas,
    ) -> Option<MeasurementReadout> {
        let marker = canvas.add_marker(position, ToolType::Distance);
        self.entities.push(marker);
        self.points.push(position);

        let [start, end] = self.points[..] else {
            return None;
        };

        let metres = distance(start, end);
        let line = canvas.add_polyline(&[start, end], false, ToolType::Distance);
        let label = canvas.add_label(
            midpoint(start, end),
            &format_distance_label(metres),
            LabelPlacement::Above,
        );
        self.entities.extend([line, label]);
        self.stop();

        Some(MeasurementReadout::Distance { metres })
    }

    fn add_area_vertex(
        &mut self,
        position: DVec3,
        canvas: &mut impl MeasurementCanvas,
    ) -> Option<MeasurementReadout> {
        let marker = canvas.add_marker(position, ToolType::Area);
        self.entities.push(marker);
        self.points.push(position);

        if self.points.len() >= 2 {
            let outline = canvas.add_polyline(&self.points, true, ToolType::Area);
            self.replace_tracked(Slot::Outline, outline, canvas);
        }

        if self.points.len() < 3 {
            return None;
        }

        let fill = canvas.add_polygon(&self.points, ToolType::Area);
        self.replace_tracked(Slot::Fill, fill, canvas);

        let square_metres = polygon_area(&self.points, &self.ellipsoid);
        let label = canvas.add_label(
            centroid(&self.points),
            &format_area(square_metres),
            LabelPlacement::Centred,
        );
        self.replace_tracked(Slot::AreaLabel, label, canvas);

        Some(MeasurementReadout::Area { square_metres })
    }

    fn replace_tracked(&mut self, slot: Slot, entity: Entity, canvas: &mut impl MeasurementCanvas) {
        let target = match slot {
            Slot::Outline => &mut self.outline,
            Slot::Fill => &mut self.fill,
            Slot::AreaLabel => &mut self.area_label,
        };

        if let Some(previous) = target.replace(entity) {
            canvas.remove(previous);
            self.entities.retain(|tracked| *tracked != previous);
        }
        self.entities.push(entity);
    }
}

enum Slot {
    Outline,
    Fill,
    AreaLabel,
}
