//! `.kicad_pcb` adapter: S-expression tree in, the same tree (plus our edits) out.
//!
//! Tracks and board drawings on known layers are lifted out of the tree into a
//! [`MemoryBoard`] at load time and written back from it, so deletions and additions
//! only ever touch the model. Footprints stay in the tree; their `at` nodes are
//! rewritten from the model on save.

use std::ffi::OsString;
use std::f64::consts::TAU;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info};

use pixelring_core::{
    document_degrees_to_radians, normalize_angle, radians_to_document_degrees,
    sweep_to_document_degrees, Component, ComponentId, DrawingId, DrawingPrimitive, LayerId,
    Net, NetId, Point, Track, TrackId,
};

use crate::document::{BoardDocument, BoardError};
use crate::memory::{MemoryBoard, PadDef};
use crate::sexpr::{self, fmt_num, SExpr};

/// First format version that uses three-point arcs and quoted layer names (KiCad 6).
pub const THREE_POINT_ARC_VERSION: u32 = 20211014;
/// First format version that wraps line widths in `(stroke ...)` (KiCad 7).
pub const STROKE_VERSION: u32 = 20221018;

pub const BACKUP_EXTENSION: &str = "layoutbak";

const DRAWING_TAGS: [&str; 3] = ["gr_line", "gr_arc", "gr_circle"];

#[derive(Debug, Clone)]
struct FootprintSlot {
    /// Position of the footprint node among the root's items.
    index: usize,
    /// Orientation (document degrees) last written to the tree.
    written_degrees: f64,
}

#[derive(Debug)]
pub struct KicadBoard {
    path: PathBuf,
    tree: SExpr,
    version: u32,
    model: MemoryBoard,
    footprints: Vec<FootprintSlot>,
    track_nodes: IndexMap<TrackId, SExpr>,
    drawing_nodes: IndexMap<DrawingId, SExpr>,
}

/// `<path>.layoutbak`, next to the board file.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(BACKUP_EXTENSION);
    PathBuf::from(name)
}

impl KicadBoard {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BoardError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| BoardError::Io {
            action: "read",
            path: path.display().to_string(),
            source,
        })?;
        Self::from_source(path, &source)
    }

    /// Parse board text; `path` is where [`BoardDocument::commit`] will write.
    pub fn from_source(path: impl Into<PathBuf>, source: &str) -> Result<Self, BoardError> {
        let root = sexpr::parse(source)?;
        if root.tag() != Some("kicad_pcb") {
            return Err(BoardError::Format(format!(
                "root node is {:?}, expected kicad_pcb",
                root.tag()
            )));
        }
        let version = root
            .value("version")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);

        let mut model = MemoryBoard::empty();
        load_layers(&root, &mut model);
        load_nets(&root, &mut model);

        let mut kept = Vec::with_capacity(root.items().len());
        let mut footprints = Vec::new();
        let mut track_nodes = IndexMap::new();
        let mut drawing_nodes = IndexMap::new();

        for (i, item) in root.items().iter().enumerate() {
            if i == 0 {
                kept.push(item.clone());
                continue;
            }
            match item.tag() {
                Some("module" | "footprint") => {
                    let (reference, position, degrees, pads) = read_footprint(item, &model);
                    model.add_component(
                        &reference,
                        position,
                        document_degrees_to_radians(degrees),
                        pads,
                    );
                    footprints.push(FootprintSlot {
                        index: kept.len(),
                        written_degrees: degrees,
                    });
                    kept.push(item.clone());
                }
                Some("segment") => match read_track(item, &model) {
                    Some(track) => {
                        let id = model.add_track(track);
                        track_nodes.insert(id, item.clone());
                    }
                    None => kept.push(item.clone()),
                },
                Some(tag) if DRAWING_TAGS.contains(&tag) => match read_drawing(item, &model) {
                    Some(drawing) => {
                        let id = model.add_drawing(drawing);
                        drawing_nodes.insert(id, item.clone());
                    }
                    None => kept.push(item.clone()),
                },
                _ => kept.push(item.clone()),
            }
        }

        debug!(
            version,
            footprints = footprints.len(),
            tracks = track_nodes.len(),
            drawings = drawing_nodes.len(),
            "loaded board"
        );

        Ok(Self {
            path: path.into(),
            tree: SExpr::List(kept),
            version,
            model,
            footprints,
            track_nodes,
            drawing_nodes,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn model(&self) -> &MemoryBoard {
        &self.model
    }

    /// The board as it would be written by `commit`.
    pub fn to_source(&self) -> Result<String, BoardError> {
        self.render(self.placed_tree()?)
    }

    /// The stored tree with every footprint moved to its model placement.
    fn placed_tree(&self) -> Result<SExpr, BoardError> {
        let mut tree = self.tree.clone();
        for (i, slot) in self.footprints.iter().enumerate() {
            let component = self.model.component(ComponentId(i))?;
            if let Some(node) = tree.items_mut().and_then(|items| items.get_mut(slot.index)) {
                write_placement(node, &component, slot.written_degrees);
            }
        }
        Ok(tree)
    }

    /// `tree` plus the model's drawings and tracks, serialised.
    fn render(&self, mut tree: SExpr) -> Result<String, BoardError> {
        let mut extra = Vec::new();
        for id in self.model.list_drawings(None) {
            let node = match self.drawing_nodes.get(&id) {
                Some(node) => node.clone(),
                None => {
                    let drawing = self
                        .model
                        .drawing(id)
                        .ok_or(BoardError::UnknownDrawing(id))?;
                    self.drawing_node(drawing)?
                }
            };
            extra.push(node);
        }
        for (id, track) in self.model.list_tracks(None) {
            let node = match self.track_nodes.get(&id) {
                Some(node) => node.clone(),
                None => self.track_node(&track)?,
            };
            extra.push(node);
        }
        if let Some(items) = tree.items_mut() {
            items.extend(extra);
        }

        Ok(tree.to_pretty_string())
    }

    fn quoted_layers(&self) -> bool {
        self.version >= THREE_POINT_ARC_VERSION
    }

    fn layer_node(&self, layer: LayerId) -> Result<SExpr, BoardError> {
        let name = self
            .model
            .layer_name(layer)
            .ok_or_else(|| BoardError::Format(format!("layer {} is not in the layer table", layer.0)))?;
        let value = if self.quoted_layers() {
            SExpr::string(name)
        } else {
            SExpr::atom(name)
        };
        Ok(SExpr::list(vec![SExpr::atom("layer"), value]))
    }

    fn width_node(&self, width: f64) -> SExpr {
        let width = SExpr::node("width", &[fmt_num(width)]);
        if self.version >= STROKE_VERSION {
            SExpr::list(vec![
                SExpr::atom("stroke"),
                width,
                SExpr::node("type", &["solid".to_string()]),
            ])
        } else {
            width
        }
    }

    fn drawing_node(&self, drawing: &DrawingPrimitive) -> Result<SExpr, BoardError> {
        let mut items = match *drawing {
            DrawingPrimitive::Segment { start, end, .. } => vec![
                SExpr::atom("gr_line"),
                xy("start", start),
                xy("end", end),
            ],
            DrawingPrimitive::Arc {
                center,
                arc_start,
                swept_angle,
                ..
            } => {
                if self.version >= THREE_POINT_ARC_VERSION {
                    vec![
                        SExpr::atom("gr_arc"),
                        xy("start", arc_start),
                        xy("mid", drawing.mid_point()),
                        xy("end", drawing.end_point()),
                    ]
                } else {
                    vec![
                        SExpr::atom("gr_arc"),
                        xy("start", center),
                        xy("end", arc_start),
                        SExpr::node("angle", &[fmt_num(sweep_to_document_degrees(swept_angle))]),
                    ]
                }
            }
            DrawingPrimitive::Circle { center, radius, .. } => vec![
                SExpr::atom("gr_circle"),
                xy("center", center),
                xy("end", Point::new(center.x + radius, center.y)),
            ],
        };
        items.push(self.layer_node(drawing.layer())?);
        items.push(self.width_node(drawing.width()));
        Ok(SExpr::list(items))
    }

    fn track_node(&self, track: &Track) -> Result<SExpr, BoardError> {
        Ok(SExpr::list(vec![
            SExpr::atom("segment"),
            xy("start", track.start),
            xy("end", track.end),
            SExpr::node("width", &[fmt_num(track.width)]),
            self.layer_node(track.layer)?,
            SExpr::node("net", &[track.net.map_or(0, |n| n.0).to_string()]),
        ]))
    }
}

impl BoardDocument for KicadBoard {
    fn resolve_layer(&self, name: &str) -> Result<LayerId, BoardError> {
        self.model.resolve_layer(name)
    }

    fn add_drawing(&mut self, primitive: DrawingPrimitive) -> DrawingId {
        self.model.add_drawing(primitive)
    }

    fn delete_drawing(&mut self, id: DrawingId) -> Result<(), BoardError> {
        self.model.delete_drawing(id)?;
        self.drawing_nodes.shift_remove(&id);
        Ok(())
    }

    fn list_drawings(&self, layer: Option<LayerId>) -> Vec<DrawingId> {
        self.model.list_drawings(layer)
    }

    fn add_track(&mut self, track: Track) -> TrackId {
        self.model.add_track(track)
    }

    fn delete_track(&mut self, id: TrackId) -> Result<(), BoardError> {
        self.model.delete_track(id)?;
        self.track_nodes.shift_remove(&id);
        Ok(())
    }

    fn list_tracks(&self, net: Option<NetId>) -> Vec<(TrackId, Track)> {
        self.model.list_tracks(net)
    }

    fn list_components(&self) -> Vec<ComponentId> {
        self.model.list_components()
    }

    fn get_component_by_reference(&self, reference: &str) -> Option<ComponentId> {
        self.model.get_component_by_reference(reference)
    }

    fn component(&self, id: ComponentId) -> Result<Component, BoardError> {
        self.model.component(id)
    }

    fn set_placement(
        &mut self,
        id: ComponentId,
        position: Point,
        orientation: f64,
    ) -> Result<(), BoardError> {
        self.model.set_placement(id, position, orientation)
    }

    fn get_net(&self, name: &str) -> Result<Net, BoardError> {
        self.model.get_net(name)
    }

    /// Move the current file to `<path>.layoutbak`, then write the board.
    fn commit(&mut self) -> Result<(), BoardError> {
        let placed = self.placed_tree()?;
        let source = self.render(placed.clone())?;
        let backup = backup_path(&self.path);
        let io_err = |action: &'static str, path: &Path| {
            let path = path.display().to_string();
            move |source: std::io::Error| BoardError::Io {
                action,
                path,
                source,
            }
        };

        if self.path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).map_err(io_err("remove old backup", &backup))?;
            }
            fs::rename(&self.path, &backup).map_err(io_err("back up", &self.path))?;
            info!(from = %self.path.display(), to = %backup.display(), "backed up board");
        }
        fs::write(&self.path, source).map_err(io_err("write", &self.path))?;

        // Pad and text angles in the tree now match `written_degrees`.
        self.tree = placed;
        for (i, slot) in self.footprints.iter_mut().enumerate() {
            let component = self.model.component(ComponentId(i))?;
            slot.written_degrees = radians_to_document_degrees(component.orientation);
        }
        self.model.commit()?;
        info!(path = %self.path.display(), "saved board");
        Ok(())
    }
}

fn xy(tag: &str, p: Point) -> SExpr {
    SExpr::node(tag, &[fmt_num(p.x), fmt_num(p.y)])
}

fn point_of(node: &SExpr, tag: &str) -> Option<Point> {
    let n = node.find(tag)?;
    Some(Point::new(n.f64_at(0)?, n.f64_at(1)?))
}

/// Line width from either `(width w)` or `(stroke (width w) ...)`.
fn width_of(node: &SExpr) -> f64 {
    node.value_f64("width")
        .or_else(|| node.find("stroke").and_then(|s| s.value_f64("width")))
        .unwrap_or(0.0)
}

fn load_layers(root: &SExpr, model: &mut MemoryBoard) {
    let Some(table) = root.find("layers") else {
        return;
    };
    for entry in table.children() {
        let (Some(id), Some(name)) = (
            entry.items().first().and_then(SExpr::as_atom),
            entry.items().get(1).and_then(SExpr::as_atom),
        ) else {
            continue;
        };
        if let Ok(id) = id.parse::<u32>() {
            model.add_layer(name, LayerId(id));
        }
    }
}

fn load_nets(root: &SExpr, model: &mut MemoryBoard) {
    for net in root.find_all("net") {
        if let Some(id) = net.atom_at(0).and_then(|s| s.parse::<u32>().ok()) {
            model.add_net_with_id(NetId(id), net.atom_at(1).unwrap_or(""));
        }
    }
}

fn footprint_reference(fp: &SExpr) -> String {
    fp.children()
        .iter()
        .find_map(|c| match c.tag() {
            Some("fp_text") if c.atom_at(0) == Some("reference") => c.atom_at(1),
            Some("property") if c.atom_at(0) == Some("Reference") => c.atom_at(1),
            _ => None,
        })
        .unwrap_or_default()
        .to_string()
}

fn read_footprint(fp: &SExpr, model: &MemoryBoard) -> (String, Point, f64, Vec<PadDef>) {
    let at = fp.find("at");
    let position = Point::new(
        at.and_then(|a| a.f64_at(0)).unwrap_or(0.0),
        at.and_then(|a| a.f64_at(1)).unwrap_or(0.0),
    );
    let degrees = at.and_then(|a| a.f64_at(2)).unwrap_or(0.0);

    let pads = fp
        .find_all("pad")
        .into_iter()
        .map(|pad| {
            let offset = point_of(pad, "at").unwrap_or_default();
            let net = pad
                .find("net")
                .and_then(|n| n.atom_at(0))
                .and_then(|id| id.parse::<u32>().ok())
                .filter(|id| *id != 0)
                .map(NetId)
                .filter(|id| model.net(*id).is_some());
            PadDef::new(pad.atom_at(0).unwrap_or_default(), offset, net)
        })
        .collect();

    (footprint_reference(fp), position, degrees, pads)
}

fn read_track(node: &SExpr, model: &MemoryBoard) -> Option<Track> {
    let layer = model.resolve_layer(node.value("layer")?).ok()?;
    Some(Track {
        start: point_of(node, "start")?,
        end: point_of(node, "end")?,
        layer,
        width: width_of(node),
        net: node
            .value("net")
            .and_then(|n| n.parse::<u32>().ok())
            .map(NetId),
    })
}

fn read_drawing(node: &SExpr, model: &MemoryBoard) -> Option<DrawingPrimitive> {
    let layer = model.resolve_layer(node.value("layer")?).ok()?;
    let width = width_of(node);
    match node.tag()? {
        "gr_line" => Some(DrawingPrimitive::Segment {
            start: point_of(node, "start")?,
            end: point_of(node, "end")?,
            layer,
            width,
        }),
        "gr_circle" => {
            let center = point_of(node, "center")?;
            Some(DrawingPrimitive::Circle {
                center,
                radius: center.distance_to(point_of(node, "end")?),
                layer,
                width,
            })
        }
        "gr_arc" => {
            let (center, arc_start, swept_angle) = match point_of(node, "mid") {
                Some(mid) => {
                    let start = point_of(node, "start")?;
                    let (center, sweep) = arc_through(start, mid, point_of(node, "end")?)?;
                    (center, start, sweep)
                }
                None => (
                    point_of(node, "start")?,
                    point_of(node, "end")?,
                    document_degrees_to_radians(node.value_f64("angle")?),
                ),
            };
            Some(DrawingPrimitive::Arc {
                center,
                arc_start,
                swept_angle,
                layer,
                width,
            })
        }
        _ => None,
    }
}

/// Centre and signed sweep of the arc from `start` through `mid` to `end`.
fn arc_through(start: Point, mid: Point, end: Point) -> Option<(Point, f64)> {
    let d = 2.0
        * (start.x * (mid.y - end.y) + mid.x * (end.y - start.y) + end.x * (start.y - mid.y));
    if d.abs() < 1e-12 {
        return None;
    }
    let s2 = start.x * start.x + start.y * start.y;
    let m2 = mid.x * mid.x + mid.y * mid.y;
    let e2 = end.x * end.x + end.y * end.y;
    let center = Point::new(
        (s2 * (mid.y - end.y) + m2 * (end.y - start.y) + e2 * (start.y - mid.y)) / d,
        (s2 * (end.x - mid.x) + m2 * (start.x - end.x) + e2 * (mid.x - start.x)) / d,
    );

    let a0 = center.angle_to(start);
    let forward = normalize_angle(center.angle_to(end) - a0);
    let to_mid = normalize_angle(center.angle_to(mid) - a0);
    let sweep = if to_mid <= forward {
        forward
    } else {
        forward - TAU
    };
    Some((center, sweep))
}

/// Rewrite a footprint's `at`, turning pads and texts by the change in orientation.
fn write_placement(node: &mut SExpr, component: &Component, written_degrees: f64) {
    let degrees = radians_to_document_degrees(component.orientation);
    node.set_child(at_node(component.position.x, component.position.y, degrees));

    let delta = degrees - written_degrees;
    if delta.abs() < 1e-9 {
        return;
    }
    for child in node.children_mut() {
        if !matches!(child.tag(), Some("pad" | "fp_text" | "property")) {
            continue;
        }
        let Some(at) = child.find("at") else {
            continue;
        };
        let (Some(x), Some(y)) = (at.f64_at(0), at.f64_at(1)) else {
            continue;
        };
        let angle = (at.f64_at(2).unwrap_or(0.0) + delta).rem_euclid(360.0);
        // Trailing flags such as `unlocked` stay.
        let flags: Vec<SExpr> = at
            .children()
            .iter()
            .skip(2)
            .filter(|c| c.as_atom().and_then(|s| s.parse::<f64>().ok()).is_none())
            .cloned()
            .collect();
        let mut new_at = at_node(x, y, angle);
        if let Some(items) = new_at.items_mut() {
            items.extend(flags);
        }
        child.set_child(new_at);
    }
}

fn at_node(x: f64, y: f64, degrees: f64) -> SExpr {
    let mut args = vec![fmt_num(x), fmt_num(y)];
    let rounded = fmt_num(degrees);
    if rounded != "0" && rounded != "360" {
        args.push(rounded);
    }
    SExpr::node("at", &args)
}
