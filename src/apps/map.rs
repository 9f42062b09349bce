//! Map viewer.
//!
//! The tiled source stacks five image layers over zoom levels 0-4. Levels 0
//! and 1 are one image per layer; from level 2 each layer is cut into four
//! quadrant tiles. Coordinates are given in zoom-4 pixels.

use super::{AppAction, ContentLine, KeyInput};
use crate::core::geometry::Point;
use crate::core::registry::MapSource;

pub const LAYER_ORDER: [&str; 5] = ["Base", "Vendors", "Entrances", "Surface", "Surface Labels"];
pub const ZOOM_SIZES: [u32; 5] = [407, 813, 1625, 3250, 6500];
pub const MAX_ZOOM: u8 = 4;
pub const QUADRANT_MIN_ZOOM: u8 = 2;
const TILE_PREFIX: &str = "SewerMap";
/// Pan step in screen pixels at the current zoom.
const PAN_PIXELS: i64 = 50;

pub const EXTERNAL_MAP_URL: &str = "https://gta-5-map.com/?slideout=false&slideoutright=false\
&x=-120.1&y=80.5&zoom=3.4&embed=light\
&notes=3EWfhJLeGcb,3nf05rUzzTS,61hDtXO1IAV,6KSIzbU0JCX,78yKmWHpAxr,8qmes9jiqky,\
9LdfkbPEQUp,Akr3xVeFxPx,BzSCrsUcHX0,CAecif3MPtL,CxmrjyVaMdb,ErAwcUUL4Jv,FqeP7JRiEfO,\
Gg4LUImN5RM,GZAFGvIkhQl,HD2hOgesZEE,Hpc1RWCbYNJ,HxWPJdFD5zG,I02HCZZmolC,I6nFz53EbKo,\
JbMeXCoX67S,K0Gco51LKq8,KOFXc19AHzl,KuW1Kv0rFKa,tzvgY7VwaI";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub fn as_str(self) -> &'static str {
        match self {
            Quadrant::TopLeft => "topleft",
            Quadrant::TopRight => "topright",
            Quadrant::BottomLeft => "bottomleft",
            Quadrant::BottomRight => "bottomright",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileAddress {
    pub zoom: u8,
    pub quadrant: Option<Quadrant>,
}

impl TileAddress {
    /// e.g. `SewerMapSurfaceLabels_zoom_3_bottomright.png`.
    pub fn file_name(&self, layer: &str) -> String {
        let stem: String = layer.split_whitespace().collect();
        match self.quadrant {
            Some(q) => format!("{TILE_PREFIX}{stem}_zoom_{}_{}.png", self.zoom, q.as_str()),
            None => format!("{TILE_PREFIX}{stem}_zoom_{}.png", self.zoom),
        }
    }
}

/// Tile covering `p` (zoom-4 pixels) at `zoom`, or `None` off the map.
pub fn tile_at(p: Point, zoom: u8) -> Option<TileAddress> {
    let full = i64::from(ZOOM_SIZES[usize::from(MAX_ZOOM)]);
    let (x, y) = (i64::from(p.x), i64::from(p.y));
    if zoom > MAX_ZOOM || x < 0 || y < 0 || x >= full || y >= full {
        return None;
    }
    if zoom < QUADRANT_MIN_ZOOM {
        return Some(TileAddress { zoom, quadrant: None });
    }
    // Quadrants are cut at half the level edge, which maps back to half of zoom 4.
    let right = x * 2 >= full;
    let bottom = y * 2 >= full;
    let quadrant = match (right, bottom) {
        (false, false) => Quadrant::TopLeft,
        (true, false) => Quadrant::TopRight,
        (false, true) => Quadrant::BottomLeft,
        (true, true) => Quadrant::BottomRight,
    };
    Some(TileAddress {
        zoom,
        quadrant: Some(quadrant),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: &'static str,
    pub visible: bool,
    pub opacity: f32,
}

#[derive(Debug)]
pub struct MapApp {
    source: MapSource,
    layers: Vec<Layer>,
    zoom: u8,
    center: Point,
    cursor: usize,
}

impl MapApp {
    pub fn new(source: MapSource) -> Self {
        let layers = LAYER_ORDER
            .iter()
            .map(|&name| Layer {
                name,
                visible: !matches!(name, "Surface" | "Surface Labels"),
                opacity: if name == "Surface" { 0.5 } else { 1.0 },
            })
            .collect();
        let half = (ZOOM_SIZES[usize::from(MAX_ZOOM)] / 2) as i32;
        Self {
            source,
            layers,
            zoom: 0,
            center: Point::new(half, half),
            cursor: 0,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1);
    }

    pub fn toggle_layer(&mut self, idx: usize) {
        if let Some(l) = self.layers.get_mut(idx) {
            l.visible = !l.visible;
        }
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        let full = i64::from(ZOOM_SIZES[usize::from(MAX_ZOOM)]);
        let step = PAN_PIXELS * full / i64::from(ZOOM_SIZES[usize::from(self.zoom)]);
        let x = (i64::from(self.center.x) + i64::from(dx) * step).clamp(0, full - 1);
        let y = (i64::from(self.center.y) + i64::from(dy) * step).clamp(0, full - 1);
        self.center = Point::new(x as i32, y as i32);
    }

    /// Visible layer tiles under the view centre, bottom layer first.
    pub fn visible_tiles(&self) -> Vec<(String, f32)> {
        let Some(addr) = tile_at(self.center, self.zoom) else {
            return Vec::new();
        };
        self.layers
            .iter()
            .filter(|l| l.visible)
            .map(|l| (addr.file_name(l.name), l.opacity))
            .collect()
    }

    pub fn key(&mut self, key: KeyInput) -> AppAction {
        if self.source == MapSource::External {
            return match key {
                KeyInput::Enter => AppAction::dialog("Cookie Deliveries", EXTERNAL_MAP_URL),
                _ => AppAction::None,
            };
        }
        match key {
            KeyInput::Char('+') | KeyInput::Char('=') => self.zoom_in(),
            KeyInput::Char('-') => self.zoom_out(),
            KeyInput::Left => self.pan(-1, 0),
            KeyInput::Right => self.pan(1, 0),
            KeyInput::Up => self.pan(0, -1),
            KeyInput::Down => self.pan(0, 1),
            KeyInput::Tab => self.cursor = (self.cursor + 1) % self.layers.len(),
            KeyInput::BackTab => {
                self.cursor = (self.cursor + self.layers.len() - 1) % self.layers.len()
            }
            KeyInput::Enter | KeyInput::Char(' ') => self.toggle_layer(self.cursor),
            KeyInput::Char(c @ '1'..='5') => self.toggle_layer(c as usize - '1' as usize),
            _ => {}
        }
        AppAction::None
    }

    pub fn lines(&self) -> Vec<ContentLine> {
        if self.source == MapSource::External {
            return vec![
                ContentLine::heading("Embedded map"),
                ContentLine::dim(EXTERNAL_MAP_URL),
                ContentLine::blank(),
                ContentLine::normal("[Enter] show link"),
            ];
        }

        let mut out = vec![
            ContentLine::heading(format!(
                "Zoom {} ({} px)   centre {},{}",
                self.zoom,
                ZOOM_SIZES[usize::from(self.zoom)],
                self.center.x,
                self.center.y
            )),
            ContentLine::blank(),
        ];
        for (i, l) in self.layers.iter().enumerate() {
            let mark = if l.visible { 'x' } else { ' ' };
            let alpha = if l.opacity < 1.0 {
                format!(" ({:.0}%)", l.opacity * 100.0)
            } else {
                String::new()
            };
            out.push(ContentLine::choice(
                format!("{} [{mark}] {}{alpha}", i + 1, l.name),
                i == self.cursor,
            ));
        }
        out.push(ContentLine::blank());
        for (file, _) in self.visible_tiles() {
            out.push(ContentLine::dim(file));
        }
        out.push(ContentLine::blank());
        out.push(ContentLine::dim("[+/-] zoom  [arrows] pan  [1-5] layers"));
        out
    }
}
