//! Backdrop palettes and the scheduler that picks one from elapsed time.

use serde::Serialize;

use crate::bands::BandTable;

pub type PaletteId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(value: u32) -> Self {
        Self((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Background {
    Solid(Rgb),
    LinearGradient {
        angle_deg: f32,
        stops: Vec<GradientStop>,
    },
}

impl Background {
    fn gradient(stops: &[(f32, u32)]) -> Self {
        Self::LinearGradient {
            angle_deg: 135.0,
            stops: stops
                .iter()
                .map(|&(offset, color)| GradientStop {
                    offset,
                    color: Rgb::hex(color),
                })
                .collect(),
        }
    }

    /// First and last colors, enough for a two-color renderer.
    pub fn endpoints(&self) -> (Rgb, Rgb) {
        match self {
            Self::Solid(color) => (*color, *color),
            Self::LinearGradient { stops, .. } => match (stops.first(), stops.last()) {
                (Some(first), Some(last)) => (first.color, last.color),
                _ => (Rgb(0, 0, 0), Rgb(0, 0, 0)),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Palette {
    pub name: &'static str,
    pub background: Background,
    pub sparkles: [Rgb; 5],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteCatalog {
    palettes: Vec<Palette>,
}

impl Default for PaletteCatalog {
    fn default() -> Self {
        Self::professional()
    }
}

impl PaletteCatalog {
    pub fn professional() -> Self {
        let sparkles = |colors: [u32; 5]| colors.map(Rgb::hex);
        Self {
            palettes: vec![
                Palette {
                    name: "Deep Blue Professional",
                    background: Background::gradient(&[
                        (0.0, 0x0f2027),
                        (0.5, 0x203a43),
                        (1.0, 0x2c5364),
                    ]),
                    sparkles: sparkles([0x4da0b0, 0xa8e063, 0xf4d03f, 0xe74c3c, 0x9b59b6]),
                },
                Palette {
                    name: "Corporate Teal",
                    background: Background::gradient(&[(0.0, 0x1a2980), (1.0, 0x26d0ce)]),
                    sparkles: sparkles([0x00b4db, 0x0083b0, 0x00b4db, 0x00c6ff, 0x00b4db]),
                },
                Palette {
                    name: "Dark Elegance",
                    background: Background::gradient(&[(0.0, 0x1e1e2f), (1.0, 0x2d2d44)]),
                    sparkles: sparkles([0x5d9cec, 0x48cfad, 0xa0d468, 0xffce54, 0xed5565]),
                },
                Palette {
                    name: "Modern Purple",
                    background: Background::gradient(&[(0.0, 0x4776e6), (1.0, 0x8e54e9)]),
                    sparkles: sparkles([0xa8ff78, 0x78ffd6, 0xff8c66, 0xffb347, 0xffcc33]),
                },
                Palette {
                    name: "Deep Ocean",
                    background: Background::gradient(&[
                        (0.0, 0x0f0c29),
                        (0.5, 0x302b63),
                        (1.0, 0x24243e),
                    ]),
                    sparkles: sparkles([0x00c9ff, 0x92fe9d, 0xff6b6b, 0xffa3b5, 0xd4a5e9]),
                },
                Palette {
                    name: "Dark Mode",
                    background: Background::Solid(Rgb::hex(0x121212)),
                    sparkles: sparkles([0x00e5ff, 0x00ff9d, 0xff4d8d, 0xffc107, 0x9c27b0]),
                },
            ],
        }
    }

    /// Out-of-range ids resolve to the last palette.
    pub fn resolve(&self, id: PaletteId) -> &Palette {
        let last = self.palettes.len().saturating_sub(1);
        &self.palettes[id.min(last)]
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }
}

/// Time-banded palette selection with an optional pin.
#[derive(Debug, Clone)]
pub struct PaletteScheduler {
    table: BandTable<PaletteId>,
    default: PaletteId,
    pinned: Option<PaletteId>,
}

impl PaletteScheduler {
    pub fn new(table: BandTable<PaletteId>, default: PaletteId) -> Self {
        Self {
            table,
            default,
            pinned: None,
        }
    }

    /// `elapsed` is `None` while no presentation is running.
    pub fn evaluate(&self, elapsed: Option<u64>) -> PaletteId {
        if let Some(id) = self.pinned {
            return id;
        }
        match elapsed {
            Some(elapsed) => self.table.select(elapsed),
            None => self.default,
        }
    }

    pub fn force(&mut self, id: PaletteId) {
        self.pinned = Some(id);
    }

    pub fn clear_override(&mut self) {
        self.pinned = None;
    }
}
