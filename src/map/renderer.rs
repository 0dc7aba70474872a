use crate::braille::{draw_line, BrailleCanvas};
use crate::color;
use crate::map::geometry::{rings_contain, Bounds, Ring};
use crate::map::projection::Viewport;
use crate::map::spatial::FeatureGrid;
use crate::names::AliasTable;
use crate::reshape::{CaseValue, Snapshot};
use glam::DVec2;
use ratatui::style::Color;
use rayon::prelude::*;

/// Grid cell size in degrees for the country bbox index
const GRID_CELL_DEGREES: f64 = 10.0;

/// A named country shape from the geometry file
#[derive(Debug, Clone)]
pub struct Country {
    pub name: String,
    pub rings: Vec<Ring>,
    pub bounds: Bounds,
}

impl Country {
    /// `None` when the shape has no vertices
    pub fn new(name: impl Into<String>, rings: Vec<Ring>) -> Option<Self> {
        let bounds = Bounds::of_rings(&rings)?;
        Some(Self {
            name: name.into(),
            rings,
            bounds,
        })
    }

    pub fn contains(&self, p: DVec2) -> bool {
        self.bounds.contains(p) && rings_contain(&self.rings, p)
    }
}

/// One drawn map: a fill color per terminal cell plus outline glyphs
pub struct MapFrame {
    pub width: usize,
    pub height: usize,
    fills: Vec<Option<Color>>,
    pub outlines: BrailleCanvas,
}

impl MapFrame {
    pub fn fill(&self, cx: usize, cy: usize) -> Option<Color> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        self.fills[cy * self.width + cx]
    }
}

/// Choropleth over country polygons
pub struct ChoroplethRenderer {
    countries: Vec<Country>,
    grid: FeatureGrid,
}

impl ChoroplethRenderer {
    pub fn new(countries: Vec<Country>) -> Self {
        let grid = FeatureGrid::build(countries.iter().map(|c| &c.bounds), GRID_CELL_DEGREES);
        Self { countries, grid }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn has_data(&self) -> bool {
        !self.countries.is_empty()
    }

    /// Index of the country under a (lon, lat) point
    pub fn country_at(&self, lonlat: DVec2) -> Option<usize> {
        let p = DVec2::new((lonlat.x + 180.0).rem_euclid(360.0) - 180.0, lonlat.y);
        self.grid
            .candidates(p)
            .iter()
            .copied()
            .find(|&idx| self.countries[idx].contains(p))
    }

    /// Snapshot value for every country, in country order. Countries with
    /// no matching record are logged.
    pub fn resolve_values(&self, snapshot: &Snapshot, aliases: &AliasTable) -> Vec<CaseValue> {
        let values: Vec<CaseValue> = self
            .countries
            .iter()
            .map(|c| snapshot.resolve(&c.name, aliases))
            .collect();

        let missing: Vec<&str> = self
            .countries
            .iter()
            .zip(&values)
            .filter(|(_, v)| **v == CaseValue::NoData)
            .map(|(c, _)| c.name.as_str())
            .collect();
        if !missing.is_empty() {
            tracing::info!(
                date = %snapshot.label,
                count = missing.len(),
                countries = ?missing,
                "map countries without case data"
            );
        }

        values
    }

    /// Draw `width` x `height` terminal cells. `values` comes from
    /// [`Self::resolve_values`].
    pub fn render(
        &self,
        width: usize,
        height: usize,
        viewport: &Viewport,
        values: &[CaseValue],
        color_max: u64,
    ) -> MapFrame {
        let mut viewport = viewport.clone();
        viewport.resize(width * 2, height * 4);

        // Each cell samples its own center independently
        let fills: Vec<Option<Color>> = (0..width * height)
            .into_par_iter()
            .map(|idx| {
                let (cx, cy) = (idx % width, idx / width);
                let geo = viewport.unproject(cx as f64 * 2.0 + 1.0, cy as f64 * 4.0 + 2.0);
                self.country_at(geo).map(|country| match values.get(country) {
                    Some(CaseValue::Cases(v)) => color::sequential(*v, color_max),
                    _ => color::NO_DATA,
                })
            })
            .collect();

        let mut outlines = BrailleCanvas::new(width, height);
        for country in &self.countries {
            for ring in &country.rings {
                draw_ring(&mut outlines, ring, &viewport);
            }
        }

        MapFrame {
            width,
            height,
            fills,
            outlines,
        }
    }
}

/// Outline a ring, skipping off-screen segments and ones that wrap the
/// antimeridian
fn draw_ring(canvas: &mut BrailleCanvas, ring: &Ring, viewport: &Viewport) {
    let mut prev: Option<(i32, i32)> = None;
    for p in ring {
        let cur = viewport.project_px(p.x, p.y);
        if let Some(last) = prev {
            let span = ((cur.0 - last.0).abs() + (cur.1 - last.1).abs()) as usize;
            if span < viewport.width && viewport.segment_might_be_visible(last, cur) {
                draw_line(canvas, last.0, last.1, cur.0, cur.1);
            }
        }
        prev = Some(cur);
    }
}
