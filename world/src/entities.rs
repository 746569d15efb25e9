//! Renderable entities owned by a level.

use std::time::Duration;

use fear_the_water_core::{CellCoord, EntityId};
use fear_the_water_rendering::{Color, Renderable, Surface};
use glam::Vec2;

/// Fill used for solid wall tiles.
pub const WALL_COLOR: Color = Color::from_rgb_u8(0x4a, 0x3b, 0x2c);
/// Fill used for floor tiles.
pub const FLOOR_COLOR: Color = Color::from_rgb_u8(0xe8, 0xd8, 0xa8);
/// Fill used for the hole marker.
pub const HOLE_COLOR: Color = Color::from_rgb_u8(0x10, 0x18, 0x20);
/// Base fill of a freshly spawned bubble.
pub const BUBBLE_COLOR: Color = Color::new(1.0, 1.0, 1.0, 0.6);

const WALL_HIGHLIGHT_RATIO: f32 = 0.2;
const HOLE_RATIO: f32 = 0.8;

/// Visual variant of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Solid wall covering one cell.
    Single,
    /// Solid wall covering a 2×2 block anchored at its top-left cell.
    Double,
    /// Walkable ground drawn underneath everything else.
    Floor,
}

impl TileKind {
    /// Number of cells covered along each axis.
    #[must_use]
    pub const fn footprint(&self) -> u32 {
        match self {
            Self::Single | Self::Floor => 1,
            Self::Double => 2,
        }
    }

    /// Whether the variant is a wall rather than ground.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        !matches!(self, Self::Floor)
    }
}

/// Static grid-aligned tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    id: EntityId,
    cell: CellCoord,
    kind: TileKind,
    grid_size: f32,
}

impl Tile {
    /// Creates a tile anchored at `cell`.
    #[must_use]
    pub const fn new(id: EntityId, cell: CellCoord, kind: TileKind, grid_size: f32) -> Self {
        Self {
            id,
            cell,
            kind,
            grid_size,
        }
    }

    /// Identifier allocated by the owning level.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Top-left cell of the tile's footprint.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Visual variant.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Cells covered by the tile, row by row.
    pub fn covered_cells(&self) -> impl Iterator<Item = CellCoord> {
        let footprint = self.kind.footprint();
        let origin = self.cell;
        (0..footprint).flat_map(move |row| {
            (0..footprint)
                .map(move |column| CellCoord::new(origin.column() + column, origin.row() + row))
        })
    }
}

impl Renderable for Tile {
    fn position(&self) -> Vec2 {
        self.cell.anchor(self.grid_size)
    }

    fn size(&self) -> Vec2 {
        Vec2::splat(self.grid_size * self.kind.footprint() as f32)
    }

    fn render(&self, surface: &mut dyn Surface) {
        let origin = self.position();
        let size = self.size();
        if !self.kind.is_structural() {
            surface.fill_rect(origin, size, FLOOR_COLOR);
            return;
        }

        surface.fill_rect(origin, size, WALL_COLOR);
        surface.fill_rect(
            origin,
            Vec2::new(size.x, size.y * WALL_HIGHLIGHT_RATIO),
            WALL_COLOR.lighten(0.25),
        );
    }
}

/// Marker drawn centred on its originating cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Hole {
    id: EntityId,
    cell: CellCoord,
    center: Vec2,
    edge: f32,
}

impl Hole {
    /// Creates a hole centred on `cell`.
    #[must_use]
    pub fn new(id: EntityId, cell: CellCoord, grid_size: f32) -> Self {
        Self {
            id,
            cell,
            center: cell.center(grid_size),
            edge: grid_size * HOLE_RATIO,
        }
    }

    /// Identifier allocated by the owning level.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Cell the hole was read from.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Centre of the originating cell in logical pixels.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }
}

impl Renderable for Hole {
    fn position(&self) -> Vec2 {
        self.center - Vec2::splat(self.edge * 0.5)
    }

    fn size(&self) -> Vec2 {
        Vec2::splat(self.edge)
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.fill_rect(self.position(), self.size(), HOLE_COLOR);
    }
}

/// Short-lived decorative bubble.
///
/// A bubble swells from half to full size while fading out, and is dead once
/// its age reaches its lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct Bubble {
    id: EntityId,
    position: Vec2,
    size: Vec2,
    age: Duration,
    lifetime: Duration,
}

impl Bubble {
    /// Creates a fresh bubble.
    #[must_use]
    pub const fn new(id: EntityId, position: Vec2, size: Vec2, lifetime: Duration) -> Self {
        Self {
            id,
            position,
            size,
            age: Duration::ZERO,
            lifetime,
        }
    }

    /// Identifier allocated by the owning level.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Time the bubble has been alive.
    #[must_use]
    pub const fn age(&self) -> Duration {
        self.age
    }

    /// Total time the bubble stays alive.
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Whether the bubble has finished its animation.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.age >= self.lifetime
    }

    /// Animation progress in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.lifetime.is_zero() {
            return 1.0;
        }
        (self.age.as_secs_f32() / self.lifetime.as_secs_f32()).clamp(0.0, 1.0)
    }
}

impl Renderable for Bubble {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn render(&self, surface: &mut dyn Surface) {
        let progress = self.progress();
        let drawn = self.size * (0.5 + 0.5 * progress);
        let origin = self.position + (self.size - drawn) * 0.5;
        let color = BUBBLE_COLOR.with_alpha(BUBBLE_COLOR.alpha * (1.0 - progress));
        surface.fill_rect(origin, drawn, color);
    }

    fn update(&mut self, dt: Duration) {
        self.age = self.age.saturating_add(dt);
    }
}

/// Entity stored in a level's render/update collection.
#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    /// Structural wall tile.
    Tile(Tile),
    /// The level's hole.
    Hole(Hole),
    /// Decorative bubble.
    Bubble(Bubble),
}

impl Component {
    /// Identifier of the wrapped entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        match self {
            Self::Tile(tile) => tile.id(),
            Self::Hole(hole) => hole.id(),
            Self::Bubble(bubble) => bubble.id(),
        }
    }

    /// Borrows the wrapped tile, if any.
    #[must_use]
    pub const fn as_tile(&self) -> Option<&Tile> {
        match self {
            Self::Tile(tile) => Some(tile),
            _ => None,
        }
    }

    /// Borrows the wrapped hole, if any.
    #[must_use]
    pub const fn as_hole(&self) -> Option<&Hole> {
        match self {
            Self::Hole(hole) => Some(hole),
            _ => None,
        }
    }

    /// Borrows the wrapped bubble, if any.
    #[must_use]
    pub const fn as_bubble(&self) -> Option<&Bubble> {
        match self {
            Self::Bubble(bubble) => Some(bubble),
            _ => None,
        }
    }

    fn renderable(&self) -> &dyn Renderable {
        match self {
            Self::Tile(tile) => tile,
            Self::Hole(hole) => hole,
            Self::Bubble(bubble) => bubble,
        }
    }
}

impl Renderable for Component {
    fn position(&self) -> Vec2 {
        self.renderable().position()
    }

    fn size(&self) -> Vec2 {
        self.renderable().size()
    }

    fn render(&self, surface: &mut dyn Surface) {
        self.renderable().render(surface);
    }

    fn update(&mut self, dt: Duration) {
        match self {
            Self::Tile(tile) => tile.update(dt),
            Self::Hole(hole) => hole.update(dt),
            Self::Bubble(bubble) => bubble.update(dt),
        }
    }
}
