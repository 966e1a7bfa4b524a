// (c) 2022 Dimitar Rusev <mitikodev@gmail.com> licensed under GPL-3.0

/// Maximum probability, 24-bit fixed point
pub const P_MAX: u32 = (1 << 24) - 1;
/// Confidence counts saturate here
pub const COUNT_MAX: u32 = u8::MAX as u32;

const PROB_MASK: u32 = P_MAX;
const COUNT_SHIFT: u32 = 24;

/// A probability with its confidence count, packed into 32 bits.
/// Low 24 bits hold the probability, high 8 bits the count.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell(u32);

impl Cell {
    /// Maximum uncertainty, nothing seen yet
    pub const EMPTY: Cell = Cell(P_MAX / 2);

    pub fn new(prob: u32, count: u32) -> Self {
        debug_assert!(prob <= P_MAX && count <= COUNT_MAX);
        Self((count.min(COUNT_MAX) << COUNT_SHIFT) | prob.min(P_MAX))
    }

    #[inline(always)]
    pub fn prob(self) -> u32 {
        self.0 & PROB_MASK
    }

    #[inline(always)]
    pub fn count(self) -> u32 {
        self.0 >> COUNT_SHIFT
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Direct-indexed table of `2^k` cells.
/// Keys are masked to the table size, colliding contexts share a cell.
pub struct ProbabilityStore {
    arr: Vec<Cell>,
    mask: u32,
}

impl ProbabilityStore {
    pub fn new(log_cell_count: u8) -> Self {
        assert!(
            (1..=30).contains(&log_cell_count),
            "store size must be within 2^1..2^30 cells"
        );
        let cell_count = 1usize << log_cell_count;
        let size = cell_count * std::mem::size_of::<Cell>();
        tracing::debug!(
            size,
            cell_count,
            log_cell_count,
            "allocating probability store ({} MiB)",
            size >> 20
        );
        Self {
            arr: vec![Cell::EMPTY; cell_count],
            mask: (1 << log_cell_count) - 1,
        }
    }

    #[inline(always)]
    pub fn get(&self, key: u32) -> Cell {
        self.arr[(key & self.mask) as usize]
    }

    #[inline(always)]
    pub fn set(&mut self, key: u32, cell: Cell) {
        self.arr[(key & self.mask) as usize] = cell;
    }

    pub fn len(&self) -> usize {
        self.arr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arr.is_empty()
    }
}
