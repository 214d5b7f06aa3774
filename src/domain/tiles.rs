//! Sliding-tile puzzle with the Manhattan distance heuristic.

use super::{Domain, Edge, PackedState};

use anyhow::{anyhow, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// 5 bits per cell in a u128.
const BITS_PER_CELL: u32 = 5;
const CELL_MASK: u128 = (1 << BITS_PER_CELL) - 1;
pub const MAX_CELLS: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesState {
    pub tiles: Vec<u8>,
    pub blank: usize,
    pub h: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct TilesUndo {
    blank: usize,
    h: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedTiles {
    word: u128,
    hash: u64,
}

impl PackedState for PackedTiles {
    fn hash_key(&self) -> u64 {
        self.hash
    }
}

#[derive(Debug, Clone)]
pub struct Tiles {
    init: Vec<u8>,
    // md[tile][cell]: distance from `cell` to the home cell of `tile`.
    md: Vec<Vec<u32>>,
    // Blank destinations per blank cell: up, left, right, down.
    ops: Vec<Vec<usize>>,
    zobrist: Vec<Vec<u64>>,
}

impl Tiles {
    pub fn new(width: usize, init: Vec<u8>, seed: u64) -> anyhow::Result<Self> {
        let ncells = init.len();
        if width == 0 || ncells % width != 0 {
            bail!("board of {ncells} tiles is not a multiple of width {width}");
        }
        if !(2..=MAX_CELLS).contains(&ncells) {
            bail!("board must have between 2 and {MAX_CELLS} cells, got {ncells}");
        }
        let mut seen = vec![false; ncells];
        for &tile in &init {
            let tile = tile as usize;
            if tile >= ncells || seen[tile] {
                bail!("board {init:?} is not a permutation of 0..{ncells}");
            }
            seen[tile] = true;
        }
        let height = ncells / width;

        let mut md = vec![vec![0; ncells]; ncells];
        for (tile, row) in md.iter_mut().enumerate().skip(1) {
            let (gx, gy) = (tile % width, tile / width);
            for (cell, dist) in row.iter_mut().enumerate() {
                let (x, y) = (cell % width, cell / width);
                *dist = (x.abs_diff(gx) + y.abs_diff(gy)) as u32;
            }
        }

        let ops = (0..ncells)
            .map(|cell| {
                let (x, y) = (cell % width, cell / width);
                let mut dests = Vec::with_capacity(4);
                if y > 0 {
                    dests.push(cell - width);
                }
                if x > 0 {
                    dests.push(cell - 1);
                }
                if x + 1 < width {
                    dests.push(cell + 1);
                }
                if y + 1 < height {
                    dests.push(cell + width);
                }
                dests
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(seed);
        let zobrist = (0..ncells)
            .map(|_| (0..ncells).map(|_| rng.gen::<u64>()).collect())
            .collect();

        Ok(Tiles {
            init,
            md,
            ops,
            zobrist,
        })
    }

    /// Parse a board given as comma- or whitespace-separated tile numbers.
    pub fn parse_board(board: &str) -> anyhow::Result<Vec<u8>> {
        board
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|tok| !tok.is_empty())
            .map(|tok| {
                tok.parse::<u8>()
                    .map_err(|err| anyhow!("bad tile {tok:?}: {err}"))
            })
            .collect()
    }

    fn manhattan(&self, tiles: &[u8]) -> u32 {
        tiles
            .iter()
            .enumerate()
            .map(|(cell, &tile)| self.md[tile as usize][cell])
            .sum()
    }

    fn state_from(&self, tiles: Vec<u8>) -> TilesState {
        let blank = tiles.iter().position(|&t| t == 0).unwrap_or_default();
        let h = self.manhattan(&tiles);
        TilesState { tiles, blank, h }
    }
}

impl Domain for Tiles {
    type State = TilesState;
    type Packed = PackedTiles;
    type Op = usize;
    type Undo = TilesUndo;

    fn initial(&self) -> TilesState {
        self.state_from(self.init.clone())
    }

    fn h(&self, state: &TilesState) -> u32 {
        state.h
    }

    fn is_goal(&self, state: &TilesState) -> bool {
        state
            .tiles
            .iter()
            .enumerate()
            .all(|(cell, &tile)| tile as usize == cell)
    }

    fn nops(&self, state: &TilesState) -> usize {
        self.ops[state.blank].len()
    }

    fn nthop(&self, state: &TilesState, n: usize) -> usize {
        self.ops[state.blank][n]
    }

    fn apply(&self, state: &mut TilesState, dest: usize) -> Edge<Self> {
        let undo = TilesUndo {
            blank: state.blank,
            h: state.h,
        };
        let tile = state.tiles[dest];
        let md = &self.md[tile as usize];
        state.h = state.h + md[state.blank] - md[dest];
        state.tiles[state.blank] = tile;
        state.tiles[dest] = 0;
        state.blank = dest;
        Edge {
            cost: 1,
            op: dest,
            undo,
        }
    }

    fn undo(&self, state: &mut TilesState, edge: &Edge<Self>) {
        let prev = edge.undo.blank;
        state.tiles[state.blank] = state.tiles[prev];
        state.tiles[prev] = 0;
        state.blank = prev;
        state.h = edge.undo.h;
    }

    fn pack(&self, dst: &mut PackedTiles, state: &TilesState) {
        let mut word = 0u128;
        let mut hash = 0u64;
        for (cell, &tile) in state.tiles.iter().enumerate() {
            word = (word << BITS_PER_CELL) | tile as u128;
            hash ^= self.zobrist[tile as usize][cell];
        }
        dst.word = word;
        dst.hash = hash;
    }

    fn unpack(&self, packed: &PackedTiles) -> TilesState {
        let ncells = self.init.len();
        let mut tiles = vec![0u8; ncells];
        let mut word = packed.word;
        for cell in (0..ncells).rev() {
            tiles[cell] = (word & CELL_MASK) as u8;
            word >>= BITS_PER_CELL;
        }
        self.state_from(tiles)
    }
}
