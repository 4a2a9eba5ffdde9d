//! Move segmentation.
//!
//! A commanded move is split into `ceil(d / L)` equal-length sub-moves
//! so the feedrate scaling loop can retarget the machine between
//! segments rather than once per whole move. Intermediate endpoints are
//! rounded to a fixed coordinate precision to keep accumulation drift
//! out of the executor; the final endpoint is forced to the requested
//! destination exactly.

use kerf_common::consts::{POSITION_AXES, SEGMENT_COORD_DECIMALS};

/// Machine position: X, Y, Z plus one auxiliary axis [mm].
pub type Position = [f64; POSITION_AXES];

/// One segment of a split move, consumed in order by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubMove {
    /// Segment start [mm per axis].
    pub start: Position,
    /// Segment end [mm per axis].
    pub end: Position,
    /// Commanded speed carried from the original request [mm/s].
    pub speed: f64,
}

/// Euclidean displacement between two positions over all axes [mm].
pub fn distance(a: Position, b: Position) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(a, b)| (b - a) * (b - a))
        .sum::<f64>()
        .sqrt()
}

/// Round one coordinate to the fixed segment precision.
fn round_coord(v: f64) -> f64 {
    let scale = 10f64.powi(SEGMENT_COORD_DECIMALS);
    (v * scale).round() / scale
}

/// Split `start → end` into equal-length sub-moves of roughly
/// `segment_length` [mm] each.
///
/// The first sub-move starts at `start` exactly and the last ends at
/// `end` exactly; consecutive sub-moves share an endpoint. A
/// zero-distance request yields a single degenerate sub-move so the
/// caller never has to special-case an empty sequence.
pub fn split_move(start: Position, end: Position, speed: f64, segment_length: f64) -> Vec<SubMove> {
    debug_assert!(segment_length > 0.0);

    let dist = distance(start, end);
    if dist == 0.0 {
        return vec![SubMove { start, end, speed }];
    }

    let segments = (dist / segment_length).ceil() as usize;
    let step = dist / segments as f64;
    let mut direction = [0.0; POSITION_AXES];
    for (d, (s, e)) in direction.iter_mut().zip(start.iter().zip(end.iter())) {
        *d = (e - s) / dist;
    }

    // Accumulate from each rounded endpoint rather than from `start`
    // so adjacent segments share endpoints bit-for-bit.
    let mut result = Vec::with_capacity(segments);
    let mut cursor = start;
    for _ in 0..segments {
        let mut next = [0.0; POSITION_AXES];
        for (n, (c, d)) in next.iter_mut().zip(cursor.iter().zip(direction.iter())) {
            *n = round_coord(c + step * d);
        }
        result.push(SubMove {
            start: cursor,
            end: next,
            speed,
        });
        cursor = next;
    }

    // Override accumulated rounding on the final endpoint.
    if let Some(last) = result.last_mut() {
        last.end = end;
    }
    result
}

// ─── Tests ──────────────────────────────────────────────────────────
