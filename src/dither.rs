//! Ordered dither patterns
//!
//! Every pattern is a small periodic threshold matrix. A pixel at (x, y)
//! takes the first color when the requested ratio exceeds
//! `matrix[y mod N][x mod N]`, otherwise the second color. The matrix is
//! also emitted verbatim into generated scripts so that the engine applies
//! exactly the thresholds computed here.

/// 4x4 Bayer matrix, unnormalized
const BAYER_4X4: [[u32; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

/// 8x8 Bayer matrix, unnormalized
const BAYER_8X8: [[u32; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Built-in dither pattern types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DitherPattern {
    /// 2x2 checkerboard pattern
    Checkerboard,
    /// 2x2 Bayer ordered dither (4 threshold levels)
    Bayer2x2,
    /// 4x4 Bayer ordered dither (16 threshold levels)
    Bayer4x4,
    /// 8x8 Bayer ordered dither (64 threshold levels)
    Bayer8x8,
    /// Diagonal line pattern
    Diagonal,
    /// Horizontal line pattern
    Horizontal,
    /// Vertical line pattern
    Vertical,
}

impl DitherPattern {
    /// Canonical names, in the order they are listed to users.
    pub const NAMES: &'static [&'static str] =
        &["checkerboard", "bayer_2x2", "bayer_4x4", "bayer_8x8", "diagonal", "horizontal", "vertical"];

    /// Parse a pattern name string into a DitherPattern
    pub fn from_str(s: &str) -> Option<DitherPattern> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "checker" | "checkerboard" => Some(DitherPattern::Checkerboard),
            "bayer_2x2" | "bayer2x2" | "ordered_2x2" | "ordered2x2" => Some(DitherPattern::Bayer2x2),
            "bayer_4x4" | "bayer4x4" | "ordered_4x4" | "ordered4x4" => Some(DitherPattern::Bayer4x4),
            "bayer_8x8" | "bayer8x8" | "ordered_8x8" | "ordered8x8" => Some(DitherPattern::Bayer8x8),
            "diagonal" => Some(DitherPattern::Diagonal),
            "horizontal" | "horizontal_lines" => Some(DitherPattern::Horizontal),
            "vertical" | "vertical_lines" => Some(DitherPattern::Vertical),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DitherPattern::Checkerboard => "checkerboard",
            DitherPattern::Bayer2x2 => "bayer_2x2",
            DitherPattern::Bayer4x4 => "bayer_4x4",
            DitherPattern::Bayer8x8 => "bayer_8x8",
            DitherPattern::Diagonal => "diagonal",
            DitherPattern::Horizontal => "horizontal",
            DitherPattern::Vertical => "vertical",
        }
    }

    /// Period of the pattern along both axes.
    pub fn size(&self) -> u32 {
        match self {
            DitherPattern::Checkerboard | DitherPattern::Bayer2x2 => 2,
            DitherPattern::Bayer8x8 => 8,
            _ => 4,
        }
    }

    /// Get the threshold value at a given position, in `[0, 1)`.
    pub fn threshold_at(&self, x: u32, y: u32) -> f64 {
        let n = self.size();
        let (px, py) = (x % n, y % n);
        match self {
            DitherPattern::Checkerboard => {
                if (px + py) % 2 == 0 {
                    0.25
                } else {
                    0.75
                }
            }
            DitherPattern::Bayer2x2 => {
                // | 0 2 |
                // | 3 1 |
                const BAYER_2X2: [[u32; 2]; 2] = [[0, 2], [3, 1]];
                BAYER_2X2[py as usize][px as usize] as f64 / 4.0
            }
            DitherPattern::Bayer4x4 => BAYER_4X4[py as usize][px as usize] as f64 / 16.0,
            DitherPattern::Bayer8x8 => BAYER_8X8[py as usize][px as usize] as f64 / 64.0,
            DitherPattern::Diagonal => ((px + py) % n) as f64 / n as f64,
            DitherPattern::Horizontal => py as f64 / n as f64,
            DitherPattern::Vertical => px as f64 / n as f64,
        }
    }

    /// Whether the pixel at (x, y) takes the first color for `ratio`.
    pub fn picks_first(&self, x: u32, y: u32, ratio: f64) -> bool {
        ratio > self.threshold_at(x, y)
    }

    /// The full threshold matrix, indexed `[y][x]`.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        let n = self.size();
        (0..n).map(|y| (0..n).map(|x| self.threshold_at(x, y)).collect()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DitherPattern; 7] = [
        DitherPattern::Checkerboard,
        DitherPattern::Bayer2x2,
        DitherPattern::Bayer4x4,
        DitherPattern::Bayer8x8,
        DitherPattern::Diagonal,
        DitherPattern::Horizontal,
        DitherPattern::Vertical,
    ];

    #[test]
    fn test_dither_pattern_from_str() {
        assert_eq!(DitherPattern::from_str("checkerboard"), Some(DitherPattern::Checkerboard));
        assert_eq!(DitherPattern::from_str("checker"), Some(DitherPattern::Checkerboard));
        assert_eq!(DitherPattern::from_str("bayer_4x4"), Some(DitherPattern::Bayer4x4));
        assert_eq!(DitherPattern::from_str("Bayer-4x4"), Some(DitherPattern::Bayer4x4));
        assert_eq!(DitherPattern::from_str("ordered-8x8"), Some(DitherPattern::Bayer8x8));
        assert_eq!(DitherPattern::from_str("horizontal_lines"), Some(DitherPattern::Horizontal));
        assert_eq!(DitherPattern::from_str("noise"), None);
        assert_eq!(DitherPattern::from_str("unknown"), None);
    }

    #[test]
    fn test_names_round_trip() {
        for pattern in ALL {
            assert_eq!(DitherPattern::from_str(pattern.name()), Some(pattern));
            assert!(DitherPattern::NAMES.contains(&pattern.name()));
        }
    }

    #[test]
    fn test_thresholds_in_unit_interval_and_periodic() {
        for pattern in ALL {
            let n = pattern.size();
            for y in 0..n {
                for x in 0..n {
                    let t = pattern.threshold_at(x, y);
                    assert!((0.0..1.0).contains(&t), "{:?} ({x},{y}) = {t}", pattern);
                    assert_eq!(t, pattern.threshold_at(x + n, y + 3 * n));
                }
            }
        }
    }

    #[test]
    fn test_bayer_2x2_values() {
        let pattern = DitherPattern::Bayer2x2;
        assert_eq!(pattern.threshold_at(0, 0), 0.0);
        assert_eq!(pattern.threshold_at(1, 0), 0.5);
        assert_eq!(pattern.threshold_at(0, 1), 0.75);
        assert_eq!(pattern.threshold_at(1, 1), 0.25);
    }

    #[test]
    fn test_bayer_4x4_half_ratio_splits_block_evenly() {
        let pattern = DitherPattern::Bayer4x4;
        for (ox, oy) in [(0, 0), (4, 0), (8, 12)] {
            let first = (0..4)
                .flat_map(|y| (0..4).map(move |x| (x, y)))
                .filter(|&(x, y)| pattern.picks_first(ox + x, oy + y, 0.5))
                .count();
            assert_eq!(first, 8);
        }
    }

    #[test]
    fn test_ratio_extremes() {
        for pattern in ALL {
            for y in 0..8 {
                for x in 0..8 {
                    assert!(pattern.picks_first(x, y, 1.0));
                    assert!(!pattern.picks_first(x, y, 0.0));
                }
            }
        }
    }

    #[test]
    fn test_matrix_matches_threshold_lookup() {
        let m = DitherPattern::Bayer4x4.matrix();
        assert_eq!(m.len(), 4);
        assert_eq!(m[1][2], 14.0 / 16.0);
        assert_eq!(DitherPattern::Checkerboard.matrix(), vec![vec![0.25, 0.75], vec![0.75, 0.25]]);
    }
}
