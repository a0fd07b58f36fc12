//! Piecewise-linear color gradient over the day.
//!
//! A [`GradientTable`] is an ordered list of keyframes, each pinning a color to an
//! offset since local midnight. Looking up an offset finds the segment that
//! contains it and blends the two end colors by how far into the segment the
//! offset lies. Offsets before the first keyframe or after the last one take the
//! nearest keyframe's color unchanged.

use std::time::Duration;

use crate::color::Color;
use crate::constants::SECONDS_PER_DAY;
use crate::error::ConstructionError;
use crate::utils::duration_ratio;

/// A color anchored at an offset since local midnight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub color: Color,
    pub offset: Duration,
}

impl Keyframe {
    pub fn new(color: Color, offset: Duration) -> Self {
        Self { color, offset }
    }
}

/// Which part of the table produced a looked-up color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Before the first keyframe
    Before,
    /// Between keyframes `index` and `index + 1`
    Between { index: usize, fraction: f64 },
    /// After the last keyframe
    After,
}

/// Result of a gradient lookup, with the segment used to compute it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lookup {
    pub color: Color,
    pub segment: Segment,
}

/// Ordered, validated set of keyframes spanning one day.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientTable {
    keyframes: Vec<Keyframe>,
}

impl GradientTable {
    /// Build a table from keyframes in ascending offset order.
    ///
    /// # Errors
    /// - fewer than two keyframes
    /// - an offset that is not strictly after its predecessor (this also rules out
    ///   zero-length segments)
    /// - an offset past 24 hours
    pub fn new(keyframes: Vec<Keyframe>) -> Result<Self, ConstructionError> {
        if keyframes.len() < 2 {
            return Err(ConstructionError::TooFewKeyframes {
                count: keyframes.len(),
            });
        }

        let day = Duration::from_secs(SECONDS_PER_DAY);
        for (index, keyframe) in keyframes.iter().enumerate() {
            if keyframe.offset > day {
                return Err(ConstructionError::BeyondDay {
                    index,
                    offset: keyframe.offset,
                });
            }
            if index > 0 {
                let previous = keyframes[index - 1].offset;
                if keyframe.offset <= previous {
                    return Err(ConstructionError::OutOfOrder {
                        index,
                        previous,
                        offset: keyframe.offset,
                    });
                }
            }
        }

        Ok(Self { keyframes })
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    fn first(&self) -> &Keyframe {
        &self.keyframes[0]
    }

    fn last(&self) -> &Keyframe {
        &self.keyframes[self.keyframes.len() - 1]
    }

    /// Color at the given offset since midnight.
    pub fn color_at(&self, t: Duration) -> Color {
        self.lookup(t).color
    }

    /// Color at the given offset, along with the segment and fraction used.
    pub fn lookup(&self, t: Duration) -> Lookup {
        let first = self.first();
        if t < first.offset {
            return Lookup {
                color: first.color,
                segment: Segment::Before,
            };
        }

        // Inclusive on both ends: a shared boundary resolves to the earlier
        // segment, where the fraction is 1.0 and the color is the keyframe's own.
        for (index, pair) in self.keyframes.windows(2).enumerate() {
            let (start, end) = (&pair[0], &pair[1]);
            if start.offset <= t && t <= end.offset {
                let fraction = duration_ratio(t, start.offset, end.offset);
                return Lookup {
                    color: start.color.blend(&end.color, fraction),
                    segment: Segment::Between { index, fraction },
                };
            }
        }

        Lookup {
            color: self.last().color,
            segment: Segment::After,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(h: u64) -> Duration {
        Duration::from_secs(h * 3600)
    }

    fn hex(s: &str) -> Color {
        Color::from_hex(s).unwrap()
    }

    fn keyframe(color: &str, h: u64) -> Keyframe {
        Keyframe::new(hex(color), hours(h))
    }

    /// Reference table with sentinels away from 0h/24h so the boundary policies
    /// can be exercised.
    fn inner_table() -> GradientTable {
        GradientTable::new(vec![
            keyframe("#000000", 7),
            keyframe("#ff0000", 8),
            keyframe("#ffff00", 12),
            keyframe("#00ffff", 18),
            keyframe("#0000ff", 19),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_too_few_keyframes() {
        assert_eq!(
            GradientTable::new(vec![]),
            Err(ConstructionError::TooFewKeyframes { count: 0 })
        );
        assert_eq!(
            GradientTable::new(vec![keyframe("#000000", 0)]),
            Err(ConstructionError::TooFewKeyframes { count: 1 })
        );
    }

    #[test]
    fn test_new_rejects_duplicate_offsets() {
        let result = GradientTable::new(vec![
            keyframe("#000000", 0),
            keyframe("#ff0000", 8),
            keyframe("#ffff00", 8),
        ]);
        assert_eq!(
            result,
            Err(ConstructionError::OutOfOrder {
                index: 2,
                previous: hours(8),
                offset: hours(8),
            })
        );
    }

    #[test]
    fn test_new_rejects_descending_offsets() {
        let result = GradientTable::new(vec![keyframe("#000000", 9), keyframe("#ff0000", 8)]);
        assert!(matches!(
            result,
            Err(ConstructionError::OutOfOrder { index: 1, .. })
        ));
    }

    #[test]
    fn test_new_rejects_offsets_past_midnight() {
        let result = GradientTable::new(vec![keyframe("#000000", 0), keyframe("#000000", 25)]);
        assert!(matches!(
            result,
            Err(ConstructionError::BeyondDay { index: 1, .. })
        ));
    }

    #[test]
    fn test_new_accepts_full_day_sentinels() {
        let table = GradientTable::new(vec![keyframe("#000000", 0), keyframe("#000000", 24)]);
        assert!(table.is_ok());
    }

    #[test]
    fn test_before_first_keyframe_returns_first_color() {
        let table = inner_table();
        let lookup = table.lookup(hours(5));
        assert_eq!(lookup.color, hex("#000000"));
        assert_eq!(lookup.segment, Segment::Before);
    }

    #[test]
    fn test_after_last_keyframe_returns_last_color() {
        let table = inner_table();
        let lookup = table.lookup(hours(22));
        assert_eq!(lookup.color, hex("#0000ff"));
        assert_eq!(lookup.segment, Segment::After);
    }

    #[test]
    fn test_exact_keyframe_offsets_return_unblended_colors() {
        let table = inner_table();
        for keyframe in table.keyframes() {
            assert_eq!(table.color_at(keyframe.offset), keyframe.color);
        }
    }

    #[test]
    fn test_shared_boundary_resolves_to_earlier_segment() {
        let table = inner_table();
        let lookup = table.lookup(hours(12));
        assert_eq!(
            lookup.segment,
            Segment::Between {
                index: 1,
                fraction: 1.0
            }
        );
        assert_eq!(lookup.color, hex("#ffff00"));
    }

    #[test]
    fn test_midpoint_is_lab_blend() {
        let table = inner_table();
        let lookup = table.lookup(hours(10));
        assert_eq!(
            lookup.segment,
            Segment::Between {
                index: 1,
                fraction: 0.5
            }
        );
        assert_eq!(lookup.color.hex(), "#ffa100");
    }

    #[test]
    fn test_fraction_tracks_position_in_segment() {
        let table = inner_table();
        // 13:30 is a quarter of the way through the 12h-18h segment
        let t = hours(13) + Duration::from_secs(30 * 60);
        match table.lookup(t).segment {
            Segment::Between { index, fraction } => {
                assert_eq!(index, 2);
                assert!((fraction - 0.25).abs() < 1e-12);
            }
            other => panic!("unexpected segment {:?}", other),
        }
    }
}
