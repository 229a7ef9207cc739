use log::{info, warn};

#[allow(unused_imports)]
use crate::Avl;

/// Depth collects the depths of leaf nodes in an [`Avl`] tree, the root
/// being at depth 1, and checks them against the shape every AVL tree
/// must have:
///
/// * no leaf is deeper than `1.4405 * log2(n + 2) - 0.3277` for `n` entries,
/// * no leaf is shallower than `max / 2 + 1`, since the shorter child of
///   any node is at most two levels lower than the taller one.
#[derive(Clone, Debug, Default)]
pub struct Depth {
    samples: usize,
    min: usize,
    max: usize,
    total: usize,
    histogram: Vec<u64>, // leaf count indexed by depth
}

impl Depth {
    pub(crate) fn new() -> Depth {
        Default::default()
    }

    pub(crate) fn sample(&mut self, depth: usize) {
        if self.samples == 0 {
            self.min = depth;
            self.max = depth;
        } else {
            self.min = self.min.min(depth);
            self.max = self.max.max(depth);
        }
        self.samples += 1;
        self.total += depth;
        if self.histogram.len() <= depth {
            self.histogram.resize(depth + 1, 0);
        }
        self.histogram[depth] += 1;
    }

    /// Return number of leaf-nodes sampled in [`Avl`] instance.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Return depth of the shallowest leaf.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Return depth of the deepest leaf, same as the tree height.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Return the average leaf depth, rounded down.
    pub fn mean(&self) -> usize {
        self.total.checked_div(self.samples).unwrap_or(0)
    }

    /// Return (percentile, depth) pairs for the 90th percentile and up,
    /// one pair per depth that crosses a new percentile.
    pub fn percentiles(&self) -> Vec<(u8, usize)> {
        let mut acc = 0_u64;
        let mut floor = 90_u8;
        let mut out = vec![];
        for (depth, &leaves) in self.histogram.iter().enumerate() {
            if leaves == 0 {
                continue;
            }
            acc += leaves;
            let perc = (acc * 100 / self.samples as u64) as u8;
            if perc >= floor {
                out.push((perc, depth));
                floor = perc;
            }
        }
        out
    }

    /// Worst case height of an AVL tree holding `entries` nodes.
    pub fn height_bound(entries: usize) -> usize {
        let n = (entries + 2) as f64;
        (1.4405 * n.log2() - 0.3277).floor() as usize
    }

    /// Check the sampled leaf depths against the AVL shape bounds for a
    /// tree of `entries` nodes. Trivially true when nothing was sampled.
    pub fn is_avl_shaped(&self, entries: usize) -> bool {
        if self.samples == 0 {
            return true;
        }
        self.max <= Depth::height_bound(entries) && self.min > self.max / 2
    }

    /// Log leaf depth statistics for a tree of `entries` nodes.
    pub fn log_summary(&self, prefix: &str, entries: usize) {
        info!(
            "{}leaf depth (min, avg, max): {:?}, height bound {}",
            prefix,
            (self.min, self.mean(), self.max),
            Depth::height_bound(entries)
        );
        for (perc, depth) in self.percentiles() {
            info!("{}  {} percentile = {}", prefix, perc, depth);
        }
        if !self.is_avl_shaped(entries) {
            warn!("{}leaf depths outside AVL bounds", prefix);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_bound() {
        // minimal AVL trees: 1, 2, 4, 7, 12 nodes for heights 1 ..= 5.
        assert_eq!(Depth::height_bound(1), 1);
        assert_eq!(Depth::height_bound(2), 2);
        assert_eq!(Depth::height_bound(4), 3);
        assert_eq!(Depth::height_bound(7), 4);
        assert_eq!(Depth::height_bound(12), 5);
        assert_eq!(Depth::height_bound(4095), 16);
    }

    #[test]
    fn test_sample() {
        let mut depth = Depth::new();
        assert_eq!(depth.mean(), 0);
        assert!(depth.percentiles().is_empty());
        assert!(depth.is_avl_shaped(0));

        for d in [3, 3, 4, 4].iter() {
            depth.sample(*d);
        }
        assert_eq!((depth.samples(), depth.min(), depth.max()), (4, 3, 4));
        assert_eq!(depth.mean(), 3);
        assert_eq!(depth.percentiles(), vec![(100, 4)]);
        assert!(depth.is_avl_shaped(7));
    }

    #[test]
    fn test_out_of_shape() {
        // a leaf at depth 1 next to one at depth 4 cannot be AVL.
        let mut depth = Depth::new();
        depth.sample(1);
        depth.sample(4);
        assert!(!depth.is_avl_shaped(100));

        // 3 entries never reach depth 4.
        let mut depth = Depth::new();
        depth.sample(4);
        assert!(!depth.is_avl_shaped(3));
    }
}
