//! Fixed-size bit sets with externally supplied size metadata.
//!
//! A Kripke state holds one valuation per world and one relation per agent,
//! all of the same size. Storing the size in every bit set would waste a
//! word per instance, so the size lives in a separate [`CommonState`] that
//! the owner keeps once and passes (by value) to every operation.
//!
//! # Invariant
//!
//! Bits beyond the logical size are always zero. [`Bitset::flip`] is the
//! only operation that could produce excess bits, so it masks the last
//! block right after inverting. All binary operations work blockwise and
//! assume both operands were created from equal common states.

/// Number of bits per block.
const BITS_PER_BLOCK: usize = u64::BITS as usize;

/// Size metadata shared by all bit sets of the same length.
///
/// Small enough to be copied into every call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CommonState {
    size: usize,
    num_blocks: usize,
    excess_mask: u64,
}

impl CommonState {
    /// Computes the common state for bit sets of `size` bits.
    pub const fn new(size: usize) -> Self {
        let num_blocks = (size + BITS_PER_BLOCK - 1) / BITS_PER_BLOCK;
        let rem = size % BITS_PER_BLOCK;
        let excess_mask = if rem == 0 { u64::MAX } else { (1u64 << rem) - 1 };
        Self {
            size,
            num_blocks,
            excess_mask,
        }
    }

    /// Returns the logical length in bits.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of `u64` blocks.
    #[inline]
    pub const fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Returns the mask of valid bits in the last block.
    #[inline]
    pub const fn excess_mask(&self) -> u64 {
        self.excess_mask
    }

    #[inline]
    fn block_and_bit(&self, index: usize) -> (usize, usize) {
        assert!(
            index < self.size,
            "Bit index {} out of range for bitset of size {}",
            index,
            self.size
        );
        (index / BITS_PER_BLOCK, index % BITS_PER_BLOCK)
    }
}

/// A bit set backed by an owned, contiguous block buffer.
///
/// The buffer is exclusively owned; every method takes the matching
/// [`CommonState`].
#[derive(Debug, Clone)]
pub struct Bitset {
    blocks: Box<[u64]>,
}

impl Bitset {
    /// Creates an all-zero bit set.
    pub fn new(cs: CommonState) -> Self {
        Self {
            blocks: vec![0; cs.num_blocks].into_boxed_slice(),
        }
    }

    /// Creates a bit set with all `cs.size()` bits set.
    pub fn full(cs: CommonState) -> Self {
        let mut bs = Self::new(cs);
        bs.flip(cs);
        bs
    }

    /// Creates a copy of `other`.
    pub fn copy_of(cs: CommonState, other: &Bitset) -> Self {
        let mut bs = Self::new(cs);
        bs.copy_from(cs, other);
        bs
    }

    /// Overwrites `self` with the contents of `other`.
    pub fn copy_from(&mut self, cs: CommonState, other: &Bitset) -> &mut Self {
        self.blocks[..cs.num_blocks].copy_from_slice(&other.blocks[..cs.num_blocks]);
        self
    }

    /// Sets the bit at `index` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= cs.size()`.
    #[inline]
    pub fn set(&mut self, cs: CommonState, index: usize, value: bool) -> &mut Self {
        let (block, bit) = cs.block_and_bit(index);
        let mask = 1u64 << bit;
        if value {
            self.blocks[block] |= mask;
        } else {
            self.blocks[block] &= !mask;
        }
        self
    }

    /// Returns the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= cs.size()`.
    #[inline]
    pub fn get(&self, cs: CommonState, index: usize) -> bool {
        let (block, bit) = cs.block_and_bit(index);
        (self.blocks[block] >> bit) & 1 == 1
    }

    pub fn union(&mut self, cs: CommonState, other: &Bitset) -> &mut Self {
        for i in 0..cs.num_blocks {
            self.blocks[i] |= other.blocks[i];
        }
        self
    }

    pub fn intersection(&mut self, cs: CommonState, other: &Bitset) -> &mut Self {
        for i in 0..cs.num_blocks {
            self.blocks[i] &= other.blocks[i];
        }
        self
    }

    /// Removes every bit of `other` from `self`.
    pub fn difference(&mut self, cs: CommonState, other: &Bitset) -> &mut Self {
        for i in 0..cs.num_blocks {
            self.blocks[i] &= !other.blocks[i];
        }
        self
    }

    pub fn symmetric_difference(&mut self, cs: CommonState, other: &Bitset) -> &mut Self {
        for i in 0..cs.num_blocks {
            self.blocks[i] ^= other.blocks[i];
        }
        self
    }

    /// Inverts every bit, keeping the excess bits zero.
    pub fn flip(&mut self, cs: CommonState) -> &mut Self {
        for i in 0..cs.num_blocks {
            self.blocks[i] = !self.blocks[i];
        }
        if let Some(last) = self.blocks[..cs.num_blocks].last_mut() {
            *last &= cs.excess_mask;
        }
        self
    }

    /// Clears all bits.
    pub fn clear(&mut self, cs: CommonState) -> &mut Self {
        for block in &mut self.blocks[..cs.num_blocks] {
            *block = 0;
        }
        self
    }

    pub fn is_subset_of(&self, cs: CommonState, other: &Bitset) -> bool {
        (0..cs.num_blocks).all(|i| self.blocks[i] & !other.blocks[i] == 0)
    }

    pub fn intersects(&self, cs: CommonState, other: &Bitset) -> bool {
        (0..cs.num_blocks).any(|i| self.blocks[i] & other.blocks[i] != 0)
    }

    /// Returns true if no bit is set.
    pub fn none(&self, cs: CommonState) -> bool {
        self.blocks[..cs.num_blocks].iter().all(|&b| b == 0)
    }

    pub fn equals(&self, cs: CommonState, other: &Bitset) -> bool {
        self.blocks[..cs.num_blocks] == other.blocks[..cs.num_blocks]
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self, cs: CommonState) -> usize {
        self.blocks[..cs.num_blocks]
            .iter()
            .map(|b| b.count_ones() as usize)
            .sum()
    }

    /// Returns an iterator over the indices of all set bits, in ascending order.
    pub fn ones(&self, cs: CommonState) -> Ones<'_> {
        let blocks = &self.blocks[..cs.num_blocks];
        Ones {
            blocks,
            block_idx: 0,
            current: blocks.first().copied().unwrap_or(0),
        }
    }
}

/// Iterator over set bits in a [`Bitset`].
pub struct Ones<'a> {
    blocks: &'a [u64],
    block_idx: usize,
    current: u64,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1; // Clear lowest set bit
                return Some(self.block_idx * BITS_PER_BLOCK + bit);
            }

            self.block_idx += 1;
            if self.block_idx >= self.blocks.len() {
                return None;
            }
            self.current = self.blocks[self.block_idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn from_indices(cs: CommonState, indices: &[usize]) -> Bitset {
        let mut bs = Bitset::new(cs);
        for &i in indices {
            bs.set(cs, i, true);
        }
        bs
    }

    #[test]
    fn test_common_state() {
        let cs = CommonState::new(100);
        assert_eq!(cs.size(), 100);
        assert_eq!(cs.num_blocks(), 2);
        assert_eq!(cs.excess_mask(), (1u64 << 36) - 1);

        let cs = CommonState::new(128);
        assert_eq!(cs.num_blocks(), 2);
        assert_eq!(cs.excess_mask(), u64::MAX);

        let cs = CommonState::new(0);
        assert_eq!(cs.num_blocks(), 0);
    }

    #[test]
    fn test_set_get() {
        let cs = CommonState::new(130);
        let mut bs = Bitset::new(cs);
        for i in 0..cs.size() {
            assert!(!bs.get(cs, i));
            bs.set(cs, i, true);
            assert!(bs.get(cs, i));
            bs.set(cs, i, false);
            assert!(!bs.get(cs, i));
        }
    }

    #[test]
    fn test_set_does_not_touch_neighbours() {
        let cs = CommonState::new(70);
        let mut bs = Bitset::new(cs);
        bs.set(cs, 64, true);
        assert!(bs.get(cs, 64));
        assert!(!bs.get(cs, 63));
        assert!(!bs.get(cs, 65));
        assert!(!bs.get(cs, 0));
        assert_eq!(bs.count_ones(cs), 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range() {
        let cs = CommonState::new(10);
        let bs = Bitset::new(cs);
        bs.get(cs, 10);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_in_excess_bits() {
        let cs = CommonState::new(10);
        let mut bs = Bitset::new(cs);
        bs.set(cs, 63, true);
    }

    #[test]
    fn test_flip_keeps_excess_zero() {
        let cs = CommonState::new(70);
        let mut bs = Bitset::new(cs);
        bs.flip(cs);
        assert_eq!(bs.count_ones(cs), 70);
        assert_eq!(bs.blocks[1], (1u64 << 6) - 1);
        bs.flip(cs);
        assert!(bs.none(cs));
    }

    #[test]
    fn test_flip_exact_block() {
        let cs = CommonState::new(64);
        let bs = Bitset::full(cs);
        assert_eq!(bs.count_ones(cs), 64);
    }

    #[test]
    fn test_flip_empty() {
        let cs = CommonState::new(0);
        let mut bs = Bitset::new(cs);
        bs.flip(cs);
        assert!(bs.none(cs));
    }

    #[test]
    fn test_union_intersection() {
        let cs = CommonState::new(100);
        let a = from_indices(cs, &[1, 5, 70]);
        let b = from_indices(cs, &[5, 6, 99]);

        let mut u = Bitset::copy_of(cs, &a);
        u.union(cs, &b);
        assert_eq!(u.ones(cs).collect::<Vec<_>>(), vec![1, 5, 6, 70, 99]);

        let mut i = Bitset::copy_of(cs, &a);
        i.intersection(cs, &b);
        assert_eq!(i.ones(cs).collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_union_intersection_commutative_associative() {
        let cs = CommonState::new(90);
        let a = from_indices(cs, &[0, 3, 64, 89]);
        let b = from_indices(cs, &[3, 4, 65]);
        let c = from_indices(cs, &[0, 4, 64, 65, 70]);

        let mut ab = Bitset::copy_of(cs, &a);
        ab.union(cs, &b);
        let mut ba = Bitset::copy_of(cs, &b);
        ba.union(cs, &a);
        assert!(ab.equals(cs, &ba));

        let mut ab_c = Bitset::copy_of(cs, &ab);
        ab_c.union(cs, &c);
        let mut bc = Bitset::copy_of(cs, &b);
        bc.union(cs, &c);
        let mut a_bc = Bitset::copy_of(cs, &a);
        a_bc.union(cs, &bc);
        assert!(ab_c.equals(cs, &a_bc));

        let mut ab = Bitset::copy_of(cs, &a);
        ab.intersection(cs, &b);
        let mut ba = Bitset::copy_of(cs, &b);
        ba.intersection(cs, &a);
        assert!(ab.equals(cs, &ba));

        let mut ab_c = Bitset::copy_of(cs, &ab);
        ab_c.intersection(cs, &c);
        let mut bc = Bitset::copy_of(cs, &b);
        bc.intersection(cs, &c);
        let mut a_bc = Bitset::copy_of(cs, &a);
        a_bc.intersection(cs, &bc);
        assert!(ab_c.equals(cs, &a_bc));
    }

    #[test]
    fn test_subset_of_union() {
        let cs = CommonState::new(66);
        let a = from_indices(cs, &[2, 65]);
        let b = from_indices(cs, &[3]);
        let mut u = Bitset::copy_of(cs, &a);
        u.union(cs, &b);
        assert!(a.is_subset_of(cs, &u));
        assert!(b.is_subset_of(cs, &u));
        assert!(!u.is_subset_of(cs, &a));
    }

    #[test]
    fn test_difference_and_symmetric_difference() {
        let cs = CommonState::new(10);
        let a = from_indices(cs, &[1, 2, 3]);
        let b = from_indices(cs, &[2, 3, 4]);

        let mut d = Bitset::copy_of(cs, &a);
        d.difference(cs, &b);
        assert_eq!(d.ones(cs).collect::<Vec<_>>(), vec![1]);

        let mut x = Bitset::copy_of(cs, &a);
        x.symmetric_difference(cs, &b);
        assert_eq!(x.ones(cs).collect::<Vec<_>>(), vec![1, 4]);
    }

    #[test]
    fn test_intersects_none_clear() {
        let cs = CommonState::new(200);
        let mut a = from_indices(cs, &[150]);
        let b = from_indices(cs, &[150, 151]);
        let c = from_indices(cs, &[0]);
        assert!(a.intersects(cs, &b));
        assert!(!a.intersects(cs, &c));
        assert!(!a.none(cs));
        a.clear(cs);
        assert!(a.none(cs));
    }

    #[test]
    fn test_copy_from() {
        let cs = CommonState::new(20);
        let a = from_indices(cs, &[7, 19]);
        let mut b = from_indices(cs, &[0]);
        b.copy_from(cs, &a);
        assert!(b.equals(cs, &a));
        assert!(!b.get(cs, 0));
    }

    #[test]
    fn test_ones() {
        let cs = CommonState::new(200);
        let bs = from_indices(cs, &[3, 5, 10, 64, 65, 199]);
        let indices: Vec<_> = bs.ones(cs).collect();
        assert_eq!(indices, vec![3, 5, 10, 64, 65, 199]);

        let empty = Bitset::new(CommonState::new(0));
        assert_eq!(empty.ones(CommonState::new(0)).count(), 0);
    }
}
