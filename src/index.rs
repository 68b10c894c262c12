//! Ordered index backed by a left-leaning red-black tree.
//!
//! The tree supports insertion (with overwrite on equal keys) and
//! comparison-based lookup. There is no deletion: the index is built once
//! from a batch of records and then queried.
//!
//! # Invariants
//!
//! After every insertion:
//!
//! 1. No node has two consecutive red links on any downward path.
//! 2. Every path from the root to a null link crosses the same number of
//!    black links.
//! 3. Red links only ever lean left.
//! 4. `node.size == 1 + size(left) + size(right)` at every node.
//! 5. An in-order traversal yields keys in strictly ascending order.
//!
//! The root is always black.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

/// Color of the link from a node's parent to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    color: Color,
    size: usize,
}

impl<K, V> Node<K, V> {
    /// A freshly inserted leaf is red with size 1.
    fn new_red(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            left: None,
            right: None,
            color: Color::Red,
            size: 1,
        })
    }
}

fn is_red<K, V>(link: &Link<K, V>) -> bool {
    link.as_ref().is_some_and(|node| node.color == Color::Red)
}

fn size<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.size)
}

/// An ordered map from `K` to `V` with guaranteed logarithmic height.
pub struct OrderedIndex<K, V> {
    root: Link<K, V>,
}

impl<K: Ord, V> OrderedIndex<K, V> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Number of key-value pairs.
    pub fn len(&self) -> usize {
        size(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Insert `value` under `key`, overwriting any existing value in place.
    pub fn insert(&mut self, key: K, value: V) {
        let mut root = put(self.root.take(), key, value);
        root.color = Color::Black;
        self.root = Some(root);
    }

    /// Look up the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut link = self.root.as_deref();
        while let Some(node) = link {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => link = node.left.as_deref(),
                Ordering::Greater => link = node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    /// Mutable lookup. The tree shape is unaffected, so no rebalancing
    /// is needed.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut link = self.root.as_deref_mut();
        while let Some(node) = link {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => link = node.left.as_deref_mut(),
                Ordering::Greater => link = node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            }
        }
        None
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Smallest key, if any.
    pub fn min_key(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.key)
    }

    /// Largest key, if any.
    pub fn max_key(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.key)
    }

    /// Height of the tree counted in nodes (0 when empty).
    pub fn height(&self) -> usize {
        fn height<K, V>(link: &Link<K, V>) -> usize {
            match link {
                None => 0,
                Some(node) => 1 + height(&node.left).max(height(&node.right)),
            }
        }
        height(&self.root)
    }
}

impl<K, V> OrderedIndex<K, V> {
    /// In-order iterator over `(key, value)` pairs, ascending by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: size(&self.root),
        };
        iter.push_left_spine(self.root.as_deref());
        iter
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

impl<K: Ord, V> Default for OrderedIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedIndex<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedIndex<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (key, value) in iter {
            index.insert(key, value);
        }
        index
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedIndex<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator returned by [`OrderedIndex::iter`].
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut node: Option<&'a Node<K, V>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Recursive insert. Descends to the null position, then repairs on the way
/// back up: rotate left, rotate right, flip colors, in that order.
fn put<K: Ord, V>(link: Link<K, V>, key: K, value: V) -> Box<Node<K, V>> {
    let mut h = match link {
        None => return Node::new_red(key, value),
        Some(node) => node,
    };

    match key.cmp(&h.key) {
        Ordering::Less => h.left = Some(put(h.left.take(), key, value)),
        Ordering::Greater => h.right = Some(put(h.right.take(), key, value)),
        Ordering::Equal => h.value = value,
    }

    if is_red(&h.right) && !is_red(&h.left) {
        h = rotate_left(h);
    }
    if is_red(&h.left) && h.left.as_ref().is_some_and(|left| is_red(&left.left)) {
        h = rotate_right(h);
    }
    if is_red(&h.left) && is_red(&h.right) {
        flip_colors(&mut h);
    }

    h.size = 1 + size(&h.left) + size(&h.right);
    h
}

/// Turn a right-leaning red link into a left-leaning one.
fn rotate_left<K, V>(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let mut x = match h.right.take() {
        Some(x) => x,
        None => return h,
    };
    h.right = x.left.take();
    x.color = h.color;
    h.color = Color::Red;
    x.size = h.size;
    h.size = 1 + size(&h.left) + size(&h.right);
    x.left = Some(h);
    x
}

/// Turn a left-leaning red link into a right-leaning one.
fn rotate_right<K, V>(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let mut x = match h.left.take() {
        Some(x) => x,
        None => return h,
    };
    h.left = x.right.take();
    x.color = h.color;
    h.color = Color::Red;
    x.size = h.size;
    h.size = 1 + size(&h.left) + size(&h.right);
    x.right = Some(h);
    x
}

/// Split a temporary 4-node: the parent turns red, both children black.
fn flip_colors<K, V>(h: &mut Node<K, V>) {
    h.color = Color::Red;
    if let Some(left) = h.left.as_mut() {
        left.color = Color::Black;
    }
    if let Some(right) = h.right.as_mut() {
        right.color = Color::Black;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    /// Walk the tree checking every structural invariant. Returns the black
    /// height of the subtree.
    fn check_node<K: Ord + fmt::Debug, V>(
        link: &Link<K, V>,
        lower: Option<&K>,
        upper: Option<&K>,
        parent_red: bool,
    ) -> usize {
        let Some(node) = link else {
            return 0;
        };

        if let Some(lower) = lower {
            assert!(&node.key > lower, "key {:?} out of order", node.key);
        }
        if let Some(upper) = upper {
            assert!(&node.key < upper, "key {:?} out of order", node.key);
        }

        assert!(!is_red(&node.right), "right-leaning red link at {:?}", node.key);
        if parent_red {
            assert_ne!(node.color, Color::Red, "red-red violation at {:?}", node.key);
        }
        assert_eq!(
            node.size,
            1 + size(&node.left) + size(&node.right),
            "size mismatch at {:?}",
            node.key
        );

        let is_red_node = node.color == Color::Red;
        let left_black = check_node(&node.left, lower, Some(&node.key), is_red_node);
        let right_black = check_node(&node.right, Some(&node.key), upper, is_red_node);
        assert_eq!(left_black, right_black, "black height differs at {:?}", node.key);

        left_black + usize::from(!is_red_node)
    }

    fn assert_invariants<K: Ord + fmt::Debug, V>(index: &OrderedIndex<K, V>) {
        if let Some(root) = &index.root {
            assert_eq!(root.color, Color::Black, "root must be black");
        }
        check_node(&index.root, None, None, false);
    }

    #[test]
    fn test_empty_index() {
        let index: OrderedIndex<String, u32> = OrderedIndex::new();

        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.get("CA"), None);
        assert!(!index.contains("CA"));
        assert_eq!(index.min_key(), None);
        assert_eq!(index.height(), 0);
        assert_eq!(index.iter().count(), 0);
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut index = OrderedIndex::new();
        index.insert("NY".to_string(), 1);
        index.insert("CA".to_string(), 2);
        index.insert("TX".to_string(), 3);

        assert_eq!(index.len(), 3);
        assert_eq!(index.get("NY"), Some(&1));
        assert_eq!(index.get("CA"), Some(&2));
        assert_eq!(index.get("TX"), Some(&3));
        assert_eq!(index.get("FL"), None);
        assert!(index.contains("TX"));
        assert!(!index.contains("FL"));
        assert_invariants(&index);
    }

    #[test]
    fn test_overwrite_keeps_single_node() {
        let mut index = OrderedIndex::new();
        index.insert("CA".to_string(), 1);
        index.insert("NY".to_string(), 2);
        index.insert("CA".to_string(), 10);

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("CA"), Some(&10));
        assert_invariants(&index);
    }

    #[test]
    fn test_ascending_inserts_stay_balanced() {
        let mut index = OrderedIndex::new();
        for i in 0..1024u32 {
            index.insert(i, i * 2);
            assert_invariants(&index);
        }

        assert_eq!(index.len(), 1024);
        // An LLRB tree has height at most 2 * lg(n).
        assert!(index.height() <= 20, "height {}", index.height());
        assert_eq!(index.min_key(), Some(&0));
        assert_eq!(index.max_key(), Some(&1023));
    }

    #[test]
    fn test_descending_inserts_stay_balanced() {
        let mut index = OrderedIndex::new();
        for i in (0..500i64).rev() {
            index.insert(i, ());
        }

        assert_invariants(&index);
        assert_eq!(index.len(), 500);
        assert!(index.height() <= 18, "height {}", index.height());
    }

    #[test]
    fn test_random_inserts_preserve_invariants_and_last_value() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut index = OrderedIndex::new();
        let mut expected = std::collections::BTreeMap::new();

        for step in 0..2000u32 {
            let key: u16 = rng.gen_range(0..600);
            index.insert(key, step);
            expected.insert(key, step);
        }

        assert_invariants(&index);
        assert_eq!(index.len(), expected.len());
        for (key, value) in &expected {
            assert_eq!(index.get(key), Some(value));
        }
        for key in 600..700u16 {
            assert_eq!(index.get(&key), None);
        }
    }

    #[test]
    fn test_in_order_iteration_is_strictly_ascending() {
        let mut keys: Vec<String> = ["WA", "CA", "NY", "TX", "AL", "FL", "OH", "IL", "AK", "ZZ"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        keys.shuffle(&mut StdRng::seed_from_u64(42));

        let index: OrderedIndex<String, usize> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i))
            .collect();

        let walked: Vec<&String> = index.keys().collect();
        assert_eq!(walked.len(), keys.len());
        assert!(walked.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(index.iter().len(), keys.len());
    }

    #[test]
    fn test_get_mut_appends_in_place() {
        let mut index: OrderedIndex<String, Vec<u32>> = OrderedIndex::new();
        index.insert("CA".to_string(), vec![1]);
        index.insert("NY".to_string(), vec![3]);

        if let Some(values) = index.get_mut("CA") {
            values.push(2);
        }
        if let Some(values) = index.get_mut("NY") {
            values.push(4);
        }

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("CA"), Some(&vec![1, 2]));
        assert_eq!(index.get("NY"), Some(&vec![3, 4]));
        assert!(index.get_mut("TX").is_none());
        assert_invariants(&index);
    }

    #[test]
    fn test_debug_lists_entries_in_order() {
        let index: OrderedIndex<u8, char> = [(3, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();
        assert_eq!(format!("{index:?}"), "{1: 'a', 2: 'b', 3: 'c'}");
    }
}
