use std::{
    borrow::Borrow,
    cmp::{Ord, Ordering},
    fmt, mem,
    ops::Deref,
};

use crate::depth::Depth;
use crate::error::AvlError;

/// Avl manage a single instance of in-memory index using
/// [AVL][avl] tree. Every write operation leaves the tree height balanced,
/// the heights of left and right subtree of any node differ by at most one.
///
/// Keys are not required to be unique. An entry whose key compares equal
/// to an existing entry is routed into the right subtree, and lookups stop
/// at the first matching node found while descending from the root.
///
/// [avl]: https://en.wikipedia.org/wiki/AVL_tree
#[derive(Clone)]
pub struct Avl<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    name: String,
    root: Option<Box<Node<K, V>>>,
    n_count: usize, // number of entries in the tree.
}

/// Different ways to construct a new Avl instance.
impl<K, V> Avl<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    /// Create an empty instance of Avl, identified by `name`.
    /// Applications can choose unique names.
    pub fn new<S>(name: S) -> Avl<K, V>
    where
        S: AsRef<str>,
    {
        Avl {
            name: name.as_ref().to_string(),
            root: Default::default(),
            n_count: Default::default(),
        }
    }

    /// Create a new instance of Avl tree and load it with entries
    /// from `iter`, in iteration order.
    pub fn load_from<S, I>(name: S, iter: I) -> Avl<K, V>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut avl = Avl::new(name);
        for (key, value) in iter {
            avl.insert(key, value);
        }
        avl
    }
}

/// Maintenance API.
impl<K, V> Avl<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    /// Identify this instance. Applications can choose unique names while
    /// creating Avl instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Return height of the tree, zero for an empty index.
    #[inline]
    pub fn height(&self) -> usize {
        get_height(self.root_deref())
    }

    /// Return the root node, if any. Useful for rendering the tree.
    #[inline]
    pub fn root(&self) -> Option<&Node<K, V>> {
        self.root_deref()
    }

    /// Return quickly with basic statisics, depths() is only available
    /// via [`Avl::validate`].
    pub fn stats(&self) -> Stats {
        Stats::new(self.n_count, mem::size_of::<Node<K, V>>(), self.height())
    }

    fn root_deref(&self) -> Option<&Node<K, V>> {
        self.root.as_ref().map(Deref::deref)
    }
}

type Delete<K, V> = (Option<Box<Node<K, V>>>, Option<V>);

/// Write operations on Avl instance.
impl<K, V> Avl<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    /// Insert a new {key, value} entry into the index. Never fails, an
    /// entry with an already present key is added as a duplicate.
    pub fn insert(&mut self, key: K, value: V) {
        let root = Avl::do_insert(self.root.take(), key, value);
        self.root = Some(root);
        self.n_count += 1;
    }

    /// Delete key from this instance and return its value. If key is
    /// not present, then delete is effectively a no-op.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (root, old_value) = Avl::do_delete(self.root.take(), key);
        self.root = root;
        if old_value.is_some() {
            self.n_count -= 1;
        }
        old_value
    }

    /// Validate AVL tree with following rules:
    ///
    /// * Keys are in sort order, duplicates are allowed to repeat.
    /// * Cached height of every node match its actual height.
    /// * Balance factor of every node is within -1 ..= 1.
    /// * Number of nodes match the number of entries.
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats, AvlError<K>> {
        let mut prev: Option<&K> = None;
        for (key, _) in self.iter() {
            if let Some(pkey) = prev {
                if pkey.gt(key) {
                    return Err(AvlError::SortError(pkey.clone(), key.clone()));
                }
            }
            prev = Some(key);
        }

        let mut stats = self.stats();
        stats.set_depths(Depth::new());
        let mut count = 0;
        Avl::validate_tree(self.root_deref(), 1, &mut count, &mut stats)?;
        if count != self.n_count {
            let (expected, found) = (self.n_count, count);
            return Err(AvlError::CountMismatch { expected, found });
        }
        Ok(stats)
    }
}

/// Read operations on Avl instance.
impl<K, V> Avl<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    /// Get the value for key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).map(Node::value)
    }

    /// Return the first node, along the search path, whose key match
    /// `key`. With duplicate keys only that first instance is reachable.
    pub fn search<Q>(&self, key: &Q) -> Option<&Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root_deref();
        while let Some(nref) = node {
            node = match key.cmp(nref.key.borrow()) {
                Ordering::Less => nref.left_deref(),
                Ordering::Greater => nref.right_deref(),
                Ordering::Equal => return Some(nref),
            };
        }
        None
    }

    /// Return all entries in ascending key order.
    pub fn in_order(&self) -> Vec<(K, V)> {
        let mut acc = Vec::with_capacity(self.n_count);
        Avl::collect(self.root_deref(), &mut acc);
        acc
    }

    /// Return an iterator over all entries in this instance.
    pub fn iter(&self) -> Iter<K, V> {
        let mut iter = Iter { stack: vec![] };
        iter.push_left(self.root_deref());
        iter
    }
}

impl<K, V> Avl<K, V>
where
    K: Clone + Ord + fmt::Display,
    V: Clone + fmt::Display,
{
    /// Render the tree sideways, right subtree on top, one node per line
    /// indented by its depth.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        Avl::render(self.root_deref(), 0, &mut out);
        out
    }

    fn render(node: Option<&Node<K, V>>, depth: usize, out: &mut String) {
        if let Some(node) = node {
            Avl::render(node.right_deref(), depth + 1, out);
            out.push_str(&format!(
                "{:indent$}{}: {} (h={})\n",
                "",
                node.key,
                node.value,
                node.height,
                indent = depth * 4
            ));
            Avl::render(node.left_deref(), depth + 1, out);
        }
    }
}

impl<K, V> Avl<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    fn do_insert(node: Option<Box<Node<K, V>>>, key: K, value: V) -> Box<Node<K, V>> {
        let mut node = match node {
            None => return Node::new(key, value),
            Some(node) => node,
        };

        // equal keys go right.
        if key.lt(&node.key) {
            let left = Avl::do_insert(node.left.take(), key.clone(), value);
            node.left = Some(left);
        } else {
            let right = Avl::do_insert(node.right.take(), key.clone(), value);
            node.right = Some(right);
        }
        node.update_height();

        let balance = node.balance();
        if balance > 1 {
            let outer = node.left_deref().map_or(false, |left| key.lt(&left.key));
            if !outer {
                node.left = node.left.take().map(Avl::rotate_left);
            }
            Avl::rotate_right(node)
        } else if balance < -1 {
            let outer = node.right_deref().map_or(false, |right| !key.lt(&right.key));
            if !outer {
                node.right = node.right.take().map(Avl::rotate_right);
            }
            Avl::rotate_left(node)
        } else {
            node
        }
    }

    fn do_delete<Q>(node: Option<Box<Node<K, V>>>, key: &Q) -> Delete<K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = match node {
            None => return (None, None),
            Some(node) => node,
        };

        let old_value = match key.cmp(node.key.borrow()) {
            Ordering::Less => {
                let (left, old_value) = Avl::do_delete(node.left.take(), key);
                node.left = left;
                old_value
            }
            Ordering::Greater => {
                let (right, old_value) = Avl::do_delete(node.right.take(), key);
                node.right = right;
                old_value
            }
            Ordering::Equal => match (node.left.take(), node.right.take()) {
                (None, child) | (child, None) => return (child, Some(node.value)),
                (Some(left), Some(right)) => {
                    // replace with in-order successor, then drop the
                    // successor from the right subtree.
                    let (skey, svalue) = {
                        let succ = right.min_node();
                        (succ.key.clone(), succ.value.clone())
                    };
                    let (right, _) = Avl::do_delete::<K>(Some(right), &skey);
                    node.left = Some(left);
                    node.right = right;
                    node.key = skey;
                    Some(mem::replace(&mut node.value, svalue))
                }
            },
        };
        node.update_height();

        let balance = node.balance();
        let node = if balance > 1 {
            if get_balance(node.left_deref()) < 0 {
                node.left = node.left.take().map(Avl::rotate_left);
            }
            Avl::rotate_right(node)
        } else if balance < -1 {
            if get_balance(node.right_deref()) > 0 {
                node.right = node.right.take().map(Avl::rotate_right);
            }
            Avl::rotate_left(node)
        } else {
            node
        };
        (Some(node), old_value)
    }

    fn collect(node: Option<&Node<K, V>>, acc: &mut Vec<(K, V)>) {
        if let Some(node) = node {
            Avl::collect(node.left_deref(), acc);
            acc.push((node.key.clone(), node.value.clone()));
            Avl::collect(node.right_deref(), acc);
        }
    }

    // return actual height of the subtree rooted at `node`.
    fn validate_tree(
        node: Option<&Node<K, V>>,
        depth: usize,
        count: &mut usize,
        stats: &mut Stats,
    ) -> Result<usize, AvlError<K>> {
        let node = match node {
            None => return Ok(0),
            Some(node) => node,
        };
        *count += 1;

        let (left, right) = (node.left_deref(), node.right_deref());
        if left.is_none() && right.is_none() {
            if let Some(depths) = stats.depths.as_mut() {
                depths.sample(depth);
            }
        }
        let lheight = Avl::validate_tree(left, depth + 1, count, stats)?;
        let rheight = Avl::validate_tree(right, depth + 1, count, stats)?;

        let actual = 1 + lheight.max(rheight);
        if node.height != actual {
            let (key, cached) = (node.key.clone(), node.height);
            return Err(AvlError::HeightMismatch { key, cached, actual });
        }
        let balance = (lheight as isize) - (rheight as isize);
        if !(-1..=1).contains(&balance) {
            let key = node.key.clone();
            return Err(AvlError::UnbalancedNode { key, balance });
        }
        Ok(actual)
    }

    //--------- rotation routines ----------------

    //               |                         |
    //              node                       x
    //              /  \                      / \
    //             /    \                    /   \
    //            /      \                  /     \
    //          left      x              node      xr
    //                   / \             /  \
    //                 xl   xr       left    xl
    //
    fn rotate_left(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let mut x = match node.right.take() {
            Some(x) => x,
            None => return node,
        };
        node.right = x.left.take();
        node.update_height();
        x.left = Some(node);
        x.update_height();
        x
    }

    //               |                         |
    //              node                       x
    //              /  \                      / \
    //             /    \                    /   \
    //            /      \                  /     \
    //           x      right             xl      node
    //          / \                               / \
    //        xl   xr                           xr   right
    //
    fn rotate_right(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let mut x = match node.left.take() {
            Some(x) => x,
            None => return node,
        };
        node.left = x.right.take();
        node.update_height();
        x.right = Some(node);
        x.update_height();
        x
    }
}

/// Height of the subtree rooted at `node`, zero for an absent node.
pub fn get_height<K, V>(node: Option<&Node<K, V>>) -> usize
where
    K: Clone + Ord,
    V: Clone,
{
    node.map_or(0, |node| node.height)
}

/// Balance factor of `node`, zero for an absent node.
pub fn get_balance<K, V>(node: Option<&Node<K, V>>) -> isize
where
    K: Clone + Ord,
    V: Clone,
{
    node.map_or(0, Node::balance)
}

/// In-order iterator over Avl entries.
pub struct Iter<'a, K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    fn push_left(&mut self, mut node: Option<&'a Node<K, V>>) {
        while let Some(nref) = node {
            self.stack.push(nref);
            node = nref.left_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right_deref());
        Some((&node.key, &node.value))
    }
}

/// Node corresponds to a single entry in Avl instance.
#[derive(Clone)]
pub struct Node<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    key: K,
    value: V,
    height: usize,                  // height of subtree rooted here
    left: Option<Box<Node<K, V>>>,  // store: left child
    right: Option<Box<Node<K, V>>>, // store: right child
}

// Primary operations on a single node.
impl<K, V> Node<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    // CREATE operation
    fn new(key: K, value: V) -> Box<Node<K, V>> {
        Box::new(Node {
            key,
            value,
            height: 1,
            left: None,
            right: None,
        })
    }

    /// Return the key of this entry.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Return the value of this entry.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Return the cached height of the subtree rooted at this node.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Return left subtree height minus right subtree height.
    #[inline]
    pub fn balance(&self) -> isize {
        let (lh, rh) = (get_height(self.left_deref()), get_height(self.right_deref()));
        (lh as isize) - (rh as isize)
    }

    #[inline]
    pub fn left(&self) -> Option<&Node<K, V>> {
        self.left_deref()
    }

    #[inline]
    pub fn right(&self) -> Option<&Node<K, V>> {
        self.right_deref()
    }

    #[inline]
    fn left_deref(&self) -> Option<&Node<K, V>> {
        self.left.as_ref().map(Deref::deref)
    }

    #[inline]
    fn right_deref(&self) -> Option<&Node<K, V>> {
        self.right.as_ref().map(Deref::deref)
    }

    #[inline]
    fn update_height(&mut self) {
        let (lh, rh) = (get_height(self.left_deref()), get_height(self.right_deref()));
        self.height = 1 + lh.max(rh);
    }

    fn min_node(&self) -> &Node<K, V> {
        let mut node = self;
        while let Some(left) = node.left_deref() {
            node = left;
        }
        node
    }
}

/// Statistics on [`Avl`] tree. Serves two purpose:
///
/// * To get partial but quick statistics via [`Avl::stats`] method.
/// * To get full statisics via [`Avl::validate`] method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of entries in the tree.
    node_size: usize,
    height: usize,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize, height: usize) -> Stats {
        Stats {
            entries,
            node_size,
            height,
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_depths(&mut self, depths: Depth) {
        self.depths = Some(depths)
    }

    /// Return number entries in [`Avl`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size, including over-head for `Avl<k,V>`. Although
    /// the node overhead is constant, the node size varies based on
    /// key and value types. EG:
    ///
    /// ```
    /// use avl_index::Avl;
    /// let avl: Avl<u64, u64> = Avl::new("myinstance");
    ///
    /// // size of key: 8 bytes
    /// // size of value: 8 bytes
    /// // overhead is 24 bytes
    /// assert_eq!(avl.stats().node_size(), 40);
    /// ```
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return height of the tree.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Return [`Depth`] statistics of leaf nodes, available only on
    /// stats returned by [`Avl::validate`] for a non-empty tree.
    pub fn depths(&self) -> Option<Depth> {
        match &self.depths {
            Some(depths) if depths.samples() > 0 => Some(depths.clone()),
            _ => None,
        }
    }
}
