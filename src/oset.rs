//! Module provide ordered-set implemented by [OSet] type.
//!
//! OSet is implemented using a classic [red-black tree][wiki-rbtree],
//! nodes carrying parent links and every leaf link aliasing one shared
//! nil sentinel.
//!
//! - Each entry in OSet instance correspond to a key.
//! - Parametrised over `key-type`.
//! - Insert, search, delete operations, via insert(), search(), delete() api.
//! - Ordered navigation, via min(), max(), successor() api.
//! - Equal keys are retained, a new arrival descending to the right.
//! - In-order text rendering, via to_text(), cached until the next
//!   structural change.
//! - Depth by depth rendering, via render_by_depth().
//! - No Durability guarantee.
//! - Not thread safe.
//!
//! [OSet] instance and its API uses Rust's ownership model and borrow
//! semantics to ensure safe operation.
//!
//! Constructing a new [OSet] instance and working its keys:
//! ```
//! use rbset::OSet;
//!
//! let mut index: OSet<i32> = OSet::new();
//!
//! index.insert(4).insert(5).insert(3).insert(2);
//!
//! let n = index.len();
//! assert_eq!(n, 4);
//!
//! assert_eq!(index.search(&4), Some(&4));
//! assert_eq!(index.min(), Some(&2));
//! assert_eq!(index.max(), Some(&5));
//! assert_eq!(index.successor(&3), Some(&4));
//! assert_eq!(index.to_text(), "2R 3B 4B 5B");
//!
//! let old_key = index.delete(&5);
//! assert_eq!(old_key, Some(5));
//! assert_eq!(index.search(&5), None);
//! ```
//!
//! [wiki-rbtree]: https://en.wikipedia.org/wiki/Red-black_tree

use std::{
    borrow::Borrow,
    cell::OnceCell,
    cmp::Ordering,
    fmt, mem, result,
};

use crate::{
    node::{Color, Node, Slot, NIL},
    Error, Result,
};

/// OSet manage a single instance of in-memory ordered-set using a
/// [red-black tree][rbt].
///
/// Nodes live in a slot arena, tree links are held as slot indices
/// and [NIL] plays the shared nil sentinel. The sentinel's colour is
/// kept on the tree itself, black except while remove-repair is
/// carrying a double-black through it.
///
/// [rbt]: https://en.wikipedia.org/wiki/Red-black_tree
pub struct OSet<K> {
    slots: Vec<Slot<K>>,
    root: usize,            // root slot, NIL when the tree is empty.
    free: usize,            // head of the free list, NIL when exhausted.
    nil_color: Color,       // colour of the shared nil sentinel.
    n_count: usize,         // number of entries in the tree.
    text: OnceCell<String>, // in-order rendering, valid till next mutation.
}

impl<K> Default for OSet<K> {
    fn default() -> Self {
        OSet::new()
    }
}

impl<K> Extend<K> for OSet<K>
where
    K: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = K>,
    {
        iter.into_iter().for_each(|key| {
            self.insert(key);
        });
    }
}

impl<K> OSet<K> {
    /// Create an empty instance of OSet.
    pub fn new() -> OSet<K> {
        OSet {
            slots: Vec::default(),
            root: NIL,
            free: NIL,
            nil_color: Color::Black,
            n_count: Default::default(),
            text: OnceCell::new(),
        }
    }
}

/// Maintenance API.
impl<K> OSet<K> {
    /// Return number of keys in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }
}

impl<K> OSet<K> {
    /// Insert key into this instance. Equal keys are retained, the new
    /// arrival descending into the right subtree. Returns a mutable
    /// borrow of self, so that inserts can be chained.
    pub fn insert(&mut self, key: K) -> &mut Self
    where
        K: Ord,
    {
        let (mut parent, mut cursor) = (NIL, self.root);
        while cursor != NIL {
            parent = cursor;
            cursor = if key.lt(self.key(cursor)) {
                self.left_of(cursor)
            } else {
                self.right_of(cursor)
            };
        }

        let node = self.alloc(key);
        self.set_parent(node, parent);
        if parent == NIL {
            self.root = node;
        } else if self.key(node).lt(self.key(parent)) {
            self.set_left(parent, node);
        } else {
            self.set_right(parent, node);
        }

        self.fix_insert(node);
        self.slots[self.root].as_node_mut().set_black();

        self.n_count += 1;
        self.text.take();
        self
    }

    /// Delete key from this instance and return the owned key. If key
    /// is not present, then delete is effectively a no-op. When equal
    /// keys are present, the topmost of them is taken out.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;
        let target = loop {
            if cursor == NIL {
                return None;
            }
            let nref = self.slots[cursor].as_node();
            cursor = match nref.key.borrow().cmp(key) {
                Ordering::Less => nref.right,
                Ordering::Greater => nref.left,
                Ordering::Equal => break cursor,
            };
        };

        // two children, trade keys with the in-order successor and
        // splice out that node instead. colours stay put.
        let target = if self.left_of(target) != NIL && self.right_of(target) != NIL {
            let next = self.min_of(self.right_of(target));
            self.swap_keys(target, next);
            next
        } else {
            target
        };

        let child = if self.left_of(target) != NIL {
            self.left_of(target)
        } else {
            self.right_of(target)
        };
        let parent = self.parent_of(target);

        self.set_parent(child, parent);
        if parent == NIL {
            self.root = child;
        } else if self.left_of(parent) == target {
            self.set_left(parent, child);
        } else {
            self.set_right(parent, child);
        }

        let node = self.release(target);

        if node.is_black() {
            // the spliced-out black leaves its child a shade darker.
            self.set_color(child, self.color(child).blacker());
            self.fix_delete(child, parent);
        }
        if self.root != NIL {
            self.slots[self.root].as_node_mut().set_black();
        }

        self.n_count -= 1;
        self.text.take();
        Some(node.key)
    }

    /// Validate tree rules:
    ///
    /// * Root must be black and carry no parent link.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * No double-black may survive outside remove-repair, on the nil
    ///   sentinel included.
    /// * Make sure keys are in sorted order, equal keys leaning right.
    /// * Parent links must mirror the child links.
    /// * Entry count must agree with [OSet::len].
    pub fn validate(&self) -> Result<()>
    where
        K: Ord + fmt::Debug,
    {
        if self.nil_color != Color::Black {
            err_at!(Fatal, msg: "nil sentinel left {:?}", self.nil_color)?;
        }
        if self.is_red(self.root) {
            err_at!(Fatal, msg: "root is red")?;
        }
        if self.parent_of(self.root) != NIL {
            err_at!(Fatal, msg: "root has a parent")?;
        }
        let (n_count, _) =
            self.validate_tree(self.root, NIL, false /*fromred*/, 0 /*n_blacks*/)?;
        if n_count != self.n_count {
            err_at!(Fatal, msg: "n_count {} != {}", n_count, self.n_count)?;
        }
        Ok(())
    }
}

impl<K> OSet<K> {
    /// Get the stored key matching `key`. When equal keys are present,
    /// the topmost of them is returned.
    pub fn search<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;
        while cursor != NIL {
            let nref = self.slots[cursor].as_node();
            cursor = match nref.key.borrow().cmp(key) {
                Ordering::Less => nref.right,
                Ordering::Greater => nref.left,
                Ordering::Equal => return Some(nref.as_key()),
            };
        }
        None
    }

    /// Return the smallest key in this instance.
    pub fn min(&self) -> Option<&K> {
        match self.root {
            NIL => None,
            root => Some(self.key(self.min_of(root))),
        }
    }

    /// Return the largest key in this instance.
    pub fn max(&self) -> Option<&K> {
        match self.root {
            NIL => None,
            root => Some(self.key(self.max_of(root))),
        }
    }

    /// Return the key ordered right after `key`, None when `key` is
    /// absent or already the largest. Follows the node's structural
    /// successor, so with equal keys in the tree the returned key can
    /// compare equal to `key`.
    pub fn successor<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;
        let found = loop {
            if cursor == NIL {
                return None;
            }
            let nref = self.slots[cursor].as_node();
            cursor = match nref.key.borrow().cmp(key) {
                Ordering::Less => nref.right,
                Ordering::Greater => nref.left,
                Ordering::Equal => break cursor,
            };
        };

        match self.successor_of(found) {
            NIL => None,
            next => Some(self.key(next)),
        }
    }

    /// In-order rendering of the tree, one `<key><colour>` token per
    /// node separated by single spaces, colour being "R", "B" or "BB".
    /// The text is computed once and served from cache until the next
    /// structural change.
    pub fn to_text(&self) -> &str
    where
        K: fmt::Display,
    {
        self.text.get_or_init(|| {
            let mut toks = Vec::with_capacity(self.n_count);
            self.text_of(self.root, &mut toks);
            toks.join(" ")
        })
    }

    /// Render the tree depth by depth, one line per depth starting at
    /// the root. Nil leaves hanging off a rendered node show up as
    /// `nil<colour>` tokens, an empty tree renders as a lone "nilB".
    pub fn render_by_depth(&self) -> String
    where
        K: fmt::Display,
    {
        let mut lines = vec![];
        for depth in 0.. {
            let mut toks = vec![];
            self.depth_of(self.root, depth, &mut toks);
            if toks.is_empty() {
                break;
            }
            lines.push(toks.join(" "));
        }
        lines.join("\n")
    }
}

impl<K> fmt::Display for OSet<K>
where
    K: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self.to_text())
    }
}

impl<K> OSet<K> {
    #[inline]
    fn key(&self, of: usize) -> &K {
        self.slots[of].as_node().as_key()
    }

    #[inline]
    fn color(&self, of: usize) -> Color {
        match of {
            NIL => self.nil_color,
            _ => self.slots[of].as_node().color,
        }
    }

    #[inline]
    fn set_color(&mut self, of: usize, color: Color) {
        match of {
            NIL => self.nil_color = color,
            _ => self.slots[of].as_node_mut().color = color,
        }
    }

    #[inline]
    fn is_red(&self, of: usize) -> bool {
        self.color(of) == Color::Red
    }

    #[inline]
    fn is_black(&self, of: usize) -> bool {
        !self.is_red(of)
    }

    #[inline]
    fn parent_of(&self, of: usize) -> usize {
        match of {
            NIL => NIL,
            _ => self.slots[of].as_node().parent,
        }
    }

    #[inline]
    fn left_of(&self, of: usize) -> usize {
        match of {
            NIL => NIL,
            _ => self.slots[of].as_node().left,
        }
    }

    #[inline]
    fn right_of(&self, of: usize) -> usize {
        match of {
            NIL => NIL,
            _ => self.slots[of].as_node().right,
        }
    }

    // link writes on the nil sentinel are dropped on the floor.

    #[inline]
    fn set_parent(&mut self, of: usize, parent: usize) {
        if of != NIL {
            self.slots[of].as_node_mut().parent = parent;
        }
    }

    #[inline]
    fn set_left(&mut self, of: usize, left: usize) {
        if of != NIL {
            self.slots[of].as_node_mut().left = left;
        }
    }

    #[inline]
    fn set_right(&mut self, of: usize, right: usize) {
        if of != NIL {
            self.slots[of].as_node_mut().right = right;
        }
    }

    fn alloc(&mut self, key: K) -> usize {
        let node = Slot::Node(key.into());
        match self.free {
            NIL => {
                self.slots.push(node);
                self.slots.len() - 1
            }
            slot => {
                self.free = match &self.slots[slot] {
                    Slot::Free(next) => *next,
                    Slot::Node(_) => {
                        panic!("alloc(): free list holds a live node? call the programmer")
                    }
                };
                self.slots[slot] = node;
                slot
            }
        }
    }

    fn release(&mut self, slot: usize) -> Node<K> {
        let node = mem::replace(&mut self.slots[slot], Slot::Free(self.free));
        self.free = slot;
        node.into_node()
    }

    fn swap_keys(&mut self, a: usize, b: usize) {
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (front, back) = self.slots.split_at_mut(high);
        mem::swap(
            &mut front[low].as_node_mut().key,
            &mut back[0].as_node_mut().key,
        );
    }

    fn min_of(&self, mut node: usize) -> usize {
        while self.left_of(node) != NIL {
            node = self.left_of(node);
        }
        node
    }

    fn max_of(&self, mut node: usize) -> usize {
        while self.right_of(node) != NIL {
            node = self.right_of(node);
        }
        node
    }

    fn successor_of(&self, node: usize) -> usize {
        if self.right_of(node) != NIL {
            return self.min_of(self.right_of(node));
        }
        let (mut node, mut parent) = (node, self.parent_of(node));
        while parent != NIL && node == self.right_of(parent) {
            node = parent;
            parent = self.parent_of(parent);
        }
        parent
    }

    fn text_of(&self, node: usize, toks: &mut Vec<String>)
    where
        K: fmt::Display,
    {
        if node == NIL {
            return;
        }
        self.text_of(self.left_of(node), toks);
        let nref = self.slots[node].as_node();
        toks.push(format!("{}{}", nref.key, nref.color.as_letter()));
        self.text_of(self.right_of(node), toks);
    }

    fn depth_of(&self, node: usize, depth: usize, toks: &mut Vec<String>)
    where
        K: fmt::Display,
    {
        if depth == 0 {
            toks.push(match node {
                NIL => format!("nil{}", self.nil_color.as_letter()),
                _ => {
                    let nref = self.slots[node].as_node();
                    format!("{}{}", nref.key, nref.color.as_letter())
                }
            });
        } else if node != NIL {
            self.depth_of(self.left_of(node), depth - 1, toks);
            self.depth_of(self.right_of(node), depth - 1, toks);
        }
    }

    fn validate_tree(
        &self,
        node: usize,
        parent: usize,
        fromred: bool,
        mut n_blacks: usize,
    ) -> Result<(usize, usize)>
    where
        K: Ord + fmt::Debug,
    {
        if node == NIL {
            return Ok((0, n_blacks));
        }

        let red = self.is_red(node);
        if fromred && red {
            return err_at!(Fatal, msg: "consecutive reds");
        }
        if self.color(node) == Color::DoubleBlack {
            return err_at!(Fatal, msg: "settled double-black at {:?}", self.key(node));
        }
        if self.parent_of(node) != parent {
            return err_at!(Fatal, msg: "parent link broken at {:?}", self.key(node));
        }

        if !red {
            n_blacks += 1;
        }

        let (left, right) = (self.left_of(node), self.right_of(node));
        let (lcount, lblacks) = self.validate_tree(left, node, red, n_blacks)?;
        let (rcount, rblacks) = self.validate_tree(right, node, red, n_blacks)?;
        if lblacks != rblacks {
            err_at!(Fatal, msg: "unbalanced blacks {} {}", lblacks, rblacks)?;
        }

        if left != NIL && self.key(left).gt(self.key(node)) {
            err_at!(Fatal, msg: "sort lkey:{:?} parent:{:?}", self.key(left), self.key(node))?;
        }
        if right != NIL && self.key(right).lt(self.key(node)) {
            err_at!(Fatal, msg: "sort rkey:{:?} parent:{:?}", self.key(right), self.key(node))?;
        }

        Ok((lcount + rcount + 1, lblacks))
    }
}

//--------- rotation and repair routines ----------------

impl<K> OSet<K> {
    // bottom-up repair after an insert. the freshly placed node is red,
    // the only possible wound is a red child under a red parent.
    fn fix_insert(&mut self, mut error: usize) {
        while self.is_red(error) && self.is_red(self.parent_of(error)) {
            let parent = self.parent_of(error);
            let grand = self.parent_of(parent);

            let uncle = if parent == self.left_of(grand) {
                self.right_of(grand)
            } else {
                self.left_of(grand)
            };

            if self.is_red(uncle) {
                // red uncle, push the blackness one level down and
                // carry the wound up to the grandparent. a red parent
                // is never the root, so grand is a real node here.
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.slots[grand].as_node_mut().set_red();
                error = grand;
                continue;
            }

            // black uncle. fold an inner red onto the outer line, then
            // one edge rotation at the grandparent settles the wound.
            let parent = if parent == self.left_of(grand) {
                if error == self.right_of(parent) {
                    self.rotate_edge(parent, error);
                    error
                } else {
                    parent
                }
            } else if error == self.left_of(parent) {
                self.rotate_edge(parent, error);
                error
            } else {
                parent
            };
            self.rotate_edge(grand, parent);
        }
    }

    // bottom-up repair after a delete, driving the double-black out.
    // `error` can be the nil sentinel, so its parent rides along.
    fn fix_delete(&mut self, mut error: usize, mut parent: usize) {
        while error != self.root && self.color(error) == Color::DoubleBlack {
            let sibling = if error == self.left_of(parent) {
                self.right_of(parent)
            } else {
                self.left_of(parent)
            };

            if self.is_red(sibling) {
                // red sibling. rotate it over the parent and retry
                // against the black sibling uncovered underneath.
                self.rotate_edge(parent, sibling);
                continue;
            }

            let (near, far) = if error == self.left_of(parent) {
                (self.left_of(sibling), self.right_of(sibling))
            } else {
                (self.right_of(sibling), self.left_of(sibling))
            };

            if self.is_black(near) && self.is_black(far) {
                // both nephews black, trade the double-black for a
                // darker parent and carry on upward.
                self.set_color(error, Color::Black);
                self.set_color(sibling, Color::Red);
                self.set_color(parent, self.color(parent).blacker());
                error = parent;
                parent = self.parent_of(error);
                continue;
            }

            if self.is_red(near) && self.is_black(far) {
                // near nephew red, fold it outward over the sibling.
                self.rotate_edge(sibling, near);
                continue;
            }

            // far nephew red. rotate the sibling over the parent, the
            // far nephew and the error both settle black.
            self.rotate_edge(parent, sibling);
            self.set_color(far, Color::Black);
            self.set_color(error, Color::Black);
            break;
        }

        // root absorbs whatever blackness is left over.
        if self.color(error) == Color::DoubleBlack {
            self.set_color(error, Color::Black);
        }
    }

    //              (p)                        (p)
    //               |                          |
    //              node                      child
    //              /  \                       /  \
    //             /    \                     /    \
    //          left   child               node     cr
    //                  /  \               /  \
    //                cl    cr          left    cl
    //
    fn rotate_left(&mut self, node: usize) {
        let child = self.right_of(node);
        if child == NIL {
            panic!("rotate_left(): rotating the nil sentinel? call the programmer");
        }

        let inner = self.left_of(child);
        self.set_right(node, inner);
        self.set_parent(inner, node);

        let parent = self.parent_of(node);
        self.set_parent(child, parent);
        if parent == NIL {
            self.root = child;
        } else if self.left_of(parent) == node {
            self.set_left(parent, child);
        } else {
            self.set_right(parent, child);
        }

        self.set_left(child, node);
        self.set_parent(node, child);
    }

    //              (p)                        (p)
    //               |                          |
    //              node                      child
    //              /  \                       /  \
    //             /    \                     /    \
    //          child   right               cl     node
    //           /  \                              /  \
    //         cl    cr                          cr    right
    //
    fn rotate_right(&mut self, node: usize) {
        let child = self.left_of(node);
        if child == NIL {
            panic!("rotate_right(): rotating the nil sentinel? call the programmer");
        }

        let inner = self.right_of(child);
        self.set_left(node, inner);
        self.set_parent(inner, node);

        let parent = self.parent_of(node);
        self.set_parent(child, parent);
        if parent == NIL {
            self.root = child;
        } else if self.left_of(parent) == node {
            self.set_left(parent, child);
        } else {
            self.set_right(parent, child);
        }

        self.set_right(child, node);
        self.set_parent(node, child);
    }

    // rotate child over parent, the side picking the direction, and
    // trade their colours as they trade places. rotation and recolour
    // travel together, both repair loops lean on that.
    fn rotate_edge(&mut self, parent: usize, child: usize) {
        if child == self.left_of(parent) {
            self.rotate_right(parent);
        } else if child == self.right_of(parent) {
            self.rotate_left(parent);
        } else {
            panic!("rotate_edge(): no such edge? call the programmer");
        }

        let pc = self.color(parent);
        let cc = self.color(child);
        self.set_color(parent, cc);
        self.set_color(child, pc);
    }
}

#[cfg(test)]
#[path = "oset_test.rs"]
mod oset_test;
