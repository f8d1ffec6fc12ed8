// Index of the shared nil sentinel. Every leaf link and the root's
// parent link alias this one value.
pub const NIL: usize = usize::MAX;

// Node colouring. DoubleBlack shows up only while remove-repair is
// in progress, a settled tree holds red and black alone.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Color {
    Red,
    Black,
    DoubleBlack,
}

impl Color {
    // One shade darker, for a node absorbing the blackness of a
    // spliced-out black node.
    pub fn blacker(self) -> Color {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::DoubleBlack,
            Color::DoubleBlack => {
                panic!("blacker(): blackening a double-black? call the programmer")
            }
        }
    }

    pub fn as_letter(self) -> &'static str {
        match self {
            Color::Red => "R",
            Color::Black => "B",
            Color::DoubleBlack => "BB",
        }
    }
}

// Node corresponds to a single key in OSet instance.
#[derive(Clone)]
pub struct Node<K> {
    pub key: K,
    pub color: Color,  // store: red, black or double-black
    pub parent: usize, // store: parent slot, NIL for the root
    pub left: usize,   // store: left child slot
    pub right: usize,  // store: right child slot
}

impl<K> Node<K> {
    #[inline]
    pub fn set_red(&mut self) {
        self.color = Color::Red
    }

    #[inline]
    pub fn set_black(&mut self) {
        self.color = Color::Black
    }

    #[inline]
    pub fn is_black(&self) -> bool {
        self.color == Color::Black
    }

    #[inline]
    pub fn as_key(&self) -> &K {
        &self.key
    }
}

impl<K> From<K> for Node<K> {
    fn from(key: K) -> Node<K> {
        Node {
            key,
            color: Color::Red,
            parent: NIL,
            left: NIL,
            right: NIL,
        }
    }
}

// Arena slot, either a live node or a link in the free list.
#[derive(Clone)]
pub enum Slot<K> {
    Node(Node<K>),
    Free(usize), // store: next free slot, NIL at the tail
}

impl<K> Slot<K> {
    #[inline]
    pub fn as_node(&self) -> &Node<K> {
        match self {
            Slot::Node(node) => node,
            Slot::Free(_) => panic!("as_node(): slot is freed, call the programmer"),
        }
    }

    #[inline]
    pub fn as_node_mut(&mut self) -> &mut Node<K> {
        match self {
            Slot::Node(node) => node,
            Slot::Free(_) => panic!("as_node_mut(): slot is freed, call the programmer"),
        }
    }

    pub fn into_node(self) -> Node<K> {
        match self {
            Slot::Node(node) => node,
            Slot::Free(_) => panic!("into_node(): slot is freed, call the programmer"),
        }
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
