use std::fmt;

use crate::error::{ConfigError, InvariantViolation};

/// Position of a node in the ring. Displayed as `a`, `b`, ..., `z`, `aa`,
/// `ab`, ... so the ring size is not bounded by the alphabet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    pub fn name(self) -> String {
        // bijective base-26
        let mut n = self.0 + 1;
        let mut name = Vec::new();
        while n > 0 {
            n -= 1;
            name.push(b'a' + (n % 26) as u8);
            n /= 26;
        }
        name.reverse();
        String::from_utf8(name).unwrap_or_default()
    }
}

impl From<usize> for NodeId {
    fn from(val: usize) -> NodeId {
        NodeId(val)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The reduction domain of a ring.
pub trait Fragment: Clone + fmt::Debug {
    /// The fragment `owner` holds in `slot` before the first step.
    fn origin(owner: NodeId, slot: usize) -> Self;
    /// Fold `other` into `self` in place.
    fn accumulate(&mut self, other: Self);
}

/// Labels like `a2`, reduced by concatenation.
impl Fragment for String {
    fn origin(owner: NodeId, slot: usize) -> Self {
        format!("{}{}", owner, slot)
    }

    fn accumulate(&mut self, other: Self) {
        self.push_str(&other);
    }
}

/// Each node contributes its 1-based position, reduced by summation.
impl Fragment for u64 {
    fn origin(owner: NodeId, _slot: usize) -> Self {
        owner.index() as u64 + 1
    }

    fn accumulate(&mut self, other: Self) {
        *self += other;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<T> {
    Value(T),
    /// The value has been sent to the neighbor and this slot no longer holds it.
    InTransit,
}

impl<T> Slot<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Slot::Value(v) => Some(v),
            Slot::InTransit => None,
        }
    }

    #[inline]
    pub fn is_in_transit(&self) -> bool {
        matches!(self, Slot::InTransit)
    }
}

impl<T: fmt::Display> fmt::Display for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Value(v) => write!(f, "{}", v),
            Slot::InTransit => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<T> {
    id: NodeId,
    buffer: Vec<Slot<T>>,
}

impl<T: Fragment> Node<T> {
    pub fn new(id: NodeId, num_slots: usize) -> Self {
        Node {
            id,
            buffer: (0..num_slots)
                .map(|i| Slot::Value(T::origin(id, i)))
                .collect(),
        }
    }

    /// Read the value in `slot` and mark the slot as in transit.
    pub(crate) fn take(&mut self, slot: usize) -> Result<T, InvariantViolation> {
        let id = self.id;
        let s = self
            .buffer
            .get_mut(slot)
            .ok_or(InvariantViolation::SlotOutOfRange { node: id, slot })?;
        match std::mem::replace(s, Slot::InTransit) {
            Slot::Value(v) => Ok(v),
            Slot::InTransit => Err(InvariantViolation::DoubleSend { node: id, slot }),
        }
    }

    pub(crate) fn accumulate(&mut self, slot: usize, value: T) -> Result<(), InvariantViolation> {
        let id = self.id;
        match self.buffer.get_mut(slot) {
            Some(Slot::Value(v)) => {
                v.accumulate(value);
                Ok(())
            }
            Some(Slot::InTransit) => Err(InvariantViolation::ReceiveInTransit { node: id, slot }),
            None => Err(InvariantViolation::SlotOutOfRange { node: id, slot }),
        }
    }
}

impl<T> Node<T> {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn buffer(&self) -> &[Slot<T>] {
        &self.buffer
    }

    #[inline]
    pub fn slot(&self, slot: usize) -> Option<&Slot<T>> {
        self.buffer.get(slot)
    }
}

/// A fixed unidirectional ring. Node `i` always sends to node `(i + 1) mod n`.
#[derive(Debug, Clone)]
pub struct Ring<T> {
    nodes: Vec<Node<T>>,
}

impl<T: Fragment> Ring<T> {
    pub fn new(num_nodes: usize) -> Result<Self, ConfigError> {
        if num_nodes == 0 {
            return Err(ConfigError::EmptyRing);
        }
        let nodes = (0..num_nodes)
            .map(|i| Node::new(NodeId(i), num_nodes))
            .collect();
        Ok(Ring { nodes })
    }
}

impl<T> Ring<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn neighbor_of(&self, pos: usize) -> usize {
        (pos + 1) % self.nodes.len()
    }

    #[inline]
    pub fn node(&self, pos: usize) -> Option<&Node<T>> {
        self.nodes.get(pos)
    }

    /// Borrow the sender at `pos` together with its neighbor.
    pub(crate) fn pair_mut(
        &mut self,
        pos: usize,
    ) -> Result<(&mut Node<T>, &mut Node<T>), InvariantViolation> {
        let succ = self.neighbor_of(pos);
        if pos == succ {
            return Err(InvariantViolation::NoNeighbor { node: NodeId(pos) });
        }
        if pos < succ {
            let (lo, hi) = self.nodes.split_at_mut(succ);
            Ok((&mut lo[pos], &mut hi[0]))
        } else {
            let (lo, hi) = self.nodes.split_at_mut(pos);
            Ok((&mut hi[0], &mut lo[succ]))
        }
    }

    pub fn nodes(&self) -> &[Node<T>] {
        &self.nodes
    }

    pub(crate) fn into_nodes(self) -> Vec<Node<T>> {
        self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_names() {
        let names: Vec<_> = [0, 1, 25, 26, 27, 51, 52, 701, 702]
            .iter()
            .map(|&i| NodeId(i).name())
            .collect();
        assert_eq!(names, ["a", "b", "z", "aa", "ab", "az", "ba", "zz", "aaa"]);
    }

    #[test]
    fn initial_labels() {
        let node: Node<String> = Node::new(NodeId(0), 3);
        assert_eq!(
            node.buffer(),
            &[
                Slot::Value("a0".to_owned()),
                Slot::Value("a1".to_owned()),
                Slot::Value("a2".to_owned()),
            ]
        );
        let node: Node<u64> = Node::new(NodeId(2), 2);
        assert_eq!(node.buffer(), &[Slot::Value(3), Slot::Value(3)]);
    }

    #[test]
    fn take_marks_in_transit() {
        let mut node: Node<String> = Node::new(NodeId(1), 3);
        assert_eq!(node.take(2), Ok("b2".to_owned()));
        assert!(node.slot(2).unwrap().is_in_transit());
        assert_eq!(
            node.take(2),
            Err(InvariantViolation::DoubleSend { node: NodeId(1), slot: 2 })
        );
        assert_eq!(
            node.accumulate(2, "x".to_owned()),
            Err(InvariantViolation::ReceiveInTransit { node: NodeId(1), slot: 2 })
        );
        assert_eq!(
            node.take(3),
            Err(InvariantViolation::SlotOutOfRange { node: NodeId(1), slot: 3 })
        );
        node.accumulate(0, "c0".to_owned()).unwrap();
        assert_eq!(node.slot(0), Some(&Slot::Value("b0c0".to_owned())));
    }

    #[test]
    fn ring_neighbors() {
        let ring: Ring<String> = Ring::new(4).unwrap();
        let succ: Vec<_> = (0..4).map(|i| ring.neighbor_of(i)).collect();
        assert_eq!(succ, [1, 2, 3, 0]);
        assert_eq!(Ring::<String>::new(0).unwrap_err(), ConfigError::EmptyRing);
    }

    #[test]
    fn pair_mut_wraps_around() {
        let mut ring: Ring<String> = Ring::new(3).unwrap();
        let (sender, receiver) = ring.pair_mut(2).unwrap();
        assert_eq!((sender.id(), receiver.id()), (NodeId(2), NodeId(0)));
        let (sender, receiver) = ring.pair_mut(0).unwrap();
        assert_eq!((sender.id(), receiver.id()), (NodeId(0), NodeId(1)));
    }

    #[test]
    fn single_node_has_no_pair() {
        let mut ring: Ring<String> = Ring::new(1).unwrap();
        assert_eq!(
            ring.pair_mut(0).map(|_| ()),
            Err(InvariantViolation::NoNeighbor { node: NodeId(0) })
        );
    }

    #[test]
    fn node_lookup_out_of_range() {
        let ring: Ring<String> = Ring::new(2).unwrap();
        assert_eq!(ring.node(1).map(|n| n.id()), Some(NodeId(1)));
        assert!(ring.node(2).is_none());
    }
}
