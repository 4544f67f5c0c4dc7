use std::fmt;

use crate::node::Node;
use crate::simulator::SimulationOutput;

struct List<'a, T>(&'a [T]);

impl<'a, T: fmt::Display> fmt::Display for List<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", x)?;
        }
        write!(f, "]")
    }
}

impl<T: fmt::Display> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node {}: {}", self.id(), List(self.buffer()))
    }
}

/// The textual transcript of a run. Per-step sections only show up when the
/// run recorded its transfers.
impl<T: fmt::Display> fmt::Display for SimulationOutput<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of nodes: {}.", self.num_nodes())?;
        writeln!(f, "Node latencies: {}", List(&self.node_latency))?;
        writeln!(f, "Link latencies: {}", List(&self.link_latency))?;

        for rec in &self.steps {
            writeln!(f)?;
            writeln!(f, "--- Step {} ---", rec.step + 1)?;
            for t in &rec.transfers {
                writeln!(f, "Node {} sends {} to Node {}", t.sender, t.value, t.receiver)?;
            }
            writeln!(f, "Step {} latency: {}", rec.step + 1, rec.latency)?;
        }
        writeln!(f, "Total latency: {}", self.total_latency)?;

        writeln!(f)?;
        writeln!(f, "Final data at each node:")?;
        for node in &self.nodes {
            writeln!(f, "{}", node)?;
        }
        Ok(())
    }
}
