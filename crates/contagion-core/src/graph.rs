use crate::{ContagionError, NodeId, Result};
use std::collections::HashMap;

/// Directed facility network over labelled nodes.
///
/// An edge `u -> v` means `v` is influenced by its predecessor `u`. Node ids are
/// positions in the label list handed to the constructor, so they follow the
/// row order of the incidence table the network was loaded from. Adjacency
/// lists are kept sorted by node id.
#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    labels: Vec<String>,
    index: HashMap<String, NodeId>,
    successors: Vec<Vec<NodeId>>,
    predecessors: Vec<Vec<NodeId>>,
}

impl Network {
    /// Network with the given nodes and no edges
    pub fn new<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Result<Self> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(labels.len());
        for (id, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), id).is_some() {
                return Err(ContagionError::DuplicateNode(label.clone()));
            }
        }

        let n = labels.len();
        Ok(Self {
            labels,
            index,
            successors: vec![Vec::new(); n],
            predecessors: vec![Vec::new(); n],
        })
    }

    /// Build from an edge-presence relation: `present(i, j)` adds `i -> j`
    pub fn from_presence<S, P>(labels: impl IntoIterator<Item = S>, present: P) -> Result<Self>
    where
        S: Into<String>,
        P: Fn(NodeId, NodeId) -> bool,
    {
        let mut network = Self::new(labels)?;
        let n = network.len();
        for i in 0..n {
            for j in 0..n {
                if present(i, j) {
                    network.insert_edge(i, j);
                }
            }
        }
        Ok(network)
    }

    /// Build from a square incidence matrix; any nonzero entry is an edge
    pub fn from_matrix<S: Into<String>>(
        labels: impl IntoIterator<Item = S>,
        matrix: &[Vec<f64>],
    ) -> Result<Self> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let n = labels.len();
        if matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
            return Err(ContagionError::invalid(format!(
                "incidence matrix must be {n}x{n} to match the node labels"
            )));
        }
        Self::from_presence(labels, |i, j| matrix[i][j] != 0.0)
    }

    /// Build from labelled edge pairs over a known node list
    pub fn from_edges<S, A, B>(
        labels: impl IntoIterator<Item = S>,
        edges: impl IntoIterator<Item = (A, B)>,
    ) -> Result<Self>
    where
        S: Into<String>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut network = Self::new(labels)?;
        for (u, v) in edges {
            let u = network.index_of(u.as_ref())?;
            let v = network.index_of(v.as_ref())?;
            network.insert_edge(u, v);
        }
        Ok(network)
    }

    /// Insert `u -> v`; duplicates are ignored. Ids outside the network are
    /// reported as `UnknownNode`.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> Result<()> {
        if let Some(bad) = [u, v].into_iter().find(|&id| id >= self.len()) {
            return Err(ContagionError::UnknownNode(format!("#{bad}")));
        }
        self.insert_edge(u, v);
        Ok(())
    }

    fn insert_edge(&mut self, u: NodeId, v: NodeId) {
        if let Err(pos) = self.successors[u].binary_search(&v) {
            self.successors[u].insert(pos, v);
        }
        if let Err(pos) = self.predecessors[v].binary_search(&u) {
            self.predecessors[v].insert(pos, u);
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn num_edges(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.labels[id]
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn index_of(&self, label: &str) -> Result<NodeId> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| ContagionError::UnknownNode(label.to_string()))
    }

    /// Resolve a list of labels, failing on the first unknown one
    pub fn resolve<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<NodeId>> {
        labels.iter().map(|l| self.index_of(l.as_ref())).collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.labels.iter().enumerate().map(|(id, l)| (id, l.as_str()))
    }

    /// All edges as `(source, target)` in source-then-target order
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(u, succ)| succ.iter().map(move |&v| (u, v)))
    }

    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.successors
            .get(u)
            .map(|succ| succ.binary_search(&v).is_ok())
            .unwrap_or(false)
    }

    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        self.successors.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        self.predecessors.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Labels of the direct predecessors of `label`
    pub fn predecessors_of(&self, label: &str) -> Result<Vec<&str>> {
        let id = self.index_of(label)?;
        Ok(self.predecessors(id).iter().map(|&u| self.label(u)).collect())
    }

    /// Labels of the direct successors of `label`
    pub fn successors_of(&self, label: &str) -> Result<Vec<&str>> {
        let id = self.index_of(label)?;
        Ok(self.successors(id).iter().map(|&v| self.label(v)).collect())
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        self.predecessors(id).len()
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.successors(id).len()
    }

    /// In-degree plus out-degree; a self-loop counts twice
    pub fn degree(&self, id: NodeId) -> usize {
        self.in_degree(id) + self.out_degree(id)
    }

    /// Copy keeping every node but only the edges accepted by `keep`
    pub fn filter_edges<K: Fn(NodeId, NodeId) -> bool>(&self, keep: K) -> Network {
        let mut filtered = Network {
            labels: self.labels.clone(),
            index: self.index.clone(),
            successors: vec![Vec::new(); self.len()],
            predecessors: vec![Vec::new(); self.len()],
        };
        for (u, v) in self.edges().filter(|&(u, v)| keep(u, v)) {
            filtered.insert_edge(u, v);
        }
        filtered
    }

    /// Copy of the network without `label` and its incident edges.
    /// Remaining nodes keep their relative order but are renumbered.
    pub fn remove_node(&self, label: &str) -> Result<Network> {
        let id = self.index_of(label)?;
        Ok(self.without(&[id]))
    }

    /// Copy of the network without the given node ids
    pub fn without(&self, removed: &[NodeId]) -> Network {
        let mut drop = vec![false; self.len()];
        for &id in removed {
            if id < drop.len() {
                drop[id] = true;
            }
        }

        // Old id -> new id for surviving nodes
        let mut remap = vec![None; self.len()];
        let mut labels = Vec::new();
        for (id, label) in self.labels.iter().enumerate() {
            if !drop[id] {
                remap[id] = Some(labels.len());
                labels.push(label.clone());
            }
        }

        let n = labels.len();
        let index = labels
            .iter()
            .enumerate()
            .map(|(id, l)| (l.clone(), id))
            .collect();
        let mut reduced = Network {
            labels,
            index,
            successors: vec![Vec::new(); n],
            predecessors: vec![Vec::new(); n],
        };
        for (u, v) in self.edges() {
            if let (Some(nu), Some(nv)) = (remap[u], remap[v]) {
                reduced.insert_edge(nu, nv);
            }
        }
        reduced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Network {
        // A -> B -> C, A -> D
        Network::from_edges(["A", "B", "C", "D"], [("A", "B"), ("B", "C"), ("A", "D")]).unwrap()
    }

    #[test]
    fn test_neighborhoods() {
        let g = chain();
        assert_eq!(g.len(), 4);
        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.successors_of("A").unwrap(), vec!["B", "D"]);
        assert_eq!(g.predecessors_of("C").unwrap(), vec!["B"]);
        assert!(g.predecessors_of("A").unwrap().is_empty());
        assert_eq!(g.degree(g.index_of("B").unwrap()), 2);
    }

    #[test]
    fn test_unknown_node() {
        let g = chain();
        assert_eq!(
            g.predecessors_of("Z"),
            Err(ContagionError::UnknownNode("Z".to_string()))
        );
        assert!(g.remove_node("Z").is_err());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let err = Network::new(["A", "B", "A"]).unwrap_err();
        assert_eq!(err, ContagionError::DuplicateNode("A".to_string()));
    }

    #[test]
    fn test_from_matrix() {
        let matrix = vec![
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 2.0],
            vec![1.0, 0.0, 0.0],
        ];
        let g = Network::from_matrix(["X", "Y", "Z"], &matrix).unwrap();
        let edges: Vec<_> = g.edges().collect();
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 0)]);

        let ragged = vec![vec![0.0, 1.0], vec![0.0]];
        assert!(Network::from_matrix(["X", "Y"], &ragged).is_err());
    }

    #[test]
    fn test_remove_node() {
        let g = chain();
        let reduced = g.remove_node("B").unwrap();
        assert_eq!(reduced.labels(), &["A", "C", "D"]);
        assert_eq!(reduced.num_edges(), 1);
        assert_eq!(reduced.successors_of("A").unwrap(), vec!["D"]);
        assert!(reduced.predecessors_of("C").unwrap().is_empty());

        // Base network untouched
        assert_eq!(g.num_edges(), 3);
    }

    #[test]
    fn test_copies_are_independent() {
        let g = chain();
        let mut copy = g.clone();
        copy.add_edge(3, 2).unwrap();
        assert!(copy.has_edge(3, 2));
        assert!(!g.has_edge(3, 2));
    }

    #[test]
    fn test_duplicate_edges_ignored() {
        let mut g = chain();
        g.add_edge(0, 1).unwrap();
        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.predecessors(1), &[0]);
    }

    #[test]
    fn test_add_edge_out_of_range() {
        let mut g = chain();
        assert_eq!(g.add_edge(0, 4), Err(ContagionError::UnknownNode("#4".to_string())));
        assert_eq!(g.add_edge(9, 1), Err(ContagionError::UnknownNode("#9".to_string())));
        assert_eq!(g.num_edges(), 3);
    }
}
