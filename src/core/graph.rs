use crate::core::geometry::Rectangle;

/// Undirected graph over a rectangle set, with an edge between every pair of
/// rectangles that overlap.
#[derive(Debug, Clone)]
pub struct OverlapGraph {
    adjacency: Vec<Vec<bool>>,
}

impl OverlapGraph {
    pub fn new(rectangles: &[Rectangle]) -> Self {
        let n = rectangles.len();
        let mut adjacency = vec![vec![false; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                if rectangles[i].overlaps(&rectangles[j]) {
                    adjacency[i][j] = true;
                    adjacency[j][i] = true;
                }
            }
        }
        Self { adjacency }
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn is_adjacent(&self, i: usize, j: usize) -> bool {
        self.adjacency[i][j]
    }

    fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[idx]
            .iter()
            .enumerate()
            .filter_map(|(j, &edge)| edge.then_some(j))
    }

    /// Partitions the vertices into connected components.
    ///
    /// Components come out in order of their lowest index, and each one lists
    /// its indices in ascending order.
    pub fn divide_groups(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.len()];
        let mut groups = Vec::new();

        for root in 0..self.len() {
            if visited[root] {
                continue;
            }
            visited[root] = true;
            let mut group = Vec::new();
            let mut stack = vec![root];
            while let Some(idx) = stack.pop() {
                group.push(idx);
                for next in self.neighbors(idx) {
                    if !visited[next] {
                        visited[next] = true;
                        stack.push(next);
                    }
                }
            }
            group.sort_unstable();
            groups.push(group);
        }

        groups
    }
}
