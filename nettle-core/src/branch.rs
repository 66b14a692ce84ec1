use rand::Rng;

/// One fork of the woody skeleton.
///
/// The shape is drawn at random when the node is created and never
/// changes afterwards; only [`Branch::add_level`] can extend it.
#[derive(Clone, Debug)]
pub struct Branch {
    pub depth: u32,
    /// Fraction of the parent's segment length, in `[0.2, 0.6)`.
    pub length_multiplier: f32,
    /// Fork angle in radians, in `[10°, 50°)`. The second child of a
    /// pair uses the negated angle.
    pub angle: f32,
    pub children: Vec<Branch>,
}

impl Branch {
    pub fn new_leaf(depth: u32, rng: &mut impl Rng) -> Self {
        Self {
            depth,
            length_multiplier: (5.0 + rng.random::<f32>() * 10.0) / 25.0,
            angle: (10.0 + rng.random::<f32>() * 40.0).to_radians(),
            children: Vec::new(),
        }
    }

    /// Builds a complete binary tree from `depth` down to `max_depth`.
    pub fn generate(depth: u32, max_depth: u32, rng: &mut impl Rng) -> Self {
        let mut node = Self::new_leaf(depth, rng);
        if depth < max_depth {
            node.children = vec![
                Self::generate(depth + 1, max_depth, rng),
                Self::generate(depth + 1, max_depth, rng),
            ];
        }
        node
    }

    /// Attaches two fresh children to every node `new_depth - 1` levels
    /// below `self`.
    ///
    /// Nodes above that level are left untouched. Any children the
    /// addressed nodes already had are replaced.
    pub fn add_level(&mut self, new_depth: u32, rng: &mut impl Rng) {
        if new_depth == 0 {
            return;
        }
        let mut level: Vec<&mut Branch> = vec![self];
        for _ in 1..new_depth {
            level = level
                .into_iter()
                .flat_map(|b| b.children.iter_mut())
                .collect();
        }
        for node in level {
            node.children = vec![
                Self::new_leaf(new_depth, rng),
                Self::new_leaf(new_depth, rng),
            ];
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Branch::node_count).sum::<usize>()
    }

    /// Depths of every terminal node, in depth-first order.
    pub fn leaf_depths(&self) -> Vec<u32> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(b) = stack.pop() {
            if b.is_terminal() {
                out.push(b.depth);
            } else {
                stack.extend(b.children.iter().rev());
            }
        }
        out
    }
}
