//! Downward addressing of nodes in a tree

use std::fmt;
use std::str::FromStr;

use crate::error::TreeError;

/// One step from a person to one of the people it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// The spouse slot
    Spouse,
    /// The child at this index
    Child(usize),
}

/// Location of a node, as the steps taken from the root to reach it.
///
/// Written as `/` for the root, `/s` for the root's spouse and `/0/s/2`
/// for the third child of the spouse of the root's first child.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    steps: Vec<Step>,
}

impl NodePath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from explicit steps.
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps from the root.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Path to this node's spouse.
    pub fn spouse(&self) -> Self {
        self.join(Step::Spouse)
    }

    /// Path to this node's child at `index`.
    pub fn child(&self, index: usize) -> Self {
        self.join(Step::Child(index))
    }

    /// Extend the path by one step.
    pub fn join(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    /// Split into the parent path and the last step; `None` for the root.
    pub fn split_last(&self) -> Option<(NodePath, Step)> {
        let (last, parent) = self.steps.split_last()?;
        Some((NodePath::from_steps(parent.to_vec()), *last))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("/");
        }
        for step in &self.steps {
            match step {
                Step::Spouse => f.write_str("/s")?,
                Step::Child(i) => write!(f, "/{}", i)?,
            }
        }
        Ok(())
    }
}

impl FromStr for NodePath {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| TreeError::InvalidPath {
            path: s.to_string(),
            reason,
        };

        let mut steps = Vec::new();
        for segment in s.trim().split('/').filter(|seg| !seg.is_empty()) {
            let step = match segment {
                "s" | "spouse" => Step::Spouse,
                other => other
                    .parse::<usize>()
                    .map(Step::Child)
                    .map_err(|_| invalid(format!("unexpected segment `{}`", other)))?,
            };
            steps.push(step);
        }
        Ok(Self { steps })
    }
}
