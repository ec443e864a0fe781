/// Positions of items that could not be transformed, in order of occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureCollector {
    indices: Vec<usize>,
}

impl FailureCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, index: usize) {
        self.indices.push(index);
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }
}
