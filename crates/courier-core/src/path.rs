// Field paths
//
// Tracks where in an object graph the encoder or decoder currently is, so
// that failures can name the offending field.

use std::fmt;

/// One step from a container into one of its children
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named field of an object or key of a mapping
    Field(String),
    /// Position inside an ordered sequence
    Index(usize),
}

/// Location of a value inside an object graph, rooted at the encoded object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The path of the root object
    pub fn root() -> Self {
        Self::default()
    }

    pub fn push_field(&mut self, name: &str) {
        self.segments.push(PathSegment::Field(name.to_string()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Number of segments below the root
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if position == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let mut path = FieldPath::root();
        assert_eq!(path.to_string(), "<root>");

        path.push_field("events");
        path.push_index(1);
        path.push_field("inputPath");
        assert_eq!(path.to_string(), "events[1].inputPath");
        assert_eq!(path.depth(), 3);

        path.pop();
        path.pop();
        assert_eq!(path.to_string(), "events");
    }
}
